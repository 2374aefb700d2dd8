use std::borrow::Cow;
use std::path::PathBuf;

mod module_id;
pub use module_id::*;
mod emit_reference;
pub use emit_reference::*;
mod build_mode;
pub use build_mode::*;

pub type StaticStr = Cow<'static, str>;

scoped_tls::scoped_thread_local!(pub static CWD: PathBuf);

/// What a `load` hook hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
  pub code: String,
  pub map: Option<String>,
}

impl ModuleSource {
  pub fn new(code: impl Into<String>) -> Self {
    Self {
      code: code.into(),
      map: None,
    }
  }

  pub fn null_stub() -> Self {
    Self::new(NULL_STUB)
  }
}

impl From<String> for ModuleSource {
  fn from(code: String) -> Self {
    Self::new(code)
  }
}

pub const NULL_STUB: &str = "export default null;";
