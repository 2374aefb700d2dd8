mod diagnostics;
mod emission;
pub use emission::*;
pub mod names;
mod options;
pub use options::*;
mod plugin;
pub use plugin::*;
pub mod producers;
mod registry;
pub use registry::*;
pub mod rewrite;
mod session;
pub use session::*;
mod transform;
pub use transform::*;
pub mod utils;
mod watch;
pub use watch::*;

pub use diagnostics::{default_warning_handler, WarningHandler};

pub type BuildResult<T> = balafon_error::Result<T>;
pub type BuildError = balafon_error::Error;
