use std::{fmt::Debug, path::PathBuf, sync::Arc};

use derivative::Derivative;

/// Compiles a component template (single file component source) into an ES module.
#[async_trait::async_trait]
pub trait TemplateTransform: Debug + Send + Sync {
  fn name(&self) -> &str;

  async fn transform(&self, source: &str, id: &str, ssr: bool) -> balafon_error::anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Serve,
  Build,
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ResolvedConfig {
  pub root: PathBuf,
  pub command: Command,
  pub is_production: bool,
  pub ssr: bool,
  pub out_dir: PathBuf,
  #[derivative(Debug = "ignore")]
  pub transforms: Vec<Arc<dyn TemplateTransform>>,
}

impl Default for ResolvedConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      command: Command::Build,
      is_production: true,
      ssr: false,
      out_dir: PathBuf::from("dist"),
      transforms: vec![],
    }
  }
}
