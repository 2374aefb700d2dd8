use std::{borrow::Cow, fmt::Debug};

use crate::{
  DevServer, HotUpdateArgs, LoadArgs, LoadOutput, OutputBundle, OutputOptions, PluginContext,
  ResolveArgs, ResolvedConfig,
};

pub type ResolveOutput = balafon_error::Result<Option<String>>;
pub type PluginName<'a> = Cow<'a, str>;

/// The hooks a host module graph drives. Every hook is optional.
#[async_trait::async_trait]
pub trait BuildPlugin: Debug + Send + Sync {
  fn name(&self) -> PluginName;

  async fn config_resolved(&self, _config: &ResolvedConfig) -> balafon_error::Result<()> {
    Ok(())
  }

  async fn resolve_id(&self, _ctx: &mut dyn PluginContext, _args: &ResolveArgs) -> ResolveOutput {
    Ok(None)
  }

  async fn load(&self, _ctx: &mut dyn PluginContext, _args: &LoadArgs) -> LoadOutput {
    Ok(None)
  }

  async fn generate_bundle(
    &self,
    _ctx: &mut dyn PluginContext,
    _output_options: &OutputOptions,
    _bundle: &mut OutputBundle,
  ) -> balafon_error::Result<()> {
    Ok(())
  }

  /// Returns `true` when the change was claimed and the host should skip its full reload.
  async fn handle_hot_update(
    &self,
    _server: &mut dyn DevServer,
    _args: &HotUpdateArgs,
  ) -> balafon_error::Result<bool> {
    Ok(false)
  }
}
