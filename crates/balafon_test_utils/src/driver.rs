use balafon_error::Result;
use balafon_plugin::{
  BuildPlugin, DevServer, HotUpdateArgs, LoadArgs, LoadOutput, OutputBundle, OutputOptions,
  PluginContext, ResolveArgs, ResolveOutput, ResolvedConfig,
};

/// Calls plugins in order, the way a host does: first result wins for `resolve_id` and `load`.
#[derive(Debug, Default)]
pub struct PluginDriver {
  pub plugins: Vec<Box<dyn BuildPlugin>>,
}

impl PluginDriver {
  pub fn new(plugins: Vec<Box<dyn BuildPlugin>>) -> Self {
    Self { plugins }
  }

  pub async fn config_resolved(&self, config: &ResolvedConfig) -> Result<()> {
    for plugin in &self.plugins {
      plugin.config_resolved(config).await?;
    }
    Ok(())
  }

  pub async fn resolve_id(&self, ctx: &mut dyn PluginContext, specifier: &str) -> ResolveOutput {
    let args = ResolveArgs {
      importer: None,
      specifier,
    };
    for plugin in &self.plugins {
      let output = plugin.resolve_id(ctx, &args).await?;
      if output.is_some() {
        return Ok(output);
      }
    }
    Ok(None)
  }

  pub async fn load(&self, ctx: &mut dyn PluginContext, id: &str) -> LoadOutput {
    for plugin in &self.plugins {
      let output = plugin.load(ctx, &LoadArgs { id }).await?;
      if output.is_some() {
        return Ok(output);
      }
    }
    Ok(None)
  }

  pub async fn generate_bundle(
    &self,
    ctx: &mut dyn PluginContext,
    output_options: &OutputOptions,
    bundle: &mut OutputBundle,
  ) -> Result<()> {
    for plugin in &self.plugins {
      plugin.generate_bundle(ctx, output_options, bundle).await?;
    }
    Ok(())
  }

  /// Every plugin sees the change. `false` means the host falls back to a full reload.
  pub async fn handle_hot_update(
    &self,
    server: &mut dyn DevServer,
    file: &std::path::Path,
  ) -> Result<bool> {
    let mut claimed = false;
    for plugin in &self.plugins {
      claimed |= plugin
        .handle_hot_update(server, &HotUpdateArgs { file })
        .await?;
    }
    Ok(claimed)
  }
}
