use std::{
  borrow::Cow,
  path::{Path, PathBuf},
  sync::Arc,
};

use balafon_common::VirtualModuleId;
use balafon_plugin::{
  BuildPlugin, DevServer, HmrPayload, HotUpdateArgs, LoadArgs, LoadOutput, OutputBundle,
  OutputOptions, PluginContext, PluginName, ResolveArgs, ResolveOutput, ResolvedConfig,
};
use balafon_runner::{ProcessRunner, ToolRunner};
use sugar_path::SugarPathBuf;
use tracing::instrument;

use crate::{
  default_warning_handler, diagnostics, names, rewrite, BalafonOptions, BuildResult, BuildSession,
  ProducerRegistry, WarningHandler, WatchBridge, WatchListener,
};

/// Serves the `virtual:balafon/*` modules of a project and wires their emitted chunks together.
#[derive(Debug)]
pub struct BalafonPlugin {
  session: Arc<BuildSession>,
  registry: ProducerRegistry,
  bridge: WatchBridge,
}

impl BalafonPlugin {
  pub fn new(options: BalafonOptions, runner: Arc<dyn ToolRunner>) -> BuildResult<Self> {
    Self::with_warning_handler(options, runner, default_warning_handler())
  }

  /// Recoverable failures go to `on_warn` instead of stderr.
  pub fn with_warning_handler(
    options: BalafonOptions,
    runner: Arc<dyn ToolRunner>,
    on_warn: WarningHandler,
  ) -> BuildResult<Self> {
    balafon_tracing::enable_tracing_on_demand();
    options.validate()?;
    let session = BuildSession::new(Arc::new(options), runner).with_warning_handler(on_warn);
    Ok(Self {
      session: Arc::new(session),
      registry: ProducerRegistry::with_builtin_producers(),
      bridge: WatchBridge::default(),
    })
  }

  /// Spawns the configured tool program for every command.
  pub fn with_process_runner(options: BalafonOptions) -> BuildResult<Self> {
    let runner = ProcessRunner::new(options.tool.program.clone(), options.tool.timeout());
    Self::new(options, Arc::new(runner))
  }

  pub fn session(&self) -> &BuildSession {
    &self.session
  }

  pub fn bridge(&self) -> &WatchBridge {
    &self.bridge
  }

  fn project_config_path(&self, root: &Path) -> PathBuf {
    root.join(&self.session.options().project_config).into_absolutize()
  }

  async fn register_builtin_listeners(&self, root: &Path) {
    if let Some(i18n_root) = &self.session.options().i18n_root {
      let dir = root.join(i18n_root).into_absolutize();
      self
        .bridge
        .register(WatchListener::new(
          "locales",
          move |path| {
            path.to_path_buf().into_absolutize().starts_with(&dir)
              && path.extension().and_then(|ext| ext.to_str()) == Some("json")
          },
          |_, server| {
            let id = VirtualModuleId::virtual_module(names::I18N);
            server.invalidate_module(id.id());
            server.send(HmrPayload::Update {
              id: id.id().to_string(),
            });
            true
          },
        ))
        .await;
    }

    let config_path = self.project_config_path(root);
    self
      .bridge
      .register(WatchListener::new(
        "project config",
        move |path| path.to_path_buf().into_absolutize() == config_path,
        |_, server| {
          for name in [names::SETTINGS, names::CORE_SCRIPT, names::CORE_STYLESHEET] {
            server.invalidate_module(VirtualModuleId::virtual_module(name).id());
          }
          server.send(HmrPayload::FullReload);
          true
        },
      ))
      .await;
  }
}

#[async_trait::async_trait]
impl BuildPlugin for BalafonPlugin {
  fn name(&self) -> PluginName {
    Cow::Borrowed("balafon:virtual-modules")
  }

  #[instrument(skip_all)]
  async fn config_resolved(&self, config: &ResolvedConfig) -> BuildResult<()> {
    self.session.configure(config).await;
    self.bridge.clear().await;
    self.register_builtin_listeners(&config.root).await;
    diagnostics::announce(if config.is_production {
      "virtual modules (production)"
    } else {
      "virtual modules (development)"
    });
    Ok(())
  }

  async fn resolve_id(&self, _ctx: &mut dyn PluginContext, args: &ResolveArgs) -> ResolveOutput {
    Ok(
      self
        .registry
        .resolve(&self.session, args.specifier)
        .await
        .map(|id| id.id().to_string()),
    )
  }

  #[instrument(skip_all)]
  async fn load(&self, ctx: &mut dyn PluginContext, args: &LoadArgs) -> LoadOutput {
    self.registry.load(&self.session, ctx, args.id).await
  }

  #[instrument(skip_all)]
  async fn generate_bundle(
    &self,
    ctx: &mut dyn PluginContext,
    output_options: &OutputOptions,
    bundle: &mut OutputBundle,
  ) -> BuildResult<()> {
    if !output_options.format.is_es() {
      return Ok(());
    }
    let references = self.session.references().await;
    let references = rewrite::resolve_references(ctx, references)?;
    rewrite::rewrite_bundle(output_options.format, &references, bundle)
  }

  #[instrument(skip_all, fields(file = %args.file.display()))]
  async fn handle_hot_update(
    &self,
    server: &mut dyn DevServer,
    args: &HotUpdateArgs,
  ) -> BuildResult<bool> {
    let root = self.session.root().await;
    if args.file.to_path_buf().into_absolutize() == self.project_config_path(&root) {
      self.session.forget_environment().await;
    }
    self
      .bridge
      .on_file_change(&self.registry, &self.session, server, args.file)
      .await
  }
}
