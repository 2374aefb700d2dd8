use std::sync::Arc;

pub use {
  balafon_common::{BuildMode, ContentKind, FileRef, ModuleSource, RewriteKind, VirtualModuleId},
  balafon_core::{
    names, AssetOptions, BalafonOptions, BalafonPlugin, BuildError, BuildResult, ToolOptions,
  },
  balafon_plugin::{
    BuildPlugin, Command, DevServer, HmrPayload, ModuleFormat, OutputAsset, OutputBundle,
    OutputChunk, OutputFile, OutputOptions, PluginContext, ResolvedConfig, TemplateTransform,
  },
  balafon_runner::{ProcessRunner, ToolRunner},
};

/// The plugins a host registers for a balafon project.
pub fn plugins(
  options: BalafonOptions,
  runner: Arc<dyn ToolRunner>,
) -> BuildResult<Vec<Box<dyn BuildPlugin>>> {
  Ok(vec![Box::new(BalafonPlugin::new(options, runner)?)])
}

/// Like [plugins], spawning the tool configured in `options`.
pub fn plugins_with_process_runner(options: BalafonOptions) -> BuildResult<Vec<Box<dyn BuildPlugin>>> {
  Ok(vec![Box::new(BalafonPlugin::with_process_runner(options)?)])
}

/// Options as a host passes them, camelCase JSON.
pub fn options_from_json(json: &str) -> BuildResult<BalafonOptions> {
  BalafonOptions::from_json_str(json)
}
