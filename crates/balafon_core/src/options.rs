use std::{
  path::{Component, Path, PathBuf},
  time::Duration,
};

use balafon_common::ContentKind;
use balafon_error::Error;
use serde::Deserialize;

use crate::BuildResult;

/// Which deferrable kinds a production build emits as static assets instead of chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetOptions {
  pub core_script: bool,
  pub core_stylesheet: bool,
  pub icons: bool,
}

impl AssetOptions {
  pub fn for_kind(&self, kind: ContentKind) -> bool {
    match kind {
      ContentKind::CoreScript => self.core_script,
      ContentKind::CoreStylesheet => self.core_stylesheet,
      ContentKind::IconLibrary => self.icons,
      _ => false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolOptions {
  /// Program spawned for every tool command. Never run through a shell.
  pub program: String,
  pub timeout_ms: u64,
  /// Working directory of the tool, relative to the project root. The root itself when unset.
  pub cwd: Option<PathBuf>,
}

impl Default for ToolOptions {
  fn default() -> Self {
    Self {
      program: "balafon".to_string(),
      timeout_ms: 30_000,
      cwd: None,
    }
  }
}

impl ToolOptions {
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BalafonOptions {
  /// Directory (inside the output dir) every emitted chunk and asset is placed under.
  pub emit_prefix: String,
  pub as_asset: AssetOptions,
  /// Directory of `<locale>.json` files, relative to the project root.
  pub i18n_root: Option<PathBuf>,
  /// Directory of the component templates served under `virtual:balafon/ssr/`.
  pub components_dir: Option<PathBuf>,
  pub component_extension: String,
  /// Name of the host transform that compiles component templates.
  pub template_transform: String,
  /// Project configuration file; a change to it reloads the page.
  pub project_config: PathBuf,
  pub tool: ToolOptions,
  /// Report recoverable failures in production builds too.
  pub verbose: bool,
}

impl Default for BalafonOptions {
  fn default() -> Self {
    Self {
      emit_prefix: "balafon".to_string(),
      as_asset: Default::default(),
      i18n_root: None,
      components_dir: None,
      component_extension: ".vue".to_string(),
      template_transform: "vite:vue".to_string(),
      project_config: PathBuf::from("balafon.config.xml"),
      tool: Default::default(),
      verbose: false,
    }
  }
}

impl BalafonOptions {
  pub fn from_json_str(json: &str) -> BuildResult<Self> {
    let options: Self = serde_json::from_str(json)
      .map_err(|e| Error::invalid_option("options", e.to_string()))?;
    options.validate()?;
    Ok(options)
  }

  pub fn validate(&self) -> BuildResult<()> {
    let prefix = Path::new(&self.emit_prefix);
    if self.emit_prefix.is_empty() {
      return Err(Error::invalid_option("emitPrefix", "must not be empty"));
    }
    if self.emit_prefix.contains('\\')
      || !prefix
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
      return Err(Error::invalid_option(
        "emitPrefix",
        format!(
          "\"{}\" must be a relative path without \"..\" or \".\" segments",
          self.emit_prefix
        ),
      ));
    }
    if !self.component_extension.starts_with('.') {
      return Err(Error::invalid_option(
        "componentExtension",
        "must start with a dot",
      ));
    }
    if self.tool.program.trim().is_empty() {
      return Err(Error::invalid_option("tool.program", "must not be empty"));
    }
    if self.tool.timeout_ms == 0 {
      return Err(Error::invalid_option(
        "tool.timeoutMs",
        "must be greater than zero",
      ));
    }
    Ok(())
  }

  /// Fills every field still at its default with the value from `other`. Set fields win.
  pub fn merge_missing(mut self, other: &BalafonOptions) -> Self {
    let defaults = BalafonOptions::default();
    macro_rules! fill {
      ($($field:ident).+) => {
        if self.$($field).+ == defaults.$($field).+ {
          self.$($field).+ = other.$($field).+.clone();
        }
      };
    }
    fill!(emit_prefix);
    fill!(as_asset.core_script);
    fill!(as_asset.core_stylesheet);
    fill!(as_asset.icons);
    fill!(i18n_root);
    fill!(components_dir);
    fill!(component_extension);
    fill!(template_transform);
    fill!(project_config);
    fill!(tool.program);
    fill!(tool.timeout_ms);
    fill!(tool.cwd);
    fill!(verbose);
    self
  }
}
