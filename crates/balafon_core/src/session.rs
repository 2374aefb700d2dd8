use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use balafon_common::{BuildMode, EmitReference, FileRef, ModuleSource, VirtualModuleId};
use balafon_error::Error;
use balafon_plugin::{ResolvedConfig, TemplateTransform};
use balafon_runner::ToolRunner;
use derivative::Derivative;
use rustc_hash::FxHashMap;
use sugar_path::SugarPathBuf;
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::{
  diagnostics::{default_warning_handler, WarningHandler},
  find_transform,
  names::command,
  BalafonOptions, BuildResult, WatchTable,
};

/// Project environment reported by the tool, fetched at most once per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectEnv {
  pub settings: serde_json::Value,
}

#[derive(Debug, Clone)]
struct SessionConfig {
  mode: BuildMode,
  root: PathBuf,
  transform: Option<Arc<dyn TemplateTransform>>,
}

/// Everything one plugin instance remembers between hooks.
///
/// Collections are appended to by whichever producer runs; locks are never held across a producer await.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct BuildSession {
  options: Arc<BalafonOptions>,
  runner: Arc<dyn ToolRunner>,
  #[derivative(Debug = "ignore")]
  on_warn: WarningHandler,
  config: RwLock<SessionConfig>,
  environment: RwLock<Arc<OnceCell<ProjectEnv>>>,
  produced: Mutex<FxHashMap<VirtualModuleId, ModuleSource>>,
  entries: Mutex<FxHashMap<String, ModuleSource>>,
  chunks: Mutex<FxHashMap<String, FileRef>>,
  references: Mutex<Vec<EmitReference>>,
  watch: Mutex<WatchTable>,
}

impl BuildSession {
  pub fn new(options: Arc<BalafonOptions>, runner: Arc<dyn ToolRunner>) -> Self {
    Self {
      options,
      runner,
      on_warn: default_warning_handler(),
      config: RwLock::new(SessionConfig {
        mode: BuildMode::development(),
        root: PathBuf::from("."),
        transform: None,
      }),
      environment: Default::default(),
      produced: Default::default(),
      entries: Default::default(),
      chunks: Default::default(),
      references: Default::default(),
      watch: Default::default(),
    }
  }

  pub fn with_warning_handler(mut self, on_warn: WarningHandler) -> Self {
    self.on_warn = on_warn;
    self
  }

  /// Hands a recoverable failure to the warning handler and lets the build continue.
  pub fn report(&self, err: &Error) {
    tracing::warn!("{} {}", err.kind.code(), err);
    (self.on_warn)(err);
  }

  /// Like [BuildSession::report], but quiet in production builds unless `verbose` is set.
  pub async fn report_verbose(&self, err: &Error) {
    if !self.mode().await.is_production || self.options.verbose {
      self.report(err);
    } else {
      tracing::debug!("{} {}", err.kind.code(), err);
    }
  }

  /// Starts a build: fixes the mode and forgets what the previous build emitted.
  pub async fn configure(&self, config: &ResolvedConfig) {
    let mode = BuildMode {
      is_production: config.is_production,
      is_ssr: config.ssr,
    };
    let transform = find_transform(&config.transforms, &self.options.template_transform);
    *self.config.write().await = SessionConfig {
      mode,
      root: config.root.clone(),
      transform,
    };
    self.produced.lock().await.clear();
    self.entries.lock().await.clear();
    self.chunks.lock().await.clear();
    self.references.lock().await.clear();
    tracing::debug!("configured {:?} in {}", mode, config.root.display());
  }

  pub fn options(&self) -> &BalafonOptions {
    &self.options
  }

  pub async fn mode(&self) -> BuildMode {
    self.config.read().await.mode
  }

  pub async fn root(&self) -> PathBuf {
    self.config.read().await.root.clone()
  }

  pub async fn project_path(&self, relative: &Path) -> PathBuf {
    self.root().await.join(relative)
  }

  pub async fn transform(&self) -> Option<Arc<dyn TemplateTransform>> {
    self.config.read().await.transform.clone()
  }

  /// Directory the tool runs in: `tool.cwd` resolved against the project root, or the root itself.
  pub async fn tool_cwd(&self) -> PathBuf {
    let root = self.root().await;
    match &self.options.tool.cwd {
      Some(cwd) => root.join(cwd).into_absolutize(),
      None => root.into_absolutize(),
    }
  }

  pub async fn run_tool(&self, args: &[String]) -> BuildResult<String> {
    let cwd = self.tool_cwd().await;
    self.runner.run(args, &cwd).await
  }

  /// Single flight: concurrent callers wait for the first fetch instead of spawning the tool again.
  pub async fn environment(&self) -> ProjectEnv {
    let cell = self.environment.read().await.clone();
    cell
      .get_or_init(|| async {
        match self.fetch_environment().await {
          Ok(env) => env,
          Err(err) => {
            self.report(&err.context("fetching the project environment"));
            ProjectEnv {
              settings: serde_json::Value::Object(Default::default()),
            }
          }
        }
      })
      .await
      .clone()
  }

  /// The next [BuildSession::environment] call asks the tool again.
  pub async fn forget_environment(&self) {
    *self.environment.write().await = Default::default();
  }

  async fn fetch_environment(&self) -> BuildResult<ProjectEnv> {
    let stdout = self.run_tool(&command::args(command::ENV)).await?;
    let settings: serde_json::Value = serde_json::from_str(stdout.trim())
      .map_err(|e| Error::malformed_tool_output("project environment", e))?;
    if !settings.is_object() {
      return Err(Error::malformed_tool_output(
        "project environment",
        "expected a JSON object",
      ));
    }
    Ok(ProjectEnv { settings })
  }

  pub async fn produced(&self, id: &VirtualModuleId) -> Option<ModuleSource> {
    self.produced.lock().await.get(id).cloned()
  }

  /// Replaces what `id` produced last; returns the previous content.
  pub async fn store_produced(
    &self,
    id: &VirtualModuleId,
    source: ModuleSource,
  ) -> Option<ModuleSource> {
    self.produced.lock().await.insert(id.clone(), source)
  }

  pub async fn register_entry(&self, name: &str, body: ModuleSource) {
    self.entries.lock().await.insert(name.to_string(), body);
  }

  pub async fn entry(&self, name: &str) -> Option<ModuleSource> {
    self.entries.lock().await.get(name).cloned()
  }

  pub async fn has_entry(&self, name: &str) -> bool {
    self.entries.lock().await.contains_key(name)
  }

  /// Emits the chunk for entry `name` once per build; later callers get the first reference back.
  pub async fn chunk_once(
    &self,
    name: &str,
    body: ModuleSource,
    emit: impl FnOnce() -> FileRef + Send,
  ) -> FileRef {
    let mut chunks = self.chunks.lock().await;
    if let Some(file_ref) = chunks.get(name) {
      return file_ref.clone();
    }
    self.register_entry(name, body).await;
    let file_ref = emit();
    chunks.insert(name.to_string(), file_ref.clone());
    file_ref
  }

  /// Identical references are kept once.
  pub async fn push_reference(&self, reference: EmitReference) {
    let mut references = self.references.lock().await;
    if !references.contains(&reference) {
      references.push(reference);
    }
  }

  /// References in registration order.
  pub async fn references(&self) -> Vec<EmitReference> {
    self.references.lock().await.clone()
  }

  /// Paths are stored absolute and without `.`/`..` segments, the form change events arrive in.
  pub async fn watch(&self, path: &Path, id: &VirtualModuleId) {
    let path = path.to_path_buf().into_absolutize();
    self.watch.lock().await.store(&path, id.clone());
  }

  pub async fn watched_id(&self, path: &Path) -> Option<VirtualModuleId> {
    let path = path.to_path_buf().into_absolutize();
    self.watch.lock().await.get(&path).cloned()
  }
}

#[cfg(test)]
mod tests {
  use balafon_test_utils::FakeRunner;

  use super::*;
  use crate::diagnostics;

  fn session(runner: Arc<FakeRunner>) -> BuildSession {
    BuildSession::new(Arc::new(BalafonOptions::default()), runner)
  }

  #[tokio::test]
  async fn environment_is_fetched_once() {
    let runner = Arc::new(FakeRunner::new().respond(command::ENV, r#"{ "title": "demo" }"#));
    let session = session(runner.clone());
    let (a, b) = tokio::join!(session.environment(), session.environment());
    assert_eq!(a, b);
    assert_eq!(a.settings["title"], "demo");
    assert_eq!(runner.call_count(command::ENV), 1);
  }

  #[tokio::test]
  async fn malformed_environment_falls_back_to_an_empty_object() {
    let runner = Arc::new(FakeRunner::new().respond(command::ENV, "<html>"));
    let session = session(runner);
    assert_eq!(session.environment().await.settings, serde_json::json!({}));
  }

  #[tokio::test]
  async fn malformed_environment_reaches_the_warning_handler() {
    let runner = Arc::new(FakeRunner::new().respond(command::ENV, "<html>"));
    let seen = Arc::new(std::sync::Mutex::new(vec![]));
    let sink = seen.clone();
    let session = session(runner).with_warning_handler(Arc::new(move |err: &Error| {
      sink.lock().unwrap().push(diagnostics::warning_line(err));
    }));
    session.environment().await;
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("[balafon]"), "{}", seen[0]);
    assert!(seen[0].contains("MALFORMED_TOOL_OUTPUT"), "{}", seen[0]);
  }

  #[tokio::test]
  async fn tool_runs_in_the_project_root() {
    let runner = Arc::new(FakeRunner::new().respond(command::ENV, "{}"));
    let session = session(runner.clone());
    session
      .configure(&ResolvedConfig {
        root: PathBuf::from("/project"),
        ..Default::default()
      })
      .await;
    session.environment().await;
    assert_eq!(runner.cwds(), [PathBuf::from("/project")]);
  }

  #[tokio::test]
  async fn tool_cwd_is_relative_to_the_project_root() {
    let options = BalafonOptions {
      tool: crate::ToolOptions {
        cwd: Some(PathBuf::from("tools/../bin")),
        ..Default::default()
      },
      ..Default::default()
    };
    let session = BuildSession::new(Arc::new(options), Arc::new(FakeRunner::new()));
    session
      .configure(&ResolvedConfig {
        root: PathBuf::from("/project"),
        ..Default::default()
      })
      .await;
    assert_eq!(session.tool_cwd().await, PathBuf::from("/project/bin"));
  }

  #[tokio::test]
  async fn watched_paths_are_normalized() {
    let session = session(Arc::new(FakeRunner::new()));
    let id = VirtualModuleId::virtual_module("virtual:balafon/ssr/Card");
    session
      .watch(Path::new("/project/components/../shared/Card.vue"), &id)
      .await;
    assert_eq!(
      session.watched_id(Path::new("/project/shared/Card.vue")).await,
      Some(id)
    );
  }

  #[tokio::test]
  async fn forgotten_environment_is_fetched_again() {
    let runner = Arc::new(FakeRunner::new().respond(command::ENV, "{}"));
    let session = session(runner.clone());
    session.environment().await;
    session.environment().await;
    session.forget_environment().await;
    session.environment().await;
    assert_eq!(runner.call_count(command::ENV), 2);
  }

  #[tokio::test]
  async fn chunk_is_emitted_once_per_entry_name() {
    let session = session(Arc::new(FakeRunner::new()));
    let mut emitted = 0;
    let first = session
      .chunk_once("balafon/i18n/en.js", ModuleSource::new("export default {};"), || {
        emitted += 1;
        FileRef::new("ref1")
      })
      .await;
    let second = session
      .chunk_once("balafon/i18n/en.js", ModuleSource::new("export default {};"), || {
        emitted += 1;
        FileRef::new("ref2")
      })
      .await;
    assert_eq!(first, second);
    assert_eq!(emitted, 1);
    assert!(session.has_entry("balafon/i18n/en.js").await);
  }

  #[tokio::test]
  async fn identical_references_are_kept_once() {
    let session = session(Arc::new(FakeRunner::new()));
    let reference = EmitReference::new(FileRef::new("ref1"), balafon_common::RewriteKind::AwaitOnly);
    session.push_reference(reference.clone()).await;
    session.push_reference(reference.clone()).await;
    session
      .push_reference(EmitReference::new(
        FileRef::new("ref1"),
        balafon_common::RewriteKind::UnwrapDefault,
      ))
      .await;
    assert_eq!(session.references().await.len(), 2);
  }

  #[tokio::test]
  async fn configure_forgets_previous_build_output() {
    let session = session(Arc::new(FakeRunner::new()));
    session
      .register_entry("balafon/core.js", ModuleSource::new("export default 1;"))
      .await;
    session
      .configure(&ResolvedConfig {
        ssr: true,
        ..Default::default()
      })
      .await;
    assert!(!session.has_entry("balafon/core.js").await);
    assert_eq!(session.mode().await, BuildMode::production().with_ssr(true));
  }
}
