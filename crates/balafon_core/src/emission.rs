use std::path::{Path, PathBuf};

use balafon_common::{
  BuildMode, ContentKind, EmitReference, FileRef, ModuleSource, RewriteKind, VirtualModuleId,
};
use balafon_error::Error;
use balafon_plugin::{file_url, EmittedAsset, EmittedChunk, PluginContext, PreserveSignature};
use sugar_path::SugarPathBuf;

use crate::{names, BuildResult, BuildSession};

/// How a virtual module reaches the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
  /// `export default null;`
  NullStub,
  /// The module body itself.
  Inline,
  /// A separate chunk behind a lazy `import()`.
  Chunk,
  /// A static asset behind a lazy `import()`.
  Asset,
}

/// Browser-only content is never produced for SSR; the producer is not even invoked.
pub fn is_suppressed(kind: ContentKind, mode: BuildMode) -> bool {
  mode.is_ssr && kind.is_browser_only()
}

pub fn decide(kind: ContentKind, mode: BuildMode, as_asset: bool, is_empty: bool) -> Representation {
  if is_suppressed(kind, mode) || is_empty {
    return Representation::NullStub;
  }
  if !mode.is_production || mode.is_ssr || !kind.is_deferrable() {
    return Representation::Inline;
  }
  if as_asset {
    Representation::Asset
  } else {
    Representation::Chunk
  }
}

/// `export default import(<url>);`, awaited and unwrapped once file names are final.
pub fn lazy_import_wrapper(file_ref: &FileRef) -> String {
  format!("export default import({});\n", file_url(file_ref))
}

/// `(()=>import(<url>))()`, awaited once file names are final.
pub fn self_invoking_import(file_ref: &FileRef) -> String {
  format!("(()=>import({}))()", file_url(file_ref))
}

/// What a producer sees while loading one virtual module.
pub struct LoadContext<'a> {
  pub session: &'a BuildSession,
  pub plugin_ctx: &'a mut dyn PluginContext,
  pub id: &'a VirtualModuleId,
  pub mode: BuildMode,
}

impl<'a> LoadContext<'a> {
  pub fn requested(&self) -> &str {
    self.id.requested()
  }

  pub fn prefix(&self) -> &str {
    &self.session.options().emit_prefix
  }

  /// Watches a file backing this module. Only development builds reload modules.
  pub async fn watch(&mut self, path: &Path) {
    if self.mode.is_production {
      return;
    }
    let path = path.to_path_buf().into_absolutize();
    self.plugin_ctx.add_watch_file(&path);
    self.session.watch(&path, self.id).await;
  }

  /// Chooses a representation for `body` and performs the emission it needs.
  ///
  /// `None` means the producer came back empty; no chunk or asset is emitted for it.
  pub async fn emit(
    &mut self,
    kind: ContentKind,
    stem: &str,
    body: Option<ModuleSource>,
  ) -> BuildResult<ModuleSource> {
    let as_asset = self.session.options().as_asset.for_kind(kind);
    let representation = decide(kind, self.mode, as_asset, body.is_none());
    tracing::debug!(
      "{} ({}) as {:?}",
      self.requested(),
      kind.as_str(),
      representation
    );
    let body = match (representation, body) {
      (Representation::NullStub, _) | (_, None) => return Ok(ModuleSource::null_stub()),
      (_, Some(body)) => body,
    };
    match representation {
      Representation::Inline | Representation::NullStub => Ok(body),
      Representation::Chunk => {
        let file_ref = self.emit_chunk(stem, body).await;
        self
          .session
          .push_reference(EmitReference::new(file_ref.clone(), RewriteKind::UnwrapDefault))
          .await;
        Ok(ModuleSource::new(lazy_import_wrapper(&file_ref)))
      }
      Representation::Asset => {
        let name = names::emitted_name(self.prefix(), stem);
        let file_ref = self.plugin_ctx.emit_asset(EmittedAsset {
          name: Some(name),
          file_name: None,
          source: body.code,
        });
        self
          .session
          .push_reference(EmitReference::new(file_ref.clone(), RewriteKind::UnwrapDefault))
          .await;
        Ok(ModuleSource::new(lazy_import_wrapper(&file_ref)))
      }
    }
  }

  /// Emits `body` as a chunk whose entry id resolves back to this session. Its exports are pinned.
  ///
  /// A stem emitted earlier in the same build returns the earlier reference.
  pub async fn emit_chunk(&mut self, stem: &str, body: ModuleSource) -> FileRef {
    let name = names::emitted_name(self.prefix(), stem);
    let chunk = EmittedChunk {
      id: name.clone(),
      name: Some(name.strip_suffix(".js").unwrap_or(&name).to_string()),
      preserve_signature: PreserveSignature::Strict,
    };
    let plugin_ctx = &mut *self.plugin_ctx;
    self
      .session
      .chunk_once(&name, body, move || plugin_ctx.emit_chunk(chunk))
      .await
  }
}

/// Context for reloading a module outside of a host `load` call. Development builds never emit.
#[derive(Debug, Default)]
pub struct DetachedContext {
  pub watched: Vec<PathBuf>,
  emitted: usize,
}

impl PluginContext for DetachedContext {
  fn emit_chunk(&mut self, chunk: EmittedChunk) -> FileRef {
    tracing::warn!("chunk {} emitted outside of a build is dropped", chunk.id);
    self.emitted += 1;
    FileRef::new(format!("detached{}", self.emitted))
  }

  fn emit_asset(&mut self, asset: EmittedAsset) -> FileRef {
    tracing::warn!("asset {:?} emitted outside of a build is dropped", asset.name);
    self.emitted += 1;
    FileRef::new(format!("detached{}", self.emitted))
  }

  fn get_file_name(&self, file_ref: &FileRef) -> BuildResult<String> {
    Err(Error::unknown_file_ref(file_ref))
  }

  fn add_watch_file(&mut self, path: &Path) {
    self.watched.push(path.to_path_buf());
  }
}
