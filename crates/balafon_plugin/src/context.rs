use std::path::Path;

use balafon_common::FileRef;

/// Export signature the host keeps for an emitted entry. Balafon chunks are always loaded for their exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreserveSignature {
  #[default]
  Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedChunk {
  /// Module id the host resolves and loads as the chunk entry.
  pub id: String,
  pub name: Option<String>,
  pub preserve_signature: PreserveSignature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
  pub name: Option<String>,
  pub file_name: Option<String>,
  pub source: String,
}

/// Capabilities a plugin may use while the host is loading or finalizing modules.
pub trait PluginContext: Send {
  fn emit_chunk(&mut self, chunk: EmittedChunk) -> FileRef;

  fn emit_asset(&mut self, asset: EmittedAsset) -> FileRef;

  /// Final output file name of an emitted file, relative to the output directory.
  fn get_file_name(&self, file_ref: &FileRef) -> balafon_error::Result<String>;

  fn add_watch_file(&mut self, path: &Path);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HmrPayload {
  Update { id: String },
  FullReload,
}

/// The dev server half of the host, only available while serving.
pub trait DevServer: Send {
  fn invalidate_module(&mut self, id: &str);

  fn send(&mut self, payload: HmrPayload);
}
