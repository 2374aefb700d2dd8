use std::path::{Path, PathBuf};

use balafon_common::FileRef;
use balafon_error::{Error, Result};
use balafon_plugin::{
  parse_file_url, relative_url, DevServer, EmittedAsset, EmittedChunk, HmrPayload, OutputAsset,
  OutputBundle, OutputChunk, OutputFile, OutputOptions, PluginContext,
};
use rustc_hash::FxHashMap;

use crate::PluginDriver;

const FILE_URL_MARKER: &str = "import.meta.ROLLUP_FILE_URL_";

#[derive(Debug)]
pub struct FileNameTemplate {
  template: String,
}

impl FileNameTemplate {
  pub fn new(template: impl Into<String>) -> Self {
    Self {
      template: template.into(),
    }
  }

  pub fn render(&self, name: &str) -> String {
    self.template.replace("[name]", name)
  }
}

/// An in-memory module graph host: records what plugins emit, watch and invalidate.
#[derive(Debug)]
pub struct TestHost {
  pub chunk_file_names: FileNameTemplate,
  pub chunks: Vec<(FileRef, EmittedChunk)>,
  pub assets: Vec<(FileRef, EmittedAsset)>,
  pub watched: Vec<PathBuf>,
  pub invalidated: Vec<String>,
  pub payloads: Vec<HmrPayload>,
  file_names: FxHashMap<FileRef, String>,
}

impl Default for TestHost {
  fn default() -> Self {
    Self {
      chunk_file_names: FileNameTemplate::new("[name].js"),
      chunks: vec![],
      assets: vec![],
      watched: vec![],
      invalidated: vec![],
      payloads: vec![],
      file_names: Default::default(),
    }
  }
}

impl TestHost {
  fn next_ref(&self) -> FileRef {
    FileRef::new(format!("ref{}", self.file_names.len()))
  }

  /// Replaces file url expressions with the urls a bundler renders for `importer`.
  pub fn render_file_urls(&self, importer: &str, code: &str) -> Result<String> {
    let mut output = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(start) = rest.find(FILE_URL_MARKER) {
      output.push_str(&rest[..start]);
      let Some((file_ref, len)) = parse_file_url(&rest[start..]) else {
        output.push_str(FILE_URL_MARKER);
        rest = &rest[start + FILE_URL_MARKER.len()..];
        continue;
      };
      let target = self.get_file_name(&file_ref)?;
      output.push_str(&format!(
        "new URL(\"{}\", import.meta.url).href",
        relative_url(importer, &target)
      ));
      rest = &rest[start + len..];
    }
    output.push_str(rest);
    Ok(output)
  }

  async fn load_module(&mut self, driver: &PluginDriver, specifier: &str) -> Result<String> {
    let id = driver
      .resolve_id(self, specifier)
      .await?
      .ok_or_else(|| Error::panic(format!("unresolved {specifier}")))?;
    let source = driver
      .load(self, &id)
      .await?
      .ok_or_else(|| Error::panic(format!("nothing loaded {id:?}")))?;
    Ok(source.code)
  }

  /// Loads every entry and every chunk emitted along the way, renders them and runs `generate_bundle`.
  ///
  /// `entries` are `(output file name, specifier)` pairs.
  pub async fn build(
    &mut self,
    driver: &PluginDriver,
    entries: &[(&str, &str)],
    output_options: &OutputOptions,
  ) -> Result<OutputBundle> {
    let mut modules = vec![];
    for (file_name, specifier) in entries {
      let code = self.load_module(driver, specifier).await?;
      modules.push((file_name.to_string(), code));
    }
    let mut next_chunk = 0;
    while next_chunk < self.chunks.len() {
      let (file_ref, chunk) = self.chunks[next_chunk].clone();
      next_chunk += 1;
      let code = self.load_module(driver, &chunk.id).await?;
      modules.push((self.get_file_name(&file_ref)?, code));
    }

    let mut bundle = OutputBundle::default();
    for (file_name, code) in modules {
      let code = self.render_file_urls(&file_name, &code)?;
      bundle
        .files
        .push(OutputFile::Chunk(OutputChunk { file_name, code }));
    }
    for (file_ref, asset) in &self.assets {
      bundle.files.push(OutputFile::Asset(OutputAsset {
        file_name: self.get_file_name(file_ref)?,
        source: asset.source.clone(),
      }));
    }
    driver
      .generate_bundle(self, output_options, &mut bundle)
      .await?;
    Ok(bundle)
  }
}

impl PluginContext for TestHost {
  fn emit_chunk(&mut self, chunk: EmittedChunk) -> FileRef {
    let file_ref = self.next_ref();
    let name = chunk.name.clone().unwrap_or_else(|| chunk.id.clone());
    self
      .file_names
      .insert(file_ref.clone(), self.chunk_file_names.render(&name));
    self.chunks.push((file_ref.clone(), chunk));
    file_ref
  }

  fn emit_asset(&mut self, asset: EmittedAsset) -> FileRef {
    let file_ref = self.next_ref();
    let file_name = asset
      .file_name
      .clone()
      .or_else(|| asset.name.clone())
      .unwrap_or_else(|| format!("assets/{file_ref}"));
    self.file_names.insert(file_ref.clone(), file_name);
    self.assets.push((file_ref.clone(), asset));
    file_ref
  }

  fn get_file_name(&self, file_ref: &FileRef) -> Result<String> {
    self
      .file_names
      .get(file_ref)
      .cloned()
      .ok_or_else(|| Error::unknown_file_ref(file_ref))
  }

  fn add_watch_file(&mut self, path: &Path) {
    self.watched.push(path.to_path_buf());
  }
}

impl DevServer for TestHost {
  fn invalidate_module(&mut self, id: &str) {
    self.invalidated.push(id.to_string());
  }

  fn send(&mut self, payload: HmrPayload) {
    self.payloads.push(payload);
  }
}
