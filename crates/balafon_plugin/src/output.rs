use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ModuleFormat {
  #[default]
  Esm,
  Cjs,
}

impl ModuleFormat {
  pub fn is_es(self) -> bool {
    self == ModuleFormat::Esm
  }
}

impl FromStr for ModuleFormat {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "es" | "esm" => Ok(ModuleFormat::Esm),
      "cjs" => Ok(ModuleFormat::Cjs),
      _ => Err(format!("Invalid module format: {value}")),
    }
  }
}

#[derive(Debug, Default, Clone)]
pub struct OutputOptions {
  pub dir: Option<String>,
  pub format: ModuleFormat,
}

#[derive(Debug, Clone)]
pub struct OutputChunk {
  pub file_name: String,
  pub code: String,
}

#[derive(Debug, Clone)]
pub struct OutputAsset {
  pub file_name: String,
  pub source: String,
}

#[derive(Debug, Clone)]
pub enum OutputFile {
  Chunk(OutputChunk),
  Asset(OutputAsset),
}

impl OutputFile {
  pub fn file_name(&self) -> &str {
    match self {
      OutputFile::Chunk(chunk) => &chunk.file_name,
      OutputFile::Asset(asset) => &asset.file_name,
    }
  }
}

/// Output files of one `generate` call, in the order the host rendered them.
#[derive(Debug, Default, Clone)]
pub struct OutputBundle {
  pub files: Vec<OutputFile>,
}

impl OutputBundle {
  pub fn chunks_mut(&mut self) -> impl Iterator<Item = &mut OutputChunk> {
    self.files.iter_mut().filter_map(|file| match file {
      OutputFile::Chunk(chunk) => Some(chunk),
      OutputFile::Asset(_) => None,
    })
  }

  pub fn get(&self, file_name: &str) -> Option<&OutputFile> {
    self.files.iter().find(|file| file.file_name() == file_name)
  }
}
