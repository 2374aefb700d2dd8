use std::fmt::Display;

/// Opaque handle returned by the host for an emitted chunk or asset.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileRef(String);

impl FileRef {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }
}

impl Display for FileRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for FileRef {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

/// Placeholder substituted with the escaped relative url of the referenced file.
pub const FILENAME_PLACEHOLDER: &str = "[filename]";

/// Shape of the expression a wrapper module left behind, and how it gets awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteKind {
  /// `import(url)` becomes `(await import(url)).default`, unless it sits inside a `()=>` thunk
  UnwrapDefault,
  /// `(()=>import(url))()` becomes `(await (()=>import(url))())`
  AwaitOnly,
}

impl RewriteKind {
  pub fn match_pattern(self) -> &'static str {
    match self {
      RewriteKind::UnwrapDefault => {
        r#"(?<!await )(?<!=>)import\(new URL\((?:"[filename]"|'[filename]'), import\.meta\.url\)\.href\)"#
      }
      RewriteKind::AwaitOnly => {
        r#"(?<!await )\(\(\)=>import\(new URL\((?:"[filename]"|'[filename]'), import\.meta\.url\)\.href\)\)\(\)"#
      }
    }
  }

  pub fn replacement(self) -> &'static str {
    match self {
      RewriteKind::UnwrapDefault => "(await ${0}).default",
      RewriteKind::AwaitOnly => "(await ${0})",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReference {
  pub file_ref: FileRef,
  pub kind: RewriteKind,
  pub match_pattern: String,
  pub replacement: String,
}

impl EmitReference {
  pub fn new(file_ref: FileRef, kind: RewriteKind) -> Self {
    Self {
      file_ref,
      kind,
      match_pattern: kind.match_pattern().to_string(),
      replacement: kind.replacement().to_string(),
    }
  }

  /// Fills the `[filename]` placeholder with an already escaped file name.
  pub fn pattern_for(&self, escaped_filename: &str) -> String {
    self
      .match_pattern
      .replace(FILENAME_PLACEHOLDER, escaped_filename)
  }
}
