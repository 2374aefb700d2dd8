use std::{fmt::Display, path::Path, time::Duration};

use balafon_common::StaticStr;

use crate::ErrorKind;

#[derive(Debug)]
pub struct Error {
  contexts: Vec<String>,
  pub kind: ErrorKind,
}

impl Error {
  fn with_kind(kind: ErrorKind) -> Self {
    Self {
      contexts: vec![],
      kind,
    }
  }

  pub fn context(mut self, context: impl Into<String>) -> Self {
    self.contexts.push(context.into());
    self
  }

  pub fn contexts(&self) -> &[String] {
    &self.contexts
  }

  /// Like `to_string`, with paths shown relative to `cwd`.
  pub fn to_readable_string(&self, cwd: impl AsRef<Path>) -> String {
    let cwd = cwd.as_ref().to_path_buf();
    balafon_common::CWD.set(&cwd, || self.to_string())
  }

  // --- External tool

  pub fn tool_failed(args: &[String], reason: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::ToolFailed {
      args: args.to_vec(),
      reason: reason.into(),
    })
  }

  pub fn tool_timeout(args: &[String], timeout: Duration) -> Self {
    Self::with_kind(ErrorKind::ToolTimeout {
      args: args.to_vec(),
      timeout,
    })
  }

  pub fn malformed_tool_output(what: impl Into<StaticStr>, reason: impl Display) -> Self {
    Self::with_kind(ErrorKind::MalformedToolOutput {
      what: what.into(),
      reason: reason.to_string(),
    })
  }

  // --- Producers

  pub fn mandatory_content(id: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::MandatoryContent { id: id.into() })
  }

  pub fn missing_capability(capability: impl Into<StaticStr>, id: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::MissingCapability {
      capability: capability.into(),
      id: id.into(),
    })
  }

  pub fn transform_failed(id: impl Into<String>, source: anyhow::Error) -> Self {
    Self::with_kind(ErrorKind::TransformFailed {
      id: id.into(),
      source,
    })
  }

  pub fn read_template_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
    Self::with_kind(ErrorKind::ReadTemplateFailed {
      path: path.as_ref().to_path_buf(),
      source,
    })
  }

  // --- Bundle finalization

  pub fn invalid_rewrite_pattern(pattern: impl Into<String>, reason: impl Display) -> Self {
    Self::with_kind(ErrorKind::InvalidRewritePattern {
      pattern: pattern.into(),
      reason: reason.to_string(),
    })
  }

  pub fn unknown_file_ref(file_ref: impl Display) -> Self {
    Self::with_kind(ErrorKind::UnknownFileRef(file_ref.to_string()))
  }

  // --- Configuration

  pub fn invalid_option(option: &'static str, reason: impl Into<StaticStr>) -> Self {
    Self::with_kind(ErrorKind::InvalidOption {
      option,
      reason: reason.into(),
    })
  }

  pub fn io_error(e: std::io::Error) -> Self {
    Self::with_kind(ErrorKind::IoError(e))
  }

  pub fn panic(msg: String) -> Self {
    anyhow::format_err!(msg).into()
  }
}

impl std::convert::From<anyhow::Error> for Error {
  fn from(value: anyhow::Error) -> Self {
    Self::with_kind(ErrorKind::Panic { source: value })
  }
}

impl std::convert::From<std::io::Error> for Error {
  fn from(value: std::io::Error) -> Self {
    Self::io_error(value)
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match &self.kind {
      ErrorKind::Panic { source } | ErrorKind::TransformFailed { source, .. } => {
        Some(source.as_ref())
      }
      ErrorKind::ReadTemplateFailed { source, .. } | ErrorKind::IoError(source) => Some(source),
      _ => None,
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for ctx in self.contexts.iter().rev() {
      writeln!(f, "{}: {}", ansi_term::Color::Yellow.paint("context"), ctx)?;
    }

    self.kind.fmt(f)
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::error_code;

  #[test]
  fn contexts_are_printed_innermost_last() {
    let err = Error::mandatory_content("virtual:balafon/core.js")
      .context("loading core")
      .context("building client");
    let rendered = err.to_string();
    let building = rendered.find("building client").unwrap();
    let loading = rendered.find("loading core").unwrap();
    assert!(building < loading);
    assert!(rendered.ends_with("required in production builds."));
    assert_eq!(err.kind.code(), error_code::MANDATORY_CONTENT);
  }

  #[test]
  fn template_paths_are_shown_relative_to_cwd() {
    let err = Error::read_template_failed(
      "/project/components/Card.vue",
      std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    assert_eq!(
      err.kind.to_readable_string(PathBuf::from("/project")),
      "Could not read template \"components/Card.vue\": gone"
    );
  }
}
