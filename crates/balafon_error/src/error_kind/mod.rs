use std::{
  fmt::Display,
  path::{Path, PathBuf},
  time::Duration,
};

use balafon_common::{StaticStr, CWD};

use crate::utils::{format_quoted_strings, PathExt};

pub mod error_code;

#[derive(Debug)]
pub enum ErrorKind {
  // --- External tool
  ToolFailed {
    args: Vec<String>,
    reason: String,
  },
  ToolTimeout {
    args: Vec<String>,
    timeout: Duration,
  },
  MalformedToolOutput {
    what: StaticStr,
    reason: String,
  },

  // --- Producers
  /// Content without which the output would be broken, e.g. the core runtime of a production build.
  MandatoryContent {
    id: String,
  },
  MissingCapability {
    capability: StaticStr,
    id: String,
  },
  TransformFailed {
    id: String,
    source: anyhow::Error,
  },
  ReadTemplateFailed {
    path: PathBuf,
    source: std::io::Error,
  },

  // --- Bundle finalization
  InvalidRewritePattern {
    pattern: String,
    reason: String,
  },
  UnknownFileRef(String),

  // --- Configuration
  InvalidOption {
    option: &'static str,
    reason: StaticStr,
  },

  /// Unrecoverable error. Also used to carry plain errors raised by collaborators.
  Panic {
    source: anyhow::Error,
  },

  IoError(std::io::Error),
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ErrorKind::ToolFailed { args, reason } => write!(f, "External tool failed for {}: {reason}", format_quoted_strings(args)),
      ErrorKind::ToolTimeout { args, timeout } => write!(f, "External tool timed out after {}ms for {}", timeout.as_millis(), format_quoted_strings(args)),
      ErrorKind::MalformedToolOutput { what, reason } => write!(f, "External tool returned malformed {what}: {reason}"),
      ErrorKind::MandatoryContent { id } => write!(f, "\"{id}\" produced no content, but it is required in production builds."),
      ErrorKind::MissingCapability { capability, id } => write!(f, "\"{id}\" requires the \"{capability}\" transform, but the host does not provide it."),
      ErrorKind::TransformFailed { id, source } => write!(f, "Transforming \"{id}\" failed: {source}"),
      ErrorKind::ReadTemplateFailed { path, source } => write!(f, "Could not read template \"{}\": {source}", path.may_display_relative()),
      ErrorKind::InvalidRewritePattern { pattern, reason } => write!(f, "Invalid rewrite pattern `{pattern}`: {reason}"),
      ErrorKind::UnknownFileRef(file_ref) => write!(f, "Unknown emitted file reference \"{file_ref}\"."),
      ErrorKind::InvalidOption { option, reason } => write!(f, "Invalid option \"{option}\": {reason}"),
      ErrorKind::Panic { source } => source.fmt(f),
      ErrorKind::IoError(e) => e.fmt(f),
    }
  }
}

impl ErrorKind {
  /// Shorten the file paths in messages by make them relative to CWD.
  pub fn to_readable_string(&self, cwd: impl AsRef<Path>) -> String {
    let cwd = cwd.as_ref().to_path_buf();
    CWD.set(&cwd, || self.to_string())
  }

  pub fn code(&self) -> &'static str {
    match self {
      ErrorKind::ToolFailed { .. } => error_code::TOOL_FAILED,
      ErrorKind::ToolTimeout { .. } => error_code::TOOL_TIMEOUT,
      ErrorKind::MalformedToolOutput { .. } => error_code::MALFORMED_TOOL_OUTPUT,
      ErrorKind::MandatoryContent { .. } => error_code::MANDATORY_CONTENT,
      ErrorKind::MissingCapability { .. } => error_code::MISSING_CAPABILITY,
      ErrorKind::TransformFailed { .. } => error_code::TRANSFORM_FAILED,
      ErrorKind::ReadTemplateFailed { .. } => error_code::IO_ERROR,
      ErrorKind::InvalidRewritePattern { .. } => error_code::INVALID_REWRITE_PATTERN,
      ErrorKind::UnknownFileRef(_) => error_code::UNKNOWN_FILE_REF,
      ErrorKind::InvalidOption { .. } => error_code::INVALID_OPTION,
      ErrorKind::Panic { .. } => error_code::PANIC,
      ErrorKind::IoError(_) => error_code::IO_ERROR,
    }
  }
}
