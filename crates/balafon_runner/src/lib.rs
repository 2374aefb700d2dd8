use std::{fmt::Debug, path::Path, process::Stdio, time::Duration};

use balafon_error::{Error, Result};
use tokio::process::Command;
use tracing::instrument;

/// Out-of-process project tool. Stdout is handed back verbatim.
#[async_trait::async_trait]
pub trait ToolRunner: Debug + Send + Sync {
  /// Runs the tool with `args` inside `cwd`.
  async fn run(&self, args: &[String], cwd: &Path) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ProcessRunner {
  program: String,
  timeout: Duration,
}

impl ProcessRunner {
  pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
    Self {
      program: program.into(),
      timeout,
    }
  }
}

#[async_trait::async_trait]
impl ToolRunner for ProcessRunner {
  #[instrument(skip(self), fields(program = %self.program))]
  async fn run(&self, args: &[String], cwd: &Path) -> Result<String> {
    let mut command = Command::new(&self.program);
    command
      .args(args)
      .current_dir(cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    let output = match tokio::time::timeout(self.timeout, command.output()).await {
      Ok(output) => output.map_err(|e| Error::tool_failed(args, e.to_string()))?,
      Err(_) => return Err(Error::tool_timeout(args, self.timeout)),
    };

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(Error::tool_failed(
        args,
        format!("{} {}", output.status, stderr.trim()),
      ));
    }

    let stdout = String::from_utf8(output.stdout)
      .map_err(|e| Error::malformed_tool_output("utf-8 output", e))?;
    tracing::debug!("{} bytes from {:?}", stdout.len(), args);
    Ok(stdout)
  }
}
