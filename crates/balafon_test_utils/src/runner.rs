use std::{
  path::{Path, PathBuf},
  sync::Mutex,
};

use balafon_error::{Error, Result};
use balafon_runner::ToolRunner;
use rustc_hash::FxHashMap;

fn key(args: &[&str]) -> Vec<String> {
  args.iter().map(|arg| arg.to_string()).collect()
}

/// Answers tool commands from a script and records every call.
#[derive(Debug, Default)]
pub struct FakeRunner {
  responses: FxHashMap<Vec<String>, std::result::Result<String, String>>,
  calls: Mutex<Vec<Vec<String>>>,
  cwds: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(mut self, args: &[&str], stdout: &str) -> Self {
    self.responses.insert(key(args), Ok(stdout.to_string()));
    self
  }

  pub fn fail(mut self, args: &[&str], reason: &str) -> Self {
    self.responses.insert(key(args), Err(reason.to_string()));
    self
  }

  pub fn calls(&self) -> Vec<Vec<String>> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self, args: &[&str]) -> usize {
    let args = key(args);
    self.calls.lock().unwrap().iter().filter(|call| **call == args).count()
  }

  /// Working directory of every call, in call order.
  pub fn cwds(&self) -> Vec<PathBuf> {
    self.cwds.lock().unwrap().clone()
  }

  pub fn total_calls(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

#[async_trait::async_trait]
impl ToolRunner for FakeRunner {
  async fn run(&self, args: &[String], cwd: &Path) -> Result<String> {
    self.calls.lock().unwrap().push(args.to_vec());
    self.cwds.lock().unwrap().push(cwd.to_path_buf());
    match self.responses.get(args) {
      Some(Ok(stdout)) => Ok(stdout.clone()),
      Some(Err(reason)) => Err(Error::tool_failed(args, reason.clone())),
      None => Err(Error::tool_failed(args, "no scripted response")),
    }
  }
}
