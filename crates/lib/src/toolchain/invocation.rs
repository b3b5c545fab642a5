//! A single synchronous run of an external program.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::ToolchainError;

/// Program, arguments, working directory, and environment overrides.
///
/// Standard output and error are inherited, so the tool's own progress and
/// diagnostics reach the user live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub current_dir: PathBuf,
  pub env: Vec<(String, OsString)>,
}

impl Invocation {
  pub fn new(program: impl Into<String>, current_dir: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      current_dir: current_dir.into(),
      env: Vec::new(),
    }
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
    self.env.push((key.into(), value.into()));
    self
  }

  pub fn current_dir(&self) -> &Path {
    &self.current_dir
  }

  /// Run to completion, failing on a spawn error or a non-zero exit.
  pub fn run(&self) -> Result<(), ToolchainError> {
    info!("Execute {}", self);

    let mut command = Command::new(&self.program);
    command
      .args(&self.args)
      .current_dir(&self.current_dir)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit());

    for (key, value) in &self.env {
      command.env(key, value);
    }

    debug!(working_dir = %self.current_dir.display(), "spawning process");

    let status = command.status().map_err(|e| ToolchainError::Spawn {
      command: self.to_string(),
      source: e,
    })?;

    if !status.success() {
      return Err(ToolchainError::Failed {
        command: self.to_string(),
        code: status.code(),
      });
    }

    Ok(())
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    write!(f, "]")
  }
}
