//! Test utilities for stagebuild-lib.
//!
//! Filesystem helpers, cross-platform shell commands, and a toolchain double
//! that records calls instead of spawning processes.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::config::BuildConfig;
use crate::pipeline::Stage;
use crate::toolchain::{Toolchain, ToolchainError};
use crate::workspace::Workspace;

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

pub fn set_mtime(path: &Path, unix_seconds: i64) {
  filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0)).unwrap();
}

pub fn mtime(path: &Path) -> i64 {
  let meta = std::fs::metadata(path).unwrap();
  FileTime::from_last_modification_time(&meta).unix_seconds()
}

#[cfg(unix)]
pub fn mode(path: &Path) -> u32 {
  use std::os::unix::fs::PermissionsExt;

  std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the shell command and args to write an environment variable to a file.
#[cfg(unix)]
pub fn echo_env_to_file(var: &str, file: &str) -> (&'static str, Vec<String>) {
  shell_cmd(&format!("echo \"${}\" > {}", var, file))
}

#[cfg(windows)]
pub fn echo_env_to_file(var: &str, file: &str) -> (&'static str, Vec<String>) {
  shell_cmd(&format!("echo %{}%> {}", var, file))
}

/// Default layout rooted at `root`, without canonicalizing it.
pub fn project_config(root: &Path) -> BuildConfig {
  BuildConfig {
    project_root: root.to_path_buf(),
    ..BuildConfig::default()
  }
}

/// Lay out a minimal project matching the default config.
pub fn seed_project(root: &Path) {
  write_file(&root.join("deps/github.com/dep/lib/lib.go"), "package lib\n");
  write_file(&root.join("common/common.go"), "package common\n");
  write_file(&root.join("gauge/main.go"), "package main\n");
  write_file(&root.join("gauge-java/main.go"), "package main\n");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  Install {
    executables: Vec<String>,
    /// Whether every executable's sources were already in the workspace.
    sources_staged: bool,
  },
  Test {
    package: String,
  },
  Package {
    project_dir: PathBuf,
    /// Whether the collected output directory already existed.
    output_exists: bool,
  },
}

/// Records toolchain calls, optionally failing one stage and writing fake
/// binaries into the workspace on install.
#[derive(Default)]
pub struct RecordingToolchain {
  calls: RefCell<Vec<Call>>,
  fail: Option<Stage>,
  produce: Vec<String>,
  output_dir: RefCell<Option<PathBuf>>,
}

impl RecordingToolchain {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing(mut self, stage: Stage) -> Self {
    self.fail = Some(stage);
    self
  }

  pub fn producing(mut self, binaries: &[&str]) -> Self {
    self.produce = binaries.iter().map(|b| b.to_string()).collect();
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.borrow().clone()
  }

  fn outcome(&self, stage: Stage) -> Result<(), ToolchainError> {
    if self.fail == Some(stage) {
      return Err(ToolchainError::Failed {
        command: format!("[fake {}]", stage),
        code: Some(1),
      });
    }
    Ok(())
  }
}

impl Toolchain for RecordingToolchain {
  fn install(&self, workspace: &Workspace, executables: &[String]) -> Result<(), ToolchainError> {
    let sources_staged = executables.iter().all(|e| workspace.src_dir().join(e).is_dir());
    self.calls.borrow_mut().push(Call::Install {
      executables: executables.to_vec(),
      sources_staged,
    });

    // Output lands next to the workspace under the default layout.
    if let Some(project_root) = workspace.root().parent() {
      *self.output_dir.borrow_mut() = Some(project_root.join("bin"));
    }

    self.outcome(Stage::Compile)?;
    for name in &self.produce {
      write_file(&workspace.bin_dir().join(name), name);
    }
    Ok(())
  }

  fn test(&self, _workspace: &Workspace, package: &str) -> Result<(), ToolchainError> {
    self.calls.borrow_mut().push(Call::Test {
      package: package.to_string(),
    });
    self.outcome(Stage::Test)
  }

  fn package(&self, project_dir: &Path) -> Result<(), ToolchainError> {
    let output_exists = self.output_dir.borrow().as_ref().is_some_and(|dir| dir.exists());
    self.calls.borrow_mut().push(Call::Package {
      project_dir: project_dir.to_path_buf(),
      output_exists,
    });
    self.outcome(Stage::Package)
  }
}
