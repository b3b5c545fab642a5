//! External toolchain invocation.
//!
//! The compiler and the secondary package tool are opaque processes; only
//! their exit status is consulted. [`Toolchain`] names the three verbs the
//! pipeline needs so tests can substitute a double that records calls
//! instead of spawning anything.

mod invocation;

pub use invocation::Invocation;

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::config::ToolchainConfig;
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The program could not be started at all.
  #[error("failed to start {command}: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("command failed with exit code {code:?}: {command}")]
  Failed { command: String, code: Option<i32> },
}

/// The verbs the pipeline invokes on its external tools.
pub trait Toolchain {
  /// Compile and install `executables` into the workspace's binary root.
  fn install(&self, workspace: &Workspace, executables: &[String]) -> Result<(), ToolchainError>;

  /// Run the tests of a single package in the workspace.
  fn test(&self, workspace: &Workspace, package: &str) -> Result<(), ToolchainError>;

  /// Build the secondary-language project in place.
  fn package(&self, project_dir: &Path) -> Result<(), ToolchainError>;
}

/// Runs the configured programs as child processes.
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
  config: ToolchainConfig,
}

impl ProcessToolchain {
  pub fn new(config: ToolchainConfig) -> Self {
    Self { config }
  }

  pub fn install_invocation(&self, workspace: &Workspace, executables: &[String]) -> Invocation {
    self
      .compiler_invocation(workspace)
      .args(self.config.install_args.iter().cloned())
      .args(executables.iter().cloned())
  }

  pub fn test_invocation(&self, workspace: &Workspace, package: &str) -> Invocation {
    self
      .compiler_invocation(workspace)
      .args(self.config.test_args.iter().cloned())
      .args([package])
  }

  pub fn package_invocation(&self, project_dir: &Path) -> Invocation {
    Invocation::new(&self.config.package_tool, project_dir).args(self.config.package_args.iter().cloned())
  }

  fn compiler_invocation(&self, workspace: &Workspace) -> Invocation {
    Invocation::new(&self.config.compiler, workspace.root()).env(&self.config.workspace_env, workspace.root())
  }
}

impl Toolchain for ProcessToolchain {
  fn install(&self, workspace: &Workspace, executables: &[String]) -> Result<(), ToolchainError> {
    info!("{} = {}", self.config.workspace_env, workspace.root().display());
    self.install_invocation(workspace, executables).run()
  }

  fn test(&self, workspace: &Workspace, package: &str) -> Result<(), ToolchainError> {
    self.test_invocation(workspace, package).run()
  }

  fn package(&self, project_dir: &Path) -> Result<(), ToolchainError> {
    self.package_invocation(project_dir).run()
  }
}
