//! Types for pipeline runs.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::artifacts::{ArtifactError, Collected};
use crate::mirror::MirrorStats;
use crate::toolchain::ToolchainError;
use crate::workspace::WorkspaceError;

/// Which of the three mutually exclusive runs to perform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
  /// Assemble the workspace, compile, package, and collect binaries.
  #[default]
  Build,
  /// Run the tests of the configured package.
  Test,
  /// Install collected binaries under a prefix (the configured default when
  /// absent or empty).
  Install { prefix: Option<PathBuf> },
}

impl Mode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Mode::Build => "build",
      Mode::Test => "test",
      Mode::Install { .. } => "install",
    }
  }
}

/// A step that invokes an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Compile,
  Package,
  Test,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::Compile => write!(f, "compile"),
      Stage::Package => write!(f, "package"),
      Stage::Test => write!(f, "test"),
    }
  }
}

#[derive(Debug, Error)]
pub enum PipelineError {
  /// Another run holds the workspace, or the lock file is unusable.
  #[error(transparent)]
  Lock(WorkspaceError),

  #[error("workspace assembly failed: {0}")]
  Workspace(#[from] WorkspaceError),

  #[error("{stage} stage failed: {source}")]
  Toolchain {
    stage: Stage,
    #[source]
    source: ToolchainError,
  },

  #[error(transparent)]
  Artifact(#[from] ArtifactError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
  /// Files staged into the workspace source root.
  pub staged: MirrorStats,
  pub collected: Collected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
  pub prefix: PathBuf,
  pub installed: Vec<PathBuf>,
}

/// Outcome of a successful run, one variant per mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineReport {
  Build(BuildReport),
  Test { package: String },
  Install(InstallReport),
}
