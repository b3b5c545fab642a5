//! Collection and installation of built binaries.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::consts::INSTALL_BIN_DIR;
use crate::mirror::{MirrorError, MirrorStats, mirror_file, mirror_tree};
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("failed to create output directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to collect binaries from {path}: {source}")]
  Collect {
    path: PathBuf,
    #[source]
    source: MirrorError,
  },

  #[error("failed to install {name} into {prefix}: {source}")]
  Install {
    name: String,
    prefix: PathBuf,
    #[source]
    source: MirrorError,
  },
}

/// Binaries gathered into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
  /// Absolute path of the output directory.
  pub output_dir: PathBuf,
  pub stats: MirrorStats,
}

/// Mirror everything the compiler installed into the workspace binary root
/// out to `output_dir`.
pub fn collect(workspace: &Workspace, output_dir: &Path) -> Result<Collected, ArtifactError> {
  std::fs::create_dir_all(output_dir).map_err(|e| ArtifactError::CreateDir {
    path: output_dir.to_path_buf(),
    source: e,
  })?;

  let stats = mirror_tree(workspace.bin_dir(), output_dir).map_err(|e| ArtifactError::Collect {
    path: workspace.bin_dir().to_path_buf(),
    source: e,
  })?;

  let output_dir = dunce::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
  info!("Binaries are available at: {}", output_dir.display());

  Ok(Collected { output_dir, stats })
}

/// Mirror each named binary from `output_dir` into `<prefix>/bin`.
///
/// Binaries are installed in order and the first failure stops the rest.
/// Returns the installed paths.
pub fn install(output_dir: &Path, prefix: &Path, binaries: &[String]) -> Result<Vec<PathBuf>, ArtifactError> {
  let install_bin = prefix.join(INSTALL_BIN_DIR);
  let mut installed = Vec::with_capacity(binaries.len());

  for name in binaries {
    let target = install_bin.join(name);
    mirror_file(&output_dir.join(name), &target).map_err(|e| ArtifactError::Install {
      name: name.clone(),
      prefix: prefix.to_path_buf(),
      source: e,
    })?;
    info!("installed {}", target.display());
    installed.push(target);
  }

  Ok(installed)
}
