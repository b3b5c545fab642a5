//! Build workspace assembly.
//!
//! The workspace is a transient directory with three fixed subdirectories:
//! a source root the compiler reads from, a binary root it installs into,
//! and a package cache. It is rebuilt in place on every build by mirroring
//! the dependency trees and the project's own packages into the source root,
//! so an unchanged project costs a metadata walk and no copies.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::consts::{LOCK_FILENAME, WORKSPACE_BIN_DIR, WORKSPACE_PKG_DIR, WORKSPACE_SRC_DIR};
use crate::mirror::{self, MirrorError, MirrorStats, mirror_tree};

#[derive(Debug, Error)]
pub enum WorkspaceError {
  #[error("failed to create workspace directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("workspace is in use by another run (lock held on {path})")]
  Busy { path: PathBuf },

  #[error("failed to lock {path}: {source}")]
  Lock {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to stage {src} into workspace: {source}")]
  Stage {
    src: PathBuf,
    #[source]
    source: MirrorError,
  },
}

/// Exclusive hold on a workspace, released on drop.
#[derive(Debug)]
pub struct WorkspaceGuard {
  _file: File,
}

/// Paths of a build workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
  root: PathBuf,
  src: PathBuf,
  bin: PathBuf,
  pkg: PathBuf,
}

impl Workspace {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    Self {
      src: root.join(WORKSPACE_SRC_DIR),
      bin: root.join(WORKSPACE_BIN_DIR),
      pkg: root.join(WORKSPACE_PKG_DIR),
      root,
    }
  }

  pub fn from_config(config: &BuildConfig) -> Self {
    Self::new(config.workspace_path())
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn src_dir(&self) -> &Path {
    &self.src
  }

  pub fn bin_dir(&self) -> &Path {
    &self.bin
  }

  pub fn pkg_dir(&self) -> &Path {
    &self.pkg
  }

  pub fn lock_path(&self) -> PathBuf {
    self.root.join(LOCK_FILENAME)
  }

  /// Take the workspace for this run, creating its root if needed.
  ///
  /// Fails with [`WorkspaceError::Busy`] instead of waiting when another
  /// process holds it.
  pub fn lock(&self) -> Result<WorkspaceGuard, WorkspaceError> {
    mirror::create_dir_all(&self.root).map_err(|e| WorkspaceError::CreateDir {
      path: self.root.clone(),
      source: e,
    })?;

    let path = self.lock_path();
    let file = OpenOptions::new()
      .create(true)
      .truncate(false)
      .write(true)
      .open(&path)
      .map_err(|e| WorkspaceError::Lock {
        path: path.clone(),
        source: e,
      })?;

    match try_lock_exclusive(&file) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Err(WorkspaceError::Busy { path }),
      Err(e) => return Err(WorkspaceError::Lock { path, source: e }),
    }

    debug!(path = %path.display(), "workspace locked");
    Ok(WorkspaceGuard { _file: file })
  }

  /// Create the source, binary, and package directories.
  ///
  /// Existing directories are left as they are.
  pub fn create(&self) -> Result<(), WorkspaceError> {
    for dir in [&self.src, &self.bin, &self.pkg] {
      mirror::create_dir_all(dir).map_err(|e| WorkspaceError::CreateDir {
        path: dir.clone(),
        source: e,
      })?;
    }
    Ok(())
  }

  /// Stage every source tree the build needs into the source root.
  ///
  /// The dependencies directory is mirrored flat into the source root, since
  /// its trees are already laid out by import path. Each package and
  /// executable is mirrored into a like-named directory under the source
  /// root. The first failure aborts assembly.
  pub fn assemble(&self, config: &BuildConfig) -> Result<MirrorStats, WorkspaceError> {
    let mut stats = self.stage(&config.deps_path(), &self.src)?;

    for name in config.staged_names() {
      stats.merge(self.stage(&config.source_path(name), &self.src.join(name))?);
    }

    info!(
      copied = stats.copied,
      unchanged = stats.unchanged,
      "workspace assembled at {}",
      self.root.display()
    );

    Ok(stats)
  }

  fn stage(&self, src: &Path, dst: &Path) -> Result<MirrorStats, WorkspaceError> {
    mirror_tree(src, dst).map_err(|e| WorkspaceError::Stage {
      src: src.to_path_buf(),
      source: e,
    })
  }
}

#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> io::Result<()> {
  use rustix::fs::{FlockOperation, flock};

  flock(file, FlockOperation::NonBlockingLockExclusive).map_err(io::Error::from)
}

// Unlocked elsewhere; concurrent runs stay unsupported there.
#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> io::Result<()> {
  Ok(())
}
