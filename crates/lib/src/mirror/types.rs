//! Types for file and tree mirroring.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while mirroring a file or a tree.
#[derive(Debug, Error)]
pub enum MirrorError {
  /// The source is a symlink, directory, FIFO, or device.
  ///
  /// Only regular files can be mirrored; reaching this means the caller
  /// pointed a mirror at something it should never have.
  #[error("cannot mirror non-regular file {path}")]
  NotRegularFile { path: PathBuf },

  #[error("failed to read metadata for {path}: {source}")]
  Metadata {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to open {path}: {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to create {path}: {source}")]
  Create {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to remove stale {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to copy {src} -> {dst}: {source}")]
  Copy {
    src: PathBuf,
    dst: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Fewer (or more) bytes were copied than the source reported.
  #[error("copied wrong size for {src} -> {dst}: copied {copied}; want {expected}")]
  ShortCopy {
    src: PathBuf,
    dst: PathBuf,
    copied: u64,
    expected: u64,
  },

  #[error("failed to flush {path}: {source}")]
  Flush {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to set permissions on {path}: {source}")]
  SetPermissions {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to set modification time on {path}: {source}")]
  SetTimes {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to traverse directory {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("{path} is not under {root}")]
  OutsideRoot { path: PathBuf, root: PathBuf },
}

/// What a single file mirror did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
  /// The destination was rewritten from the source.
  Copied { bytes: u64 },
  /// The destination already matched the source and was left alone.
  Unchanged,
}

/// Aggregate counts over a tree mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
  pub copied: usize,
  pub unchanged: usize,
  pub bytes: u64,
}

impl MirrorStats {
  pub fn record(&mut self, outcome: MirrorOutcome) {
    match outcome {
      MirrorOutcome::Copied { bytes } => {
        self.copied += 1;
        self.bytes += bytes;
      }
      MirrorOutcome::Unchanged => self.unchanged += 1,
    }
  }

  pub fn merge(&mut self, other: MirrorStats) {
    self.copied += other.copied;
    self.unchanged += other.unchanged;
    self.bytes += other.bytes;
  }

  /// Number of files visited, copied or not.
  pub fn files(&self) -> usize {
    self.copied + self.unchanged
  }
}
