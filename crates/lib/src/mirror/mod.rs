//! Incremental file mirroring.
//!
//! A mirror is a one-directional, metadata-driven conditional copy. The
//! destination is only rewritten when its size, executable bit, or
//! modification time (whole seconds) differ from the source's. After a copy
//! the destination carries the source's permissions and modification time,
//! which is what lets the next run recognize it as unchanged.
//!
//! Content is never hashed: a file rewritten with the same size within the
//! same second as its mirrored copy will not be picked up.

mod types;

pub use types::{MirrorError, MirrorOutcome, MirrorStats};

use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::Path;

use filetime::FileTime;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Mirror a single regular file from `src` to `dst`.
///
/// Returns [`MirrorOutcome::Unchanged`] without touching the destination when
/// it is already a regular file with the same size, executable bit, and
/// modification time as the source. Otherwise the destination's parent
/// directories are created, the bytes are copied and verified against the
/// source's size, and permissions and timestamps are carried over.
///
/// # Errors
///
/// [`MirrorError::NotRegularFile`] if `src` is not a regular file (symlinks
/// are not followed); nothing is written in that case. Any I/O failure along
/// the way is returned with the offending path.
pub fn mirror_file(src: &Path, dst: &Path) -> Result<MirrorOutcome, MirrorError> {
  let src_meta = fs::symlink_metadata(src).map_err(|e| MirrorError::Metadata {
    path: src.to_path_buf(),
    source: e,
  })?;

  if !src_meta.file_type().is_file() {
    return Err(MirrorError::NotRegularFile {
      path: src.to_path_buf(),
    });
  }

  if let Ok(dst_meta) = fs::symlink_metadata(dst) {
    if is_up_to_date(&src_meta, &dst_meta) {
      debug!(path = %dst.display(), "unchanged");
      return Ok(MirrorOutcome::Unchanged);
    }

    // Replace rather than truncate: a stale symlink must not be written
    // through, and a read-only copy must not block the update.
    if !dst_meta.is_dir() {
      fs::remove_file(dst).map_err(|e| MirrorError::Remove {
        path: dst.to_path_buf(),
        source: e,
      })?;
    }
  }

  if let Some(parent) = dst.parent()
    && !parent.as_os_str().is_empty()
  {
    create_dir_all(parent).map_err(|e| MirrorError::CreateDir {
      path: parent.to_path_buf(),
      source: e,
    })?;
  }

  let mut reader = File::open(src).map_err(|e| MirrorError::Open {
    path: src.to_path_buf(),
    source: e,
  })?;
  let mut writer = File::create(dst).map_err(|e| MirrorError::Create {
    path: dst.to_path_buf(),
    source: e,
  })?;

  let copied = copy_verified(&mut reader, &mut writer, src_meta.len(), src, dst)?;

  // std discards close(2) errors on drop, so deferred write failures only
  // surface through an explicit sync. This costs one fdatasync per copied
  // file; unchanged files never reach this point.
  writer.sync_data().map_err(|e| MirrorError::Flush {
    path: dst.to_path_buf(),
    source: e,
  })?;
  drop(writer);

  fs::set_permissions(dst, src_meta.permissions()).map_err(|e| MirrorError::SetPermissions {
    path: dst.to_path_buf(),
    source: e,
  })?;

  let mtime = FileTime::from_last_modification_time(&src_meta);
  filetime::set_file_times(dst, mtime, mtime).map_err(|e| MirrorError::SetTimes {
    path: dst.to_path_buf(),
    source: e,
  })?;

  debug!(src = %src.display(), dst = %dst.display(), bytes = copied, "copied");
  Ok(MirrorOutcome::Copied { bytes: copied })
}

/// Mirror every regular file under `src` into the same relative path under `dst`.
///
/// Directories are walked but not mirrored as objects, so empty directories
/// do not appear in the destination. Symlinks are not followed; meeting one
/// fails the whole operation. The first error aborts the walk.
pub fn mirror_tree(src: &Path, dst: &Path) -> Result<MirrorStats, MirrorError> {
  info!("copying {} -> {}", src.display(), dst.display());

  let mut stats = MirrorStats::default();

  for entry in WalkDir::new(src) {
    let entry = entry.map_err(|e| MirrorError::Walk {
      path: src.to_path_buf(),
      source: e,
    })?;

    if entry.file_type().is_dir() {
      continue;
    }

    let relative = entry
      .path()
      .strip_prefix(src)
      .map_err(|_| MirrorError::OutsideRoot {
        path: entry.path().to_path_buf(),
        root: src.to_path_buf(),
      })?;

    // A file passed as the root maps straight onto `dst`.
    let target = if relative.as_os_str().is_empty() {
      dst.to_path_buf()
    } else {
      dst.join(relative)
    };

    stats.record(mirror_file(entry.path(), &target)?);
  }

  debug!(
    copied = stats.copied,
    unchanged = stats.unchanged,
    bytes = stats.bytes,
    "mirrored {}",
    src.display()
  );

  Ok(stats)
}

/// Copy `reader` into `writer`, failing unless exactly `expected` bytes moved.
fn copy_verified<R: Read, W: Write>(
  reader: &mut R,
  writer: &mut W,
  expected: u64,
  src: &Path,
  dst: &Path,
) -> Result<u64, MirrorError> {
  let copied = io::copy(reader, writer).map_err(|e| MirrorError::Copy {
    src: src.to_path_buf(),
    dst: dst.to_path_buf(),
    source: e,
  })?;

  if copied != expected {
    return Err(MirrorError::ShortCopy {
      src: src.to_path_buf(),
      dst: dst.to_path_buf(),
      copied,
      expected,
    });
  }

  Ok(copied)
}

fn is_up_to_date(src: &Metadata, dst: &Metadata) -> bool {
  dst.file_type().is_file()
    && is_executable(src) == is_executable(dst)
    && dst.len() == src.len()
    && mtime_secs(dst) == mtime_secs(src)
}

fn mtime_secs(meta: &Metadata) -> i64 {
  FileTime::from_last_modification_time(meta).unix_seconds()
}

#[cfg(unix)]
fn is_executable(meta: &Metadata) -> bool {
  use std::os::unix::fs::PermissionsExt;

  meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &Metadata) -> bool {
  false
}

/// Recursive `mkdir` with the fixed directory mode on unix.
pub(crate) fn create_dir_all(path: &Path) -> io::Result<()> {
  let mut builder = fs::DirBuilder::new();
  builder.recursive(true);

  #[cfg(unix)]
  {
    use std::os::unix::fs::DirBuilderExt;
    builder.mode(crate::consts::DIR_MODE);
  }

  builder.create(path)
}
