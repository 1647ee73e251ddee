//! Filesystem helpers shared by the copy, purge and orchestration code.

use filetime::{FileTime, set_file_times};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

// =============================================================================
// Metadata comparison and copying
// =============================================================================

/// Check whether a destination file looks like an up-to-date copy of the source.
///
/// Size and mtime must match exactly; atime too when `compare_atime` is set.
#[inline]
pub(crate) fn same_looking(src_meta: &Metadata, dst_meta: &Metadata, compare_atime: bool) -> bool {
    if !dst_meta.is_file() || src_meta.len() != dst_meta.len() {
        return false;
    }

    if FileTime::from_last_modification_time(src_meta)
        != FileTime::from_last_modification_time(dst_meta)
    {
        return false;
    }

    !compare_atime
        || FileTime::from_last_access_time(src_meta) == FileTime::from_last_access_time(dst_meta)
}

/// Copy permission bits and atime/mtime from `src` to `dst`.
///
/// Times are set before permissions so a read-only mode cannot block them.
pub(crate) fn copy_metadata(src: &Path, dst: &Path) -> io::Result<()> {
    let src_meta = fs::metadata(src)?;
    let mtime = FileTime::from_last_modification_time(&src_meta);
    let atime = FileTime::from_last_access_time(&src_meta);
    set_file_times(dst, atime, mtime)?;
    fs::set_permissions(dst, src_meta.permissions())
}

// =============================================================================
// Directory utilities
// =============================================================================

/// Create `dir` (and missing parents) if needed.
///
/// An existing directory is fine; an existing non-directory is an error.
pub(crate) fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Map a path relative to the source root onto the destination root.
pub(crate) fn dest_path(dest_root: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        dest_root.to_path_buf()
    } else {
        dest_root.join(relative)
    }
}

/// Remove directories that ended up empty, deepest first.
///
/// `dirs` must be in top-down order. Non-empty or vanished directories are
/// left alone. Returns how many were removed.
pub(crate) fn prune_empty_dirs(dirs: &[PathBuf]) -> usize {
    dirs.iter()
        .rev()
        .filter(|dir| fs::remove_dir(dir).is_ok())
        .count()
}

// =============================================================================
// Tests
// =============================================================================
