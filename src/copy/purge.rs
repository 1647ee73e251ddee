//! Destination pruning.

use crate::error::{Error, Result};
use crate::progress::ProgressAggregator;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

/// Delete every entry directly under `dir` whose name is not in `retained`.
///
/// Stale directories are emptied recursively before removal. Returns the
/// number of non-directory entries deleted at any depth, which is also added
/// to the aggregator's purge counter. A missing `dir` purges nothing.
pub(crate) fn purge_directory(
    dir: &Path,
    retained: &HashSet<OsString>,
    progress: &ProgressAggregator,
) -> Result<u64> {
    let purge_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| Error::Purge { path, source }
    };

    let mut entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(purge_err(dir)(e)),
    };

    let mut removed = 0;
    let outcome = entries.try_for_each(|entry| {
        let entry = entry.map_err(purge_err(dir))?;
        if retained.contains(&entry.file_name()) {
            return Ok(());
        }
        remove_entry(&entry.path(), &mut removed)
    });

    // Entries deleted before a failure still count
    progress.add_purged_files(removed);
    outcome?;

    #[cfg(feature = "tracing")]
    if removed > 0 {
        tracing::debug!("purged {} entries under {}", removed, dir.display());
    }

    Ok(removed)
}

/// Remove `path` and everything below it, adding each non-directory to `removed`.
fn remove_entry(path: &Path, removed: &mut u64) -> Result<()> {
    let err = |source| Error::Purge {
        path: path.to_path_buf(),
        source,
    };

    // symlink_metadata so a linked directory is unlinked, not emptied
    let meta = fs::symlink_metadata(path).map_err(err)?;
    if !meta.is_dir() {
        fs::remove_file(path).map_err(err)?;
        *removed += 1;
        return Ok(());
    }

    for entry in fs::read_dir(path).map_err(err)? {
        let entry = entry.map_err(err)?;
        remove_entry(&entry.path(), removed)?;
    }
    fs::remove_dir(path).map_err(err)
}
