//! Depth-first directory traversal.
//!
//! [`TreeWalker`] visits a tree top-down and yields, for each directory, its
//! immediate subdirectory and file names. Symlinks are never followed into
//! directories, so traversal cannot loop.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// One visited directory and its immediate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Absolute-or-as-given path of the directory
    pub path: PathBuf,
    /// Path relative to the walk root (empty for the root itself)
    pub relative: PathBuf,
    /// Real subdirectories, traversed after this listing
    pub dirs: Vec<OsString>,
    /// Regular files and symlinks to regular files
    pub files: Vec<OsString>,
    /// Entries that are neither: symlinked directories, broken symlinks,
    /// sockets, devices. Their names are known but nothing is copied.
    pub other: Vec<OsString>,
}

impl DirListing {
    /// Whether the directory has no entries of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty() && self.other.is_empty()
    }

    /// Every entry name in the directory.
    pub fn entry_names(&self) -> impl Iterator<Item = &OsString> {
        self.dirs.iter().chain(&self.files).chain(&self.other)
    }
}

/// Top-down, depth-first iterator over a directory tree.
///
/// Entries within a directory are sorted by name so runs are reproducible.
/// A directory that cannot be read yields an [`Error::Walk`] and the walk
/// continues with the remaining directories.
pub struct TreeWalker {
    stack: Vec<(PathBuf, PathBuf)>,
    warn: Option<fn(&str)>,
}

impl TreeWalker {
    /// Start a walk at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            stack: vec![(root.as_ref().to_path_buf(), PathBuf::new())],
            warn: None,
        }
    }

    /// Route warnings about skipped entries through `handler`.
    #[must_use]
    pub fn with_warn_handler(mut self, handler: Option<fn(&str)>) -> Self {
        self.warn = handler;
        self
    }

    fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    fn list(&self, path: &Path, relative: PathBuf) -> Result<DirListing> {
        let walk_err = |source| Error::Walk {
            path: path.to_path_buf(),
            source,
        };

        let mut listing = DirListing {
            path: path.to_path_buf(),
            relative,
            dirs: Vec::new(),
            files: Vec::new(),
            other: Vec::new(),
        };

        for entry in fs::read_dir(path).map_err(walk_err)? {
            let entry = entry.map_err(walk_err)?;
            let name = entry.file_name();
            // file_type() does not follow symlinks
            let file_type = entry.file_type().map_err(walk_err)?;

            if file_type.is_dir() {
                listing.dirs.push(name);
            } else if file_type.is_file() {
                listing.files.push(name);
            } else if file_type.is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => listing.files.push(name),
                    Ok(meta) if meta.is_dir() => {
                        self.warn(&format!(
                            "Not descending into symlinked directory: {}",
                            entry.path().display()
                        ));
                        listing.other.push(name);
                    }
                    Ok(_) => {
                        self.warn(&format!("Skipping special file: {}", entry.path().display()));
                        listing.other.push(name);
                    }
                    Err(e) => {
                        self.warn(&format!(
                            "Skipping broken symlink {}: {}",
                            entry.path().display(),
                            e
                        ));
                        listing.other.push(name);
                    }
                }
            } else {
                self.warn(&format!("Skipping special file: {}", entry.path().display()));
                listing.other.push(name);
            }
        }

        listing.dirs.sort();
        listing.files.sort();
        listing.other.sort();
        Ok(listing)
    }
}

impl Iterator for TreeWalker {
    type Item = Result<DirListing>;

    fn next(&mut self) -> Option<Self::Item> {
        let (path, relative) = self.stack.pop()?;
        let listing = self.list(&path, relative);
        if let Ok(listing) = &listing {
            // Reverse so the first name is visited next
            for name in listing.dirs.iter().rev() {
                self.stack
                    .push((listing.path.join(name), listing.relative.join(name)));
            }
        }
        Some(listing)
    }
}
