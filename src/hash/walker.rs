// File enumeration module
// Lazy recursive walk of a directory tree with basename exclusions

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use jwalk::{DirEntryIter, Parallelism, WalkDir};

use super::error::{ChecksumError, Result};

/// Lazy, single-pass sequence of absolute file paths under a root
///
/// Entries are yielded depth-first with each directory's children sorted by
/// name, so two walks over an unchanged tree produce the same order.
/// Files whose basename is in the exclusion set are dropped at every depth.
/// Unreadable entries are logged and skipped; the walk never aborts on one.
/// Symbolic links are not followed and are not yielded.
pub struct FileEnumerator {
    root: PathBuf,
    exclude: HashSet<OsString>,
    entries: DirEntryIter<((), ())>,
}

impl FileEnumerator {
    /// Start a walk at `root`, which must be an existing directory
    pub fn new<I, S>(root: &Path, exclude: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let root = root
            .canonicalize()
            .map_err(|e| ChecksumError::from_io_error(e, "scanning directory", Some(root.to_path_buf())))?;

        if !root.is_dir() {
            return Err(ChecksumError::DirectoryNotFound { path: root });
        }

        let entries = WalkDir::new(&root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .into_iter();

        Ok(Self {
            root,
            exclude: exclude.into_iter().map(Into::into).collect(),
            entries,
        })
    }

    /// Canonical root of the walk
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        self.exclude.contains(name)
    }
}

impl Iterator for FileEnumerator {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.entries.next()? {
                Ok(entry) => {
                    // jwalk reports an unreadable directory on its own entry
                    if let Some(ref e) = entry.read_children_error {
                        tracing::warn!("Skipping unreadable directory {}: {}", entry.path().display(), e);
                        continue;
                    }
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if self.is_excluded(entry.file_name()) {
                        tracing::debug!(path = %entry.path().display(), "excluded by name");
                        continue;
                    }
                    return Some(entry.path());
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                }
            }
        }
    }
}

/// Collect every file under `root` eagerly
pub fn collect_files<I, S>(root: &Path, exclude: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    Ok(FileEnumerator::new(root, exclude)?.collect())
}
