//! Document scanner
//!
//! Recursive discovery of member documents under the record root. There is
//! no index: every lookup walks the tree. Entries that cannot be read are
//! logged and skipped, never fatal.

use gym_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A document found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub path: PathBuf,
    /// File name without extension
    pub stem: String,
    pub modified: SystemTime,
}

/// Walks the record root for files with one extension
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    extension: String,
}

impl DocumentScanner {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Every document under `root`, in file-name order
    pub fn scan(&self, root: &Path) -> Result<Vec<DocumentEntry>> {
        self.scan_matching(root, |_| true)
    }

    /// Documents whose stem satisfies `keep`. Metadata is only read for kept entries.
    pub fn scan_matching<F>(&self, root: &Path, keep: F) -> Result<Vec<DocumentEntry>>
    where
        F: Fn(&str) -> bool,
    {
        check_root(root)?;

        let mut documents = Vec::new();
        let mut skipped = 0usize;

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.has_extension(entry.path()) {
                continue;
            }

            let stem = match entry.path().file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            };
            if !keep(&stem) {
                continue;
            }

            match entry.metadata().map_err(std::io::Error::from).and_then(|m| m.modified()) {
                Ok(modified) => documents.push(DocumentEntry {
                    path: entry.into_path(),
                    stem,
                    modified,
                }),
                Err(e) => {
                    tracing::warn!("Cannot stat {}: {}", entry.path().display(), e);
                    skipped += 1;
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            found = documents.len(),
            skipped,
            "Document scan complete"
        );

        Ok(documents)
    }

    /// Every directory under `root` whose name is exactly `name`.
    ///
    /// Matches nested inside an earlier match are not reported.
    pub fn directories_named(&self, root: &Path, name: &str) -> Result<Vec<PathBuf>> {
        check_root(root)?;

        let mut found: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_dir()
                && entry.file_name() == name
                && !found.iter().any(|outer| entry.path().starts_with(outer))
            {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

/// The most recently modified entry; the first one wins a tie.
pub fn latest(entries: &[DocumentEntry]) -> Option<&DocumentEntry> {
    entries
        .iter()
        .reduce(|best, e| if e.modified > best.modified { e } else { best })
}

fn check_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(Error::StorageUnavailable(root.to_path_buf()));
    }
    Ok(())
}
