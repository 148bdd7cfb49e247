//! Content-duplicate detection.
//!
//! A scan walks a directory tree in a stable order, hashes each file, and
//! keeps the first path seen for every digest as the canonical copy. Any
//! later file with the same digest is reported against that canonical path.
//! Scanning never touches the files themselves.

use crate::hasher::{ContentDigest, hash_file};
use crate::reporting::Hooks;
use crate::walk::collect_files;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a scan before it starts.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root is missing or not a directory.
    #[error("Cannot scan {}: not a directory", path.display())]
    InvalidRoot { path: PathBuf },
}

/// A file whose content matches an earlier file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePair {
    pub duplicate: PathBuf,
    pub canonical: PathBuf,
}

/// Result of one scan.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    /// Duplicate findings in walk order.
    pub pairs: Vec<DuplicatePair>,
    /// Files that were hashed.
    pub files_hashed: usize,
    /// Files that could not be read, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Digest to first-seen path. Entries are never overwritten.
#[derive(Debug, Default)]
pub struct HashIndex {
    canonical: HashMap<ContentDigest, PathBuf>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` under `digest`.
    ///
    /// Returns `None` when `path` became canonical, or the existing canonical
    /// path when `digest` was already present.
    pub fn insert(&mut self, digest: ContentDigest, path: &Path) -> Option<&Path> {
        match self.canonical.entry(digest) {
            Entry::Vacant(slot) => {
                slot.insert(path.to_path_buf());
                None
            }
            Entry::Occupied(slot) => Some(slot.into_mut().as_path()),
        }
    }

    pub fn canonical_for(&self, digest: &ContentDigest) -> Option<&Path> {
        self.canonical.get(digest).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Walks a tree and reports content duplicates.
pub struct DuplicateScanner;

impl DuplicateScanner {
    /// Scans every regular file under `root`.
    ///
    /// Files that fail to hash are recorded in `unreadable` and left out of
    /// the index; the scan carries on with the next file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reshelf::duplicates::DuplicateScanner;
    /// use reshelf::reporting::Hooks;
    /// use std::path::Path;
    ///
    /// let report = DuplicateScanner::scan(Path::new("/path/to/photos"), Hooks::none()).unwrap();
    /// for pair in &report.pairs {
    ///     println!("{} duplicates {}", pair.duplicate.display(), pair.canonical.display());
    /// }
    /// ```
    pub fn scan(root: &Path, hooks: Hooks<'_>) -> Result<DuplicateReport, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }

        let files = collect_files(root, true);
        info!("Scanning {} files under {} for duplicates", files.len(), root.display());

        let report = scan_paths(&files, hooks);

        info!(
            "Duplicate scan complete: {} hashed, {} duplicates, {} unreadable",
            report.files_hashed,
            report.pairs.len(),
            report.unreadable.len()
        );

        Ok(report)
    }
}

/// Hashes `files` in order, reporting each one whose digest was seen before.
pub(crate) fn scan_paths(files: &[PathBuf], hooks: Hooks<'_>) -> DuplicateReport {
    let total = files.len();
    let mut index = HashIndex::new();
    let mut report = DuplicateReport::default();

    for (done, path) in files.iter().enumerate() {
        match hash_file(path) {
            Ok(digest) => {
                report.files_hashed += 1;
                debug!("{} {}", digest, path.display());
                if let Some(canonical) = index.insert(digest, path) {
                    hooks.log(&format!(
                        "Duplicate: {} | Original: {}",
                        path.display(),
                        canonical.display()
                    ));
                    report.pairs.push(DuplicatePair {
                        duplicate: path.clone(),
                        canonical: canonical.to_path_buf(),
                    });
                }
            }
            Err(e) => {
                warn!("Could not hash {}: {}", path.display(), e);
                hooks.log(&format!("Skipped (unreadable): {}", path.display()));
                report.unreadable.push((path.clone(), e.to_string()));
            }
        }
        hooks.progress(done + 1, total);
    }

    report
}
