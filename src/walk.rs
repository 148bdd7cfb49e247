//! Directory enumeration shared by the organize and duplicate passes.

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists every regular file under `root`, sorted by file name at each level.
///
/// With `recursive` false only the direct children of `root` are listed.
/// Entries that cannot be read are logged and skipped; symlinks are not
/// followed.
pub fn collect_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
