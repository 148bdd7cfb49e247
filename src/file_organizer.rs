/// File organization: name normalization and relocation into category folders.
///
/// An organize pass walks a directory, classifies every file by extension,
/// normalizes its name (dots in the stem become spaces) and then either moves
/// it into a `<category>` folder next to it or, for videos, makes sure its
/// parent folder is named after the series and season. Every committed
/// change is recorded in the engine's [`ActionLog`] so it can be undone.
use crate::config::{CompiledFilters, ConfigError, ReshelfConfig};
use crate::file_category::{Category, TypeClassifier};
use crate::reporting::Hooks;
use crate::series::{PrefixSeason, SeasonStrategy, SeriesError, series_label};
use crate::undo::{ActionLog, ActionRecord, UndoError, UndoOutcome};
use crate::walk::collect_files;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static REGEX_SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("Invalid regex"));

/// Errors that can occur while organizing a single file or starting a pass.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The directory to organize is missing or not a directory.
    #[error("Invalid base path {}: not a directory", path.display())]
    InvalidBasePath { path: PathBuf },
    /// Failed to create a category or series folder.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to rename a file or folder in place.
    #[error("Failed to rename {} to {}: {source}", from.display(), to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to move a file into another folder.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The target path is taken by something else.
    #[error("Destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },
    /// The path has no file name or parent component.
    #[error("Path has no usable file name: {}", path.display())]
    MissingFileName { path: PathBuf },
    /// The video heuristic could not derive a series folder name.
    #[error("Cannot derive series folder for {}: {source}", path.display())]
    VideoLayout {
        path: PathBuf,
        #[source]
        source: SeriesError,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Where a file ended up after [`OrganizerEngine::relocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Nothing needed to change.
    Stayed(PathBuf),
    /// The file moved into another folder.
    Moved { from: PathBuf, to: PathBuf },
    /// The file's parent folder was renamed; `file` is the file's new path.
    FolderRenamed {
        from: PathBuf,
        to: PathBuf,
        file: PathBuf,
    },
}

impl Placement {
    /// The file's path after relocation.
    pub fn path(&self) -> &Path {
        match self {
            Placement::Stayed(path) => path,
            Placement::Moved { to, .. } => to,
            Placement::FolderRenamed { file, .. } => file,
        }
    }
}

/// Options for one organize pass.
#[derive(Debug, Clone, Copy)]
pub struct OrganizeOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Compute the outcome without touching the filesystem.
    pub dry_run: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            dry_run: false,
        }
    }
}

/// Counts gathered during an organize pass.
#[derive(Debug, Clone, Default)]
pub struct OrganizeSummary {
    /// Files visited.
    pub processed: usize,
    /// Files whose path changed (or would change in a dry run).
    pub changed: usize,
    /// Files left alone: filtered out or without a category.
    pub skipped: usize,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Classified files per category.
    pub by_category: BTreeMap<String, usize>,
    /// Whether the pass ran without touching the filesystem.
    pub dry_run: bool,
}

/// Applies the stem normalization to a bare file name.
///
/// Every `.` in the stem becomes a space and runs of spaces collapse into
/// one. The extension (text after the last dot) is kept as is, so applying
/// this twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use reshelf::file_organizer::normalized_file_name;
///
/// assert_eq!(normalized_file_name("Show.Name.S01E02.mkv"), "Show Name S01E02.mkv");
/// assert_eq!(normalized_file_name("Show Name S01E02.mkv"), "Show Name S01E02.mkv");
/// assert_eq!(normalized_file_name("a. .b.jpg"), "a b.jpg");
/// ```
pub fn normalized_file_name(name: &str) -> String {
    let (stem, extension) = split_extension(name);
    let spaced = stem.replace('.', " ");
    let collapsed = REGEX_SPACE_RUNS.replace_all(&spaced, " ");
    format!("{}{}", collapsed, extension)
}

/// Splits at the last dot, keeping the dot with the extension. A leading
/// dot or a trailing dot does not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => name.split_at(i),
        _ => (name, ""),
    }
}

/// Classifies, renames and relocates files, and owns their undo history.
pub struct OrganizerEngine {
    classifier: TypeClassifier,
    filters: CompiledFilters,
    season: Box<dyn SeasonStrategy>,
    actions: ActionLog,
}

impl OrganizerEngine {
    pub fn new(
        classifier: TypeClassifier,
        filters: CompiledFilters,
        season: Box<dyn SeasonStrategy>,
    ) -> Self {
        Self {
            classifier,
            filters,
            season,
            actions: ActionLog::new(),
        }
    }

    /// Builds an engine from loaded configuration.
    pub fn from_config(config: &ReshelfConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.classifier(),
            config.compile_filters()?,
            config.videos.season_strategy.build(),
        ))
    }

    pub fn classifier(&self) -> &TypeClassifier {
        &self.classifier
    }

    /// Committed actions, oldest first.
    pub fn actions(&self) -> &ActionLog {
        &self.actions
    }

    /// Reverts the most recent committed action.
    pub fn undo(&mut self) -> Result<UndoOutcome, UndoError> {
        self.actions.undo()
    }

    /// Renames `path` to its normalized file name.
    ///
    /// Returns the new path (the prospective one in a dry run). Names that
    /// are already normalized, or are not valid UTF-8, are left untouched and
    /// nothing is recorded.
    pub fn normalize_name(&mut self, path: &Path, dry_run: bool) -> OrganizeResult<PathBuf> {
        let Some(name) = path.file_name() else {
            return Err(OrganizeError::MissingFileName {
                path: path.to_path_buf(),
            });
        };
        let Some(name) = name.to_str() else {
            debug!("Leaving non UTF-8 name as is: {}", path.display());
            return Ok(path.to_path_buf());
        };

        let new_name = normalized_file_name(name);
        if new_name == name {
            return Ok(path.to_path_buf());
        }

        let new_path = path.with_file_name(&new_name);
        if dry_run {
            return Ok(new_path);
        }

        self.rename_recorded(path, &new_path)?;
        Ok(new_path)
    }

    /// Moves `path` according to its category.
    ///
    /// Generic categories move the file into `<parent>/<category>`. Videos
    /// rename the parent folder to `"<series> <season>"` unless its name
    /// already contains that text.
    pub fn relocate(
        &mut self,
        path: &Path,
        category: &Category,
        dry_run: bool,
    ) -> OrganizeResult<Placement> {
        self.relocate_within(path, category, None, dry_run)
    }

    /// Normalizes the name, then relocates. `root` is the directory being
    /// organized; it is never renamed itself.
    fn organize_file(
        &mut self,
        path: &Path,
        category: &Category,
        root: &Path,
        dry_run: bool,
    ) -> OrganizeResult<Placement> {
        let renamed = self.normalize_name(path, dry_run)?;
        self.relocate_within(&renamed, category, Some(root), dry_run)
    }

    fn relocate_within(
        &mut self,
        path: &Path,
        category: &Category,
        root: Option<&Path>,
        dry_run: bool,
    ) -> OrganizeResult<Placement> {
        let parent = path
            .parent()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: path.to_path_buf(),
            })?;

        if category.is_videos() {
            return self.place_video(path, parent, root, dry_run);
        }

        let already_sorted = parent
            .file_name()
            .is_some_and(|name| name == category.dir_name());
        if already_sorted {
            return Ok(Placement::Stayed(path.to_path_buf()));
        }

        self.move_into(path, &parent.join(category.dir_name()), dry_run)
    }

    fn place_video(
        &mut self,
        path: &Path,
        parent: &Path,
        root: Option<&Path>,
        dry_run: bool,
    ) -> OrganizeResult<Placement> {
        let stem = path
            .file_stem()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: path.to_path_buf(),
            })?
            .to_string_lossy();

        let label =
            series_label(&stem, self.season.as_ref()).map_err(|source| OrganizeError::VideoLayout {
                path: path.to_path_buf(),
                source,
            })?;
        let target_name = label.folder_name();

        let parent_name = parent.file_name().map(|n| n.to_string_lossy());
        if parent_name
            .as_deref()
            .is_some_and(|name| name.contains(&target_name))
        {
            return Ok(Placement::Stayed(path.to_path_buf()));
        }

        // Loose episodes in the organized root (or a filesystem root) get a
        // fresh series folder instead of renaming the directory they sit in.
        let grandparent = match parent.parent() {
            Some(grandparent) if parent_name.is_some() && root != Some(parent) => grandparent,
            _ => return self.move_into(path, &parent.join(&target_name), dry_run),
        };

        let target_dir = grandparent.join(&target_name);
        if target_dir.is_dir() {
            debug!(
                "Merging {} into existing {}",
                path.display(),
                target_dir.display()
            );
            return self.move_into(path, &target_dir, dry_run);
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: path.to_path_buf(),
            })?;
        let placement = Placement::FolderRenamed {
            from: parent.to_path_buf(),
            to: target_dir.clone(),
            file: target_dir.join(file_name),
        };

        if !dry_run {
            self.rename_recorded(parent, &target_dir)?;
        }
        Ok(placement)
    }

    /// Moves `path` into `dir`, creating `dir` when needed.
    fn move_into(&mut self, path: &Path, dir: &Path, dry_run: bool) -> OrganizeResult<Placement> {
        let file_name = path
            .file_name()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: path.to_path_buf(),
            })?;
        let destination = dir.join(file_name);

        if fs::symlink_metadata(&destination).is_ok() {
            return Err(OrganizeError::DestinationExists { path: destination });
        }

        if dry_run {
            return Ok(Placement::Moved {
                from: path.to_path_buf(),
                to: destination,
            });
        }

        let created_dir = !dir.exists();
        if created_dir {
            fs::create_dir(dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        if let Err(e) = fs::rename(path, &destination) {
            if created_dir {
                let _ = fs::remove_dir(dir);
            }
            return Err(OrganizeError::MoveFailed {
                from: path.to_path_buf(),
                to: destination,
                source: e,
            });
        }

        self.actions.push(ActionRecord::Move {
            current: destination.clone(),
            original: path.to_path_buf(),
            created_dir,
        });

        Ok(Placement::Moved {
            from: path.to_path_buf(),
            to: destination,
        })
    }

    /// Renames in place and records the inverse.
    fn rename_recorded(&mut self, from: &Path, to: &Path) -> OrganizeResult<()> {
        if fs::symlink_metadata(to).is_ok() {
            return Err(OrganizeError::DestinationExists {
                path: to.to_path_buf(),
            });
        }

        fs::rename(from, to).map_err(|e| OrganizeError::RenameFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        })?;

        self.actions.push(ActionRecord::Rename {
            current: to.to_path_buf(),
            original: from.to_path_buf(),
        });
        Ok(())
    }

    /// Organizes every file under `directory`.
    ///
    /// Files are handled one at a time in walk order. A file that fails is
    /// logged and counted in the summary, and the pass moves on; only an
    /// unusable `directory` fails the whole call.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reshelf::file_organizer::{OrganizeOptions, OrganizerEngine};
    /// use reshelf::reporting::Hooks;
    /// use reshelf::ReshelfConfig;
    /// use std::path::Path;
    ///
    /// let mut engine = OrganizerEngine::from_config(&ReshelfConfig::default()).unwrap();
    /// let summary = engine
    ///     .organize(Path::new("/path/to/downloads"), OrganizeOptions::default(), Hooks::none())
    ///     .unwrap();
    /// println!("{} files changed", summary.changed);
    /// engine.undo().unwrap();
    /// ```
    pub fn organize(
        &mut self,
        directory: &Path,
        options: OrganizeOptions,
        hooks: Hooks<'_>,
    ) -> OrganizeResult<OrganizeSummary> {
        if !directory.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: directory.to_path_buf(),
            });
        }

        let mut files = collect_files(directory, options.recursive);
        let total = files.len();
        info!(
            "Organizing {} files under {}{}",
            total,
            directory.display(),
            if options.dry_run { " (dry run)" } else { "" }
        );

        let mut summary = OrganizeSummary {
            dry_run: options.dry_run,
            ..OrganizeSummary::default()
        };
        let prefix = if options.dry_run { "[dry run] " } else { "" };

        for i in 0..total {
            let path = files[i].clone();
            summary.processed += 1;

            let relative = path.strip_prefix(directory).unwrap_or(&path);
            let category = if self.filters.should_include(relative) {
                self.classifier.classify(&path)
            } else {
                debug!("Filtered out {}", path.display());
                None
            };

            match category {
                None => {
                    summary.skipped += 1;
                    hooks.log(&format!("{}Skipped: {}", prefix, path.display()));
                }
                Some(category) => {
                    match self.organize_file(&path, &category, directory, options.dry_run) {
                        Ok(placement) => {
                            if let Placement::FolderRenamed { from, to, .. } = &placement {
                                rebase_pending(&mut files[i + 1..], from, to);
                            }
                            if placement.path() != path {
                                summary.changed += 1;
                            }
                            *summary
                                .by_category
                                .entry(category.dir_name().to_string())
                                .or_insert(0) += 1;
                            hooks.log(&format!(
                                "{}Processed: {} -> {}",
                                prefix,
                                path.display(),
                                placement.path().display()
                            ));
                        }
                        Err(e) => {
                            warn!("Error organizing {}: {}", path.display(), e);
                            hooks.log(&format!("{}Error organizing {}: {}", prefix, path.display(), e));
                            summary.failed.push((path.clone(), e.to_string()));
                        }
                    }
                }
            }

            hooks.progress(i + 1, total);
        }

        info!(
            "Organize pass finished: {} processed, {} changed, {} skipped, {} failed",
            summary.processed,
            summary.changed,
            summary.skipped,
            summary.failed.len()
        );

        Ok(summary)
    }
}

impl Default for OrganizerEngine {
    fn default() -> Self {
        Self::new(
            TypeClassifier::default(),
            CompiledFilters::allow_all(),
            Box::new(PrefixSeason),
        )
    }
}

/// Rewrites queued paths that lived under a folder that was just renamed.
fn rebase_pending(pending: &mut [PathBuf], from: &Path, to: &Path) {
    for path in pending.iter_mut() {
        if let Ok(rest) = path.strip_prefix(from) {
            *path = to.join(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalized_file_name() {
        assert_eq!(normalized_file_name("My.Holiday.Photo.jpg"), "My Holiday Photo.jpg");
        assert_eq!(normalized_file_name("plain.pdf"), "plain.pdf");
        assert_eq!(normalized_file_name("a..b.png"), "a b.png");
        assert_eq!(normalized_file_name("no_extension"), "no_extension");
        assert_eq!(normalized_file_name("archive.tar.gz"), "archive tar.gz");
    }

    #[test]
    fn test_normalize_name_renames_and_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let file_path = base.join("Show.Name.S01E02.mkv");
        fs::write(&file_path, "video").unwrap();

        let mut engine = OrganizerEngine::default();
        let new_path = engine.normalize_name(&file_path, false).unwrap();

        assert_eq!(new_path, base.join("Show Name S01E02.mkv"));
        assert!(new_path.exists());
        assert!(!file_path.exists());
        assert_eq!(
            engine.actions().records(),
            [ActionRecord::Rename {
                current: new_path.clone(),
                original: file_path.clone(),
            }]
        );
    }

    #[test]
    fn test_normalize_name_is_noop_when_normalized() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("Already Fine.jpg");
        fs::write(&file_path, "x").unwrap();

        let mut engine = OrganizerEngine::default();
        let new_path = engine.normalize_name(&file_path, false).unwrap();

        assert_eq!(new_path, file_path);
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn test_normalize_name_refuses_to_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.b.jpg"), "first").unwrap();
        fs::write(base.join("a b.jpg"), "second").unwrap();

        let mut engine = OrganizerEngine::default();
        let result = engine.normalize_name(&base.join("a.b.jpg"), false);

        assert!(matches!(result, Err(OrganizeError::DestinationExists { .. })));
        assert_eq!(fs::read_to_string(base.join("a b.jpg")).unwrap(), "second");
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn test_relocate_creates_category_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let file_path = base.join("report.pdf");
        fs::write(&file_path, "pdf").unwrap();

        let mut engine = OrganizerEngine::default();
        let placement = engine
            .relocate(&file_path, &Category::new("Documents"), false)
            .unwrap();

        let moved = base.join("Documents").join("report.pdf");
        assert_eq!(placement.path(), moved);
        assert!(moved.exists());
        assert!(!file_path.exists());
        assert_eq!(
            engine.actions().records(),
            [ActionRecord::Move {
                current: moved,
                original: file_path,
                created_dir: true,
            }]
        );
    }

    #[test]
    fn test_relocate_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Images")).unwrap();
        let file_path = base.join("test.png");
        fs::write(&file_path, "png").unwrap();

        let mut engine = OrganizerEngine::default();
        engine
            .relocate(&file_path, &Category::new("Images"), false)
            .unwrap();

        assert!(base.join("Images").join("test.png").exists());
        assert!(matches!(
            engine.actions().records(),
            [ActionRecord::Move {
                created_dir: false,
                ..
            }]
        ));
    }

    #[test]
    fn test_relocate_leaves_already_sorted_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Images")).unwrap();
        let file_path = base.join("Images").join("a.png");
        fs::write(&file_path, "png").unwrap();

        let mut engine = OrganizerEngine::default();
        let placement = engine
            .relocate(&file_path, &Category::new("Images"), false)
            .unwrap();

        assert_eq!(placement, Placement::Stayed(file_path.clone()));
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn test_relocate_video_renames_release_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let release = base.join("Show.Name.Release");
        fs::create_dir(&release).unwrap();
        let file_path = release.join("Show Name S01E02.mkv");
        fs::write(&file_path, "video").unwrap();

        let mut engine = OrganizerEngine::default();
        let placement = engine
            .relocate(&file_path, &Category::new("Videos"), false)
            .unwrap();

        let season_dir = base.join("Show Name S01");
        assert_eq!(
            placement,
            Placement::FolderRenamed {
                from: release.clone(),
                to: season_dir.clone(),
                file: season_dir.join("Show Name S01E02.mkv"),
            }
        );
        assert!(season_dir.join("Show Name S01E02.mkv").exists());
        assert!(!release.exists());
    }

    #[test]
    fn test_relocate_video_keeps_matching_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let folder = temp_dir.path().join("[HD] Show Name S01 Complete");
        fs::create_dir(&folder).unwrap();
        let file_path = folder.join("Show Name S01E03.mp4");
        fs::write(&file_path, "video").unwrap();

        let mut engine = OrganizerEngine::default();
        let placement = engine
            .relocate(&file_path, &Category::new("Videos"), false)
            .unwrap();

        assert_eq!(placement, Placement::Stayed(file_path));
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn test_relocate_video_merges_into_existing_season_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Show Name S01")).unwrap();
        fs::create_dir(base.join("Other.Release")).unwrap();
        let file_path = base.join("Other.Release").join("Show Name S01E04.mkv");
        fs::write(&file_path, "video").unwrap();

        let mut engine = OrganizerEngine::default();
        let placement = engine
            .relocate(&file_path, &Category::new("Videos"), false)
            .unwrap();

        let merged = base.join("Show Name S01").join("Show Name S01E04.mkv");
        assert_eq!(placement.path(), merged);
        assert!(merged.exists());
        assert!(base.join("Other.Release").is_dir());
    }

    #[test]
    fn test_relocate_video_without_series_name_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let folder = temp_dir.path().join("dump");
        fs::create_dir(&folder).unwrap();
        let file_path = folder.join("S01E01.mkv");
        fs::write(&file_path, "video").unwrap();

        let mut engine = OrganizerEngine::default();
        let result = engine.relocate(&file_path, &Category::new("Videos"), false);

        assert!(matches!(result, Err(OrganizeError::VideoLayout { .. })));
        assert!(file_path.exists());
    }

    #[test]
    fn test_dry_run_relocate_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let file_path = base.join("c.png");
        fs::write(&file_path, "png").unwrap();

        let mut engine = OrganizerEngine::default();
        let placement = engine
            .relocate(&file_path, &Category::new("Images"), true)
            .unwrap();

        assert_eq!(placement.path(), base.join("Images").join("c.png"));
        assert!(!base.join("Images").exists());
        assert!(file_path.exists());
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn test_failed_move_removes_created_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let vanished = base.join("gone.pdf");

        let mut engine = OrganizerEngine::default();
        let result = engine.relocate(&vanished, &Category::new("Documents"), false);

        assert!(matches!(result, Err(OrganizeError::MoveFailed { .. })));
        assert!(!base.join("Documents").exists());
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn test_dry_run_reports_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Images")).unwrap();
        fs::write(base.join("Images").join("p.png"), "already there").unwrap();
        fs::write(base.join("p.png"), "newcomer").unwrap();

        let mut engine = OrganizerEngine::default();
        let dry = engine
            .organize(
                base,
                OrganizeOptions {
                    recursive: true,
                    dry_run: true,
                },
                Hooks::none(),
            )
            .unwrap();
        let live = engine
            .organize(base, OrganizeOptions::default(), Hooks::none())
            .unwrap();

        assert_eq!(dry.failed.len(), 1);
        assert_eq!(dry.changed, 0);
        assert_eq!(live.failed.len(), dry.failed.len());
        assert_eq!(live.changed, dry.changed);
    }

    #[test]
    fn test_rebase_pending() {
        let mut pending = vec![
            PathBuf::from("/m/Show.Release/e2.mkv"),
            PathBuf::from("/m/Elsewhere/e3.mkv"),
        ];
        rebase_pending(
            &mut pending,
            Path::new("/m/Show.Release"),
            Path::new("/m/Show S01"),
        );
        assert_eq!(pending[0], PathBuf::from("/m/Show S01/e2.mkv"));
        assert_eq!(pending[1], PathBuf::from("/m/Elsewhere/e3.mkv"));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(name in "[a-zA-Z0-9 .]{0,24}") {
            let once = normalized_file_name(&name);
            prop_assert_eq!(normalized_file_name(&once), once);
        }

        #[test]
        fn normalization_keeps_extension(stem in "[a-z.]{1,12}", ext in "[a-z0-9]{1,4}") {
            let name = format!("{}.{}", stem, ext);
            let normalized = normalized_file_name(&name);
            let expected_suffix = format!(".{}", ext);
            prop_assert!(normalized.ends_with(&expected_suffix));
        }
    }
}
