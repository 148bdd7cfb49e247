/// Undo support for organize passes.
///
/// Every rename or move the organizer commits is stored as an inverse record
/// in an [`ActionLog`]. Calling [`ActionLog::undo`] pops the newest record and
/// puts the path back where it came from.
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A committed mutation, stored so that `current -> original` reverses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRecord {
    /// A file or folder renamed in place.
    Rename {
        current: PathBuf,
        original: PathBuf,
    },
    /// A file moved into another folder.
    Move {
        current: PathBuf,
        original: PathBuf,
        /// The move created `current`'s parent folder.
        created_dir: bool,
    },
}

impl ActionRecord {
    /// Path the record's subject lives at now.
    pub fn current(&self) -> &Path {
        match self {
            ActionRecord::Rename { current, .. } | ActionRecord::Move { current, .. } => current,
        }
    }

    /// Path the subject had before the mutation.
    pub fn original(&self) -> &Path {
        match self {
            ActionRecord::Rename { original, .. } | ActionRecord::Move { original, .. } => {
                original
            }
        }
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ActionRecord::Rename { .. } => "rename",
            ActionRecord::Move { .. } => "move",
        };
        write!(
            f,
            "{}: {} <- {}",
            kind,
            self.current().display(),
            self.original().display()
        )
    }
}

/// Errors raised while reverting a record. The record is gone either way.
#[derive(Debug, Error)]
pub enum UndoError {
    /// Something already occupies the path the record wants to restore.
    #[error("Cannot restore {}: path is already occupied", original.display())]
    Conflict { original: PathBuf },
    /// The path to restore from no longer exists.
    #[error("Cannot restore {}: {} no longer exists", original.display(), current.display())]
    Missing { current: PathBuf, original: PathBuf },
    /// The inverse filesystem call failed.
    #[error("Failed to move {} back to {}: {source}", current.display(), original.display())]
    RevertFailed {
        current: PathBuf,
        original: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a successful [`ActionLog::undo`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The log was empty.
    NothingToUndo,
    /// The given record was reverted.
    Reverted(ActionRecord),
}

/// LIFO history of committed mutations.
#[derive(Debug, Default)]
pub struct ActionLog {
    records: Vec<ActionRecord>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. Only call after the filesystem change succeeded.
    pub fn push(&mut self, record: ActionRecord) {
        debug!("Recorded {}", record);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records oldest first.
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// Reverts the most recent record.
    ///
    /// On error the record has already been removed from the log; the
    /// filesystem state for that one path is then unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use reshelf::undo::{ActionLog, UndoOutcome};
    ///
    /// let mut log = ActionLog::new();
    /// assert_eq!(log.undo().unwrap(), UndoOutcome::NothingToUndo);
    /// ```
    pub fn undo(&mut self) -> Result<UndoOutcome, UndoError> {
        let Some(record) = self.records.pop() else {
            info!("Nothing to undo");
            return Ok(UndoOutcome::NothingToUndo);
        };

        revert(&record)?;
        info!("Undid {}", record);
        Ok(UndoOutcome::Reverted(record))
    }
}

fn revert(record: &ActionRecord) -> Result<(), UndoError> {
    let current = record.current();
    let original = record.original();

    if fs::symlink_metadata(current).is_err() {
        return Err(UndoError::Missing {
            current: current.to_path_buf(),
            original: original.to_path_buf(),
        });
    }

    if fs::symlink_metadata(original).is_ok() {
        return Err(UndoError::Conflict {
            original: original.to_path_buf(),
        });
    }

    fs::rename(current, original).map_err(|e| UndoError::RevertFailed {
        current: current.to_path_buf(),
        original: original.to_path_buf(),
        source: e,
    })?;

    if let ActionRecord::Move {
        created_dir: true, ..
    } = record
        && let Some(dir) = current.parent()
    {
        remove_dir_if_empty(dir);
    }

    Ok(())
}

/// Removes a folder the organizer created, unless other files still use it.
fn remove_dir_if_empty(dir: &Path) {
    let is_empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);

    if !is_empty {
        debug!("Keeping {}: not empty", dir.display());
        return;
    }

    if let Err(e) = fs::remove_dir(dir) {
        warn!("Could not remove {}: {}", dir.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_undo_empty_log() {
        let mut log = ActionLog::new();
        assert_eq!(log.undo().unwrap(), UndoOutcome::NothingToUndo);
        assert!(log.is_empty());
    }

    #[test]
    fn test_undo_rename() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let original = base.join("My.Holiday.jpg");
        let current = base.join("My Holiday.jpg");
        fs::write(&current, "pixels").unwrap();

        let mut log = ActionLog::new();
        log.push(ActionRecord::Rename {
            current: current.clone(),
            original: original.clone(),
        });

        let outcome = log.undo().expect("Undo failed");
        assert!(matches!(outcome, UndoOutcome::Reverted(ActionRecord::Rename { .. })));
        assert!(original.exists());
        assert!(!current.exists());
        assert!(log.is_empty());
    }

    #[test]
    fn test_undo_move_removes_created_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Images")).unwrap();
        let current = base.join("Images").join("a.jpg");
        fs::write(&current, "pixels").unwrap();

        let mut log = ActionLog::new();
        log.push(ActionRecord::Move {
            current: current.clone(),
            original: base.join("a.jpg"),
            created_dir: true,
        });

        log.undo().expect("Undo failed");
        assert!(base.join("a.jpg").exists());
        assert!(!base.join("Images").exists());
    }

    #[test]
    fn test_undo_move_keeps_preexisting_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Images")).unwrap();
        let current = base.join("Images").join("a.jpg");
        fs::write(&current, "pixels").unwrap();

        let mut log = ActionLog::new();
        log.push(ActionRecord::Move {
            current,
            original: base.join("a.jpg"),
            created_dir: false,
        });

        log.undo().expect("Undo failed");
        assert!(base.join("Images").is_dir());
    }

    #[test]
    fn test_undo_is_lifo() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("one b.pdf"), "1").unwrap();
        fs::write(base.join("two b.pdf"), "2").unwrap();

        let mut log = ActionLog::new();
        log.push(ActionRecord::Rename {
            current: base.join("one b.pdf"),
            original: base.join("one.b.pdf"),
        });
        log.push(ActionRecord::Rename {
            current: base.join("two b.pdf"),
            original: base.join("two.b.pdf"),
        });

        match log.undo().unwrap() {
            UndoOutcome::Reverted(record) => assert_eq!(record.original(), base.join("two.b.pdf")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(base.join("two.b.pdf").exists());
        assert!(base.join("one b.pdf").exists());

        log.undo().unwrap();
        assert!(base.join("one.b.pdf").exists());
        assert_eq!(log.undo().unwrap(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_undo_conflict_consumes_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a b.jpg"), "moved").unwrap();
        fs::write(base.join("a.b.jpg"), "squatter").unwrap();

        let mut log = ActionLog::new();
        log.push(ActionRecord::Rename {
            current: base.join("a b.jpg"),
            original: base.join("a.b.jpg"),
        });

        let result = log.undo();
        assert!(matches!(result, Err(UndoError::Conflict { .. })));
        assert!(log.is_empty());
        assert_eq!(fs::read_to_string(base.join("a.b.jpg")).unwrap(), "squatter");
    }

    #[test]
    fn test_undo_missing_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let mut log = ActionLog::new();
        log.push(ActionRecord::Move {
            current: base.join("Images").join("gone.jpg"),
            original: base.join("gone.jpg"),
            created_dir: true,
        });

        assert!(matches!(log.undo(), Err(UndoError::Missing { .. })));
        assert!(log.is_empty());
    }
}
