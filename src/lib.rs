//! reshelf - sort files into category folders and keep the change reversible
//!
//! This library classifies files by extension, normalizes their names, moves
//! them into per-category folders (with a series/season heuristic for
//! videos), reports content duplicates found by SHA-256 hashing, and undoes
//! the most recent change one step at a time.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod file_category;
pub mod file_organizer;
pub mod hasher;
pub mod output;
pub mod reporting;
pub mod series;
pub mod undo;
pub mod walk;

pub use config::{CompiledFilters, ConfigError, ReshelfConfig};
pub use duplicates::{DuplicatePair, DuplicateReport, DuplicateScanner, HashIndex, ScanError};
pub use file_category::{Category, Resolution, TypeClassifier};
pub use file_organizer::{
    OrganizeError, OrganizeOptions, OrganizeSummary, OrganizerEngine, Placement,
};
pub use hasher::{ContentDigest, hash_file};
pub use reporting::{Hooks, Logger, ProgressReporter};
pub use undo::{ActionLog, ActionRecord, UndoError, UndoOutcome};

pub use cli::{Command, run_cli};
