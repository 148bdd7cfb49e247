//! Configuration loading.
//!
//! Two formats are understood:
//!
//! A TOML file with category overrides, exclusion filters and video options:
//!
//! ```toml
//! [categories]
//! heic = "Images"
//! mp3 = "Music"
//!
//! [filters]
//! include_hidden = false
//! exclude_patterns = ["*.part", "**/node_modules/**"]
//! exclude_extensions = ["tmp"]
//!
//! [videos]
//! season_strategy = "pattern"
//! ```
//!
//! A flat JSON object mapping extensions to categories, e.g.
//! `{".jpg": "Images", ".srt": "Videos"}`. Keys may carry a leading dot and
//! entries whose value is not a string are ignored.

use crate::file_category::TypeClassifier;
use crate::series::SeasonStrategyKind;
use glob::Pattern;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML or JSON content.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Everything read from a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReshelfConfig {
    /// Extension to category overrides.
    #[serde(default)]
    pub categories: BTreeMap<String, String>,

    #[serde(default)]
    pub filters: FilterRules,

    #[serde(default)]
    pub videos: VideoRules,
}

/// Which files an organize pass looks at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files whose name starts with "." are organized.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,

    /// Glob patterns, matched against the path relative to the organized directory.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Extensions never organized, case-insensitive.
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
}

fn default_include_hidden() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include_hidden: default_include_hidden(),
            exclude_patterns: Vec::new(),
            exclude_extensions: Vec::new(),
        }
    }
}

/// Options for the video series heuristic.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VideoRules {
    #[serde(default)]
    pub season_strategy: SeasonStrategyKind,
}

impl ReshelfConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Looks in this order:
    /// 1. `config_path`, when given
    /// 2. `.reshelf.toml` in the current directory
    /// 3. `config.json` in the current directory
    /// 4. `~/.config/reshelf/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any discovered file is malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let mut candidates = vec![PathBuf::from(".reshelf.toml"), PathBuf::from("config.json")];
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("reshelf")
                    .join("config.toml"),
            );
        }

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_file(&candidate);
            }
        }

        debug!("No configuration file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file. `.json` files are read as a
    /// flat extension mapping, anything else as TOML.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        debug!("Loading configuration from {}", path.display());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content).map_err(|reason| ConfigError::ConfigInvalid {
                path: path.to_path_buf(),
                reason,
            })
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }

    /// Parses a flat JSON extension mapping.
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| e.to_string())?;

        let categories = map
            .into_iter()
            .filter_map(|(ext, value)| match value {
                serde_json::Value::String(category) => {
                    Some((ext.trim_start_matches('.').to_lowercase(), category))
                }
                _ => None,
            })
            .collect();

        Ok(Self {
            categories,
            ..Self::default()
        })
    }

    /// Builds a classifier with this configuration's overrides.
    pub fn classifier(&self) -> TypeClassifier {
        TypeClassifier::with_overrides(&self.categories)
    }

    /// Compile the filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Filter rules with patterns parsed once up front.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_patterns: Vec<Pattern>,
    exclude_extensions: HashSet<String>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            exclude_patterns,
            exclude_extensions: rules
                .exclude_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        })
    }

    /// Filters that let every file through.
    pub fn allow_all() -> Self {
        Self {
            include_hidden: true,
            exclude_patterns: Vec::new(),
            exclude_extensions: HashSet::new(),
        }
    }

    /// Whether a file (path relative to the organized directory) is organized.
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        if let Some(ext) = relative_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::allow_all()
    }
}
