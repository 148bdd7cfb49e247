//! File categorization by extension.
//!
//! This module maps file extensions to category names (e.g., "Images",
//! "Videos"). Lookups go through two tiers: a user-supplied override table
//! first, then the built-in default table. Extensions found in neither are
//! reported as unmatched so callers can skip the file.
//!
//! # Examples
//!
//! ```
//! use reshelf::file_category::{Category, TypeClassifier};
//! use std::path::Path;
//!
//! let classifier = TypeClassifier::default();
//! assert_eq!(classifier.classify(Path::new("photo.JPG")), Some(Category::new("Images")));
//! assert_eq!(classifier.classify(Path::new("notes.txt")), None);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Built-in extension to category table.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("jpg", Category::IMAGES),
    ("jpeg", Category::IMAGES),
    ("png", Category::IMAGES),
    ("gif", Category::IMAGES),
    ("mp4", Category::VIDEOS),
    ("mkv", Category::VIDEOS),
    ("ts", Category::VIDEOS),
    ("pdf", Category::DOCUMENTS),
    ("doc", Category::DOCUMENTS),
    ("docx", Category::DOCUMENTS),
];

/// A category label. Its name doubles as the destination folder name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    pub const IMAGES: &'static str = "Images";
    pub const VIDEOS: &'static str = "Videos";
    pub const DOCUMENTS: &'static str = "Documents";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the folder name used for this category.
    pub fn dir_name(&self) -> &str {
        &self.0
    }

    /// Videos get the series-folder treatment instead of a plain move.
    pub fn is_videos(&self) -> bool {
        self.0 == Self::VIDEOS
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a two-tier extension lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Found in the override table.
    Override(Category),
    /// Found in the built-in table.
    Default(Category),
    /// No table knows this extension.
    Unmatched,
}

impl Resolution {
    pub fn into_category(self) -> Option<Category> {
        match self {
            Resolution::Override(category) | Resolution::Default(category) => Some(category),
            Resolution::Unmatched => None,
        }
    }
}

/// Maps file extensions to categories.
///
/// Keys are stored lowercase and without a leading dot, so `".JPG"`, `"JPG"`
/// and `"jpg"` all address the same entry.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    overrides: HashMap<String, Category>,
    defaults: HashMap<String, Category>,
}

impl TypeClassifier {
    /// Creates a classifier with the built-in table and no overrides.
    pub fn new() -> Self {
        let defaults = DEFAULT_CATEGORIES
            .iter()
            .map(|(ext, name)| (ext.to_string(), Category::new(*name)))
            .collect();

        Self {
            overrides: HashMap::new(),
            defaults,
        }
    }

    /// Creates a classifier whose override table is `overrides`.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut classifier = Self::new();
        for (ext, category) in overrides {
            classifier.add_override(ext.as_ref(), Category::new(category));
        }
        classifier
    }

    /// Adds or replaces an override entry.
    pub fn add_override(&mut self, ext: &str, category: Category) {
        self.overrides.insert(normalize_extension(ext), category);
    }

    /// Number of override entries.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Looks an extension up in the override table, then the built-in table.
    ///
    /// # Examples
    ///
    /// ```
    /// use reshelf::file_category::{Category, Resolution, TypeClassifier};
    ///
    /// let classifier = TypeClassifier::with_overrides([("ts", "Code")]);
    /// assert_eq!(classifier.resolve("TS"), Resolution::Override(Category::new("Code")));
    /// assert_eq!(classifier.resolve("pdf"), Resolution::Default(Category::new("Documents")));
    /// assert_eq!(classifier.resolve("xyz"), Resolution::Unmatched);
    /// ```
    pub fn resolve(&self, ext: &str) -> Resolution {
        let key = normalize_extension(ext);

        if let Some(category) = self.overrides.get(&key) {
            return Resolution::Override(category.clone());
        }

        if let Some(category) = self.defaults.get(&key) {
            return Resolution::Default(category.clone());
        }

        Resolution::Unmatched
    }

    /// Returns the category for a path, or `None` when the file should be skipped.
    pub fn classify(&self, path: &Path) -> Option<Category> {
        let ext = path.extension()?.to_str()?;
        self.resolve(ext).into_category()
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
