//! File filtering logic for the scanner.

use std::path::Path;

/// Selects files whose name ends with one of a set of suffixes,
/// ignoring case
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// Lowercased suffixes, e.g. ".jpg"
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Create a filter; blank entries are ignored
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Check if a file should be included
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
