//! Types for the organize module.

use crate::core::metadata::PhotoMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// How a planned file reaches its destination
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Copy files to destination (keep originals)
    #[default]
    Copy,
    /// Move files to destination
    Move,
    /// Leave originals in place and link to them from the destination
    Symlink,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Copy => "Copy",
            OperationType::Move => "Move",
            OperationType::Symlink => "Symlink",
        };
        f.pad(name)
    }
}

/// What to do with files sharing a content hash
///
/// Only `Skip` changes the photo list; the other two are accepted and
/// leave it untouched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHandling {
    /// Keep the first file of each duplicate group
    #[default]
    Skip,
    Rename,
    Overwrite,
}

/// One planned filesystem mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoOperation {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub operation: OperationType,
    /// Record the operation was planned from, for display
    #[serde(skip)]
    pub metadata: Option<Arc<PhotoMetadata>>,
}

impl PhotoOperation {
    pub fn new(
        source_path: impl Into<PathBuf>,
        destination_path: impl Into<PathBuf>,
        operation: OperationType,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            destination_path: destination_path.into(),
            operation,
            metadata: None,
        }
    }

    /// Attach the originating record
    pub fn with_metadata(mut self, metadata: Arc<PhotoMetadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Result of executing a batch of operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub operations_completed: usize,
    pub folders_created: usize,
    pub total_size_bytes: u64,
    pub duration_ms: u64,
    /// Operations whose destination already was the source file
    #[serde(default)]
    pub already_in_place: usize,
}
