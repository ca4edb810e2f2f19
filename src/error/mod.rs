//! # Error Module
//!
//! Error types for the photo manager.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, operation, what went wrong
//! - **Per-file problems are soft** - they are logged and absorbed by the
//!   stage that hit them, only batch-level failures surface here
//! - **Cancellation is not a failure** - it has its own variants

use crate::core::organize::OperationType;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PhotoManagerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Organization error: {0}")]
    Organize(#[from] OrganizeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PhotoManagerError {
    /// True when the run stopped because the caller asked it to
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            PhotoManagerError::Scan(ScanError::Cancelled)
                | PhotoManagerError::Organize(OrganizeError::Cancelled { .. })
        )
    }
}

/// Errors that occur during photo scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to start worker pool: {reason}")]
    WorkerPool { reason: String },

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors raised while reading embedded metadata or hashing a single file.
///
/// These never escape the extractor: they are logged and the file is
/// degraded or dropped.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable EXIF data: {0}")]
    Exif(#[from] exif::Error),
}

/// Errors that occur while executing planned operations
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} failed for {source_path} -> {destination}: {source}")]
    OperationFailed {
        operation: OperationType,
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operations were cancelled after {completed} of {total}")]
    Cancelled { completed: usize, total: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PhotoManagerError>;
