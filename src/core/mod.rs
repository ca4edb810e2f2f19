//! # Core Module
//!
//! The UI-agnostic photo organizing engine.
//!
//! ## Modules
//! - `fs` - Filesystem abstraction (real disk and in-memory)
//! - `hasher` - SHA-256 content fingerprints
//! - `metadata` - Extracts EXIF metadata from photos
//! - `scanner` - Discovers photos and extracts metadata in parallel
//! - `organize` - Duplicate grouping, path planning and execution
//! - `config` - Run configuration
//! - `pipeline` - Orchestrates the full workflow

pub mod cancel;
pub mod config;
pub mod fs;
pub mod hasher;
pub mod metadata;
pub mod organize;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use config::{PhotoManagerConfig, PhotoManagerConfigBuilder};
pub use metadata::{GpsCoordinates, PhotoMetadata, ScanSummary};
pub use organize::{DuplicateHandling, ExecutionReport, OperationType, PhotoOperation};
