//! # Scanner Module
//!
//! Discovers photo files in a directory tree and extracts their metadata.
//!
//! ## How It Works
//! 1. Walk the tree and keep files whose name ends with a wanted extension
//! 2. Fan extraction out over a bounded rayon pool
//! 3. Collect results into a slot per file, so output order equals
//!    enumeration order no matter which worker finishes first
//!
//! ## Example
//! ```rust,ignore
//! use photo_manager::core::scanner::{ParallelScanner, PhotoScanner, ScanConfig};
//!
//! let scanner = ParallelScanner::new(fs, extractor, ScanConfig::default());
//! let photos = scanner.scan(root, &extensions, &events, &cancel)?;
//! ```

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::{ParallelScanner, ScanConfig};
pub(crate) use walker::default_parallelism;

use crate::core::cancel::CancellationToken;
use crate::core::metadata::PhotoMetadata;
use crate::error::ScanError;
use crate::events::EventSender;
use std::path::Path;

/// Trait for photo scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait PhotoScanner: Send + Sync {
    /// Scan `root` recursively and return metadata for every readable file
    /// matching `extensions`, in enumeration order
    fn scan(
        &self,
        root: &Path,
        extensions: &[String],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Vec<PhotoMetadata>, ScanError>;
}
