//! Builds `PhotoMetadata` records from files.

use super::{EmbeddedMetadata, ExifParser, KamadakExifParser, PhotoMetadata};
use crate::core::fs::FileSystem;
use crate::core::hasher::ContentHasher;
use crate::error::MetadataError;
use std::path::Path;
use std::sync::Arc;

/// Trait for metadata extractors
///
/// Implementations are called concurrently from the scanner's worker pool
/// on distinct paths. `None` means "skip this file".
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<PhotoMetadata>;
}

/// Extractor that hashes the file and reads its EXIF block
pub struct ExifMetadataExtractor {
    fs: Arc<dyn FileSystem>,
    parser: Box<dyn ExifParser>,
    hasher: ContentHasher,
}

impl ExifMetadataExtractor {
    /// Create an extractor using the kamadak-exif parser
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            parser: Box::new(KamadakExifParser),
            hasher: ContentHasher::new(),
        }
    }

    /// Replace the embedded metadata parser
    pub fn with_parser(mut self, parser: impl ExifParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    fn try_extract(&self, path: &Path) -> Result<Option<PhotoMetadata>, MetadataError> {
        if !self.fs.is_file(path) {
            return Ok(None);
        }

        let io_error = |source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file_size = self.fs.file_len(path).map_err(io_error)?;

        let hash = {
            let mut reader = self.fs.open_read(path).map_err(io_error)?;
            self.hasher.hash_reader(&mut reader).map_err(io_error)?
        };

        let embedded = {
            let mut reader = self.fs.open_read(path).map_err(io_error)?;
            match self.parser.parse(reader.as_mut()) {
                Ok(embedded) => embedded,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "No embedded metadata, keeping basic info");
                    EmbeddedMetadata::default()
                }
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(PhotoMetadata {
            source_path: path.to_path_buf(),
            hash,
            date_taken: embedded.date_taken,
            location: embedded.location,
            camera_make: embedded.camera_make,
            camera_model: embedded.camera_model,
            width: embedded.width,
            height: embedded.height,
            file_size,
            file_name,
        }))
    }
}

impl MetadataExtractor for ExifMetadataExtractor {
    fn extract(&self, path: &Path) -> Option<PhotoMetadata> {
        match self.try_extract(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error extracting metadata");
                None
            }
        }
    }
}
