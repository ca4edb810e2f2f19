//! # Metadata Module
//!
//! Per-file metadata records and the extractor that builds them.
//!
//! ## Extracted Fields
//! - Content hash (SHA-256 of the whole file)
//! - Date taken (DateTimeOriginal)
//! - GPS location in signed decimal degrees
//! - Camera make and model
//! - Pixel dimensions
//!
//! ## Failure Model
//! Extraction never fails a scan. A file whose EXIF block cannot be parsed
//! still yields a record with path, hash, size and name; a file that cannot
//! be read at all yields nothing.

mod exif_parser;
mod extractor;

pub use exif_parser::{EmbeddedMetadata, ExifParser, KamadakExifParser};
pub use extractor::{ExifMetadataExtractor, MetadataExtractor};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A GPS fix in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a fix from raw components, rejecting non-finite values and the
    /// `(0, 0)` "no fix" marker
    pub fn from_fix(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude == 0.0 && longitude == 0.0 {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }
}

/// Everything known about one scanned photo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// Where the file was found
    pub source_path: PathBuf,
    /// Uppercase hex SHA-256 of the file contents
    pub hash: String,
    /// Original capture date/time (camera local time)
    pub date_taken: Option<NaiveDateTime>,
    /// GPS fix, if the photo has one
    pub location: Option<GpsCoordinates>,
    /// Camera make (e.g., "Apple", "Canon")
    pub camera_make: Option<String>,
    /// Camera model (e.g., "iPhone 15 Pro")
    pub camera_model: Option<String>,
    /// Image width in pixels, 0 when unknown
    pub width: u32,
    /// Image height in pixels, 0 when unknown
    pub height: u32,
    /// File size in bytes
    pub file_size: u64,
    /// Base file name
    pub file_name: String,
}

impl PhotoMetadata {
    /// Get a display string for the camera
    pub fn camera_display(&self) -> Option<String> {
        match (&self.camera_make, &self.camera_model) {
            (Some(make), Some(model)) => {
                // Avoid duplication like "Apple Apple iPhone"
                if model.starts_with(make.as_str()) {
                    Some(model.clone())
                } else {
                    Some(format!("{} {}", make, model))
                }
            }
            (None, Some(model)) => Some(model.clone()),
            (Some(make), None) => Some(make.clone()),
            (None, None) => None,
        }
    }

    /// Get dimensions as a formatted string
    pub fn dimensions_display(&self) -> Option<String> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(format!("{}x{}", self.width, self.height))
    }

    /// Calculate megapixels
    pub fn megapixels(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some((self.width as f64 * self.height as f64) / 1_000_000.0)
    }

    /// True when the camera make is present and non-empty
    pub fn has_camera(&self) -> bool {
        self.camera_make
            .as_deref()
            .map(|m| !m.is_empty())
            .unwrap_or(false)
    }
}

/// Aggregate counts over a scan result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_photos: usize,
    pub total_size_bytes: u64,
    pub with_date: usize,
    pub with_location: usize,
    pub with_camera: usize,
}

impl ScanSummary {
    pub fn from_photos(photos: &[PhotoMetadata]) -> Self {
        Self {
            total_photos: photos.len(),
            total_size_bytes: photos.iter().map(|p| p.file_size).sum(),
            with_date: photos.iter().filter(|p| p.date_taken.is_some()).count(),
            with_location: photos.iter().filter(|p| p.location.is_some()).count(),
            with_camera: photos.iter().filter(|p| p.has_camera()).count(),
        }
    }
}
