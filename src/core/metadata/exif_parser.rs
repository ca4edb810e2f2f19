//! EXIF parsing behind a swappable capability.

use super::GpsCoordinates;
use crate::core::fs::ReadSeek;
use crate::error::MetadataError;
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::io::BufReader;

/// Fields read from a photo's embedded metadata blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedMetadata {
    pub date_taken: Option<NaiveDateTime>,
    pub location: Option<GpsCoordinates>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Trait for embedded metadata parsers
///
/// Any error means "no embedded metadata available"; callers never look
/// inside it beyond logging.
pub trait ExifParser: Send + Sync {
    fn parse(&self, reader: &mut dyn ReadSeek) -> Result<EmbeddedMetadata, MetadataError>;
}

/// Parser backed by the kamadak-exif crate
///
/// Reads JPEG, TIFF, HEIF, PNG and WebP containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct KamadakExifParser;

impl ExifParser for KamadakExifParser {
    fn parse(&self, reader: &mut dyn ReadSeek) -> Result<EmbeddedMetadata, MetadataError> {
        let mut bufreader = BufReader::new(reader);
        let exif = Reader::new().read_from_container(&mut bufreader)?;
        Ok(read_fields(&exif))
    }
}

fn read_fields(exif: &Exif) -> EmbeddedMetadata {
    let mut metadata = EmbeddedMetadata::default();

    if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        metadata.date_taken = get_string_value(&field.value)
            .and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y:%m:%d %H:%M:%S").ok());
    }

    if let Some(field) = exif.get_field(Tag::PixelXDimension, In::PRIMARY) {
        metadata.width = get_u32_value(&field.value).unwrap_or(0);
    }
    if let Some(field) = exif.get_field(Tag::PixelYDimension, In::PRIMARY) {
        metadata.height = get_u32_value(&field.value).unwrap_or(0);
    }

    if let Some(field) = exif.get_field(Tag::Make, In::PRIMARY) {
        metadata.camera_make = get_string_value(&field.value);
    }
    if let Some(field) = exif.get_field(Tag::Model, In::PRIMARY) {
        metadata.camera_model = get_string_value(&field.value);
    }

    let latitude = gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let longitude = gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);
    if let (Some(lat), Some(lon)) = (latitude, longitude) {
        metadata.location = GpsCoordinates::from_fix(lat, lon);
    }

    metadata
}

/// Degrees/minutes/seconds plus hemisphere reference to signed degrees
fn gps_coordinate(exif: &Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let coord_field = exif.get_field(coord_tag, In::PRIMARY)?;

    let degrees = match &coord_field.value {
        Value::Rational(v) if !v.is_empty() => v
            .iter()
            .take(3)
            .zip([1.0, 60.0, 3600.0])
            .map(|(r, scale)| r.to_f64() / scale)
            .sum::<f64>(),
        _ => return None,
    };

    // South and West are negative
    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| get_string_value(&f.value))
        .map(|r| r.starts_with('S') || r.starts_with('W'))
        .unwrap_or(false);

    Some(if negative { -degrees } else { degrees })
}

/// Helper to extract u32 from various EXIF value types
fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
