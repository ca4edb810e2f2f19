//! Destination path planning from token patterns.
//!
//! ## Tokens
//! Matched case-insensitively; every occurrence is replaced.
//! - `{Year}` - four digit year
//! - `{Month}` - two digit month
//! - `{MonthName}` - full English month name
//! - `{Day}` - two digit day
//! - `{Location}` - `lat_lon` with two decimals, or `Unknown`
//! - `{Camera}` - camera make, or `Unknown`
//!
//! Anything else in braces is left as written.

use super::{OperationType, PhotoOperation};
use crate::core::fs::FileSystem;
use crate::core::metadata::PhotoMetadata;
use chrono::{DateTime, Local, NaiveDateTime};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

const UNKNOWN: &str = "Unknown";

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"(?i)\{(monthname|year|month|day|location|camera)\}")
            .expect("token pattern is valid")
    })
}

/// Render a pattern for one photo taken at `date`
pub fn render_pattern(pattern: &str, date: NaiveDateTime, photo: &PhotoMetadata) -> String {
    token_regex()
        .replace_all(pattern, |caps: &Captures| {
            match caps[1].to_ascii_lowercase().as_str() {
                "year" => date.format("%Y").to_string(),
                "month" => date.format("%m").to_string(),
                "monthname" => date.format("%B").to_string(),
                "day" => date.format("%d").to_string(),
                "location" => match photo.location {
                    Some(gps) => format!("{:.2}_{:.2}", gps.latitude, gps.longitude),
                    None => UNKNOWN.to_string(),
                },
                "camera" => match photo.camera_make.as_deref() {
                    Some(make) if !make.trim().is_empty() => make.to_string(),
                    _ => UNKNOWN.to_string(),
                },
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Plans one operation per photo
pub struct PathPlanner {
    fs: Arc<dyn FileSystem>,
}

impl PathPlanner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Build operations in input order; never fails
    pub fn plan(
        &self,
        photos: &[PhotoMetadata],
        destination: &Path,
        pattern: &str,
        operation: OperationType,
    ) -> Vec<PhotoOperation> {
        let operations: Vec<PhotoOperation> = photos
            .iter()
            .map(|photo| {
                let date = self.effective_date(photo);
                let destination_path = destination_for(destination, pattern, date, photo);
                tracing::debug!(
                    source = %photo.source_path.display(),
                    destination = %destination_path.display(),
                    "Planned"
                );
                PhotoOperation::new(photo.source_path.clone(), destination_path, operation)
                    .with_metadata(Arc::new(photo.clone()))
            })
            .collect();

        tracing::info!(operations = operations.len(), pattern, "Planning complete");
        operations
    }

    /// Capture date, else the file's creation time
    pub fn effective_date(&self, photo: &PhotoMetadata) -> NaiveDateTime {
        if let Some(date) = photo.date_taken {
            return date;
        }
        match self.fs.created(&photo.source_path) {
            Ok(time) => DateTime::<Local>::from(time).naive_local(),
            Err(e) => {
                tracing::warn!(
                    path = %photo.source_path.display(),
                    error = %e,
                    "No capture or creation time, using the Unix epoch"
                );
                NaiveDateTime::default()
            }
        }
    }
}

fn destination_for(
    destination: &Path,
    pattern: &str,
    date: NaiveDateTime,
    photo: &PhotoMetadata,
) -> PathBuf {
    let rendered = render_pattern(pattern, date, photo);
    // A leading separator would make the join escape the destination root
    let relative = rendered.trim_start_matches(['/', '\\']);

    let file_name = photo
        .source_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| photo.file_name.clone().into());

    destination.join(relative).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemoryFileSystem;
    use crate::core::metadata::GpsCoordinates;
    use chrono::NaiveDate;
    use std::time::{Duration, SystemTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn photo(path: &str) -> PhotoMetadata {
        let path = PathBuf::from(path);
        PhotoMetadata {
            file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
            source_path: path,
            hash: "ABC".to_string(),
            date_taken: Some(date(2024, 10, 15)),
            ..Default::default()
        }
    }

    fn planner() -> PathPlanner {
        PathPlanner::new(Arc::new(MemoryFileSystem::new()))
    }

    #[test]
    fn renders_date_tokens() {
        let p = photo("/in/a.jpg");
        let rendered = render_pattern("{Year}/{Month}/{Day} {MonthName}", date(2024, 3, 7), &p);
        assert_eq!(rendered, "2024/03/07 March");
    }

    #[test]
    fn tokens_are_case_insensitive_and_repeatable() {
        let p = photo("/in/a.jpg");
        let rendered = render_pattern("{YEAR}-{year}/{monthNAME}", date(2024, 1, 2), &p);
        assert_eq!(rendered, "2024-2024/January");
    }

    #[test]
    fn location_uses_two_decimals() {
        let mut p = photo("/in/a.jpg");
        p.location = Some(GpsCoordinates::new(-33.8321, 151.0));
        assert_eq!(render_pattern("{Location}", date(2024, 1, 1), &p), "-33.83_151.00");
    }

    #[test]
    fn missing_location_and_camera_render_unknown() {
        let mut p = photo("/in/a.jpg");
        assert_eq!(render_pattern("{Location}/{Camera}", date(2024, 1, 1), &p), "Unknown/Unknown");

        p.camera_make = Some("   ".to_string());
        assert_eq!(render_pattern("{Camera}", date(2024, 1, 1), &p), "Unknown");

        p.camera_make = Some("Canon".to_string());
        assert_eq!(render_pattern("{Camera}", date(2024, 1, 1), &p), "Canon");
    }

    #[test]
    fn token_regex_is_compiled_once() {
        let first = token_regex();
        let second = token_regex();
        assert!(std::ptr::eq(first, second));
        assert!(first.is_match("{MONTHNAME}"));
        assert!(!first.is_match("{Album}"));
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let p = photo("/in/a.jpg");
        assert_eq!(render_pattern("{Year}/{Album}", date(2024, 1, 1), &p), "2024/{Album}");
    }

    #[test]
    fn plan_without_gps_lands_in_unknown_folder() {
        let ops = planner().plan(
            &[photo("/in/a.jpg")],
            Path::new("/out"),
            "{Year}/{Month}/{Location}",
            OperationType::Copy,
        );

        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].destination_path, PathBuf::from("/out/2024/10/Unknown/a.jpg"));
        assert_eq!(ops[0].source_path, PathBuf::from("/in/a.jpg"));
        assert!(ops[0].metadata.is_some());
    }

    #[test]
    fn plan_preserves_length_and_order() {
        let photos: Vec<_> = (0..25).map(|i| photo(&format!("/in/{:02}.jpg", i))).collect();

        let ops = planner().plan(&photos, Path::new("/out"), "{Year}", OperationType::Move);

        assert_eq!(ops.len(), photos.len());
        for (op, p) in ops.iter().zip(&photos) {
            assert_eq!(op.source_path, p.source_path);
            assert_eq!(op.operation, OperationType::Move);
        }
    }

    #[test]
    fn plan_is_deterministic() {
        let photos = vec![photo("/in/a.jpg"), photo("/in/b.jpg")];
        let planner = planner();

        let first = planner.plan(&photos, Path::new("/out"), "{Year}/{Camera}", OperationType::Copy);
        let second = planner.plan(&photos, Path::new("/out"), "{Year}/{Camera}", OperationType::Copy);

        let a: Vec<_> = first.iter().map(|o| o.destination_path.clone()).collect();
        let b: Vec<_> = second.iter().map(|o| o.destination_path.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn leading_separator_stays_under_destination() {
        let ops = planner().plan(&[photo("/in/a.jpg")], Path::new("/out"), "/{Year}", OperationType::Copy);
        assert_eq!(ops[0].destination_path, PathBuf::from("/out/2024/a.jpg"));
    }

    #[test]
    fn undated_photo_uses_creation_time() {
        let fs = MemoryFileSystem::new();
        // 2021-06-15 UTC noon; mid-month so any local offset keeps the month
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_623_758_400);
        fs.add_file_created("/in/old.jpg", b"x".to_vec(), created);

        let mut p = photo("/in/old.jpg");
        p.date_taken = None;

        let ops = PathPlanner::new(Arc::new(fs)).plan(
            &[p],
            Path::new("/out"),
            "{Year}/{Month}",
            OperationType::Copy,
        );
        assert_eq!(ops[0].destination_path, PathBuf::from("/out/2021/06/old.jpg"));
    }
}
