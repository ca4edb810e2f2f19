//! Content-hash duplicate grouping.

use super::DuplicateHandling;
use crate::core::metadata::PhotoMetadata;
use std::collections::{HashMap, HashSet};

/// Group photos by hash, keeping only hashes shared by two or more photos.
///
/// Members of each group keep their input order.
pub fn detect_duplicates(photos: &[PhotoMetadata]) -> HashMap<String, Vec<PhotoMetadata>> {
    let mut groups: HashMap<String, Vec<PhotoMetadata>> = HashMap::new();
    for photo in photos {
        groups
            .entry(photo.hash.clone())
            .or_default()
            .push(photo.clone());
    }
    groups.retain(|_, members| members.len() >= 2);
    groups
}

/// Drop every photo whose hash was already seen earlier in the list
pub fn skip_duplicates(photos: Vec<PhotoMetadata>) -> Vec<PhotoMetadata> {
    let mut seen = HashSet::new();
    let before = photos.len();
    let kept: Vec<PhotoMetadata> = photos
        .into_iter()
        .filter(|photo| seen.insert(photo.hash.clone()))
        .collect();

    tracing::debug!(skipped = before - kept.len(), "Skipped duplicate photos");
    kept
}

/// Apply a duplicate policy to a scanned list
pub fn apply_duplicate_policy(
    photos: Vec<PhotoMetadata>,
    policy: DuplicateHandling,
) -> Vec<PhotoMetadata> {
    match policy {
        DuplicateHandling::Skip => skip_duplicates(photos),
        DuplicateHandling::Rename | DuplicateHandling::Overwrite => {
            tracing::debug!(?policy, "Duplicate policy leaves photo list unchanged");
            photos
        }
    }
}
