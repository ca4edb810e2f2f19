//! Run configuration.
//!
//! A `PhotoManagerConfig` is built once through `PhotoManagerConfigBuilder`
//! and only read afterwards.

use crate::core::organize::{DuplicateHandling, OperationType};
use crate::core::scanner::default_parallelism;
use crate::error::PhotoManagerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pattern used when none is given
pub const DEFAULT_PATTERN: &str = "{Year}/{Month}";

/// File name suffixes scanned when none are given
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".heic", ".raw", ".cr2", ".nef"];

/// Immutable configuration snapshot for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoManagerConfig {
    source_folder: PathBuf,
    destination_folder: PathBuf,
    organization_pattern: String,
    operation_type: OperationType,
    duplicate_handling: DuplicateHandling,
    file_extensions: Vec<String>,
    parallel_processing: bool,
    max_parallelism: usize,
    dry_run: bool,
}

impl PhotoManagerConfig {
    pub fn builder() -> PhotoManagerConfigBuilder {
        PhotoManagerConfigBuilder::new()
    }

    pub fn source_folder(&self) -> &Path {
        &self.source_folder
    }

    pub fn destination_folder(&self) -> &Path {
        &self.destination_folder
    }

    pub fn organization_pattern(&self) -> &str {
        &self.organization_pattern
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn duplicate_handling(&self) -> DuplicateHandling {
        self.duplicate_handling
    }

    pub fn file_extensions(&self) -> &[String] {
        &self.file_extensions
    }

    pub fn parallel_processing(&self) -> bool {
        self.parallel_processing
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Worker count the scanner should use
    pub fn effective_parallelism(&self) -> usize {
        if self.parallel_processing {
            self.max_parallelism.max(1)
        } else {
            1
        }
    }

    fn validate(&self) -> Result<(), PhotoManagerError> {
        if self.organization_pattern.trim().is_empty() {
            return Err(PhotoManagerError::Config(
                "organization pattern must not be empty".to_string(),
            ));
        }
        if self.file_extensions.is_empty() {
            return Err(PhotoManagerError::Config(
                "at least one file extension is required".to_string(),
            ));
        }
        if self.max_parallelism == 0 {
            return Err(PhotoManagerError::Config(
                "max parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PhotoManagerConfig {
    fn default() -> Self {
        Self {
            source_folder: PathBuf::new(),
            destination_folder: PathBuf::new(),
            organization_pattern: DEFAULT_PATTERN.to_string(),
            operation_type: OperationType::default(),
            duplicate_handling: DuplicateHandling::default(),
            file_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            parallel_processing: true,
            max_parallelism: default_parallelism(),
            dry_run: false,
        }
    }
}

/// Builder for `PhotoManagerConfig`
#[derive(Debug, Clone, Default)]
pub struct PhotoManagerConfigBuilder {
    config: PhotoManagerConfig,
}

impl PhotoManagerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder to scan
    pub fn source_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_folder = path.into();
        self
    }

    /// Root that planned destinations are placed under
    pub fn destination_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.destination_folder = path.into();
        self
    }

    /// Token pattern, e.g. `{Year}/{MonthName}/{Camera}`
    pub fn organization_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.organization_pattern = pattern.into();
        self
    }

    pub fn operation_type(mut self, operation: OperationType) -> Self {
        self.config.operation_type = operation;
        self
    }

    pub fn duplicate_handling(mut self, policy: DuplicateHandling) -> Self {
        self.config.duplicate_handling = policy;
        self
    }

    /// File name suffixes to scan; blank entries are dropped
    pub fn file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.file_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn parallel_processing(mut self, enabled: bool) -> Self {
        self.config.parallel_processing = enabled;
        self
    }

    pub fn max_parallelism(mut self, workers: usize) -> Self {
        self.config.max_parallelism = workers;
        self
    }

    /// Plan without touching the destination
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<PhotoManagerConfig, PhotoManagerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Split a comma separated extension list, e.g. `".jpg, .png"`
pub fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PhotoManagerConfig::builder().build().unwrap();

        assert_eq!(config.organization_pattern(), "{Year}/{Month}");
        assert_eq!(config.operation_type(), OperationType::Copy);
        assert_eq!(config.duplicate_handling(), DuplicateHandling::Skip);
        assert_eq!(config.file_extensions().len(), 7);
        assert!(config.parallel_processing());
        assert!(config.max_parallelism() >= 1);
        assert!(!config.dry_run());
    }

    #[test]
    fn extensions_are_trimmed_and_blanks_dropped() {
        let config = PhotoManagerConfig::builder()
            .file_extensions([" .jpg ", "", ".png"])
            .build()
            .unwrap();

        assert_eq!(config.file_extensions(), &[".jpg".to_string(), ".png".to_string()]);
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let result = PhotoManagerConfig::builder()
            .file_extensions(Vec::<String>::new())
            .build();

        assert!(matches!(result, Err(PhotoManagerError::Config(_))));
    }

    #[test]
    fn blank_pattern_is_rejected() {
        let result = PhotoManagerConfig::builder().organization_pattern("  ").build();
        assert!(matches!(result, Err(PhotoManagerError::Config(_))));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = PhotoManagerConfig::builder().max_parallelism(0).build();
        assert!(matches!(result, Err(PhotoManagerError::Config(_))));
    }

    #[test]
    fn sequential_mode_uses_one_worker() {
        let config = PhotoManagerConfig::builder()
            .max_parallelism(8)
            .parallel_processing(false)
            .build()
            .unwrap();

        assert_eq!(config.effective_parallelism(), 1);
    }

    #[test]
    fn parses_comma_separated_extensions() {
        assert_eq!(
            parse_extension_list(".jpg, .PNG,,.heic "),
            vec![".jpg", ".PNG", ".heic"]
        );
    }

    #[test]
    fn round_trips_through_json() {
        let config = PhotoManagerConfig::builder()
            .source_folder("/in")
            .destination_folder("/out")
            .operation_type(OperationType::Symlink)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let back: PhotoManagerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
