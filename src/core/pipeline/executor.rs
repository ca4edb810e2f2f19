//! Pipeline execution implementation.

use crate::core::cancel::CancellationToken;
use crate::core::config::PhotoManagerConfig;
use crate::core::fs::{FileSystem, LocalFileSystem};
use crate::core::metadata::{ExifMetadataExtractor, MetadataExtractor, PhotoMetadata};
use crate::core::organize::{
    apply_duplicate_policy, ExecutionReport, FileOrganizer, PhotoOperation, PhotoOrganizer,
};
use crate::core::scanner::{ParallelScanner, PhotoScanner, ScanConfig};
use crate::error::PhotoManagerError;
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Photos that were planned (after the duplicate policy)
    pub photos: Vec<PhotoMetadata>,
    /// Number of hashes shared by two or more scanned photos
    pub duplicate_groups: usize,
    /// Photos dropped by the duplicate policy
    pub duplicates_skipped: usize,
    /// Planned operations, in photo order
    pub operations: Vec<PhotoOperation>,
    /// Execution report; `None` on a dry run
    pub report: Option<ExecutionReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_photos: self.photos.len() + self.duplicates_skipped,
            duplicates_skipped: self.duplicates_skipped,
            operations_planned: self.operations.len(),
            operations_completed: self
                .report
                .as_ref()
                .map(|r| r.operations_completed)
                .unwrap_or(0),
            duration_ms: self.duration_ms,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PhotoManagerConfig,
    fs: Option<Arc<dyn FileSystem>>,
    extractor: Option<Arc<dyn MetadataExtractor>>,
    deduplicate: bool,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PhotoManagerConfig::default(),
            fs: None,
            extractor: None,
            deduplicate: false,
        }
    }

    /// Set the run configuration
    pub fn config(mut self, config: PhotoManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a different filesystem backend
    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Use a different metadata extractor
    pub fn extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Apply the configured duplicate policy before planning
    pub fn deduplicate(mut self, enabled: bool) -> Self {
        self.deduplicate = enabled;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        let fs = self
            .fs
            .unwrap_or_else(|| Arc::new(LocalFileSystem::new()));
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(ExifMetadataExtractor::new(Arc::clone(&fs))));

        let scanner = ParallelScanner::new(
            Arc::clone(&fs),
            extractor,
            ScanConfig {
                parallelism: self.config.effective_parallelism(),
            },
        );

        Pipeline {
            config: self.config,
            scanner: Box::new(scanner),
            organizer: Box::new(FileOrganizer::new(fs)),
            deduplicate: self.deduplicate,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan, deduplicate, plan and execute in one place
pub struct Pipeline {
    config: PhotoManagerConfig,
    scanner: Box<dyn PhotoScanner>,
    organizer: Box<dyn PhotoOrganizer>,
    deduplicate: bool,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PhotoManagerConfig {
        &self.config
    }

    /// Scan the configured source folder
    pub fn scan(
        &self,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Vec<PhotoMetadata>, PhotoManagerError> {
        let photos = self.scanner.scan(
            self.config.source_folder(),
            self.config.file_extensions(),
            events,
            cancel,
        )?;
        Ok(photos)
    }

    /// Hashes shared by two or more photos
    pub fn detect_duplicates(&self, photos: &[PhotoMetadata]) -> HashMap<String, Vec<PhotoMetadata>> {
        self.organizer.detect_duplicates(photos)
    }

    /// Apply the duplicate policy when deduplication is enabled
    pub fn prepare(&self, photos: Vec<PhotoMetadata>) -> Vec<PhotoMetadata> {
        if self.deduplicate {
            apply_duplicate_policy(photos, self.config.duplicate_handling())
        } else {
            photos
        }
    }

    /// Plan operations into the configured destination folder
    pub fn plan(&self, photos: &[PhotoMetadata]) -> Result<Vec<PhotoOperation>, PhotoManagerError> {
        if self.config.destination_folder().as_os_str().is_empty() {
            return Err(PhotoManagerError::Config(
                "a destination folder is required to plan operations".to_string(),
            ));
        }
        Ok(self.organizer.plan_organization(photos, &self.config))
    }

    /// Execute planned operations
    pub fn execute(
        &self,
        operations: &[PhotoOperation],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, PhotoManagerError> {
        let report = self.organizer.execute_operations(operations, events, cancel)?;
        Ok(report)
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, PhotoManagerError> {
        self.run_with_events(&null_sender(), &CancellationToken::new())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PhotoManagerError> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        match self.run_stages(events, cancel) {
            Ok(result) => {
                events.send(Event::Pipeline(PipelineEvent::Completed {
                    summary: result.summary(),
                }));
                Ok(result)
            }
            Err(e) if e.is_cancelled() => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "Pipeline failed");
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    fn run_stages(
        &self,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PhotoManagerError> {
        let start_time = Instant::now();
        let phase = |phase: PipelinePhase| events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));

        // Phase 1: Scanning
        phase(PipelinePhase::Scanning);
        let scanned = self.scan(events, cancel)?;
        let scanned_count = scanned.len();

        // Phase 2: Deduplicating
        phase(PipelinePhase::Deduplicating);
        let duplicate_groups = self.detect_duplicates(&scanned).len();
        let photos = self.prepare(scanned);
        let duplicates_skipped = scanned_count - photos.len();

        // Phase 3: Planning
        phase(PipelinePhase::Planning);
        let operations = self.plan(&photos)?;

        // Phase 4: Executing
        let report = if self.config.dry_run() {
            tracing::info!(operations = operations.len(), "Dry run, nothing executed");
            None
        } else {
            phase(PipelinePhase::Executing);
            Some(self.execute(&operations, events, cancel)?)
        };

        Ok(PipelineResult {
            photos,
            duplicate_groups,
            duplicates_skipped,
            operations,
            report,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
