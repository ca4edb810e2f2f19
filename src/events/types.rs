//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the photo manager pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Operation execution events
    Organize(OrganizeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration finished and extraction is about to start
    Started { root: PathBuf, total_files: usize },
    /// One file finished extraction (kept or dropped)
    Progress(ScanProgress),
    /// A file could not be read and was dropped; scanning continues
    Skipped { path: PathBuf },
    /// Scanning completed
    Completed { total_photos: usize },
}

/// Progress information during scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of files processed so far
    pub processed: usize,
    /// Total number of matching files
    pub total: usize,
    /// File that just finished
    pub current_path: PathBuf,
}

/// Events while executing planned operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// Execution has started
    Started { total_operations: usize },
    /// An operation completed
    Progress(OperationProgress),
    /// All operations completed
    Completed { operations_completed: usize },
}

/// Progress information during execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationProgress {
    /// Number of operations completed so far
    pub completed: usize,
    /// Total number of operations in the batch
    pub total: usize,
    /// Source path of the operation that just completed
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Deduplicating,
    Planning,
    Executing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Photos returned by the scanner
    pub total_photos: usize,
    /// Photos dropped by the duplicate policy
    pub duplicates_skipped: usize,
    /// Operations planned
    pub operations_planned: usize,
    /// Operations actually performed (0 on a dry run)
    pub operations_completed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Deduplicating => write!(f, "Deduplicating"),
            PipelinePhase::Planning => write!(f, "Planning"),
            PipelinePhase::Executing => write!(f, "Executing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Scan(ScanEvent::Progress(ScanProgress {
            processed: 10,
            total: 50,
            current_path: PathBuf::from("/photos/a.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Scan(ScanEvent::Progress(p)) => {
                assert_eq!(p.processed, 10);
                assert_eq!(p.total, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn phase_display_names() {
        assert_eq!(PipelinePhase::Executing.to_string(), "Executing");
        assert_eq!(PipelinePhase::Deduplicating.to_string(), "Deduplicating");
    }
}
