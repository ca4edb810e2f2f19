//! # Organize Module
//!
//! Turns scanned photos into destination paths and carries the moves out.
//!
//! ## Stages
//! 1. **Deduplicate** - group by content hash, optionally keep one per group
//! 2. **Plan** - render a destination for every photo from a token pattern
//! 3. **Execute** - copy, move or link each file, one at a time

mod duplicates;
mod executor;
mod planner;
mod types;

pub use duplicates::{apply_duplicate_policy, detect_duplicates, skip_duplicates};
pub use executor::{OperationExecutor, COPY_BUFFER_SIZE};
pub use planner::{render_pattern, PathPlanner};
pub use types::*;

use crate::core::cancel::CancellationToken;
use crate::core::config::PhotoManagerConfig;
use crate::core::fs::FileSystem;
use crate::core::metadata::PhotoMetadata;
use crate::error::OrganizeError;
use crate::events::EventSender;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for photo organizers
pub trait PhotoOrganizer: Send + Sync {
    /// One operation per photo, in input order
    fn plan_organization(
        &self,
        photos: &[PhotoMetadata],
        config: &PhotoManagerConfig,
    ) -> Vec<PhotoOperation>;

    /// Carry out operations sequentially
    fn execute_operations(
        &self,
        operations: &[PhotoOperation],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, OrganizeError>;

    /// Hashes shared by two or more photos
    fn detect_duplicates(&self, photos: &[PhotoMetadata]) -> HashMap<String, Vec<PhotoMetadata>>;
}

/// Organizer backed by a `FileSystem`
pub struct FileOrganizer {
    planner: PathPlanner,
    executor: OperationExecutor,
}

impl FileOrganizer {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            planner: PathPlanner::new(Arc::clone(&fs)),
            executor: OperationExecutor::new(fs),
        }
    }
}

impl PhotoOrganizer for FileOrganizer {
    fn plan_organization(
        &self,
        photos: &[PhotoMetadata],
        config: &PhotoManagerConfig,
    ) -> Vec<PhotoOperation> {
        self.planner.plan(
            photos,
            config.destination_folder(),
            config.organization_pattern(),
            config.operation_type(),
        )
    }

    fn execute_operations(
        &self,
        operations: &[PhotoOperation],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, OrganizeError> {
        self.executor.execute(operations, events, cancel)
    }

    fn detect_duplicates(&self, photos: &[PhotoMetadata]) -> HashMap<String, Vec<PhotoMetadata>> {
        detect_duplicates(photos)
    }
}
