//! # Pipeline Module
//!
//! Orchestrates the full organize workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover photos and extract their metadata
//! 2. **Deduplicate** - Group by content hash, optionally skip copies
//! 3. **Plan** - Render a destination path for every photo
//! 4. **Execute** - Copy, move or link files (skipped on a dry run)
//!
//! ## Parallelism
//! Only scanning fans out; execution is strictly sequential.

mod executor;

pub use crate::core::cancel::CancellationToken;
pub use executor::{Pipeline, PipelineBuilder, PipelineResult};
