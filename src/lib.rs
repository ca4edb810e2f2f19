//! # Photo Manager
//!
//! Sorts a folder of photos into a tidy tree built from their metadata.
//!
//! ## Core Philosophy
//! - **Plan before touching anything** - every run can be previewed as a dry run
//! - **Deterministic paths** - the same photos and pattern give the same tree
//! - **Duplicates by content** - files are compared by SHA-256, not by name
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Scanning, planning and executing
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with path context
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PhotoManagerError, Result};

/// Initialize tracing for the library
///
/// Honors `RUST_LOG`; otherwise logs at `info`, or `debug` when `verbose`.
/// Output goes to stderr so it never mixes with JSON on stdout. Calling it
/// twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
