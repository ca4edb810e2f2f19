//! # photomanager CLI
//!
//! Command-line interface for the photo manager.
//!
//! ## Usage
//! ```bash
//! photomanager scan ~/Photos --output json
//! photomanager organize ~/Photos ~/Sorted --pattern "{Year}/{MonthName}" --dry-run
//! ```

mod cli;

use photo_manager::Result;

fn main() -> Result<()> {
    cli::run()
}
