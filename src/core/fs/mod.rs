//! # Filesystem Module
//!
//! The filesystem capability the core is written against.
//!
//! ## Backends
//! - `LocalFileSystem` - The real disk (std::fs + walkdir)
//! - `MemoryFileSystem` - For testing

mod local;
mod memory;
mod traits;

pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
pub use traits::{FileSystem, ReadSeek};
