//! Filesystem capability used by every stage of the core.

use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A readable, seekable byte stream that can cross threads.
///
/// EXIF containers need random access, so plain `Read` is not enough.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Trait for filesystem backends
///
/// Implement this trait to run the scanner, planner and executor against
/// something other than the local disk (e.g., for testing).
pub trait FileSystem: Send + Sync {
    /// Check if the path is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if the path is an existing regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if anything (file, directory or link) sits at the path,
    /// without following links
    fn exists(&self, path: &Path) -> bool;

    /// Enumerate every regular file below `root`, recursively.
    ///
    /// The order is stable for an unchanged tree. Entries that cannot be
    /// read are skipped.
    fn walk_files(&self, root: &Path) -> Vec<PathBuf>;

    /// Size of a file in bytes
    fn file_len(&self, path: &Path) -> io::Result<u64>;

    /// Creation time of a file, or its modification time on platforms
    /// that do not record creation
    fn created(&self, path: &Path) -> io::Result<SystemTime>;

    /// Open a file for reading
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>>;

    /// Create (or truncate) a file for writing
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    /// Create a directory and all missing parents. Succeeds if it exists.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename a file. Fails with `AlreadyExists` if `to` exists; an
    /// existing destination is never replaced.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing at `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Resolve a path to its absolute, canonical form
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}
