//! # Hasher Module
//!
//! Computes content fingerprints for exact duplicate detection.
//!
//! ## How It Works
//! The complete byte stream of a file is fed through SHA-256 in fixed-size
//! chunks, so memory use does not grow with file size. Two files share a
//! fingerprint exactly when their bytes are identical (up to SHA-256
//! collision probability). The digest is rendered as uppercase hex.
//!
//! ## Example
//! ```rust,ignore
//! use photo_manager::core::hasher::ContentHasher;
//!
//! let hash = ContentHasher::new().hash_reader(&mut file)?;
//! assert_eq!(hash.len(), 64);
//! ```

use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Default read chunk size
const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streams bytes through SHA-256
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    /// Create a hasher with the default chunk size
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the read chunk size in bytes
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Hash everything the reader yields until EOF
    pub fn hash_reader<R: Read + ?Sized>(&self, reader: &mut R) -> io::Result<String> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:X}", hasher.finalize()))
    }

    /// Hash an in-memory buffer
    pub fn hash_bytes(&self, bytes: &[u8]) -> String {
        format!("{:X}", Sha256::digest(bytes))
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
