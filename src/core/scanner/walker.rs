//! Parallel scanning implementation using walkdir-backed enumeration and a
//! bounded rayon pool.

use super::{ExtensionFilter, PhotoScanner};
use crate::core::cancel::CancellationToken;
use crate::core::fs::FileSystem;
use crate::core::metadata::{MetadataExtractor, PhotoMetadata};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of files extracted at once
    pub parallelism: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
        }
    }
}

/// Number of hardware threads, or 1 if unknown
pub(crate) fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Scanner that extracts metadata on a bounded worker pool
pub struct ParallelScanner {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn MetadataExtractor>,
    config: ScanConfig,
}

impl ParallelScanner {
    /// Create a new scanner with the given configuration
    pub fn new(
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn MetadataExtractor>,
        config: ScanConfig,
    ) -> Self {
        Self {
            fs,
            extractor,
            config,
        }
    }

    fn collect_files(&self, root: &Path, extensions: &[String]) -> Vec<PathBuf> {
        let filter = ExtensionFilter::new(extensions);
        self.fs
            .walk_files(root)
            .into_iter()
            .filter(|path| filter.matches(path))
            .collect()
    }
}

impl PhotoScanner for ParallelScanner {
    fn scan(
        &self,
        root: &Path,
        extensions: &[String],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Vec<PhotoMetadata>, ScanError> {
        if !self.fs.is_dir(root) {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let start = Instant::now();
        let files = self.collect_files(root, extensions);
        let total = files.len();
        let workers = self.config.parallelism.max(1);

        tracing::info!(root = %root.display(), files = total, workers, "Scanning");
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
            total_files: total,
        }));

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("scan-worker-{}", i))
            .build()
            .map_err(|e| ScanError::WorkerPool {
                reason: e.to_string(),
            })?;

        // One slot per file; a worker's result lands at its file's index
        let mut slots: Vec<Option<PhotoMetadata>> = (0..total).map(|_| None).collect();
        let (tx, rx) = crossbeam_channel::unbounded::<(usize, Option<PhotoMetadata>)>();
        let extractor: &dyn MetadataExtractor = self.extractor.as_ref();
        let file_list = &files;

        std::thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(move || {
                    file_list
                        .par_iter()
                        .enumerate()
                        .for_each_with(tx, |tx, (index, path)| {
                            if cancel.is_cancelled() {
                                return;
                            }
                            let result = extractor.extract(path);
                            let _ = tx.send((index, result));
                        });
                });
            });

            // Progress is emitted from this thread only, so counts reach the
            // sink in strictly increasing order
            let mut processed = 0usize;
            for (index, result) in rx.iter() {
                if cancel.is_cancelled() {
                    break;
                }
                processed += 1;
                let path = &files[index];

                if result.is_none() {
                    tracing::debug!(path = %path.display(), "Dropped unreadable file");
                    events.send(Event::Scan(ScanEvent::Skipped { path: path.clone() }));
                }
                slots[index] = result;

                events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                    processed,
                    total,
                    current_path: path.clone(),
                })));
            }
        });

        if cancel.is_cancelled() {
            tracing::info!(root = %root.display(), "Scan cancelled");
            return Err(ScanError::Cancelled);
        }

        let photos: Vec<PhotoMetadata> = slots.into_iter().flatten().collect();

        tracing::info!(
            photos = photos.len(),
            dropped = total - photos.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scan complete"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_photos: photos.len(),
        }));

        Ok(photos)
    }
}
