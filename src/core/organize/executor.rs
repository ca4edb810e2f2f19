//! Executor for planned operations.

use super::{ExecutionReport, OperationType, PhotoOperation};
use crate::core::cancel::CancellationToken;
use crate::core::fs::FileSystem;
use crate::error::OrganizeError;
use crate::events::{Event, EventSender, OperationProgress, OrganizeEvent};
use std::collections::HashSet;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Read buffer used when copying file contents
pub const COPY_BUFFER_SIZE: usize = 80 * 1024;

/// Runs operations one at a time, in order
pub struct OperationExecutor {
    fs: Arc<dyn FileSystem>,
}

impl OperationExecutor {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Execute every operation, stopping at the first failure or when
    /// `cancel` is raised. Completed operations are not rolled back.
    pub fn execute(
        &self,
        operations: &[PhotoOperation],
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, OrganizeError> {
        let start = Instant::now();
        let total = operations.len();
        let mut report = ExecutionReport::default();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        tracing::info!(operations = total, "Executing operations");
        events.send(Event::Organize(OrganizeEvent::Started {
            total_operations: total,
        }));

        for op in operations {
            if cancel.is_cancelled() {
                tracing::info!(completed = report.operations_completed, total, "Execution cancelled");
                return Err(OrganizeError::Cancelled {
                    completed: report.operations_completed,
                    total,
                });
            }

            if let Some(parent) = op.destination_path.parent() {
                if !created_dirs.contains(parent) {
                    if !self.fs.is_dir(parent) {
                        self.fs
                            .create_dir_all(parent)
                            .map_err(|source| OrganizeError::CreateDirectory {
                                path: parent.to_path_buf(),
                                source,
                            })?;
                        report.folders_created += 1;
                    }
                    created_dirs.insert(parent.to_path_buf());
                }
            }

            if self.already_in_place(op) {
                tracing::debug!(
                    source = %op.source_path.display(),
                    destination = %op.destination_path.display(),
                    "Already in place, skipping"
                );
                report.already_in_place += 1;
                report.operations_completed += 1;
                events.send(Event::Organize(OrganizeEvent::Progress(OperationProgress {
                    completed: report.operations_completed,
                    total,
                    current_path: op.source_path.clone(),
                })));
                continue;
            }

            let bytes = self
                .apply(op)
                .map_err(|source| OrganizeError::OperationFailed {
                    operation: op.operation,
                    source_path: op.source_path.clone(),
                    destination: op.destination_path.clone(),
                    source,
                })?;

            report.operations_completed += 1;
            report.total_size_bytes += bytes;
            tracing::debug!(
                operation = %op.operation,
                source = %op.source_path.display(),
                destination = %op.destination_path.display(),
                "Done"
            );

            events.send(Event::Organize(OrganizeEvent::Progress(OperationProgress {
                completed: report.operations_completed,
                total,
                current_path: op.source_path.clone(),
            })));
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            completed = report.operations_completed,
            folders_created = report.folders_created,
            bytes = report.total_size_bytes,
            "Execution complete"
        );
        events.send(Event::Organize(OrganizeEvent::Completed {
            operations_completed: report.operations_completed,
        }));

        Ok(report)
    }

    /// True when the destination already resolves to the source file.
    /// Copying a file onto itself would truncate it.
    fn already_in_place(&self, op: &PhotoOperation) -> bool {
        if !self.fs.exists(&op.destination_path) {
            return false;
        }
        match (
            self.fs.canonicalize(&op.source_path),
            self.fs.canonicalize(&op.destination_path),
        ) {
            (Ok(source), Ok(destination)) => source == destination,
            _ => false,
        }
    }

    /// Perform one operation, returning the number of bytes it covered
    fn apply(&self, op: &PhotoOperation) -> io::Result<u64> {
        let source = op.source_path.as_path();
        let destination = op.destination_path.as_path();

        match op.operation {
            OperationType::Copy => self.copy_file(source, destination),
            OperationType::Move => self.move_file(source, destination),
            OperationType::Symlink => {
                let size = self.fs.file_len(source)?;
                let target = self.fs.canonicalize(source)?;
                self.fs.symlink(&target, destination)?;
                Ok(size)
            }
        }
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, self.fs.open_read(source)?);
        let mut writer = self.fs.create(destination)?;
        let copied = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        Ok(copied)
    }

    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        let source_size = self.fs.file_len(source)?;
        if self.fs.exists(destination) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", destination.display()),
            ));
        }

        match self.fs.rename(source, destination) {
            Ok(()) => Ok(source_size),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
            Err(e) => {
                // rename fails across filesystems, fall back to copy+delete
                tracing::debug!(error = %e, "Rename failed, copying instead");
                self.copy_file(source, destination)?;

                let dest_size = self.fs.file_len(destination)?;
                if dest_size != source_size {
                    let _ = self.fs.remove_file(destination);
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!(
                            "Copy verification failed: source {} bytes, dest {} bytes",
                            source_size, dest_size
                        ),
                    ));
                }

                self.fs.remove_file(source)?;
                Ok(source_size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::{LocalFileSystem, MemoryFileSystem};
    use crate::events::{null_sender, EventChannel};
    use std::fs;
    use tempfile::TempDir;

    fn memory_executor() -> (Arc<MemoryFileSystem>, OperationExecutor) {
        let fs = Arc::new(MemoryFileSystem::new());
        let executor = OperationExecutor::new(fs.clone());
        (fs, executor)
    }

    #[test]
    fn copy_creates_missing_directories() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"photo bytes".to_vec());
        let ops = vec![PhotoOperation::new("/in/a.jpg", "/out/2024/10/a.jpg", OperationType::Copy)];

        let report = executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();

        assert_eq!(report.operations_completed, 1);
        assert_eq!(report.folders_created, 1);
        assert_eq!(report.total_size_bytes, 11);
        assert_eq!(fs.read("/out/2024/10/a.jpg").unwrap(), b"photo bytes");
        assert!(fs.read("/in/a.jpg").is_some());
    }

    #[test]
    fn copy_of_large_file_is_byte_identical() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = temp_src.path().join("big.jpg");
        let data: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src_file, &data).unwrap();

        let dest_file = temp_dest.path().join("2024/01/big.jpg");
        let ops = vec![PhotoOperation::new(&src_file, &dest_file, OperationType::Copy)];

        let executor = OperationExecutor::new(Arc::new(LocalFileSystem::new()));
        executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();

        assert_eq!(fs::read(&dest_file).unwrap(), data);
        assert!(src_file.exists());
    }

    #[test]
    fn move_removes_source() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"abc".to_vec());
        let ops = vec![PhotoOperation::new("/in/a.jpg", "/out/a.jpg", OperationType::Move)];

        executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();

        assert!(fs.read("/in/a.jpg").is_none());
        assert_eq!(fs.read("/out/a.jpg").unwrap(), b"abc");
    }

    #[test]
    fn move_on_disk() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = temp_src.path().join("test.jpg");
        fs::write(&src_file, b"test content").unwrap();
        let dest_file = temp_dest.path().join("2024/01/test.jpg");

        let executor = OperationExecutor::new(Arc::new(LocalFileSystem::new()));
        let report = executor
            .execute(
                &[PhotoOperation::new(&src_file, &dest_file, OperationType::Move)],
                &null_sender(),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(report.operations_completed, 1);
        assert!(!src_file.exists());
        assert_eq!(fs::read(&dest_file).unwrap(), b"test content");
    }

    #[test]
    fn symlink_points_at_canonical_source() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"abc".to_vec());
        let ops = vec![PhotoOperation::new("/in/a.jpg", "/out/links/a.jpg", OperationType::Symlink)];

        executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();

        assert_eq!(fs.symlink_target("/out/links/a.jpg"), Some(PathBuf::from("/in/a.jpg")));
        assert!(fs.read("/in/a.jpg").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_on_disk_resolves_to_source() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = temp_src.path().join("a.jpg");
        fs::write(&src_file, b"linked").unwrap();
        let link = temp_dest.path().join("2024/a.jpg");

        let executor = OperationExecutor::new(Arc::new(LocalFileSystem::new()));
        executor
            .execute(
                &[PhotoOperation::new(&src_file, &link, OperationType::Symlink)],
                &null_sender(),
                &CancellationToken::new(),
            )
            .unwrap();

        let target = fs::read_link(&link).unwrap();
        assert!(target.is_absolute());
        assert_eq!(fs::read(&link).unwrap(), b"linked");
    }

    #[test]
    fn progress_reported_per_operation() {
        let (fs, executor) = memory_executor();
        for name in ["a", "b", "c"] {
            fs.add_file(format!("/in/{}.jpg", name), name.as_bytes().to_vec());
        }
        let ops: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| PhotoOperation::new(format!("/in/{}.jpg", n), format!("/out/{}.jpg", n), OperationType::Copy))
            .collect();

        let (sender, receiver) = EventChannel::new();
        executor.execute(&ops, &sender, &CancellationToken::new()).unwrap();

        let progress: Vec<_> = receiver
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                Event::Organize(OrganizeEvent::Progress(p)) => Some((p.completed, p.total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn cancelled_before_start_does_nothing() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"a".to_vec());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = executor.execute(
            &[PhotoOperation::new("/in/a.jpg", "/out/a.jpg", OperationType::Copy)],
            &null_sender(),
            &cancel,
        );

        assert!(matches!(result, Err(OrganizeError::Cancelled { completed: 0, total: 1 })));
        assert!(fs.read("/out/a.jpg").is_none());
    }

    #[test]
    fn failure_aborts_remaining_operations() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"a".to_vec());
        fs.add_file("/in/c.jpg", b"c".to_vec());
        let ops = vec![
            PhotoOperation::new("/in/a.jpg", "/out/a.jpg", OperationType::Copy),
            PhotoOperation::new("/in/missing.jpg", "/out/b.jpg", OperationType::Copy),
            PhotoOperation::new("/in/c.jpg", "/out/c.jpg", OperationType::Copy),
        ];

        let err = executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap_err();

        match err {
            OrganizeError::OperationFailed {
                operation,
                source_path,
                destination,
                ..
            } => {
                assert_eq!(operation, OperationType::Copy);
                assert_eq!(source_path, PathBuf::from("/in/missing.jpg"));
                assert_eq!(destination, PathBuf::from("/out/b.jpg"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fs.read("/out/a.jpg").is_some());
        assert!(fs.read("/out/c.jpg").is_none());
    }

    #[test]
    fn denied_directory_is_create_directory_error() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"a".to_vec());
        fs.deny_writes("/locked");

        let result = executor.execute(
            &[PhotoOperation::new("/in/a.jpg", "/locked/2024/a.jpg", OperationType::Copy)],
            &null_sender(),
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(OrganizeError::CreateDirectory { .. })));
    }

    #[test]
    fn existing_directories_are_not_counted() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"a".to_vec());
        fs.add_file("/in/b.jpg", b"b".to_vec());
        fs.add_dir("/out/2024");
        let ops = vec![
            PhotoOperation::new("/in/a.jpg", "/out/2024/a.jpg", OperationType::Copy),
            PhotoOperation::new("/in/b.jpg", "/out/2025/b.jpg", OperationType::Copy),
        ];

        let report = executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();

        assert_eq!(report.folders_created, 1);
    }

    #[test]
    fn move_refuses_existing_destination() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a/IMG_0001.jpg", b"first".to_vec());
        fs.add_file("/in/b/IMG_0001.jpg", b"second".to_vec());
        let ops = vec![
            PhotoOperation::new("/in/a/IMG_0001.jpg", "/out/IMG_0001.jpg", OperationType::Move),
            PhotoOperation::new("/in/b/IMG_0001.jpg", "/out/IMG_0001.jpg", OperationType::Move),
        ];

        let err = executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap_err();

        match err {
            OrganizeError::OperationFailed {
                source_path, source, ..
            } => {
                assert_eq!(source_path, PathBuf::from("/in/b/IMG_0001.jpg"));
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs.read("/out/IMG_0001.jpg").unwrap(), b"first");
        assert_eq!(fs.read("/in/b/IMG_0001.jpg").unwrap(), b"second");
    }

    #[test]
    fn move_onto_existing_file_on_disk_keeps_both() {
        let temp = TempDir::new().unwrap();
        let src_file = temp.path().join("new.jpg");
        let dest_file = temp.path().join("out/new.jpg");
        fs::write(&src_file, b"incoming").unwrap();
        fs::create_dir_all(dest_file.parent().unwrap()).unwrap();
        fs::write(&dest_file, b"already here").unwrap();

        let executor = OperationExecutor::new(Arc::new(LocalFileSystem::new()));
        let result = executor.execute(
            &[PhotoOperation::new(&src_file, &dest_file, OperationType::Move)],
            &null_sender(),
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(OrganizeError::OperationFailed { .. })));
        assert_eq!(fs::read(&dest_file).unwrap(), b"already here");
        assert_eq!(fs::read(&src_file).unwrap(), b"incoming");
    }

    #[test]
    fn copy_onto_itself_keeps_contents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Unknown/a.jpg");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"do not truncate").unwrap();
        let same = temp.path().join("Unknown/../Unknown/a.jpg");

        let executor = OperationExecutor::new(Arc::new(LocalFileSystem::new()));
        let report = executor
            .execute(
                &[PhotoOperation::new(&file, &same, OperationType::Copy)],
                &null_sender(),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(report.operations_completed, 1);
        assert_eq!(report.already_in_place, 1);
        assert_eq!(report.total_size_bytes, 0);
        assert_eq!(fs::read(&file).unwrap(), b"do not truncate");
    }

    #[test]
    fn move_onto_itself_is_a_no_op() {
        let (fs, executor) = memory_executor();
        fs.add_file("/photos/a.jpg", b"abc".to_vec());

        let report = executor
            .execute(
                &[PhotoOperation::new("/photos/a.jpg", "/photos/a.jpg", OperationType::Move)],
                &null_sender(),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(report.already_in_place, 1);
        assert_eq!(fs.read("/photos/a.jpg").unwrap(), b"abc");
    }

    #[cfg(unix)]
    #[test]
    fn repeated_symlink_run_is_a_no_op() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let src_file = temp_src.path().join("a.jpg");
        fs::write(&src_file, b"linked").unwrap();
        let link = temp_dest.path().join("2024/a.jpg");
        let ops = vec![PhotoOperation::new(&src_file, &link, OperationType::Symlink)];

        let executor = OperationExecutor::new(Arc::new(LocalFileSystem::new()));
        executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();
        let second = executor
            .execute(&ops, &null_sender(), &CancellationToken::new())
            .unwrap();

        assert_eq!(second.already_in_place, 1);
        assert_eq!(fs::read(&link).unwrap(), b"linked");
    }

    #[test]
    fn move_falls_back_to_copy_when_rename_fails() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"across volumes".to_vec());
        fs.deny_renames();

        let report = executor
            .execute(
                &[PhotoOperation::new("/in/a.jpg", "/other/2024/a.jpg", OperationType::Move)],
                &null_sender(),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(report.total_size_bytes, 14);
        assert_eq!(fs.read("/other/2024/a.jpg").unwrap(), b"across volumes");
        assert!(fs.read("/in/a.jpg").is_none());
    }

    #[test]
    fn short_fallback_copy_keeps_source() {
        let (fs, executor) = memory_executor();
        fs.add_file("/in/a.jpg", b"abcdef".to_vec());
        fs.deny_renames();
        fs.truncate_writes(2);

        let result = executor.execute(
            &[PhotoOperation::new("/in/a.jpg", "/other/a.jpg", OperationType::Move)],
            &null_sender(),
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(OrganizeError::OperationFailed { .. })));
        assert_eq!(fs.read("/in/a.jpg").unwrap(), b"abcdef");
        assert!(fs.read("/other/a.jpg").is_none());
    }
}
