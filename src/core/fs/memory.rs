//! In-memory filesystem backend for testing.

use super::{FileSystem, ReadSeek};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    created: SystemTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, MemoryFile>,
    dirs: BTreeSet<PathBuf>,
    symlinks: BTreeMap<PathBuf, PathBuf>,
    read_only: BTreeSet<PathBuf>,
    renames_denied: bool,
    write_limit: Option<usize>,
}

impl MemoryState {
    fn add_dir_with_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.read_only.iter().any(|denied| path.starts_with(denied)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        Ok(())
    }

    fn check_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.dirs.contains(parent) => {
                Err(not_found(parent))
            }
            _ => Ok(()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path) || self.symlinks.contains_key(path)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory filesystem lock poisoned")
}

/// In-memory filesystem backend
///
/// Paths are compared literally; use absolute paths throughout.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryFileSystem {
    /// Create an empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> io::Result<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| poisoned())
    }

    fn write_state(&self) -> io::Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| poisoned())
    }

    /// Add a directory and its parents
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        if let Ok(mut state) = self.write_state() {
            state.add_dir_with_parents(path.as_ref());
        }
    }

    /// Add a file (creating parent directories) with a creation time of
    /// the Unix epoch
    pub fn add_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        self.add_file_created(path, data, SystemTime::UNIX_EPOCH);
    }

    /// Add a file with an explicit creation time
    pub fn add_file_created(
        &self,
        path: impl AsRef<Path>,
        data: impl Into<Vec<u8>>,
        created: SystemTime,
    ) {
        let path = path.as_ref();
        if let Ok(mut state) = self.write_state() {
            if let Some(parent) = path.parent() {
                state.add_dir_with_parents(parent);
            }
            state.files.insert(
                path.to_path_buf(),
                MemoryFile {
                    data: data.into(),
                    created,
                },
            );
        }
    }

    /// Make every write at or below `path` fail with `PermissionDenied`
    pub fn deny_writes(&self, path: impl AsRef<Path>) {
        if let Ok(mut state) = self.write_state() {
            state.read_only.insert(path.as_ref().to_path_buf());
        }
    }

    /// Make every rename fail, as between two volumes
    pub fn deny_renames(&self) {
        if let Ok(mut state) = self.write_state() {
            state.renames_denied = true;
        }
    }

    /// Keep at most `limit` bytes of anything written from now on
    pub fn truncate_writes(&self, limit: usize) {
        if let Ok(mut state) = self.write_state() {
            state.write_limit = Some(limit);
        }
    }

    /// Contents of a file, if present
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.read_state().ok()?;
        state.files.get(path.as_ref()).map(|f| f.data.clone())
    }

    /// Target of a symbolic link, if present
    pub fn symlink_target(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        let state = self.read_state().ok()?;
        state.symlinks.get(path.as_ref()).cloned()
    }

    /// Number of regular files currently stored
    pub fn file_count(&self) -> usize {
        self.read_state().map(|s| s.files.len()).unwrap_or(0)
    }
}

/// Buffers writes and publishes them to the filesystem on flush and drop
struct MemoryWriter {
    state: Arc<RwLock<MemoryState>>,
    path: PathBuf,
    buffer: Vec<u8>,
}

impl MemoryWriter {
    fn publish(&mut self) -> io::Result<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let limit = state.write_limit.unwrap_or(usize::MAX).min(self.buffer.len());
        let file = state
            .files
            .entry(self.path.clone())
            .or_insert_with(|| MemoryFile {
                data: Vec::new(),
                created: SystemTime::now(),
            });
        file.data = self.buffer[..limit].to_vec();
        Ok(())
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.publish()
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        let _ = self.publish();
    }
}

impl FileSystem for MemoryFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        self.read_state()
            .map(|s| s.dirs.contains(path))
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.read_state()
            .map(|s| s.files.contains_key(path))
            .unwrap_or(false)
    }

    fn exists(&self, path: &Path) -> bool {
        self.read_state()
            .map(|s| s.exists(path))
            .unwrap_or(false)
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        self.read_state()
            .map(|s| {
                s.files
                    .keys()
                    .filter(|p| p.starts_with(root))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        let state = self.read_state()?;
        state
            .files
            .get(path)
            .map(|f| f.data.len() as u64)
            .ok_or_else(|| not_found(path))
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        let state = self.read_state()?;
        state
            .files
            .get(path)
            .map(|f| f.created)
            .ok_or_else(|| not_found(path))
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        let state = self.read_state()?;
        let file = state.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(file.data.clone())))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        {
            let mut state = self.write_state()?;
            state.check_writable(path)?;
            state.check_parent(path)?;
            state.files.insert(
                path.to_path_buf(),
                MemoryFile {
                    data: Vec::new(),
                    created: SystemTime::now(),
                },
            );
        }

        Ok(Box::new(MemoryWriter {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            buffer: Vec::new(),
        }))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        if state.dirs.contains(path) {
            return Ok(());
        }
        state.check_writable(path)?;
        state.add_dir_with_parents(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        if state.renames_denied {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "cross-device link",
            ));
        }
        state.check_writable(to)?;
        state.check_parent(to)?;
        if state.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        let file = state.files.remove(from).ok_or_else(|| not_found(from))?;
        state.files.insert(to.to_path_buf(), file);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        state.check_writable(link)?;
        state.check_parent(link)?;
        if state.exists(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", link.display()),
            ));
        }
        state.symlinks.insert(link.to_path_buf(), target.to_path_buf());
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let state = self.read_state()?;
        if state.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(not_found(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn add_file_creates_parent_directories() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/photos/2024/a.jpg", b"abc".to_vec());

        assert!(fs.is_dir(Path::new("/photos")));
        assert!(fs.is_dir(Path::new("/photos/2024")));
        assert!(fs.is_file(Path::new("/photos/2024/a.jpg")));
    }

    #[test]
    fn create_requires_parent_directory() {
        let fs = MemoryFileSystem::new();
        let result = fs.create(Path::new("/missing/out.jpg"));
        assert_eq!(result.err().map(|e| e.kind()), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn written_data_is_visible_after_drop() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/out");

        {
            let mut writer = fs.create(Path::new("/out/a.bin")).unwrap();
            writer.write_all(b"payload").unwrap();
        }

        assert_eq!(fs.read("/out/a.bin"), Some(b"payload".to_vec()));

        let mut back = Vec::new();
        fs.open_read(Path::new("/out/a.bin"))
            .unwrap()
            .read_to_end(&mut back)
            .unwrap();
        assert_eq!(back, b"payload");
    }

    #[test]
    fn walk_files_only_returns_files_under_root() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a/1.jpg", b"1".to_vec());
        fs.add_file("/a/b/2.jpg", b"2".to_vec());
        fs.add_file("/other/3.jpg", b"3".to_vec());

        let files = fs.walk_files(Path::new("/a"));
        assert_eq!(
            files,
            vec![PathBuf::from("/a/1.jpg"), PathBuf::from("/a/b/2.jpg")]
        );
    }

    #[test]
    fn denied_paths_reject_writes() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/locked");
        fs.deny_writes("/locked");

        let err = fs.create(Path::new("/locked/a.jpg")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn rename_refuses_existing_destination() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.jpg", b"new".to_vec());
        fs.add_file("/out/a.jpg", b"kept".to_vec());

        let err = fs
            .rename(Path::new("/in/a.jpg"), Path::new("/out/a.jpg"))
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs.read("/out/a.jpg").unwrap(), b"kept");
        assert!(fs.exists(Path::new("/in/a.jpg")));
    }

    #[test]
    fn denied_renames_fail_and_truncated_writes_are_short() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/in/a.jpg", b"abcdef".to_vec());
        fs.add_dir("/out");
        fs.deny_renames();
        fs.truncate_writes(2);

        assert!(fs
            .rename(Path::new("/in/a.jpg"), Path::new("/out/a.jpg"))
            .is_err());

        {
            let mut writer = fs.create(Path::new("/out/b.jpg")).unwrap();
            writer.write_all(b"abcdef").unwrap();
        }
        assert_eq!(fs.read("/out/b.jpg").unwrap(), b"ab");
    }
}
