use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FileStore, KeyValueStore};
use crate::error::{LinkNestError, Result};

/// In-memory key-value store.
///
/// Counts writes and can be told to fail them, so tests can observe when the
/// repository persists and how it copes with a failing store.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    simulate_write_error: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Seed a raw value without counting it as a write.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().await.insert(key.to_string(), value.to_string());
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(LinkNestError::Storage("Simulated write error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.entries.lock().await.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// In-memory file system.
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<HashSet<PathBuf>>,
    simulate_unlink_error: AtomicBool,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `unlink` fail.
    pub fn set_simulate_unlink_error(&self, simulate: bool) {
        self.simulate_unlink_error.store(simulate, Ordering::SeqCst);
    }

    /// Place a file directly, e.g. a picked source file.
    pub async fn put_file(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.lock().await.insert(path.into(), bytes.into());
    }

    /// Remove a file behind the repository's back.
    pub async fn remove_file(&self, path: &Path) -> bool {
        self.files.lock().await.remove(path).is_some()
    }

    pub async fn contains_file(&self, path: &Path) -> bool {
        self.files.lock().await.contains_key(path)
    }

    pub async fn contains_dir(&self, path: &Path) -> bool {
        self.dirs.lock().await.contains(path)
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

fn not_found(path: &Path) -> LinkNestError {
    LinkNestError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    ))
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        if self.files.lock().await.contains_key(path) {
            return Ok(true);
        }
        Ok(self.dirs.lock().await.contains(path))
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        let mut dirs = self.dirs.lock().await;
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64> {
        let mut files = self.files.lock().await;
        let bytes = files.get(src).cloned().ok_or_else(|| not_found(src))?;
        let len = bytes.len() as u64;
        files.insert(dest.to_path_buf(), bytes);
        Ok(len)
    }

    async fn unlink(&self, path: &Path) -> Result<()> {
        if self.simulate_unlink_error.load(Ordering::SeqCst) {
            return Err(LinkNestError::Storage("Simulated unlink error".to_string()));
        }
        self.files
            .lock()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_kv_set_get_remove() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.write_count(), 1);

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_kv_simulated_write_error() {
        let store = MemoryKvStore::new();
        store.set_simulate_write_error(true);
        assert!(store.set("k", "v").await.is_err());
        assert!(store.remove("k").await.is_err());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_files_copy_and_unlink() {
        let files = MemoryFileStore::new();
        files.put_file("/picker/a.txt", b"hello".to_vec()).await;

        let copied = files
            .copy_file(Path::new("/picker/a.txt"), Path::new("/docs/1_a.txt"))
            .await
            .unwrap();
        assert_eq!(copied, 5);
        assert!(files.exists(Path::new("/docs/1_a.txt")).await.unwrap());

        files.unlink(Path::new("/docs/1_a.txt")).await.unwrap();
        assert!(!files.exists(Path::new("/docs/1_a.txt")).await.unwrap());
        assert!(files.unlink(Path::new("/docs/1_a.txt")).await.is_err());
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let files = MemoryFileStore::new();
        let result = files
            .copy_file(Path::new("/nope"), Path::new("/docs/nope"))
            .await;
        assert!(matches!(result, Err(LinkNestError::Io(_))));
    }

    #[tokio::test]
    async fn test_mkdir_creates_ancestors() {
        let files = MemoryFileStore::new();
        files.mkdir(Path::new("/data/LinkNestDocuments")).await.unwrap();
        assert!(files.exists(Path::new("/data")).await.unwrap());
        assert!(files.contains_dir(Path::new("/data/LinkNestDocuments")).await);
    }
}
