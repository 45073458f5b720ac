use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{FileStore, KeyValueStore};
use crate::error::Result;

/// Key-value store keeping one JSON file per key inside a directory.
///
/// Keys are mapped to file names by replacing every character outside
/// `[A-Za-z0-9_-]` with `_`, so `@linknest:links` lives in
/// `_linknest_links.json`.
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KeyValueStore for JsonDirStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!(key, path = %path.display(), size = value.len(), "kv: write");

        fs::create_dir_all(&self.root).await.map_err(|e| {
            warn!(root = %self.root.display(), error = %e, "kv: create_dir_all failed");
            e
        })?;

        // Write to a temp file and rename so readers never see a partial value
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %path.display(), error = %e, "kv: rename failed");
            e
        })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// [`FileStore`] over the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64> {
        debug!(src = %src.display(), dest = %dest.display(), "files: copy");
        Ok(fs::copy(src, dest).await?)
    }

    async fn unlink(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_to_file_name() {
        let store = JsonDirStore::new("/data");
        assert_eq!(
            store.path_for("@linknest:links"),
            PathBuf::from("/data/_linknest_links.json")
        );
    }

    #[tokio::test]
    async fn test_json_dir_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::new(tmp.path().join("store"));

        assert_eq!(store.get("@linknest:notes").await.unwrap(), None);

        store.set("@linknest:notes", "[]").await.unwrap();
        assert_eq!(store.get("@linknest:notes").await.unwrap(), Some("[]".to_string()));

        store.set("@linknest:notes", "[1]").await.unwrap();
        assert_eq!(store.get("@linknest:notes").await.unwrap(), Some("[1]".to_string()));

        store.remove("@linknest:notes").await.unwrap();
        assert_eq!(store.get("@linknest:notes").await.unwrap(), None);
        store.remove("@linknest:notes").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_file_store_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let files = LocalFileStore::new();
        let dir = tmp.path().join("LinkNestDocuments");
        let src = tmp.path().join("picked.txt");
        std::fs::write(&src, b"some bytes").unwrap();

        assert!(!files.exists(&dir).await.unwrap());
        files.mkdir(&dir).await.unwrap();
        assert!(files.exists(&dir).await.unwrap());

        let dest = dir.join("1_picked.txt");
        assert_eq!(files.copy_file(&src, &dest).await.unwrap(), 10);
        assert!(files.exists(&dest).await.unwrap());

        files.unlink(&dest).await.unwrap();
        assert!(!files.exists(&dest).await.unwrap());
        assert!(files.unlink(&dest).await.is_err());
    }
}
