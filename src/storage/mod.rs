//! # Storage Collaborators
//!
//! The repository never touches the disk directly. It talks to two injected
//! collaborators:
//!
//! - [`KeyValueStore`]: string-keyed blobs. Each collection is stored as one
//!   JSON array under its own key.
//! - [`FileStore`]: a hierarchical file system used for imported document
//!   files.
//!
//! ## Implementations
//!
//! - [`memory::MemoryKvStore`] / [`memory::MemoryFileStore`]: in-memory, with
//!   failure simulation for tests.
//! - [`fs::JsonDirStore`] / [`fs::LocalFileStore`]: on-disk, used by the CLI.
//!
//! ## Key Layout
//!
//! ```text
//! @linknest:links
//! @linknest:categories
//! @linknest:tags
//! @linknest:notes
//! @linknest:documents
//! ```

use std::path::Path;

use async_trait::async_trait;

use crate::entity::CollectionKind;
use crate::error::Result;

pub mod fs;
pub mod memory;

pub use fs::{JsonDirStore, LocalFileStore};
pub use memory::{MemoryFileStore, MemoryKvStore};

/// Default prefix of every storage key.
pub const DEFAULT_KEY_NAMESPACE: &str = "@linknest";

/// Persistent string-keyed blob store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, `Ok(None)` if there is none.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// File system operations needed for the document lifecycle.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory (and missing parents).
    async fn mkdir(&self, path: &Path) -> Result<()>;

    /// Copy `src` to `dest`, returning the number of bytes copied.
    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64>;

    async fn unlink(&self, path: &Path) -> Result<()>;
}

/// The five storage keys for a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    namespace: String,
}

impl StorageKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn key(&self, kind: CollectionKind) -> String {
        format!("{}:{}", self.namespace, kind)
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAMESPACE)
    }
}
