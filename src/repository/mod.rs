//! # Entity Repository
//!
//! In-memory owner of the five collections. Every mutation is applied to the
//! in-memory state first and returned to the caller right away; a background
//! flush then writes the whole collection to the [`KeyValueStore`].
//!
//! ```text
//! caller ──add/update/delete──▶ RwLock<Snapshot> ──▶ caller gets the record
//!                                     │
//!                                     └─ spawn flush(kind) ──▶ kv.set(key, json)
//! ```
//!
//! Flushes of one collection take that collection's flush lock and serialize
//! the state as it is when they run, so the last flush always writes the
//! latest data.

mod documents;
mod persist;
mod snapshot;

pub use documents::DocumentImport;
pub use snapshot::{Snapshot, Stored};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::entity::{
    default_categories, default_tags, now_millis, Category, CollectionKind, Favorite, Tag,
};
use crate::events::{EventBus, RepositoryEvent};
use crate::storage::{FileStore, KeyValueStore, StorageKeys};

/// Where the repository is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Uninitialized => write!(f, "uninitialized"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::Ready => write!(f, "ready"),
        }
    }
}

/// Default categories and tags, generated once per repository so every
/// reset restores the same records.
struct Defaults {
    categories: Vec<Category>,
    tags: Vec<Tag>,
}

struct Inner {
    kv: Arc<dyn KeyValueStore>,
    files: Arc<dyn FileStore>,
    keys: StorageKeys,
    documents_dir: PathBuf,
    defaults: Defaults,
    data: RwLock<Snapshot>,
    state: watch::Sender<LoadState>,
    /// One per collection, indexed by `CollectionKind::index`
    flush_locks: [Mutex<()>; 5],
    flushes: TaskTracker,
    events: EventBus,
}

/// Shared handle to the organizer's data. Cloning is cheap and every clone
/// sees the same state.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("state", &self.state())
            .field("documents_dir", &self.inner.documents_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Build a repository over the given collaborators. Nothing is read until
    /// [`Repository::init`] runs.
    pub fn new(kv: Arc<dyn KeyValueStore>, files: Arc<dyn FileStore>, config: &Config) -> Self {
        let now = now_millis();
        let (state, _) = watch::channel(LoadState::Uninitialized);

        Self {
            inner: Arc::new(Inner {
                kv,
                files,
                keys: config.storage_keys(),
                documents_dir: config.documents_dir(),
                defaults: Defaults {
                    categories: default_categories(now),
                    tags: default_tags(now),
                },
                data: RwLock::new(Snapshot::default()),
                state,
                flush_locks: Default::default(),
                flushes: TaskTracker::new(),
                events: EventBus::default(),
            }),
        }
    }

    /// Construct and initialize in one step.
    pub async fn open(kv: Arc<dyn KeyValueStore>, files: Arc<dyn FileStore>, config: &Config) -> Self {
        let repo = Self::new(kv, files, config);
        repo.init().await;
        repo
    }

    pub fn state(&self) -> LoadState {
        *self.inner.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Ready
    }

    /// Wait until initialization has finished.
    pub async fn wait_ready(&self) {
        let mut rx = self.inner.state.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|state| *state == LoadState::Ready).await;
    }

    pub fn documents_dir(&self) -> &Path {
        &self.inner.documents_dir
    }

    pub fn storage_keys(&self) -> &StorageKeys {
        &self.inner.keys
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.inner.events.subscribe()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get<E: Stored>(&self, id: Uuid) -> Option<E> {
        self.inner.data.read().await.get::<E>(id).cloned()
    }

    pub async fn list<E: Stored>(&self) -> Vec<E> {
        E::collection(&*self.inner.data.read().await).clone()
    }

    /// Copy of all five collections at this instant.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.data.read().await.clone()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a record from `draft` with a fresh id and timestamps.
    pub async fn add<E: Stored>(&self, draft: E::Draft) -> E {
        let record = E::create(draft, Uuid::new_v4(), now_millis());
        E::collection_mut(&mut *self.inner.data.write().await).push(record.clone());

        debug!(collection = %E::KIND, id = %record.id(), "added");
        self.changed(E::KIND);
        record
    }

    /// Merge `patch` into the record with `id`. `None` when there is no such
    /// record, in which case nothing changes.
    pub async fn update<E: Stored>(&self, id: Uuid, patch: E::Patch) -> Option<E> {
        let updated = {
            let mut data = self.inner.data.write().await;
            let record = E::collection_mut(&mut data).iter_mut().find(|r| r.id() == id)?;
            record.apply(patch);
            record.touch(now_millis());
            record.clone()
        };

        debug!(collection = %E::KIND, %id, "updated");
        self.changed(E::KIND);
        Some(updated)
    }

    /// Flip the favorite flag. `None` when there is no such record.
    pub async fn toggle_favorite<E: Stored + Favorite>(&self, id: Uuid) -> Option<E> {
        let updated = {
            let mut data = self.inner.data.write().await;
            let record = E::collection_mut(&mut data).iter_mut().find(|r| r.id() == id)?;
            let flipped = !record.is_favorite();
            record.apply(E::favorite_patch(flipped));
            record.touch(now_millis());
            record.clone()
        };

        debug!(collection = %E::KIND, %id, is_favorite = updated.is_favorite(), "favorite toggled");
        self.changed(E::KIND);
        Some(updated)
    }

    /// Remove the record with `id`, returning whether it existed.
    ///
    /// A record that owns a file (documents) has the file unlinked first.
    /// File errors are logged and do not stop the removal.
    pub async fn delete<E: Stored>(&self, id: Uuid) -> bool {
        let owned_file = {
            let data = self.inner.data.read().await;
            match data.get::<E>(id) {
                Some(record) => record.owned_file().map(Path::to_path_buf),
                None => return false,
            }
        };

        if let Some(path) = owned_file {
            self.remove_owned_file(&path).await;
        }

        let removed = {
            let mut data = self.inner.data.write().await;
            let records = E::collection_mut(&mut data);
            let before = records.len();
            records.retain(|r| r.id() != id);
            records.len() != before
        };

        if removed {
            debug!(collection = %E::KIND, %id, "deleted");
            self.changed(E::KIND);
        }
        removed
    }

    fn changed(&self, kind: CollectionKind) {
        if self.is_ready() {
            self.schedule_flush(kind);
        } else {
            debug!(collection = %kind, state = %self.state(), "not ready, flush skipped");
        }
        self.inner.events.emit(RepositoryEvent::Changed(kind));
    }

    fn mark_ready(&self) {
        self.inner.state.send_replace(LoadState::Ready);
        self.inner.events.emit(RepositoryEvent::Ready);
        info!("repository ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Link, LinkDraft, LinkPatch, Note, NoteDraft};
    use crate::storage::{MemoryFileStore, MemoryKvStore};

    fn repo() -> (Repository, Arc<MemoryKvStore>) {
        let kv = Arc::new(MemoryKvStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let repo = Repository::new(kv.clone(), files, &Config::with_data_dir("/data"));
        (repo, kv)
    }

    #[tokio::test]
    async fn test_lifecycle_states() {
        let (repo, _) = repo();
        assert_eq!(repo.state(), LoadState::Uninitialized);
        assert!(!repo.is_ready());

        repo.init().await;
        assert_eq!(repo.state(), LoadState::Ready);
        repo.wait_ready().await;
    }

    #[tokio::test]
    async fn test_add_stamps_both_timestamps_equal() {
        let (repo, _) = repo();
        repo.init().await;

        let link = repo.add::<Link>(LinkDraft::new("https://a.com", "A")).await;
        assert!(!link.id.is_nil());
        assert_eq!(link.created_at, link.updated_at);
        assert_eq!(repo.get::<Link>(link.id).await, Some(link));
    }

    #[tokio::test]
    async fn test_update_advances_updated_at() {
        let (repo, _) = repo();
        repo.init().await;

        let note = repo.add::<Note>(NoteDraft::new("T", "c")).await;
        let patch = crate::entity::NotePatch {
            content: Some("changed".to_string()),
            ..Default::default()
        };
        let updated = repo.update::<Note>(note.id, patch).await.unwrap();
        assert_eq!(updated.content, "changed");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids_change_nothing() {
        let (repo, _) = repo();
        repo.init().await;
        repo.add::<Link>(LinkDraft::new("https://a.com", "A")).await;
        let before = repo.snapshot().await;

        let missing = Uuid::new_v4();
        assert!(repo.update::<Link>(missing, LinkPatch::default()).await.is_none());
        assert!(repo.toggle_favorite::<Link>(missing).await.is_none());
        assert!(!repo.delete::<Link>(missing).await);
        assert_eq!(repo.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice_restores() {
        let (repo, _) = repo();
        repo.init().await;

        let link = repo.add::<Link>(LinkDraft::new("https://a.com", "A")).await;
        let once = repo.toggle_favorite::<Link>(link.id).await.unwrap();
        assert!(once.is_favorite);
        let twice = repo.toggle_favorite::<Link>(link.id).await.unwrap();
        assert!(!twice.is_favorite);
        assert!(twice.updated_at > once.updated_at);
    }

    #[tokio::test]
    async fn test_events_follow_mutations() {
        let (repo, _) = repo();
        let mut rx = repo.subscribe();
        repo.init().await;
        assert_eq!(rx.recv().await.unwrap(), RepositoryEvent::Ready);

        let link = repo.add::<Link>(LinkDraft::new("https://a.com", "A")).await;
        assert_eq!(rx.recv().await.unwrap(), RepositoryEvent::Changed(CollectionKind::Links));

        repo.delete::<Link>(link.id).await;
        assert_eq!(rx.recv().await.unwrap(), RepositoryEvent::Changed(CollectionKind::Links));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (repo, _) = repo();
        repo.init().await;
        let other = repo.clone();

        let note = other.add::<Note>(NoteDraft::new("Shared", "")).await;
        assert_eq!(repo.list::<Note>().await, vec![note]);
    }
}
