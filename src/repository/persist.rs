use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{Inner, LoadState, Repository, Snapshot, Stored};
use crate::entity::{CollectionKind, Document, Entity, Link, Note};
use crate::error::Result;
use crate::events::RepositoryEvent;

/// Outcome of reading one stored collection.
enum Loaded<E> {
    Found(Vec<E>),
    Missing,
    Unreadable,
}

impl<E> Loaded<E> {
    fn or_empty(self) -> Vec<E> {
        match self {
            Loaded::Found(items) => items,
            Loaded::Missing | Loaded::Unreadable => Vec::new(),
        }
    }
}

impl Repository {
    /// Load every collection from storage and become ready.
    ///
    /// Never fails: unreadable data falls back to empty collections (or the
    /// defaults for categories and tags) and the problem is logged. Missing
    /// categories or tags are seeded and written right away. Calling `init`
    /// a second time does nothing.
    pub async fn init(&self) {
        let started = self.inner.state.send_if_modified(|state| {
            if *state == LoadState::Uninitialized {
                *state = LoadState::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            debug!(state = %self.state(), "init already started, ignoring");
            return;
        }

        if let Err(e) = self.ensure_documents_dir().await {
            warn!(
                path = %self.inner.documents_dir.display(),
                error = %e,
                "could not create document directory"
            );
        }

        let links = self.load::<Link>().await.or_empty();
        let notes = self.load::<Note>().await.or_empty();
        let documents = self.load::<Document>().await.or_empty();
        let categories = self.load_or_seed(&self.inner.defaults.categories).await;
        let tags = self.load_or_seed(&self.inner.defaults.tags).await;

        // Records added while loading stay, after the stored ones. Ready is
        // published before the guard drops so no mutation lands in between.
        let early = {
            let mut data = self.inner.data.write().await;
            let early = [
                install(&mut data, links),
                install(&mut data, categories),
                install(&mut data, tags),
                install(&mut data, notes),
                install(&mut data, documents),
            ];
            self.mark_ready();
            early
        };

        for kind in early.into_iter().flatten() {
            debug!(collection = %kind, "persisting records added before ready");
            self.schedule_flush(kind);
        }
    }

    async fn load<E: Stored>(&self) -> Loaded<E> {
        let key = self.inner.keys.key(E::KIND);
        match self.inner.kv.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<E>>(&raw) {
                Ok(items) => {
                    debug!(collection = %E::KIND, count = items.len(), "loaded");
                    Loaded::Found(items)
                }
                Err(e) => {
                    warn!(collection = %E::KIND, %key, error = %e, "stored collection is malformed");
                    Loaded::Unreadable
                }
            },
            Ok(None) => Loaded::Missing,
            Err(e) => {
                warn!(collection = %E::KIND, %key, error = %e, "could not read stored collection");
                Loaded::Unreadable
            }
        }
    }

    /// Load a collection that has defaults. Absent: seed and persist.
    /// Unreadable: defaults in memory only, so the stored value is left for
    /// inspection until the next mutation overwrites it.
    async fn load_or_seed<E: Stored>(&self, defaults: &[E]) -> Vec<E> {
        match self.load::<E>().await {
            Loaded::Found(items) => items,
            Loaded::Missing => {
                info!(collection = %E::KIND, count = defaults.len(), "seeding defaults");
                if let Err(e) = self.inner.store(E::KIND, defaults).await {
                    error!(collection = %E::KIND, error = %e, "could not persist defaults");
                }
                defaults.to_vec()
            }
            Loaded::Unreadable => {
                warn!(collection = %E::KIND, "using defaults without persisting");
                defaults.to_vec()
            }
        }
    }

    /// Write one collection in the background.
    pub(super) fn schedule_flush(&self, kind: CollectionKind) {
        let inner = Arc::clone(&self.inner);
        self.inner.flushes.spawn(async move {
            if let Err(e) = inner.flush(kind).await {
                error!(collection = %kind, error = %e, "flush failed, in-memory state kept");
            }
        });
    }

    /// Wait for every flush scheduled so far to finish. Not meant to be called
    /// from several tasks at once; `reset_all` calls it too.
    pub async fn flush_pending(&self) {
        let flushes = &self.inner.flushes;
        flushes.close();
        flushes.wait().await;
        flushes.reopen();
    }

    /// Restore the first-run state.
    ///
    /// Links and notes are emptied, categories and tags go back to the
    /// defaults, every document file is removed (failures are logged and
    /// skipped) and the documents are dropped. Storage is then brought in
    /// line: defaults written, item keys removed. Storage errors are logged
    /// and the first one is returned; memory is reset regardless.
    pub async fn reset_all(&self) -> Result<()> {
        let documents = {
            let mut data = self.inner.data.write().await;
            data.links.clear();
            data.notes.clear();
            data.categories = self.inner.defaults.categories.clone();
            data.tags = self.inner.defaults.tags.clone();
            data.documents.clone()
        };

        let mut files_removed = 0;
        for document in &documents {
            if let Some(path) = document.owned_file() {
                if self.remove_owned_file(path).await {
                    files_removed += 1;
                }
            }
        }

        // Documents imported since the reset started are kept.
        self.inner
            .data
            .write()
            .await
            .documents
            .retain(|d| !documents.iter().any(|old| old.id == d.id));

        // Flushes scheduled before the reset must land before its writes.
        self.flush_pending().await;

        let mut outcome = Ok(());
        for kind in CollectionKind::ALL {
            if let Err(e) = self.inner.sync_after_reset(kind).await {
                error!(collection = %kind, error = %e, "reset: storage write failed");
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        info!(documents = documents.len(), files_removed, "reset to defaults");
        self.inner.events.emit(RepositoryEvent::Reset);
        outcome
    }
}

/// Put `loaded` in place of the collection, keeping records added before it
/// arrived. Returns the kind when such records existed.
fn install<E: Stored>(data: &mut Snapshot, loaded: Vec<E>) -> Option<CollectionKind> {
    let early = std::mem::replace(E::collection_mut(data), loaded);
    if early.is_empty() {
        return None;
    }
    E::collection_mut(data).extend(early);
    Some(E::KIND)
}

impl Inner {
    /// Write the collection as it is now. Flushes of the same collection
    /// never overlap.
    async fn flush(&self, kind: CollectionKind) -> Result<()> {
        let _guard = self.flush_locks[kind.index()].lock().await;
        let payload = self.data.read().await.to_json(kind)?;
        let key = self.keys.key(kind);
        self.kv.set(&key, &payload).await?;
        debug!(collection = %kind, %key, bytes = payload.len(), "flushed");
        Ok(())
    }

    async fn store<T: Serialize>(&self, kind: CollectionKind, items: &[T]) -> Result<()> {
        let _guard = self.flush_locks[kind.index()].lock().await;
        let payload = serde_json::to_string(items)?;
        self.kv.set(&self.keys.key(kind), &payload).await
    }

    /// Empty item collections lose their key; everything else is written.
    async fn sync_after_reset(&self, kind: CollectionKind) -> Result<()> {
        let _guard = self.flush_locks[kind.index()].lock().await;
        let key = self.keys.key(kind);
        let payload = {
            let data = self.data.read().await;
            let removable = matches!(
                kind,
                CollectionKind::Links | CollectionKind::Notes | CollectionKind::Documents
            );
            if removable && data.is_empty(kind) {
                None
            } else {
                Some(data.to_json(kind)?)
            }
        };

        match payload {
            Some(payload) => self.kv.set(&key, &payload).await,
            None => {
                debug!(collection = %kind, %key, "removing key");
                self.kv.remove(&key).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entity::{LinkDraft, NoteDraft};
    use crate::storage::{MemoryFileStore, MemoryKvStore};

    fn setup() -> (Repository, Arc<MemoryKvStore>) {
        let kv = Arc::new(MemoryKvStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let repo = Repository::new(kv.clone(), files, &Config::with_data_dir("/data"));
        (repo, kv)
    }

    #[tokio::test]
    async fn test_first_run_seeds_and_persists_defaults() {
        let (repo, kv) = setup();
        repo.init().await;

        let snapshot = repo.snapshot().await;
        assert_eq!(snapshot.categories.len(), 4);
        assert_eq!(snapshot.tags.len(), 3);
        assert!(kv.raw("@linknest:categories").await.is_some());
        assert!(kv.raw("@linknest:tags").await.is_some());
        assert!(kv.raw("@linknest:links").await.is_none());
    }

    #[tokio::test]
    async fn test_second_init_is_noop() {
        let (repo, kv) = setup();
        repo.init().await;
        let writes = kv.write_count();

        repo.init().await;
        assert_eq!(kv.write_count(), writes);
        assert_eq!(repo.snapshot().await.categories.len(), 4);
    }

    #[tokio::test]
    async fn test_mutations_before_ready_are_not_flushed() {
        let (repo, kv) = setup();
        let link = repo.add::<Link>(LinkDraft::new("https://early.com", "Early")).await;
        repo.flush_pending().await;
        assert_eq!(kv.write_count(), 0);

        repo.init().await;
        repo.flush_pending().await;

        let snapshot = repo.snapshot().await;
        assert_eq!(snapshot.links, vec![link.clone()]);
        let stored: Vec<Link> = serde_json::from_str(&kv.raw("@linknest:links").await.unwrap()).unwrap();
        assert_eq!(stored, vec![link]);
    }

    #[tokio::test]
    async fn test_concurrent_flushes_converge_on_latest() {
        let (repo, kv) = setup();
        repo.init().await;

        for i in 0..20 {
            repo.add::<Note>(NoteDraft::new(format!("n{}", i), "")).await;
        }
        repo.flush_pending().await;

        let stored: Vec<Note> = serde_json::from_str(&kv.raw("@linknest:notes").await.unwrap()).unwrap();
        assert_eq!(stored, repo.list::<Note>().await);
        assert_eq!(stored.len(), 20);
    }

    #[tokio::test]
    async fn test_malformed_categories_fall_back_without_persisting() {
        let (repo, kv) = setup();
        kv.insert_raw("@linknest:categories", "{not json").await;
        kv.insert_raw("@linknest:links", "[42]").await;

        repo.init().await;

        assert_eq!(repo.snapshot().await.categories.len(), 4);
        assert!(repo.list::<Link>().await.is_empty());
        assert_eq!(kv.raw("@linknest:categories").await.as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory() {
        let (repo, kv) = setup();
        repo.init().await;
        kv.set_simulate_write_error(true);

        let note = repo.add::<Note>(NoteDraft::new("kept", "")).await;
        repo.flush_pending().await;

        assert_eq!(repo.get::<Note>(note.id).await, Some(note));
        assert!(kv.raw("@linknest:notes").await.is_none());
    }

    #[tokio::test]
    async fn test_reset_returns_storage_error() {
        let (repo, kv) = setup();
        repo.init().await;
        repo.add::<Link>(LinkDraft::new("https://a.com", "A")).await;
        repo.flush_pending().await;

        kv.set_simulate_write_error(true);
        assert!(repo.reset_all().await.is_err());
        assert!(repo.list::<Link>().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_waits_for_scheduled_flushes() {
        let (repo, kv) = setup();
        repo.init().await;
        repo.add::<Link>(LinkDraft::new("https://a.com", "A")).await;
        repo.add::<Note>(NoteDraft::new("N", "")).await;

        repo.reset_all().await.unwrap();
        repo.flush_pending().await;

        assert!(kv.raw("@linknest:links").await.is_none());
        assert!(kv.raw("@linknest:notes").await.is_none());
        assert!(kv.raw("@linknest:categories").await.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_adds_racing_init_are_all_persisted() {
        let (repo, kv) = setup();

        let mut adds = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            adds.push(tokio::spawn(async move {
                repo.add::<Note>(NoteDraft::new(format!("n{}", i), "")).await
            }));
        }
        repo.init().await;
        for add in adds {
            add.await.unwrap();
        }
        repo.flush_pending().await;

        let mut stored: Vec<Note> =
            serde_json::from_str(&kv.raw("@linknest:notes").await.unwrap()).unwrap();
        let mut listed = repo.list::<Note>().await;
        assert_eq!(listed.len(), 32);
        stored.sort_by_key(|n| n.id);
        listed.sort_by_key(|n| n.id);
        assert_eq!(stored, listed);
    }
}
