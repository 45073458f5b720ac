use std::path::{Path, PathBuf};

use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::Repository;
use crate::entity::{display_type, now_millis, stored_file_name, Document, DocumentDraft};
use crate::error::{LinkNestError, Result};

/// A file to copy into the document directory and register as a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentImport {
    /// File to copy. It stays where it is.
    pub source: PathBuf,
    /// Display name; the source file name when unset.
    pub name: Option<String>,
    pub mime_type: Option<String>,
    /// Size to record; the number of bytes copied when unset.
    pub size: Option<u64>,
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub is_favorite: bool,
}

impl DocumentImport {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

impl Repository {
    /// Copy a file into the document directory and add a document for it.
    ///
    /// The copy is named `<millis>_<name>`. A missing source or a failed copy
    /// is returned as an error and nothing is added.
    pub async fn import_document(&self, import: DocumentImport) -> Result<Document> {
        let files = &self.inner.files;
        if !files.exists(&import.source).await? {
            return Err(LinkNestError::SourceMissing(import.source));
        }
        self.ensure_documents_dir().await?;

        let name = import
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                import
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            });

        let mut stamp = now_millis();
        let mut dest = self.inner.documents_dir.join(stored_file_name(stamp, name.as_deref()));
        while files.exists(&dest).await? {
            stamp += Duration::milliseconds(1);
            dest = self.inner.documents_dir.join(stored_file_name(stamp, name.as_deref()));
        }

        let copied = files.copy_file(&import.source, &dest).await.map_err(|e| {
            warn!(
                src = %import.source.display(),
                dest = %dest.display(),
                error = %e,
                "document copy failed"
            );
            e
        })?;

        let name = name.unwrap_or_else(|| format!("Document_{}", stamp.timestamp_millis()));
        let mime_type = import.mime_type.filter(|m| !m.trim().is_empty());
        let doc_type = display_type(mime_type.as_deref(), &name);

        let document = self
            .add::<Document>(DocumentDraft {
                name,
                uri: dest.to_string_lossy().into_owned(),
                doc_type,
                mime_type,
                size: import.size.unwrap_or(copied),
                category: import.category,
                tags: import.tags,
                is_favorite: import.is_favorite,
            })
            .await;

        info!(id = %document.id, path = %dest.display(), size = document.size, "document imported");
        Ok(document)
    }

    pub(super) async fn ensure_documents_dir(&self) -> Result<()> {
        let dir = &self.inner.documents_dir;
        if !self.inner.files.exists(dir).await? {
            debug!(path = %dir.display(), "creating document directory");
            self.inner.files.mkdir(dir).await?;
        }
        Ok(())
    }

    /// Unlink a document's file if it is still there. Returns whether the
    /// file is gone afterwards; failures are logged, never raised.
    pub(super) async fn remove_owned_file(&self, path: &Path) -> bool {
        let files = &self.inner.files;
        match files.exists(path).await {
            Ok(false) => {
                debug!(path = %path.display(), "document file already gone");
                true
            }
            Ok(true) => match files.unlink(path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "document file removed");
                    true
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not remove document file");
                    false
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not check document file");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::{MemoryFileStore, MemoryKvStore};
    use std::sync::Arc;

    async fn setup() -> (Repository, Arc<MemoryFileStore>) {
        let kv = Arc::new(MemoryKvStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let repo = Repository::open(kv, files.clone(), &Config::with_data_dir("/data")).await;
        (repo, files)
    }

    #[tokio::test]
    async fn test_init_creates_documents_dir() {
        let (_repo, files) = setup().await;
        assert!(files.contains_dir(Path::new("/data/LinkNestDocuments")).await);
    }

    #[tokio::test]
    async fn test_import_copies_with_timestamp_prefix() {
        let (repo, files) = setup().await;
        files.put_file("/picker/report.pdf", vec![0u8; 2048]).await;

        let mut import = DocumentImport::new("/picker/report.pdf");
        import.mime_type = Some("application/pdf".to_string());
        let doc = repo.import_document(import).await.unwrap();

        assert_eq!(doc.name, "report.pdf");
        assert_eq!(doc.doc_type, "pdf");
        assert_eq!(doc.size, 2048);
        assert!(doc.uri.starts_with("/data/LinkNestDocuments/"));
        assert!(doc.uri.ends_with("_report.pdf"));
        assert!(files.contains_file(Path::new(&doc.uri)).await);
        assert!(files.contains_file(Path::new("/picker/report.pdf")).await);
    }

    #[tokio::test]
    async fn test_same_name_imports_get_distinct_files() {
        let (repo, files) = setup().await;
        files.put_file("/picker/a.txt", b"a".to_vec()).await;

        let first = repo.import_document(DocumentImport::new("/picker/a.txt")).await.unwrap();
        let second = repo.import_document(DocumentImport::new("/picker/a.txt")).await.unwrap();
        assert_ne!(first.uri, second.uri);
        assert_eq!(first.doc_type, "txt");
    }

    #[tokio::test]
    async fn test_import_missing_source_adds_nothing() {
        let (repo, _files) = setup().await;
        let result = repo.import_document(DocumentImport::new("/picker/gone.png")).await;
        assert!(matches!(result, Err(LinkNestError::SourceMissing(_))));
        assert!(repo.list::<Document>().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unlinks_file() {
        let (repo, files) = setup().await;
        files.put_file("/picker/a.txt", b"abc".to_vec()).await;
        let doc = repo.import_document(DocumentImport::new("/picker/a.txt")).await.unwrap();

        assert!(repo.delete::<Document>(doc.id).await);
        assert!(!files.contains_file(Path::new(&doc.uri)).await);
    }

    #[tokio::test]
    async fn test_delete_survives_unlink_error() {
        let (repo, files) = setup().await;
        files.put_file("/picker/a.txt", b"abc".to_vec()).await;
        let doc = repo.import_document(DocumentImport::new("/picker/a.txt")).await.unwrap();

        files.set_simulate_unlink_error(true);
        assert!(repo.delete::<Document>(doc.id).await);
        assert!(repo.get::<Document>(doc.id).await.is_none());
        assert!(files.contains_file(Path::new(&doc.uri)).await);
    }
}
