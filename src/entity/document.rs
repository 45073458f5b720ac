// src/entity/document.rs
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{advance, soft_ref, CollectionKind, Entity, Favorite};

/// A file imported into the app-private document directory.
///
/// The repository owns the file at `uri`: deleting the record (or resetting)
/// removes the file as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    /// Original file name, shown to the user
    pub name: String,
    /// Path of the stored copy
    pub uri: String,
    /// Short display type ("pdf", "jpg", ...)
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default, with = "soft_ref::category")]
    pub category: Option<Uuid>,
    #[serde(default, with = "soft_ref::tags")]
    pub tags: Vec<Uuid>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentDraft {
    pub name: String,
    pub uri: String,
    pub doc_type: String,
    pub mime_type: Option<String>,
    pub size: u64,
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub doc_type: Option<String>,
    pub mime_type: Option<Option<String>>,
    pub size: Option<u64>,
    pub category: Option<Option<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    pub is_favorite: Option<bool>,
}

impl Entity for Document {
    const KIND: CollectionKind = CollectionKind::Documents;

    type Draft = DocumentDraft;
    type Patch = DocumentPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(draft: DocumentDraft, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            uri: draft.uri,
            doc_type: draft.doc_type,
            mime_type: draft.mime_type,
            size: draft.size,
            category: draft.category,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            is_favorite: draft.is_favorite,
        }
    }

    fn apply(&mut self, patch: DocumentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(uri) = patch.uri {
            self.uri = uri;
        }
        if let Some(doc_type) = patch.doc_type {
            self.doc_type = doc_type;
        }
        if let Some(mime_type) = patch.mime_type {
            self.mime_type = mime_type;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = advance(self.updated_at, now);
    }

    fn owned_file(&self) -> Option<&Path> {
        if self.uri.is_empty() {
            None
        } else {
            Some(Path::new(&self.uri))
        }
    }
}

impl Favorite for Document {
    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn favorite_patch(is_favorite: bool) -> DocumentPatch {
        DocumentPatch {
            is_favorite: Some(is_favorite),
            ..DocumentPatch::default()
        }
    }
}

/// Short, user-facing type for a file.
///
/// Well-known MIME types collapse to an extension-like label. Without a MIME
/// type the file extension is used.
pub fn display_type(mime_type: Option<&str>, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();
    let raw = match mime_type {
        Some(mime) if !mime.is_empty() => mime,
        _ => extension,
    };

    if raw.contains("image/jpeg") || raw.contains("image/jpg") {
        "jpg".to_string()
    } else if raw.contains("image/png") {
        "png".to_string()
    } else if raw.contains("image/") {
        raw.replace("image/", "")
    } else if raw.contains("application/pdf") {
        "pdf".to_string()
    } else if raw.contains("application/msword")
        || raw.contains("application/vnd.openxmlformats-officedocument.wordprocessingml")
    {
        "doc".to_string()
    } else if raw.contains("application/vnd.ms-excel")
        || raw.contains("application/vnd.openxmlformats-officedocument.spreadsheetml")
    {
        "xls".to_string()
    } else if raw.contains("application/vnd.ms-powerpoint")
        || raw.contains("application/vnd.openxmlformats-officedocument.presentationml")
    {
        "ppt".to_string()
    } else if raw.contains("text/plain") {
        "txt".to_string()
    } else {
        raw.to_string()
    }
}

/// Human-readable size: bytes, then KB/MB with one decimal.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// File name for a stored copy: the original name prefixed with the import
/// time in milliseconds, which keeps names unique inside the directory.
pub fn stored_file_name(imported_at: DateTime<Utc>, original: Option<&str>) -> String {
    let millis = imported_at.timestamp_millis();
    match original.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{}_{}", millis, name),
        None => format!("{}_document", millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_type_from_mime() {
        assert_eq!(display_type(Some("image/jpeg"), "a.jpeg"), "jpg");
        assert_eq!(display_type(Some("image/png"), "a.png"), "png");
        assert_eq!(display_type(Some("image/webp"), "a.webp"), "webp");
        assert_eq!(display_type(Some("application/pdf"), "a.pdf"), "pdf");
        assert_eq!(
            display_type(
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
                "a.docx"
            ),
            "doc"
        );
        assert_eq!(display_type(Some("application/vnd.ms-excel"), "a.xls"), "xls");
        assert_eq!(display_type(Some("application/vnd.ms-powerpoint"), "a.ppt"), "ppt");
        assert_eq!(display_type(Some("text/plain"), "a.txt"), "txt");
        assert_eq!(display_type(Some("application/zip"), "a.zip"), "application/zip");
    }

    #[test]
    fn test_display_type_falls_back_to_extension() {
        assert_eq!(display_type(None, "report.pdf"), "pdf");
        assert_eq!(display_type(Some(""), "archive.tar.gz"), "gz");
        assert_eq!(display_type(None, "README"), "");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_stored_file_name() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(stored_file_name(at, Some("report.pdf")), "1700000000123_report.pdf");
        assert_eq!(stored_file_name(at, Some("  ")), "1700000000123_document");
        assert_eq!(stored_file_name(at, None), "1700000000123_document");
    }

    #[test]
    fn test_type_field_name_on_the_wire() {
        let doc = Document::create(
            DocumentDraft {
                name: "a.pdf".to_string(),
                uri: "/docs/1_a.pdf".to_string(),
                doc_type: "pdf".to_string(),
                mime_type: Some("application/pdf".to_string()),
                size: 10,
                ..DocumentDraft::default()
            },
            Uuid::new_v4(),
            crate::entity::now_millis(),
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value.get("type").unwrap(), "pdf");
        assert_eq!(value.get("mimeType").unwrap(), "application/pdf");
        assert_eq!(doc.owned_file(), Some(Path::new("/docs/1_a.pdf")));
    }
}
