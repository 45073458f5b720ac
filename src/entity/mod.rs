mod category;
mod document;
mod link;
mod note;
mod resource;
pub(crate) mod soft_ref;
mod tag;

pub use category::{default_categories, Category, CategoryDraft, CategoryPatch};
pub use document::{display_type, format_file_size, stored_file_name, Document, DocumentDraft, DocumentPatch};
pub use link::{display_url, ensure_protocol, extract_domain, Link, LinkDraft, LinkPatch};
pub use note::{Note, NoteDraft, NotePatch};
pub use resource::{Resource, ResourceKind};
pub use tag::{default_tags, Tag, TagDraft, TagPatch};

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five persisted collections, one storage key each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Links,
    Categories,
    Tags,
    Notes,
    Documents,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Links,
        CollectionKind::Categories,
        CollectionKind::Tags,
        CollectionKind::Notes,
        CollectionKind::Documents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Links => "links",
            CollectionKind::Categories => "categories",
            CollectionKind::Tags => "tags",
            CollectionKind::Notes => "notes",
            CollectionKind::Documents => "documents",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            CollectionKind::Links => 0,
            CollectionKind::Categories => 1,
            CollectionKind::Tags => 2,
            CollectionKind::Notes => 3,
            CollectionKind::Documents => 4,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "links" | "link" => Ok(CollectionKind::Links),
            "categories" | "category" => Ok(CollectionKind::Categories),
            "tags" | "tag" => Ok(CollectionKind::Tags),
            "notes" | "note" => Ok(CollectionKind::Notes),
            "documents" | "document" | "docs" | "doc" => Ok(CollectionKind::Documents),
            _ => Err(format!("Unknown collection: {}", s)),
        }
    }
}

/// A record kind the repository stores.
///
/// `Draft` is the payload of an add (everything but id and timestamps),
/// `Patch` the partial payload of an update.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: CollectionKind;

    type Draft: Send;
    type Patch: Send;

    fn id(&self) -> Uuid;

    /// Build a new record from a draft. `now` stamps every timestamp field.
    fn create(draft: Self::Draft, id: Uuid, now: DateTime<Utc>) -> Self;

    /// Merge the fields present in `patch` over this record.
    fn apply(&mut self, patch: Self::Patch);

    /// Refresh `updated_at` after an update. Kinds without one ignore it.
    fn touch(&mut self, _now: DateTime<Utc>) {}

    /// File in the document directory whose lifetime is tied to this record.
    fn owned_file(&self) -> Option<&Path> {
        None
    }
}

/// Entities carrying an `is_favorite` flag (links, notes, documents).
pub trait Favorite: Entity {
    fn is_favorite(&self) -> bool;

    fn favorite_patch(is_favorite: bool) -> Self::Patch;
}

/// Current time truncated to whole milliseconds, the precision records are
/// stored with.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Next `updated_at` value: `now`, or one millisecond past `previous` when the
/// clock has not moved beyond it.
pub(crate) fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
