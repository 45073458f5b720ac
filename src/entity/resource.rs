// src/entity/resource.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Document, Link, Note};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Link,
    Note,
    Document,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Link => write!(f, "link"),
            ResourceKind::Note => write!(f, "note"),
            ResourceKind::Document => write!(f, "document"),
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "link" | "links" => Ok(ResourceKind::Link),
            "note" | "notes" => Ok(ResourceKind::Note),
            "document" | "documents" | "doc" | "docs" => Ok(ResourceKind::Document),
            _ => Err(format!("Unknown item type: {}", s)),
        }
    }
}

/// Any saved item, for views that mix links, notes, and documents.
///
/// The repository keeps the three collections separate; this type only
/// exists for consumers that need to treat them uniformly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resource {
    Link(Link),
    Note(Note),
    Document(Document),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Link(_) => ResourceKind::Link,
            Resource::Note(_) => ResourceKind::Note,
            Resource::Document(_) => ResourceKind::Document,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Resource::Link(link) => link.id,
            Resource::Note(note) => note.id,
            Resource::Document(doc) => doc.id,
        }
    }

    /// Title for links and notes, file name for documents.
    pub fn title(&self) -> &str {
        match self {
            Resource::Link(link) => &link.title,
            Resource::Note(note) => &note.title,
            Resource::Document(doc) => &doc.name,
        }
    }

    pub fn category(&self) -> Option<Uuid> {
        match self {
            Resource::Link(link) => link.category,
            Resource::Note(note) => note.category,
            Resource::Document(doc) => doc.category,
        }
    }

    pub fn tags(&self) -> &[Uuid] {
        match self {
            Resource::Link(link) => &link.tags,
            Resource::Note(note) => &note.tags,
            Resource::Document(doc) => &doc.tags,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Resource::Link(link) => link.created_at,
            Resource::Note(note) => note.created_at,
            Resource::Document(doc) => doc.created_at,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Resource::Link(link) => link.updated_at,
            Resource::Note(note) => note.updated_at,
            Resource::Document(doc) => doc.updated_at,
        }
    }

    pub fn is_favorite(&self) -> bool {
        match self {
            Resource::Link(link) => link.is_favorite,
            Resource::Note(note) => note.is_favorite,
            Resource::Document(doc) => doc.is_favorite,
        }
    }
}

impl From<Link> for Resource {
    fn from(link: Link) -> Self {
        Resource::Link(link)
    }
}

impl From<Note> for Resource {
    fn from(note: Note) -> Self {
        Resource::Note(note)
    }
}

impl From<Document> for Resource {
    fn from(doc: Document) -> Self {
        Resource::Document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{now_millis, Entity, NoteDraft};

    #[test]
    fn test_resource_serializes_with_kind_tag() {
        let note = Note::create(NoteDraft::new("Groceries", "milk"), Uuid::new_v4(), now_millis());
        let resource = Resource::from(note.clone());
        assert_eq!(resource.kind(), ResourceKind::Note);
        assert_eq!(resource.title(), "Groceries");

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value.get("kind").unwrap(), "note");
        assert_eq!(value.get("content").unwrap(), "milk");
    }
}
