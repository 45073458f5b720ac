// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{advance, soft_ref, CollectionKind, Entity, Favorite};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
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
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub is_favorite: bool,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Option<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    pub is_favorite: Option<bool>,
}

impl Entity for Note {
    const KIND: CollectionKind = CollectionKind::Notes;

    type Draft = NoteDraft;
    type Patch = NotePatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(draft: NoteDraft, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            category: draft.category,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            is_favorite: draft.is_favorite,
        }
    }

    fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
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
}

impl Favorite for Note {
    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn favorite_patch(is_favorite: bool) -> NotePatch {
        NotePatch {
            is_favorite: Some(is_favorite),
            ..NotePatch::default()
        }
    }
}
