// src/entity/tag.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CollectionKind, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct TagDraft {
    pub name: String,
    pub color: String,
}

impl TagDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl Entity for Tag {
    const KIND: CollectionKind = CollectionKind::Tags;

    type Draft = TagDraft;
    type Patch = TagPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(draft: TagDraft, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: TagPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

const DEFAULT_TAGS: [(&str, &str); 3] = [
    ("Important", "#FF5252"),
    ("Reference", "#448AFF"),
    ("Tutorial", "#9C27B0"),
];

pub fn default_tags(now: DateTime<Utc>) -> Vec<Tag> {
    DEFAULT_TAGS
        .iter()
        .map(|(name, color)| Tag::create(TagDraft::new(*name, *color), Uuid::new_v4(), now))
        .collect()
}
