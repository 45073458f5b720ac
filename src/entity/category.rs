// src/entity/category.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CollectionKind, Entity};

/// A user-defined grouping for links, notes, and documents.
///
/// Names are expected to be unique (case-insensitive), but that is checked by
/// callers before adding, not by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Hex color, e.g. "#4285F4"
    pub color: String,
    /// Icon name understood by the front end
    pub icon: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl Entity for Category {
    const KIND: CollectionKind = CollectionKind::Categories;

    type Draft = CategoryDraft;
    type Patch = CategoryPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(draft: CategoryDraft, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
            icon: draft.icon,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
    }
}

const DEFAULT_CATEGORIES: [(&str, &str, &str); 4] = [
    ("Work", "#4285F4", "briefcase"),
    ("Personal", "#EA4335", "person"),
    ("Education", "#FBBC05", "school"),
    ("Entertainment", "#34A853", "play"),
];

/// The categories a fresh install (or a reset) starts with.
pub fn default_categories(now: DateTime<Utc>) -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color, icon)| Category::create(CategoryDraft::new(*name, *color, *icon), Uuid::new_v4(), now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::now_millis;

    #[test]
    fn test_default_categories() {
        let categories = default_categories(now_millis());
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Work", "Personal", "Education", "Entertainment"]);
        assert_eq!(categories[0].icon, "briefcase");
        assert_eq!(categories[3].color, "#34A853");
    }

    #[test]
    fn test_touch_leaves_created_at_alone() {
        let now = now_millis();
        let mut category = Category::create(CategoryDraft::new("Work", "#000", "folder"), Uuid::new_v4(), now);
        category.touch(now + chrono::Duration::seconds(10));
        assert_eq!(category.created_at, now);
    }
}
