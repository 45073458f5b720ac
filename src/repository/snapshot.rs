use serde::Serialize;
use uuid::Uuid;

use crate::entity::{Category, CollectionKind, Document, Entity, Link, Note, Resource, Tag};
use crate::search::{parse_query, Filter};

/// The five collections at one instant.
///
/// The repository keeps its live state in a `Snapshot`; callers receive
/// clones and never mutate the repository through them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub links: Vec<Link>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub notes: Vec<Note>,
    pub documents: Vec<Document>,
}

/// Gives generic code access to the collection an entity kind lives in.
pub trait Stored: Entity {
    fn collection(snapshot: &Snapshot) -> &Vec<Self>;

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

impl Stored for Link {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.links
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.links
    }
}

impl Stored for Category {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.categories
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.categories
    }
}

impl Stored for Tag {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.tags
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.tags
    }
}

impl Stored for Note {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.notes
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.notes
    }
}

impl Stored for Document {
    fn collection(snapshot: &Snapshot) -> &Vec<Self> {
        &snapshot.documents
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.documents
    }
}

impl Snapshot {
    pub fn get<E: Stored>(&self, id: Uuid) -> Option<&E> {
        E::collection(self).iter().find(|item| item.id() == id)
    }

    pub fn len(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Links => self.links.len(),
            CollectionKind::Categories => self.categories.len(),
            CollectionKind::Tags => self.tags.len(),
            CollectionKind::Notes => self.notes.len(),
            CollectionKind::Documents => self.documents.len(),
        }
    }

    pub fn is_empty(&self, kind: CollectionKind) -> bool {
        self.len(kind) == 0
    }

    /// Serialize one collection the way it is stored.
    pub fn to_json(&self, kind: CollectionKind) -> serde_json::Result<String> {
        match kind {
            CollectionKind::Links => serde_json::to_string(&self.links),
            CollectionKind::Categories => serde_json::to_string(&self.categories),
            CollectionKind::Tags => serde_json::to_string(&self.tags),
            CollectionKind::Notes => serde_json::to_string(&self.notes),
            CollectionKind::Documents => serde_json::to_string(&self.documents),
        }
    }

    // ========================================================================
    // Soft reference resolution
    // ========================================================================

    /// Resolve a category reference. Dangling references resolve to `None`.
    pub fn category(&self, id: Option<Uuid>) -> Option<&Category> {
        let id = id?;
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn tag(&self, id: Uuid) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Resolve tag references in order, skipping ones that no longer exist.
    pub fn tags_for(&self, ids: &[Uuid]) -> Vec<&Tag> {
        ids.iter().filter_map(|id| self.tag(*id)).collect()
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        let needle = name.trim().to_lowercase();
        self.categories.iter().find(|c| c.name.to_lowercase() == needle)
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        let needle = name.trim().to_lowercase();
        self.tags.iter().find(|t| t.name.to_lowercase() == needle)
    }

    /// Whether another category already uses `name` (trimmed, case-insensitive).
    /// `except` skips the category being renamed.
    pub fn category_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.category_by_name(name).is_some_and(|c| Some(c.id) != except)
    }

    pub fn tag_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.tag_by_name(name).is_some_and(|t| Some(t.id) != except)
    }

    /// Number of links, notes, and documents filed under a category.
    pub fn category_usage(&self, id: Uuid) -> usize {
        self.links.iter().filter(|l| l.category == Some(id)).count()
            + self.notes.iter().filter(|n| n.category == Some(id)).count()
            + self.documents.iter().filter(|d| d.category == Some(id)).count()
    }

    /// Number of links, notes, and documents carrying a tag.
    pub fn tag_usage(&self, id: Uuid) -> usize {
        self.links.iter().filter(|l| l.tags.contains(&id)).count()
            + self.notes.iter().filter(|n| n.tags.contains(&id)).count()
            + self.documents.iter().filter(|d| d.tags.contains(&id)).count()
    }

    // ========================================================================
    // Unified views
    // ========================================================================

    /// Links, notes, and documents as one list, in collection order.
    pub fn resources(&self) -> Vec<Resource> {
        self.links
            .iter()
            .cloned()
            .map(Resource::from)
            .chain(self.notes.iter().cloned().map(Resource::from))
            .chain(self.documents.iter().cloned().map(Resource::from))
            .collect()
    }

    /// Most recently updated items across all kinds.
    pub fn recent(&self, limit: usize) -> Vec<Resource> {
        let mut items = self.resources();
        by_last_update(&mut items);
        items.truncate(limit);
        items
    }

    /// Favorite items across all kinds, most recently updated first.
    pub fn favorites(&self, limit: usize) -> Vec<Resource> {
        let mut items: Vec<Resource> = self
            .resources()
            .into_iter()
            .filter(|r| r.is_favorite())
            .collect();
        by_last_update(&mut items);
        items.truncate(limit);
        items
    }

    /// Search all items with a query string such as
    /// `"type:link tag:reference is:favorite rust"`.
    ///
    /// Category and tag names are matched case-insensitively. A name that
    /// resolves to nothing matches no items.
    pub fn search(&self, raw: &str) -> Vec<Resource> {
        let (text, terms) = parse_query(raw);

        let category = match terms.category.as_deref() {
            Some(name) => match self.category_by_name(name) {
                Some(c) => Some(c.id),
                None => return Vec::new(),
            },
            None => None,
        };

        let mut tags = Vec::with_capacity(terms.tags.len());
        for name in &terms.tags {
            match self.tag_by_name(name) {
                Some(tag) => tags.push(tag.id),
                None => return Vec::new(),
            }
        }

        let filter = Filter {
            text: Some(text),
            category,
            tags,
            tag_match: terms.tag_match,
            favorites_only: terms.favorites_only,
            created_after: terms.created_after,
            created_before: terms.created_before,
        };

        let mut hits: Vec<Resource> = self
            .resources()
            .into_iter()
            .filter(|r| terms.kind.map_or(true, |kind| r.kind() == kind))
            .filter(|r| filter.matches(r))
            .collect();
        terms.sort.unwrap_or_default().sort(&mut hits);
        hits
    }
}

fn by_last_update(items: &mut [Resource]) {
    items.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{
        default_categories, default_tags, now_millis, LinkDraft, NoteDraft, ResourceKind,
    };
    use chrono::Duration;

    fn sample() -> Snapshot {
        let now = now_millis();
        let categories = default_categories(now);
        let tags = default_tags(now);
        let work = categories[0].id;
        let important = tags[0].id;

        let mut rust = LinkDraft::new("https://www.rust-lang.org", "Rust");
        rust.category = Some(work);
        rust.tags = vec![important];
        rust.is_favorite = true;
        let rust = Link::create(rust, Uuid::new_v4(), now);

        let mut docs = LinkDraft::new("docs.rs", "Docs");
        docs.category = Some(Uuid::new_v4()); // dangling
        let docs = Link::create(docs, Uuid::new_v4(), now + Duration::seconds(1));

        let mut note = NoteDraft::new("Meeting", "Discuss the Rust roadmap");
        note.category = Some(work);
        let note = Note::create(note, Uuid::new_v4(), now + Duration::seconds(2));

        Snapshot {
            links: vec![rust, docs],
            categories,
            tags,
            notes: vec![note],
            documents: Vec::new(),
        }
    }

    #[test]
    fn test_dangling_category_resolves_to_none() {
        let snapshot = sample();
        let docs = &snapshot.links[1];
        assert!(snapshot.category(docs.category).is_none());
        assert!(snapshot.category(None).is_none());
        assert_eq!(snapshot.category(snapshot.links[0].category).unwrap().name, "Work");
    }

    #[test]
    fn test_tags_for_skips_missing() {
        let snapshot = sample();
        let ids = vec![snapshot.tags[1].id, Uuid::new_v4(), snapshot.tags[0].id];
        let names: Vec<&str> = snapshot.tags_for(&ids).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Reference", "Important"]);
    }

    #[test]
    fn test_usage_counts() {
        let snapshot = sample();
        assert_eq!(snapshot.category_usage(snapshot.categories[0].id), 2);
        assert_eq!(snapshot.category_usage(snapshot.categories[1].id), 0);
        assert_eq!(snapshot.tag_usage(snapshot.tags[0].id), 1);
    }

    #[test]
    fn test_name_taken_is_case_insensitive() {
        let snapshot = sample();
        let work = snapshot.categories[0].id;
        assert!(snapshot.category_name_taken("  work ", None));
        assert!(!snapshot.category_name_taken("Work", Some(work)));
        assert!(!snapshot.category_name_taken("Hobbies", None));
        assert!(snapshot.tag_name_taken("TUTORIAL", None));
    }

    #[test]
    fn test_recent_orders_across_kinds() {
        let snapshot = sample();
        let recent = snapshot.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].kind(), ResourceKind::Note);
        assert_eq!(recent[1].title(), "Docs");
    }

    #[test]
    fn test_recent_uses_last_update_for_notes() {
        let mut snapshot = sample();
        // The note is the newest record; touching the first link moves it ahead.
        snapshot.links[0].updated_at = snapshot.notes[0].created_at + Duration::seconds(5);
        let recent = snapshot.recent(1);
        assert_eq!(recent[0].title(), "Rust");
    }

    #[test]
    fn test_favorites() {
        let snapshot = sample();
        let favorites = snapshot.favorites(10);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title(), "Rust");
    }

    #[test]
    fn test_search_by_text_and_terms() {
        let snapshot = sample();

        let hits = snapshot.search("rust");
        assert_eq!(hits.len(), 2);

        let hits = snapshot.search("type:link rust");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title(), "Rust");

        let hits = snapshot.search("category:work sort:alphabetical");
        let titles: Vec<&str> = hits.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["Meeting", "Rust"]);

        assert_eq!(snapshot.search("tag:important").len(), 1);
        assert!(snapshot.search("tag:nonexistent").is_empty());
        assert!(snapshot.search("category:nowhere").is_empty());
        assert_eq!(snapshot.search("is:favorite").len(), 1);
    }

    #[test]
    fn test_to_json_round_trip() {
        let snapshot = sample();
        let json = snapshot.to_json(CollectionKind::Links).unwrap();
        let parsed: Vec<Link> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot.links);
    }
}
