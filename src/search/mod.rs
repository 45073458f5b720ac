//! Filtering, sorting, and query parsing for links, notes, and documents.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entity::{Document, Link, Note, Resource, ResourceKind};

/// Ordering applied to a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Latest first, by [`Searchable::sort_time`]
    #[default]
    Newest,
    /// Earliest first
    Oldest,
    /// By title (name for documents), case-insensitive
    Alphabetical,
    /// Favorites first, then newest
    Favorites,
}

impl SortOrder {
    /// Sort in place. Ties keep their existing relative order.
    pub fn sort<T: Searchable>(self, items: &mut [T]) {
        match self {
            SortOrder::Newest => items.sort_by(|a, b| b.sort_time().cmp(&a.sort_time())),
            SortOrder::Oldest => items.sort_by_key(|item| item.sort_time()),
            SortOrder::Alphabetical => items.sort_by_cached_key(|item| item.sort_title().to_lowercase()),
            SortOrder::Favorites => items.sort_by(|a, b| {
                b.is_favorite()
                    .cmp(&a.is_favorite())
                    .then_with(|| b.sort_time().cmp(&a.sort_time()))
            }),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Oldest => write!(f, "oldest"),
            SortOrder::Alphabetical => write!(f, "alphabetical"),
            SortOrder::Favorites => write!(f, "favorites"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "new" => Ok(SortOrder::Newest),
            "oldest" | "old" => Ok(SortOrder::Oldest),
            "alphabetical" | "alpha" | "az" => Ok(SortOrder::Alphabetical),
            "favorites" | "favorite" | "fav" => Ok(SortOrder::Favorites),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// How a tag filter with several tags is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMatch {
    /// Item carries at least one of the tags
    #[default]
    Any,
    /// Item carries every one of the tags
    All,
}

impl std::str::FromStr for TagMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(TagMatch::Any),
            "all" => Ok(TagMatch::All),
            _ => Err(format!("Unknown tag match mode: {} (expected any or all)", s)),
        }
    }
}

/// Fields the filters and sort orders look at.
pub trait Searchable {
    /// Whether any text field contains `needle`, which is already lowercase.
    fn contains_text(&self, needle: &str) -> bool;

    fn sort_title(&self) -> &str;

    fn category(&self) -> Option<Uuid>;

    fn tags(&self) -> &[Uuid];

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Timestamp the newest/oldest orders compare. Notes are ordered by
    /// creation, everything else by last update.
    fn sort_time(&self) -> DateTime<Utc> {
        self.updated_at()
    }

    fn is_favorite(&self) -> bool;
}

fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Searchable for Link {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.title, needle)
            || contains_lower(&self.url, needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_lower(d, needle))
    }

    fn sort_title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<Uuid> {
        self.category
    }

    fn tags(&self) -> &[Uuid] {
        &self.tags
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }
}

impl Searchable for Note {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.title, needle) || contains_lower(&self.content, needle)
    }

    fn sort_title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<Uuid> {
        self.category
    }

    fn tags(&self) -> &[Uuid] {
        &self.tags
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn sort_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }
}

impl Searchable for Document {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.name, needle) || contains_lower(&self.doc_type, needle)
    }

    fn sort_title(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<Uuid> {
        self.category
    }

    fn tags(&self) -> &[Uuid] {
        &self.tags
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }
}

impl Searchable for Resource {
    fn contains_text(&self, needle: &str) -> bool {
        match self {
            Resource::Link(link) => link.contains_text(needle),
            Resource::Note(note) => note.contains_text(needle),
            Resource::Document(doc) => doc.contains_text(needle),
        }
    }

    fn sort_title(&self) -> &str {
        self.title()
    }

    fn category(&self) -> Option<Uuid> {
        Resource::category(self)
    }

    fn tags(&self) -> &[Uuid] {
        Resource::tags(self)
    }

    fn created_at(&self) -> DateTime<Utc> {
        Resource::created_at(self)
    }

    fn updated_at(&self) -> DateTime<Utc> {
        Resource::updated_at(self)
    }

    fn sort_time(&self) -> DateTime<Utc> {
        match self {
            Resource::Link(link) => link.sort_time(),
            Resource::Note(note) => note.sort_time(),
            Resource::Document(doc) => doc.sort_time(),
        }
    }

    fn is_favorite(&self) -> bool {
        Resource::is_favorite(self)
    }
}

/// Constraints an item must satisfy to appear in a list.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Case-insensitive substring; blank matches everything
    pub text: Option<String>,
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub tag_match: TagMatch,
    pub favorites_only: bool,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.category.is_none()
            && self.tags.is_empty()
            && !self.favorites_only
            && self.created_after.is_none()
            && self.created_before.is_none()
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        if self.favorites_only && !item.is_favorite() {
            return false;
        }
        if let Some(category) = self.category {
            if item.category() != Some(category) {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let carried = item.tags();
            let ok = match self.tag_match {
                TagMatch::Any => self.tags.iter().any(|t| carried.contains(t)),
                TagMatch::All => self.tags.iter().all(|t| carried.contains(t)),
            };
            if !ok {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if item.created_at() < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if item.created_at() > before {
                return false;
            }
        }
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => item.contains_text(&text.to_lowercase()),
            _ => true,
        }
    }

    /// Clone the matching items and sort them.
    pub fn apply<T: Searchable + Clone>(&self, items: &[T], order: SortOrder) -> Vec<T> {
        let mut hits: Vec<T> = items.iter().filter(|item| self.matches(*item)).cloned().collect();
        order.sort(&mut hits);
        hits
    }
}

/// Structured terms pulled out of a query string.
///
/// Terms are written with prefixes:
/// - `type:link` - Only links, notes, or documents
/// - `category:work` - Filed under the named category
/// - `tag:important` - Carries the named tag (can specify multiple)
/// - `match:all` - Require every tag instead of any
/// - `is:favorite` - Favorites only
/// - `sort:alphabetical` - Result ordering
/// - `created:>2025-01-01` - Created after date
/// - `created:<2025-12-31` - Created before date
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryTerms {
    pub kind: Option<ResourceKind>,
    /// Category name, resolved by the caller
    pub category: Option<String>,
    /// Tag names, resolved by the caller
    pub tags: Vec<String>,
    pub tag_match: TagMatch,
    pub favorites_only: bool,
    pub sort: Option<SortOrder>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl QueryTerms {
    /// Check if any term was given.
    pub fn is_empty(&self) -> bool {
        *self == QueryTerms::default()
    }
}

/// Parse a raw query string into (remaining query text, terms).
///
/// Prefixed tokens with a value that does not parse are kept as text.
///
/// # Examples
///
/// ```
/// use linknest::search::parse_query;
///
/// let (text, terms) = parse_query("type:note tag:reference rust async");
/// assert_eq!(text, "rust async");
/// assert_eq!(terms.tags, vec!["reference".to_string()]);
/// ```
pub fn parse_query(raw: &str) -> (String, QueryTerms) {
    let mut terms = QueryTerms::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        let recognized = if let Some(value) = token.strip_prefix("type:") {
            match value.parse() {
                Ok(kind) => {
                    terms.kind = Some(kind);
                    true
                }
                Err(_) => false,
            }
        } else if let Some(value) = token.strip_prefix("category:") {
            if value.is_empty() {
                false
            } else {
                terms.category = Some(value.to_string());
                true
            }
        } else if let Some(value) = token.strip_prefix("tag:") {
            if value.is_empty() {
                false
            } else {
                terms.tags.push(value.to_string());
                true
            }
        } else if let Some(value) = token.strip_prefix("match:") {
            match value.parse() {
                Ok(mode) => {
                    terms.tag_match = mode;
                    true
                }
                Err(_) => false,
            }
        } else if let Some(value) = token.strip_prefix("is:") {
            let favorite = matches!(value.to_lowercase().as_str(), "favorite" | "fav" | "starred");
            terms.favorites_only |= favorite;
            favorite
        } else if let Some(value) = token.strip_prefix("sort:") {
            match value.parse() {
                Ok(order) => {
                    terms.sort = Some(order);
                    true
                }
                Err(_) => false,
            }
        } else if let Some(value) = token.strip_prefix("created:>") {
            let date = parse_date(value);
            if date.is_some() {
                terms.created_after = date;
            }
            date.is_some()
        } else if let Some(value) = token.strip_prefix("created:<") {
            let date = parse_date(value);
            if date.is_some() {
                terms.created_before = date;
            }
            date.is_some()
        } else {
            false
        };

        if !recognized {
            remaining.push(token);
        }
    }

    (remaining.join(" "), terms)
}

/// Parse a date string into DateTime<Utc>.
/// Supports ISO 8601 date format (YYYY-MM-DD) or full datetime.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Date only - midnight UTC
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let datetime = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(datetime, Utc));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{now_millis, DocumentDraft, Entity, LinkDraft, NoteDraft};
    use chrono::{Datelike, Duration};

    fn link(title: &str, url: &str, minutes: i64) -> Link {
        Link::create(
            LinkDraft::new(url, title),
            Uuid::new_v4(),
            now_millis() + Duration::minutes(minutes),
        )
    }

    #[test]
    fn test_parse_query_no_terms() {
        let (text, terms) = parse_query("hello world");
        assert_eq!(text, "hello world");
        assert!(terms.is_empty());
    }

    #[test]
    fn test_parse_query_combined() {
        let (text, terms) =
            parse_query("type:link category:Work tag:important tag:reference match:all is:fav sort:oldest api");
        assert_eq!(text, "api");
        assert_eq!(terms.kind, Some(ResourceKind::Link));
        assert_eq!(terms.category.as_deref(), Some("Work"));
        assert_eq!(terms.tags, vec!["important".to_string(), "reference".to_string()]);
        assert_eq!(terms.tag_match, TagMatch::All);
        assert!(terms.favorites_only);
        assert_eq!(terms.sort, Some(SortOrder::Oldest));
    }

    #[test]
    fn test_parse_query_unknown_values_stay_text() {
        let (text, terms) = parse_query("type:folder sort:random is:pinned tag:");
        assert_eq!(text, "type:folder sort:random is:pinned tag:");
        assert!(terms.is_empty());
    }

    #[test]
    fn test_parse_query_date_terms() {
        let (text, terms) = parse_query("created:>2025-01-01 created:<2025-12-31T00:00:00Z test");
        assert_eq!(text, "test");
        assert_eq!(terms.created_after.unwrap().year(), 2025);
        assert_eq!(terms.created_before.unwrap().month(), 12);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("not-a-date").is_none());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("alpha".parse::<SortOrder>().unwrap(), SortOrder::Alphabetical);
        assert_eq!("Favorites".parse::<SortOrder>().unwrap(), SortOrder::Favorites);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Oldest.to_string(), "oldest");
    }

    #[test]
    fn test_text_filter_is_case_insensitive_across_fields() {
        let mut with_description = link("Docs", "https://docs.rs", 0);
        with_description.description = Some("Crate DOCUMENTATION".to_string());
        let items = vec![link("Rust", "https://rust-lang.org", 0), with_description];

        let filter = Filter {
            text: Some("documentation".to_string()),
            ..Filter::default()
        };
        let hits = filter.apply(&items, SortOrder::Newest);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Docs");

        let filter = Filter {
            text: Some("RUST-LANG".to_string()),
            ..Filter::default()
        };
        assert_eq!(filter.apply(&items, SortOrder::Newest).len(), 1);

        let blank = Filter {
            text: Some("   ".to_string()),
            ..Filter::default()
        };
        assert!(blank.is_empty());
        assert_eq!(blank.apply(&items, SortOrder::Newest).len(), 2);
    }

    #[test]
    fn test_tag_match_any_and_all() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut draft = NoteDraft::new("Both", "");
        draft.tags = vec![a, b];
        let both = Note::create(draft, Uuid::new_v4(), now_millis());
        let mut draft = NoteDraft::new("One", "");
        draft.tags = vec![a];
        let one = Note::create(draft, Uuid::new_v4(), now_millis());
        let items = vec![both, one];

        let mut filter = Filter {
            tags: vec![a, b],
            ..Filter::default()
        };
        assert_eq!(filter.apply(&items, SortOrder::Newest).len(), 2);

        filter.tag_match = TagMatch::All;
        let hits = filter.apply(&items, SortOrder::Newest);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Both");
    }

    #[test]
    fn test_category_and_favorites_filters() {
        let work = Uuid::new_v4();
        let mut filed = link("Filed", "a.com", 0);
        filed.category = Some(work);
        filed.is_favorite = true;
        let items = vec![filed, link("Loose", "b.com", 0)];

        let filter = Filter {
            category: Some(work),
            ..Filter::default()
        };
        assert_eq!(filter.apply(&items, SortOrder::Newest)[0].title, "Filed");

        let filter = Filter {
            favorites_only: true,
            ..Filter::default()
        };
        assert_eq!(filter.apply(&items, SortOrder::Newest).len(), 1);
    }

    #[test]
    fn test_sort_orders() {
        let mut items = vec![
            link("banana", "b.com", 1),
            link("Apple", "a.com", 0),
            link("cherry", "c.com", 2),
        ];
        items[0].is_favorite = true;

        SortOrder::Newest.sort(&mut items);
        let titles: Vec<&str> = items.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["cherry", "banana", "Apple"]);

        SortOrder::Oldest.sort(&mut items);
        let titles: Vec<&str> = items.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);

        SortOrder::Alphabetical.sort(&mut items);
        let titles: Vec<&str> = items.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);

        SortOrder::Favorites.sort(&mut items);
        let titles: Vec<&str> = items.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["banana", "cherry", "Apple"]);
    }

    #[test]
    fn test_notes_order_by_creation_time() {
        let now = now_millis();
        let mut older = Note::create(NoteDraft::new("Older", ""), Uuid::new_v4(), now);
        let newer = Note::create(NoteDraft::new("Newer", ""), Uuid::new_v4(), now + Duration::minutes(1));
        // Editing the older note does not move it ahead.
        older.updated_at = now + Duration::minutes(5);
        let mut items = vec![older, newer];

        SortOrder::Newest.sort(&mut items);
        let titles: Vec<&str> = items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        SortOrder::Oldest.sort(&mut items);
        let titles: Vec<&str> = items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Older", "Newer"]);
    }

    #[test]
    fn test_links_order_by_update_time() {
        let mut first = link("First", "a.com", 0);
        let second = link("Second", "b.com", 1);
        first.updated_at = second.updated_at + Duration::minutes(1);
        let mut items = vec![second, first];

        SortOrder::Newest.sort(&mut items);
        assert_eq!(items[0].title, "First");
    }

    #[test]
    fn test_document_searches_name_and_type() {
        let draft = DocumentDraft {
            name: "report.pdf".to_string(),
            doc_type: "PDF".to_string(),
            ..DocumentDraft::default()
        };
        let doc = Document::create(draft, Uuid::new_v4(), now_millis());
        assert!(doc.contains_text("pdf"));
        assert!(doc.contains_text("report"));
        assert!(!doc.contains_text("image"));
    }
}
