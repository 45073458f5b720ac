// src/entity/link.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{advance, soft_ref, CollectionKind, Entity, Favorite};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,
    /// The URL this link points to, as entered
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
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

/// Payload for a new link.
#[derive(Debug, Clone, Default)]
pub struct LinkDraft {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub is_favorite: bool,
}

impl LinkDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Update payload for a link
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>, // Some(None) to clear
    pub category: Option<Option<Uuid>>,      // Some(None) to clear
    pub tags: Option<Vec<Uuid>>,
    pub is_favorite: Option<bool>,
}

impl Entity for Link {
    const KIND: CollectionKind = CollectionKind::Links;

    type Draft = LinkDraft;
    type Patch = LinkPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(draft: LinkDraft, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            url: draft.url,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
            is_favorite: draft.is_favorite,
        }
    }

    fn apply(&mut self, patch: LinkPatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
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

impl Favorite for Link {
    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn favorite_patch(is_favorite: bool) -> LinkPatch {
        LinkPatch {
            is_favorite: Some(is_favorite),
            ..LinkPatch::default()
        }
    }
}

/// Prefix `https://` unless the URL already names an http(s) scheme.
pub fn ensure_protocol(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Host part of a URL without a leading `www.`.
///
/// Scheme-less input is treated as https. When the URL cannot be parsed the
/// host is cut out of the raw string, and as a last resort the input is
/// returned unchanged.
pub fn extract_domain(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    if let Ok(parsed) = Url::parse(&ensure_protocol(url)) {
        if let Some(host) = parsed.host_str() {
            return host.strip_prefix("www.").unwrap_or(host).to_string();
        }
    }

    let rest = strip_www(strip_scheme(url));
    let host = rest.split(['/', ':']).next().unwrap_or_default();
    if host.is_empty() {
        url.to_string()
    } else {
        host.to_string()
    }
}

/// URL without scheme, `www.`, or a trailing slash, for list rows.
pub fn display_url(url: &str) -> String {
    let stripped = strip_www(strip_scheme(url));
    stripped.strip_suffix('/').unwrap_or(stripped).to_string()
}

fn strip_scheme(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        if let Some(prefix) = url.get(..scheme.len()) {
            if prefix.eq_ignore_ascii_case(scheme) {
                return &url[scheme.len()..];
            }
        }
    }
    url
}

fn strip_www(url: &str) -> &str {
    match url.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") => &url[4..],
        _ => url,
    }
}
