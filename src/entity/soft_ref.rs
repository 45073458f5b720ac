//! Serde adapters for soft references.
//!
//! Category and tag references are stored as plain id strings and are never
//! validated against the referenced collection. An empty category string
//! means "no category"; ids that do not parse are dropped on read.

use serde::{Deserialize, Deserializer, Serializer};
use uuid::Uuid;

pub mod category {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Uuid>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Uuid>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| Uuid::parse_str(s).ok()))
    }
}

pub mod tags {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[Uuid], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(value.iter().map(Uuid::to_string))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Uuid>, D::Error> {
        let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .iter()
            .filter_map(|s| Uuid::parse_str(s.trim()).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, with = "super::category")]
        category: Option<Uuid>,
        #[serde(default, with = "super::tags")]
        tags: Vec<Uuid>,
    }

    #[test]
    fn test_empty_category_reads_as_none() {
        let holder: Holder = serde_json::from_str(r#"{"category":"","tags":[]}"#).unwrap();
        assert!(holder.category.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.category.is_none());
        assert!(holder.tags.is_empty());
    }

    #[test]
    fn test_none_category_writes_empty_string() {
        let holder = Holder {
            category: None,
            tags: Vec::new(),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"category":"","tags":[]}"#);
    }

    #[test]
    fn test_unparseable_tag_ids_are_dropped() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"category":null,"tags":["{}","not-an-id"]}}"#, id);
        let holder: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(holder.tags, vec![id]);
    }
}
