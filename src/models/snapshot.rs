//! Persisted category snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ArticleRow;

/// Identity of a snapshot: `region:category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub region: String,
    pub category: String,
}

impl SnapshotKey {
    pub fn new(region: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            category: category.into(),
        }
    }

    /// Parse a `region:category` document key.
    pub fn parse(key: &str) -> Option<Self> {
        let (region, category) = key.split_once(':')?;
        if region.is_empty() || category.is_empty() {
            return None;
        }
        Some(Self::new(region, category))
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.category)
    }
}

/// Enriched rows for one region/category as of the last successful sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySnapshot {
    /// Document key, `region:category`
    pub category: String,

    /// Rows in upstream order
    pub rows: Vec<ArticleRow>,

    pub updated_at: DateTime<Utc>,
}

impl CategorySnapshot {
    pub fn new(key: &SnapshotKey, rows: Vec<ArticleRow>, updated_at: DateTime<Utc>) -> Self {
        Self {
            category: key.to_string(),
            rows,
            updated_at,
        }
    }

    pub fn key(&self) -> Option<SnapshotKey> {
        SnapshotKey::parse(&self.category)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_round_trips_through_display() {
        let key = SnapshotKey::new("global", "notices");
        assert_eq!(key.to_string(), "global:notices");
        assert_eq!(SnapshotKey::parse("global:notices"), Some(key));
        assert_eq!(SnapshotKey::parse("global"), None);
        assert_eq!(SnapshotKey::parse(":news"), None);
    }

    #[test]
    fn document_uses_camel_case_fields() {
        let key = SnapshotKey::new("jp", "news");
        let snapshot = CategorySnapshot::new(
            &key,
            vec![ArticleRow::from(json!({"id": 1}))],
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        );

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["category"], "jp:news");
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["rows"][0]["id"], 1);
    }
}
