use crate::search::SearchFilters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named query plus filter snapshot the user can come back to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    #[validate(length(min = 1))]
    pub id: String,

    /// Unique within a store
    #[validate(length(min = 1))]
    pub name: String,

    pub query: String,

    pub filters: SearchFilters,

    pub created_at: DateTime<Utc>,

    /// Touched on save, load, rename and update; drives eviction order
    pub last_used: DateTime<Utc>,

    /// Result count at the time the search was saved
    #[serde(default)]
    pub result_count: usize,
}

impl SavedSearch {
    /// `search_{millis}_{9 random chars}`
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("search_{}_{}", now.timestamp_millis(), &random[..9])
    }

    pub fn is_favorite(&self) -> bool {
        self.name.contains(FAVORITE_MARKER)
    }
}

/// Marker that flags a saved search as a favorite when present in its name
pub const FAVORITE_MARKER: char = '⭐';

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct SavedSearchUpdate {
    pub name: Option<String>,
    pub query: Option<String>,
    pub filters: Option<SearchFilters>,
    pub result_count: Option<usize>,
}

impl SavedSearchUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Summary over the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchStatistics {
    pub total_searches: usize,

    /// Mean result count, rounded to the nearest integer
    pub avg_result_count: usize,

    /// Name of the most recently used search
    pub most_used: Option<String>,

    /// Earliest creation time in the store
    pub oldest_search: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let now = Utc::now();
        let id = SavedSearch::generate_id(now);
        let parts: Vec<&str> = id.splitn(3, '_').collect();

        assert_eq!(parts[0], "search");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let now = Utc::now();
        let search = SavedSearch {
            id: "search_1_abcdefghi".into(),
            name: "Trees".into(),
            query: "phylogeny".into(),
            filters: SearchFilters::default(),
            created_at: now,
            last_used: now,
            result_count: 3,
        };

        let json = serde_json::to_value(&search).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastUsed").is_some());
        assert_eq!(json["resultCount"], 3);
    }

    #[test]
    fn test_favorite_marker() {
        let now = Utc::now();
        let mut search = SavedSearch {
            id: "x".into(),
            name: "Trees".into(),
            query: String::new(),
            filters: SearchFilters::default(),
            created_at: now,
            last_used: now,
            result_count: 0,
        };
        assert!(!search.is_favorite());
        search.name = "⭐ Trees".into();
        assert!(search.is_favorite());
    }
}
