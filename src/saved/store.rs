//! Saved-search store

use super::clock::{Clock, SystemClock};
use super::error::{SavedSearchError, SavedSearchResult, StorageError};
use super::model::{SavedSearch, SavedSearchStatistics, SavedSearchUpdate};
use super::storage::SearchStorage;
use crate::search::SearchFilters;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Storage key the whole set is written under
pub const DEFAULT_STORAGE_KEY: &str = "evomics-saved-searches";

pub const DEFAULT_MAX_SAVED: usize = 20;

pub const DEFAULT_RECENT_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SavedSearchConfig {
    #[validate(length(min = 1))]
    pub storage_key: String,

    /// Cap on stored searches; least recently used are evicted first
    #[validate(range(min = 1))]
    pub max_saved: usize,

    pub recent_count: usize,
}

impl Default for SavedSearchConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_saved: DEFAULT_MAX_SAVED,
            recent_count: DEFAULT_RECENT_COUNT,
        }
    }
}

/// Named searches persisted as one JSON array in a [`SearchStorage`].
///
/// Every mutation writes the whole set back. A failed write is logged and
/// the in-memory state is kept, so the store stays usable when the backend
/// is full or unavailable.
pub struct SavedSearchStore {
    storage: Box<dyn SearchStorage>,
    clock: Arc<dyn Clock>,
    config: SavedSearchConfig,
    searches: RwLock<Vec<SavedSearch>>,
}

impl SavedSearchStore {
    pub fn open(
        storage: Box<dyn SearchStorage>,
        config: SavedSearchConfig,
    ) -> SavedSearchResult<Self> {
        Self::with_clock(storage, config, Arc::new(SystemClock))
    }

    /// Open with an explicit time source
    pub fn with_clock(
        storage: Box<dyn SearchStorage>,
        config: SavedSearchConfig,
        clock: Arc<dyn Clock>,
    ) -> SavedSearchResult<Self> {
        config
            .validate()
            .map_err(|e| SavedSearchError::Validation(e.to_string()))?;

        let mut searches = read_blob(storage.as_ref(), &config.storage_key);
        cap(&mut searches, config.max_saved, None);

        tracing::debug!(
            key = %config.storage_key,
            count = searches.len(),
            "Loaded saved searches"
        );

        Ok(Self {
            storage,
            clock,
            config,
            searches: RwLock::new(searches),
        })
    }

    pub fn config(&self) -> &SavedSearchConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.searches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.read().is_empty()
    }

    /// Save under `name`, overwriting an existing entry with the same name.
    ///
    /// An overwrite keeps the entry's ID and creation time.
    pub fn save(
        &self,
        name: &str,
        query: &str,
        filters: SearchFilters,
        result_count: usize,
    ) -> SavedSearchResult<SavedSearch> {
        let name = validated_name(name)?;
        let now = self.clock.now();

        let mut searches = self.searches.write();
        let saved = match searches.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                existing.query = query.trim().to_string();
                existing.filters = filters;
                existing.result_count = result_count;
                existing.last_used = now;
                existing.clone()
            }
            None => {
                let search = SavedSearch {
                    id: SavedSearch::generate_id(now),
                    name,
                    query: query.trim().to_string(),
                    filters,
                    created_at: now,
                    last_used: now,
                    result_count,
                };
                searches.push(search.clone());
                search
            }
        };

        let evicted = cap(&mut searches, self.config.max_saved, Some(&saved.id));
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted least recently used saved searches");
        }

        self.persist(&searches);
        tracing::info!(id = %saved.id, name = %saved.name, "Saved search");
        Ok(saved)
    }

    /// Fetch by ID and mark it used
    pub fn load(&self, id: &str) -> Option<SavedSearch> {
        let now = self.clock.now();
        let mut searches = self.searches.write();
        let search = searches.iter_mut().find(|s| s.id == id)?;
        search.last_used = now;
        let loaded = search.clone();

        self.persist(&searches);
        Some(loaded)
    }

    /// Fetch by ID without touching it
    pub fn get(&self, id: &str) -> Option<SavedSearch> {
        self.searches.read().iter().find(|s| s.id == id).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<SavedSearch> {
        let name = name.trim();
        self.searches.read().iter().find(|s| s.name == name).cloned()
    }

    /// Returns whether an entry was removed
    pub fn delete(&self, id: &str) -> bool {
        let mut searches = self.searches.write();
        let before = searches.len();
        searches.retain(|s| s.id != id);
        if searches.len() == before {
            return false;
        }

        self.persist(&searches);
        true
    }

    /// Rename, suffixing the name when another entry already uses it.
    ///
    /// Returns `None` when no entry has `id`.
    pub fn rename(&self, id: &str, new_name: &str) -> SavedSearchResult<Option<SavedSearch>> {
        self.update(id, SavedSearchUpdate::name(new_name))
    }

    /// Apply a partial update and mark the entry used
    pub fn update(
        &self,
        id: &str,
        update: SavedSearchUpdate,
    ) -> SavedSearchResult<Option<SavedSearch>> {
        let name = update.name.as_deref().map(validated_name).transpose()?;
        let now = self.clock.now();

        let mut searches = self.searches.write();
        let Some(position) = searches.iter().position(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(name) = name {
            let name = unique_name(&searches, &name, Some(id));
            searches[position].name = name;
        }

        let search = &mut searches[position];
        if let Some(query) = update.query {
            search.query = query.trim().to_string();
        }
        if let Some(filters) = update.filters {
            search.filters = filters;
        }
        if let Some(result_count) = update.result_count {
            search.result_count = result_count;
        }
        search.last_used = now;
        let updated = search.clone();

        self.persist(&searches);
        Ok(Some(updated))
    }

    /// All searches, most recently used first
    pub fn list_all(&self) -> Vec<SavedSearch> {
        let mut all = self.searches.read().clone();
        all.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        all
    }

    pub fn recent(&self) -> Vec<SavedSearch> {
        let mut all = self.list_all();
        all.truncate(self.config.recent_count);
        all
    }

    /// Searches whose name carries the favorite marker
    pub fn favorites(&self) -> Vec<SavedSearch> {
        self.list_all()
            .into_iter()
            .filter(SavedSearch::is_favorite)
            .collect()
    }

    pub fn is_name_taken(&self, name: &str, exclude_id: Option<&str>) -> bool {
        name_taken(&self.searches.read(), name.trim(), exclude_id)
    }

    /// `base`, or `base (1)`, `base (2)`, ... whichever is free first
    pub fn generate_unique_name(&self, base: &str) -> String {
        unique_name(&self.searches.read(), base.trim(), None)
    }

    pub fn statistics(&self) -> SavedSearchStatistics {
        let searches = self.searches.read();
        let total = searches.len();

        let avg_result_count = if total == 0 {
            0
        } else {
            let sum: usize = searches.iter().map(|s| s.result_count).sum();
            (sum as f64 / total as f64).round() as usize
        };

        SavedSearchStatistics {
            total_searches: total,
            avg_result_count,
            most_used: searches
                .iter()
                .reduce(|most, s| if s.last_used > most.last_used { s } else { most })
                .map(|s| s.name.clone()),
            oldest_search: searches.iter().map(|s| s.created_at).min(),
        }
    }

    /// Pretty-printed JSON array of the stored set
    pub fn export(&self) -> SavedSearchResult<String> {
        let searches = self.searches.read();
        serde_json::to_string_pretty(&*searches)
            .map_err(|e| SavedSearchError::Storage(StorageError::from(e)))
    }

    /// Replace the stored set with the valid records in `json`.
    ///
    /// Invalid records are skipped. Returns the number imported.
    pub fn import(&self, json: &str) -> SavedSearchResult<usize> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SavedSearchError::InvalidImport(e.to_string()))?;
        let serde_json::Value::Array(records) = value else {
            return Err(SavedSearchError::InvalidImport(
                "expected a JSON array of saved searches".to_string(),
            ));
        };

        let mut imported = valid_records(records);
        cap(&mut imported, self.config.max_saved, None);
        let count = imported.len();

        let mut searches = self.searches.write();
        *searches = imported;
        self.persist(&searches);

        tracing::info!(count, "Imported saved searches");
        Ok(count)
    }

    pub fn clear_all(&self) {
        let mut searches = self.searches.write();
        searches.clear();
        self.persist(&searches);
    }

    fn persist(&self, searches: &[SavedSearch]) {
        let result = serde_json::to_string(searches)
            .map_err(StorageError::from)
            .and_then(|blob| self.storage.set(&self.config.storage_key, &blob));

        if let Err(e) = result {
            tracing::warn!(
                key = %self.config.storage_key,
                error = %e,
                "Failed to persist saved searches"
            );
        }
    }
}

fn validated_name(name: &str) -> SavedSearchResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SavedSearchError::Validation(
            "saved search name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn name_taken(searches: &[SavedSearch], name: &str, exclude_id: Option<&str>) -> bool {
    searches
        .iter()
        .any(|s| s.name == name && Some(s.id.as_str()) != exclude_id)
}

fn unique_name(searches: &[SavedSearch], base: &str, exclude_id: Option<&str>) -> String {
    let mut name = base.to_string();
    let mut counter = 1;
    while name_taken(searches, &name, exclude_id) {
        name = format!("{} ({})", base, counter);
        counter += 1;
    }
    name
}

/// Keep the `max` most recently used; returns how many were dropped
/// Keep the `max` most recently used searches; on a `last_used` tie the
/// search with ID `keep` sorts first
fn cap(searches: &mut Vec<SavedSearch>, max: usize, keep: Option<&str>) -> usize {
    if searches.len() <= max {
        return 0;
    }
    let dropped = searches.len() - max;
    let kept = |s: &SavedSearch| keep == Some(s.id.as_str());
    searches.sort_by(|a, b| {
        b.last_used
            .cmp(&a.last_used)
            .then_with(|| kept(b).cmp(&kept(a)))
    });
    searches.truncate(max);
    dropped
}

fn read_blob(storage: &dyn SearchStorage, key: &str) -> Vec<SavedSearch> {
    let blob = match storage.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read saved searches");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(&blob) {
        Ok(records) => valid_records(records),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable saved searches");
            Vec::new()
        }
    }
}

fn valid_records(records: Vec<serde_json::Value>) -> Vec<SavedSearch> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let parsed = serde_json::from_value::<SavedSearch>(record)
                .map_err(|e| e.to_string())
                .and_then(|search| search.validate().map(|_| search).map_err(|e| e.to_string()));
            match parsed {
                Ok(search) => Some(search),
                Err(reason) => {
                    tracing::warn!(position, %reason, "Skipping invalid saved search");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved::clock::ManualClock;
    use crate::saved::storage::MemoryStorage;
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> (SavedSearchStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()));
        let store = SavedSearchStore::with_clock(
            Box::new(MemoryStorage::new()),
            SavedSearchConfig::default(),
            clock.clone(),
        )
        .unwrap();
        (store, clock)
    }

    #[test]
    fn test_save_trims_and_rejects_empty_name() {
        let (store, _) = store();
        let saved = store.save("  Trees ", " phylo ", SearchFilters::default(), 2).unwrap();
        assert_eq!(saved.name, "Trees");
        assert_eq!(saved.query, "phylo");

        let err = store.save("   ", "x", SearchFilters::default(), 0).unwrap_err();
        assert!(matches!(err, SavedSearchError::Validation(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_cap_keeps_just_saved_search_on_timestamp_tie() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()));
        let config = SavedSearchConfig {
            max_saved: 2,
            ..SavedSearchConfig::default()
        };
        let store =
            SavedSearchStore::with_clock(Box::new(MemoryStorage::new()), config, clock).unwrap();

        store.save("a", "", SearchFilters::default(), 0).unwrap();
        store.save("b", "", SearchFilters::default(), 0).unwrap();
        let newest = store.save("c", "", SearchFilters::default(), 0).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&newest.id), Some(newest));
    }

    #[test]
    fn test_load_touches_last_used() {
        let (store, clock) = store();
        let saved = store.save("Trees", "phylo", SearchFilters::default(), 0).unwrap();

        clock.advance(Duration::minutes(5));
        let loaded = store.load(&saved.id).unwrap();
        assert_eq!(loaded.last_used - saved.last_used, Duration::minutes(5));
        assert!(store.load("missing").is_none());
    }

    #[test]
    fn test_rename_suffixes_on_collision() {
        let (store, _) = store();
        store.save("Trees", "a", SearchFilters::default(), 0).unwrap();
        let other = store.save("Variants", "b", SearchFilters::default(), 0).unwrap();

        let renamed = store.rename(&other.id, "Trees").unwrap().unwrap();
        assert_eq!(renamed.name, "Trees (1)");

        // Renaming to its own name is not a collision
        let same = store.rename(&other.id, "Trees (1)").unwrap().unwrap();
        assert_eq!(same.name, "Trees (1)");

        assert!(store.rename("missing", "x").unwrap().is_none());
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let (store, _) = store();
        let saved = store.save("Trees", "phylo", SearchFilters::default(), 4).unwrap();

        let updated = store
            .update(
                &saved.id,
                SavedSearchUpdate {
                    result_count: Some(9),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Trees");
        assert_eq!(updated.query, "phylo");
        assert_eq!(updated.result_count, 9);
    }

    #[test]
    fn test_statistics() {
        let (store, clock) = store();
        assert_eq!(store.statistics().most_used, None);

        store.save("A", "", SearchFilters::default(), 1).unwrap();
        clock.advance(Duration::seconds(1));
        store.save("B", "", SearchFilters::default(), 2).unwrap();

        let stats = store.statistics();
        assert_eq!(stats.total_searches, 2);
        assert_eq!(stats.avg_result_count, 2);
        assert_eq!(stats.most_used.as_deref(), Some("B"));
        assert_eq!(stats.oldest_search, Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()));
    }

    #[test]
    fn test_favorites_and_recent() {
        let (store, clock) = store();
        for i in 0..7 {
            let name = if i % 3 == 0 { format!("⭐ fav {}", i) } else { format!("plain {}", i) };
            store.save(&name, "", SearchFilters::default(), 0).unwrap();
            clock.advance(Duration::seconds(1));
        }

        let recent = store.recent();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].name, "⭐ fav 6");

        let favorites: Vec<_> = store.favorites().into_iter().map(|s| s.name).collect();
        assert_eq!(favorites, vec!["⭐ fav 6", "⭐ fav 3", "⭐ fav 0"]);
    }

    #[test]
    fn test_import_rejects_non_array() {
        let (store, _) = store();
        store.save("Keep", "", SearchFilters::default(), 0).unwrap();

        let err = store.import(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, SavedSearchError::InvalidImport(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_export_import_replaces_set() {
        let (source, _) = store();
        source.save("Trees", "phylo", SearchFilters::new().with_years([2024]), 3).unwrap();
        let exported = source.export().unwrap();

        let (target, _) = store();
        target.save("Other", "", SearchFilters::default(), 0).unwrap();
        assert_eq!(target.import(&exported).unwrap(), 1);

        let all = target.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], source.list_all()[0]);
    }

    #[test]
    fn test_clear_all() {
        let (store, _) = store();
        store.save("Trees", "", SearchFilters::default(), 0).unwrap();
        store.clear_all();
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let config = SavedSearchConfig {
            max_saved: 0,
            ..Default::default()
        };
        let result = SavedSearchStore::open(Box::new(MemoryStorage::new()), config);
        assert!(matches!(result, Err(SavedSearchError::Validation(_))));
    }
}
