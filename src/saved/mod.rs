//! Saved searches
//!
//! Named query and filter snapshots, capped to the most recently used and
//! persisted as a single JSON blob through a pluggable key-value storage.

mod clock;
mod error;
mod model;
mod storage;
mod store;
mod templates;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SavedSearchError, SavedSearchResult, StorageError};
pub use model::{SavedSearch, SavedSearchStatistics, SavedSearchUpdate, FAVORITE_MARKER};
pub use storage::{MemoryStorage, SearchStorage, SledStorage, StorageResult};
pub use store::{
    SavedSearchConfig, SavedSearchStore, DEFAULT_MAX_SAVED, DEFAULT_RECENT_COUNT,
    DEFAULT_STORAGE_KEY,
};
pub use templates::{find_template, QuickSearchTemplate, QUICK_SEARCH_TEMPLATES};
