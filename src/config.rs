use crate::error::{AppError, Result};
use crate::saved::{
    MemoryStorage, SavedSearchConfig, SavedSearchStore, SearchStorage, SledStorage,
    DEFAULT_MAX_SAVED, DEFAULT_RECENT_COUNT, DEFAULT_STORAGE_KEY,
};
use crate::search::{SearchOptions, TopicVocabulary};
use crate::taxonomy::{FacultyTopics, Taxonomy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an extra config file
pub const CONFIG_PATH_ENV: &str = "ARCHIVE_SEARCH_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Archive data files
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Ranking options
    #[serde(default)]
    pub search: SearchOptions,

    /// Derived-topic vocabulary; the built-in list when absent
    #[serde(default)]
    pub vocabulary: TopicVocabulary,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub taxonomy: TaxonomyConfig,

    /// Saved-search persistence
    #[serde(default)]
    pub saved_searches: SavedSearchesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, the file named by
    /// `ARCHIVE_SEARCH_CONFIG` if set, and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Load with an explicit override file; a missing file is an error
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Config = builder
            // Override with environment variables (prefix: ARCHIVE_SEARCH_)
            .add_source(
                config::Environment::with_prefix("ARCHIVE_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.saved_searches.max_saved == 0 {
            return Err(AppError::Configuration(
                "saved_searches.max_saved must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Faculty teaching history JSON
    #[serde(default = "default_teaching_path")]
    pub teaching_path: PathBuf,

    /// Workshop catalogue JSON
    #[serde(default = "default_workshops_path")]
    pub workshops_path: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            teaching_path: default_teaching_path(),
            workshops_path: default_workshops_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Delay between the last keystroke and the search
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl LiveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// YAML tree replacing the built-in expertise taxonomy
    pub definition_path: Option<PathBuf>,

    /// Faculty topic JSON merged into the unified taxonomy
    pub faculty_topics_path: Option<PathBuf>,
}

impl TaxonomyConfig {
    pub fn load_taxonomy(&self) -> Result<Taxonomy> {
        match &self.definition_path {
            Some(path) => {
                let definition = read_file(path)?;
                Ok(Taxonomy::from_yaml(&definition)?)
            }
            None => Ok(Taxonomy::builtin().clone()),
        }
    }

    /// Empty topic set when no file is configured
    pub fn load_faculty_topics(&self) -> Result<FacultyTopics> {
        match &self.faculty_topics_path {
            Some(path) => Ok(serde_json::from_str(&read_file(path)?)?),
            None => Ok(FacultyTopics::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Lost on exit
    Memory,
    #[default]
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSearchesConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database directory for the sled backend
    #[serde(default = "default_saved_searches_path")]
    pub path: PathBuf,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_max_saved")]
    pub max_saved: usize,

    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
}

impl SavedSearchesConfig {
    pub fn store_config(&self) -> SavedSearchConfig {
        SavedSearchConfig {
            storage_key: self.storage_key.clone(),
            max_saved: self.max_saved,
            recent_count: self.recent_count,
        }
    }

    /// Open the configured backend and load the store from it
    pub fn open_store(&self) -> Result<SavedSearchStore> {
        let storage: Box<dyn SearchStorage> = match self.backend {
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
            StorageBackend::Sled => Box::new(SledStorage::open(&self.path)?),
        };
        Ok(SavedSearchStore::open(storage, self.store_config())?)
    }
}

impl Default for SavedSearchesConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_saved_searches_path(),
            storage_key: default_storage_key(),
            max_saved: default_max_saved(),
            recent_count: default_recent_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })
}

fn default_teaching_path() -> PathBuf {
    PathBuf::from("data/teaching.json")
}

fn default_workshops_path() -> PathBuf {
    PathBuf::from("data/workshops.json")
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_suggestion_limit() -> usize {
    10
}

fn default_saved_searches_path() -> PathBuf {
    PathBuf::from("data/saved-searches")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_saved() -> usize {
    DEFAULT_MAX_SAVED
}

fn default_recent_count() -> usize {
    DEFAULT_RECENT_COUNT
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_debounce_ms(), 300);
        assert_eq!(default_max_saved(), 20);
        assert_eq!(default_storage_key(), "evomics-saved-searches");
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_storage_backend_default() {
        assert_eq!(StorageBackend::default(), StorageBackend::Sled);
    }

    #[test]
    fn test_override_file_wins_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nmax_results = 5\n\n[saved_searches]\nbackend = \"memory\"\nmax_saved = 3"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.weights.title, 3.0);
        assert_eq!(config.saved_searches.backend, StorageBackend::Memory);
        assert_eq!(config.saved_searches.max_saved, 3);
        assert_eq!(config.live.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_invalid_search_options_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nmax_results = 0").unwrap();

        let err = Config::load_from(Some(file.path())).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_missing_faculty_topics_is_empty() {
        let topics = TaxonomyConfig::default().load_faculty_topics().unwrap();
        assert!(topics.topics.is_empty());
    }
}
