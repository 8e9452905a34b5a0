//! Error types for saved-search persistence

use crate::error::AppError;

pub type SavedSearchResult<T> = std::result::Result<T, SavedSearchError>;

/// Failure of a key-value storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend failure: {0}")]
    Backend(String),

    /// Write would push the store past its byte quota
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Stored value is not valid: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SavedSearchError {
    #[error("Invalid saved search: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Import payload is not a JSON array of saved searches
    #[error("Invalid saved search import: {0}")]
    InvalidImport(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(msg) => AppError::Serialization(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<SavedSearchError> for AppError {
    fn from(err: SavedSearchError) -> Self {
        match err {
            SavedSearchError::Validation(msg) => AppError::Validation(msg),
            SavedSearchError::Storage(err) => err.into(),
            SavedSearchError::InvalidImport(msg) => AppError::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_maps_to_storage_error() {
        let err: AppError = StorageError::QuotaExceeded { needed: 10, quota: 4 }.into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_validation_maps_to_validation_error() {
        let err: AppError = SavedSearchError::Validation("empty name".into()).into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.exit_code(), 3);
    }
}
