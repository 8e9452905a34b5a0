//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while building or querying the index
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A document was rejected by strict index building
    #[error("Invalid document at position {position}: {reason}")]
    InvalidDocument { position: usize, reason: String },

    /// Search options failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::InvalidDocument { .. } => AppError::Validation(err.to_string()),
        }
    }
}
