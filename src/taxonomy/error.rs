//! Error types for taxonomy loading and lookup

use crate::error::AppError;

pub type TaxonomyResult<T> = std::result::Result<T, TaxonomyError>;

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// Definition is not valid YAML or does not have the node shape
    #[error("Failed to parse taxonomy definition: {0}")]
    Parse(String),

    #[error("Duplicate taxonomy node id: {0}")]
    DuplicateNodeId(String),

    #[error("Taxonomy node '{0}' has an empty label")]
    EmptyLabel(String),

    #[error("Unknown taxonomy node: {0}")]
    UnknownNode(String),
}

impl From<serde_yaml::Error> for TaxonomyError {
    fn from(err: serde_yaml::Error) -> Self {
        TaxonomyError::Parse(err.to_string())
    }
}

impl From<TaxonomyError> for AppError {
    fn from(err: TaxonomyError) -> Self {
        match err {
            TaxonomyError::UnknownNode(id) => AppError::NotFound(format!("taxonomy node '{}'", id)),
            other => AppError::Configuration(other.to_string()),
        }
    }
}
