//! Workshop archive search
//!
//! Faceted full-text search over teaching sessions, search-as-you-type
//! suggestions, saved searches and an expertise taxonomy.

pub mod archive;
pub mod config;
pub mod error;
pub mod models;
pub mod saved;
pub mod search;
pub mod taxonomy;

pub use error::{AppError, Result};
