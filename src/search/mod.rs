//! In-memory full-text search over workshop sessions
//!
//! - **Index**: `topic:<token>` term postings plus presenter, derived-topic
//!   and technique postings, built once per document set
//! - **Ranking**: additive per-field weights, relevance bands
//! - **Facets**: conjunctive post-filter over text matches
//! - **Suggestions**: substring scan of the auxiliary indexes
//! - **Live search**: debounced query input publishing on a watch channel
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use workshop_archive_search::models::{SessionDocument, SessionType};
//! use workshop_archive_search::search::{SearchQuery, SearchService};
//!
//! let docs = vec![
//!     SessionDocument::new("s1", "wog", 2024, "Bayesian phylogenetics", SessionType::Lecture)
//!         .with_presenters(vec!["smith-jane"]),
//! ];
//! let service = SearchService::new(Arc::new(docs));
//!
//! let results = service.search(&SearchQuery::new("phylo"));
//! assert_eq!(results[0].document.id, "s1");
//! ```

mod analysis;
mod config;
mod debounce;
mod error;
mod highlight;
mod index;
mod live;
mod query;
mod ranking;
mod service;
mod suggest;
mod vocabulary;

pub use analysis::{fuzzy_score, tokenize};
pub use config::{FieldWeights, SearchOptions, SearchOptionsBuilder};
pub use debounce::Debouncer;
pub use error::{SearchError, SearchResult};
pub use highlight::{find_highlights, highlight_text, Highlight};
pub use index::{DocId, FilterOptions, IndexStats, PostingMap, SearchIndex};
pub use live::{LiveSearch, LiveSearchState, DEFAULT_DEBOUNCE};
pub use query::{DateRange, SearchFilters, SearchQuery};
pub use ranking::{
    MatchField, Relevance, ScoredResult, SearchMatch, HIGH_RELEVANCE_SCORE, MEDIUM_RELEVANCE_SCORE,
};
pub use service::SearchService;
pub use suggest::{SearchSuggestion, SuggestionType};
pub use vocabulary::{TopicVocabulary, DEFAULT_TOPIC_TERMS};
