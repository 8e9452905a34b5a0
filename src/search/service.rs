//! Search service owning the current index

use crate::archive::DocumentSource;
use crate::error::Result;
use crate::models::SessionDocument;
use crate::search::config::SearchOptions;
use crate::search::error::SearchResult;
use crate::search::index::{FilterOptions, IndexStats, SearchIndex};
use crate::search::query::SearchQuery;
use crate::search::ranking::ScoredResult;
use crate::search::suggest::SearchSuggestion;
use crate::search::vocabulary::TopicVocabulary;
use parking_lot::RwLock;
use std::sync::Arc;

struct Published {
    source: Arc<Vec<SessionDocument>>,
    index: Arc<SearchIndex>,
}

/// Query front end over a [`SearchIndex`].
///
/// The index is rebuilt off to the side and swapped in whole, so readers
/// always hold a complete index.
pub struct SearchService {
    current: RwLock<Published>,
    options: SearchOptions,
    vocabulary: TopicVocabulary,
}

impl SearchService {
    /// Create a service with default options and vocabulary
    pub fn new(documents: Arc<Vec<SessionDocument>>) -> Self {
        Self::with_config(documents, SearchOptions::default(), TopicVocabulary::default())
    }

    pub fn with_config(
        documents: Arc<Vec<SessionDocument>>,
        options: SearchOptions,
        vocabulary: TopicVocabulary,
    ) -> Self {
        let index = Arc::new(SearchIndex::build(&documents, &vocabulary));
        tracing::info!(
            documents = index.len(),
            skipped = index.skipped_documents(),
            "Search service initialized"
        );
        Self {
            current: RwLock::new(Published {
                source: documents,
                index,
            }),
            options,
            vocabulary,
        }
    }

    /// Validate options and build from a document source
    pub fn from_source(
        source: &dyn DocumentSource,
        options: SearchOptions,
        vocabulary: TopicVocabulary,
    ) -> Result<Self> {
        options.validate()?;
        let documents = source.documents()?;
        Ok(Self::with_config(documents, options, vocabulary))
    }

    /// Rebuild when `documents` is a different set than the one indexed.
    ///
    /// Sets are compared by pointer; returns whether a rebuild happened.
    pub fn refresh(&self, documents: Arc<Vec<SessionDocument>>) -> bool {
        if Arc::ptr_eq(&self.current.read().source, &documents) {
            return false;
        }
        self.publish(documents);
        true
    }

    /// Rebuild unconditionally
    pub fn rebuild(&self, documents: Arc<Vec<SessionDocument>>) {
        self.publish(documents);
    }

    /// Rebuild in strict mode; the current index stays on failure
    pub fn try_rebuild(&self, documents: Arc<Vec<SessionDocument>>) -> SearchResult<()> {
        let index = Arc::new(SearchIndex::try_build(&documents, &self.vocabulary)?);
        self.swap(documents, index);
        Ok(())
    }

    fn publish(&self, documents: Arc<Vec<SessionDocument>>) {
        let index = Arc::new(SearchIndex::build(&documents, &self.vocabulary));
        self.swap(documents, index);
    }

    fn swap(&self, source: Arc<Vec<SessionDocument>>, index: Arc<SearchIndex>) {
        tracing::debug!(documents = index.len(), "Publishing rebuilt search index");
        *self.current.write() = Published { source, index };
    }

    /// Snapshot of the current index
    pub fn index(&self) -> Arc<SearchIndex> {
        Arc::clone(&self.current.read().index)
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn search(&self, query: &SearchQuery) -> Vec<ScoredResult> {
        self.search_with_options(query, &self.options)
    }

    pub fn search_with_options(&self, query: &SearchQuery, options: &SearchOptions) -> Vec<ScoredResult> {
        self.index().search(&query.query, &query.filters, options)
    }

    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<SearchSuggestion> {
        self.index().suggest(partial, limit)
    }

    pub fn filter_options(&self) -> FilterOptions {
        self.index().filter_options()
    }

    pub fn stats(&self) -> IndexStats {
        self.index().stats()
    }
}
