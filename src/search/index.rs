//! In-memory inverted index over session documents

use crate::models::SessionDocument;
use crate::search::analysis;
use crate::search::error::{SearchError, SearchResult};
use crate::search::vocabulary::TopicVocabulary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use validator::Validate;

/// Position of a document inside the index; also its corpus order
pub type DocId = usize;

/// Key prefix of topic/title postings
pub const TOPIC_FIELD: &str = "topic";

/// Key -> document set, iterated in first-insertion order
#[derive(Debug, Clone, Default)]
pub struct PostingMap {
    positions: HashMap<String, usize>,
    entries: Vec<(String, BTreeSet<DocId>)>,
}

impl PostingMap {
    fn insert(&mut self, key: String, doc: DocId) {
        match self.positions.get(&key) {
            Some(&pos) => {
                self.entries[pos].1.insert(doc);
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, BTreeSet::from([doc])));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<DocId>> {
        self.positions.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<DocId>)> {
        self.entries.iter().map(|(key, docs)| (key.as_str(), docs))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents in the index
    pub total_documents: usize,

    /// Documents rejected at build time
    pub skipped_documents: usize,

    /// Distinct `field:token` keys
    pub indexed_terms: usize,

    /// Distinct presenters
    pub presenters: usize,

    /// Distinct derived topics
    pub topics: usize,

    /// Distinct technique tags
    pub techniques: usize,

    /// When the index was built
    pub built_at: DateTime<Utc>,
}

/// Distinct facet values for filter widgets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub workshops: Vec<String>,
    pub presenters: Vec<String>,
    pub session_types: Vec<String>,
    pub topics: Vec<String>,
    pub techniques: Vec<String>,
    /// Newest first
    pub years: Vec<i32>,
}

/// Read-only index built once from a document set.
///
/// Holds `topic:<token>` term postings plus presenter, derived-topic and
/// technique postings. Keys of the auxiliary indexes are lower-cased values.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    documents: Vec<Arc<SessionDocument>>,
    derived_topics: Vec<Vec<String>>,
    terms: PostingMap,
    presenters: PostingMap,
    topics: PostingMap,
    techniques: PostingMap,
    skipped: usize,
    built_at: DateTime<Utc>,
}

impl SearchIndex {
    /// Build the index, skipping documents without an ID and repeated IDs
    pub fn build(documents: &[SessionDocument], vocabulary: &TopicVocabulary) -> Self {
        let mut index = Self::empty();
        let mut seen: HashSet<&str> = HashSet::with_capacity(documents.len());

        for (position, document) in documents.iter().enumerate() {
            if let Err(reason) = Self::check_document(document, &mut seen) {
                tracing::warn!(
                    position,
                    document_id = %document.id,
                    reason = %reason,
                    "Skipping document while building search index"
                );
                index.skipped += 1;
                continue;
            }
            index.add(document, vocabulary);
        }

        tracing::debug!(
            documents = index.documents.len(),
            skipped = index.skipped,
            terms = index.terms.len(),
            presenters = index.presenters.len(),
            topics = index.topics.len(),
            "Search index built"
        );
        index
    }

    /// Build the index, failing on the first document `build` would skip
    pub fn try_build(documents: &[SessionDocument], vocabulary: &TopicVocabulary) -> SearchResult<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(documents.len());
        for (position, document) in documents.iter().enumerate() {
            Self::check_document(document, &mut seen)
                .map_err(|reason| SearchError::InvalidDocument { position, reason })?;
        }
        Ok(Self::build(documents, vocabulary))
    }

    fn empty() -> Self {
        Self {
            documents: Vec::new(),
            derived_topics: Vec::new(),
            terms: PostingMap::default(),
            presenters: PostingMap::default(),
            topics: PostingMap::default(),
            techniques: PostingMap::default(),
            skipped: 0,
            built_at: Utc::now(),
        }
    }

    fn check_document<'a>(document: &'a SessionDocument, seen: &mut HashSet<&'a str>) -> Result<(), String> {
        document
            .validate()
            .map_err(|e| format!("missing document id: {}", e))?;
        if !seen.insert(document.id.as_str()) {
            return Err(format!("duplicate document id '{}'", document.id));
        }
        Ok(())
    }

    fn add(&mut self, document: &SessionDocument, vocabulary: &TopicVocabulary) {
        let doc: DocId = self.documents.len();

        for token in analysis::index_terms(&document.topic) {
            self.terms.insert(format!("{}:{}", TOPIC_FIELD, token), doc);
        }

        for presenter in document.all_presenters() {
            self.presenters.insert(presenter.to_lowercase(), doc);
        }

        let derived = vocabulary.extract(&document.topic);
        for topic in &derived {
            self.topics.insert(topic.clone(), doc);
        }

        for technique in &document.techniques {
            let technique = technique.trim().to_lowercase();
            if !technique.is_empty() {
                self.techniques.insert(technique, doc);
            }
        }

        self.derived_topics.push(derived);
        self.documents.push(Arc::new(document.clone()));
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, doc: DocId) -> Option<&Arc<SessionDocument>> {
        self.documents.get(doc)
    }

    pub fn documents(&self) -> &[Arc<SessionDocument>] {
        &self.documents
    }

    /// Topics the vocabulary derived from a document's title
    pub fn derived_topics(&self, doc: DocId) -> &[String] {
        self.derived_topics.get(doc).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Term postings, keyed `field:token`
    pub fn terms(&self) -> &PostingMap {
        &self.terms
    }

    pub fn presenters(&self) -> &PostingMap {
        &self.presenters
    }

    pub fn topics(&self) -> &PostingMap {
        &self.topics
    }

    pub fn techniques(&self) -> &PostingMap {
        &self.techniques
    }

    pub fn skipped_documents(&self) -> usize {
        self.skipped
    }

    /// Every posting resolved to document IDs, for comparing builds
    pub fn posting_snapshot(&self) -> BTreeMap<String, BTreeSet<String>> {
        let groups = [
            ("", &self.terms),
            ("presenter:", &self.presenters),
            ("derived:", &self.topics),
            ("technique:", &self.techniques),
        ];

        let mut snapshot = BTreeMap::new();
        for (prefix, postings) in groups {
            for (key, docs) in postings.iter() {
                let ids = docs
                    .iter()
                    .filter_map(|&doc| self.documents.get(doc))
                    .map(|d| d.id.clone())
                    .collect();
                snapshot.insert(format!("{}{}", prefix, key), ids);
            }
        }
        snapshot
    }

    /// Distinct values per facet: ascending, years descending
    pub fn filter_options(&self) -> FilterOptions {
        let mut workshops = BTreeSet::new();
        let mut presenters = BTreeSet::new();
        let mut session_types = BTreeSet::new();
        let mut techniques = BTreeSet::new();
        let mut years = BTreeSet::new();

        for document in &self.documents {
            workshops.insert(document.workshop_id.clone());
            session_types.insert(document.session_type.to_string());
            years.insert(document.year);
            presenters.extend(document.all_presenters().map(str::to_string));
            techniques.extend(
                document
                    .techniques
                    .iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty()),
            );
        }
        let topics: BTreeSet<String> = self.topics.iter().map(|(key, _)| key.to_string()).collect();

        FilterOptions {
            workshops: workshops.into_iter().collect(),
            presenters: presenters.into_iter().collect(),
            session_types: session_types.into_iter().collect(),
            topics: topics.into_iter().collect(),
            techniques: techniques.into_iter().collect(),
            years: years.into_iter().rev().collect(),
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.documents.len(),
            skipped_documents: self.skipped,
            indexed_terms: self.terms.len(),
            presenters: self.presenters.len(),
            topics: self.topics.len(),
            techniques: self.techniques.len(),
            built_at: self.built_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionType;

    fn documents() -> Vec<SessionDocument> {
        vec![
            SessionDocument::new("d1", "wog", 2023, "Bayesian phylogenetics workshop", SessionType::Lecture)
                .with_presenters(vec!["Smith-Jane"])
                .with_techniques(vec!["BEAST", "MrBayes"]),
            SessionDocument::new("d2", "wpsg", 2024, "Genome assembly practical", SessionType::Practical)
                .with_presenters(vec!["doe-john"])
                .with_co_presenters(vec!["smith-jane"]),
            SessionDocument::new("d3", "wog", 2024, "Phylogenetic tree bootstrap methods", SessionType::Lab)
                .with_presenters(vec!["smith-jane"])
                .with_techniques(vec!["beast "]),
        ]
    }

    #[test]
    fn test_build_postings() {
        let index = SearchIndex::build(&documents(), &TopicVocabulary::default());

        assert_eq!(index.len(), 3);
        assert_eq!(index.terms().get("topic:bayesian"), Some(&BTreeSet::from([0])));
        assert_eq!(index.terms().get("topic:workshop"), Some(&BTreeSet::from([0])));
        assert!(index.terms().get("topic:of").is_none());
        assert_eq!(index.presenters().get("smith-jane"), Some(&BTreeSet::from([0, 1, 2])));
        assert_eq!(index.topics().get("tree"), Some(&BTreeSet::from([2])));
        assert_eq!(index.topics().get("bayesian"), Some(&BTreeSet::from([0])));
        assert_eq!(index.techniques().get("beast"), Some(&BTreeSet::from([0, 2])));
        assert_eq!(index.derived_topics(2), &["tree", "bootstrap"]);
    }

    #[test]
    fn test_presenter_iteration_keeps_insertion_order() {
        let index = SearchIndex::build(&documents(), &TopicVocabulary::default());
        let keys: Vec<&str> = index.presenters().iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["smith-jane", "doe-john"]);
    }

    #[test]
    fn test_skips_missing_and_duplicate_ids() {
        let mut docs = documents();
        docs.push(SessionDocument::new("", "wog", 2024, "Orphan session", SessionType::Lecture));
        docs.push(SessionDocument::new("d1", "wog", 2024, "Duplicate", SessionType::Lecture));

        let index = SearchIndex::build(&docs, &TopicVocabulary::default());
        assert_eq!(index.len(), 3);
        assert_eq!(index.skipped_documents(), 2);
        assert!(index.terms().get("topic:orphan").is_none());
        assert!(index.terms().get("topic:duplicate").is_none());
    }

    #[test]
    fn test_try_build_rejects_invalid_document() {
        let mut docs = documents();
        docs.insert(1, SessionDocument::new("", "wog", 2024, "Orphan", SessionType::Lecture));

        match SearchIndex::try_build(&docs, &TopicVocabulary::default()) {
            Err(SearchError::InvalidDocument { position, .. }) => assert_eq!(position, 1),
            other => panic!("expected InvalidDocument, got {:?}", other.map(|i| i.len())),
        }
        assert!(SearchIndex::try_build(&documents(), &TopicVocabulary::default()).is_ok());
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = SearchIndex::build(&documents(), &TopicVocabulary::default());
        let second = SearchIndex::build(&documents(), &TopicVocabulary::default());
        assert_eq!(first.posting_snapshot(), second.posting_snapshot());
    }

    #[test]
    fn test_filter_options() {
        let index = SearchIndex::build(&documents(), &TopicVocabulary::default());
        let options = index.filter_options();

        assert_eq!(options.workshops, vec!["wog", "wpsg"]);
        assert_eq!(options.presenters, vec!["Smith-Jane", "doe-john", "smith-jane"]);
        assert_eq!(options.session_types, vec!["lab", "lecture", "practical"]);
        assert_eq!(options.techniques, vec!["beast", "mrbayes"]);
        assert_eq!(options.years, vec![2024, 2023]);
        assert!(options.topics.contains(&"bootstrap".to_string()));
    }

    #[test]
    fn test_stats() {
        let index = SearchIndex::build(&documents(), &TopicVocabulary::default());
        let stats = index.stats();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.skipped_documents, 0);
        assert_eq!(stats.presenters, 2);
        assert_eq!(stats.techniques, 2);
        assert_eq!(stats.indexed_terms, index.terms().len());
    }
}
