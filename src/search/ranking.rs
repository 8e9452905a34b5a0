//! Additive multi-field scoring

use crate::models::SessionDocument;
use crate::search::analysis;
use crate::search::config::SearchOptions;
use crate::search::highlight::{find_highlights, Highlight};
use crate::search::index::{DocId, PostingMap, SearchIndex, TOPIC_FIELD};
use crate::search::query::SearchFilters;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use strum::{Display, EnumString};

/// Scores at or above this are `High`
pub const HIGH_RELEVANCE_SCORE: f64 = 5.0;

/// Scores at or above this (and below high) are `Medium`
pub const MEDIUM_RELEVANCE_SCORE: f64 = 2.0;

/// Coarse relevance band derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RELEVANCE_SCORE {
            Relevance::High
        } else if score >= MEDIUM_RELEVANCE_SCORE {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }
}

/// Which index produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchField {
    Title,
    Presenter,
    Technique,
    Topic,
}

/// One contribution to a result's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub field: MatchField,

    /// Matched value: the full title, or the matched index key
    pub value: String,

    /// Where the query term occurs in `value`
    pub highlights: Vec<Highlight>,
}

/// A matching document with its score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    pub document: Arc<SessionDocument>,
    pub score: f64,
    pub matches: Vec<SearchMatch>,
    pub relevance: Relevance,
}

#[derive(Default)]
struct Accumulator {
    hits: BTreeMap<DocId, (f64, Vec<SearchMatch>)>,
}

impl Accumulator {
    fn add(&mut self, doc: DocId, weight: f64, matched: SearchMatch) {
        let entry = self.hits.entry(doc).or_insert_with(|| (0.0, Vec::new()));
        entry.0 += weight;
        entry.1.push(matched);
    }
}

impl SearchIndex {
    /// Rank documents against a free-text query.
    ///
    /// Filters only narrow text matches: a query with no usable terms returns
    /// nothing whatever the filters say.
    pub fn search(&self, query: &str, filters: &SearchFilters, options: &SearchOptions) -> Vec<ScoredResult> {
        let terms = analysis::query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut acc = Accumulator::default();
        let weights = &options.weights;

        if options.include_titles {
            for term in &terms {
                for doc in self.title_matches(term, options.fuzzy_match) {
                    if let Some(document) = self.document(doc) {
                        let matched = SearchMatch {
                            field: MatchField::Title,
                            value: document.topic.clone(),
                            highlights: find_highlights(&document.topic, term),
                        };
                        acc.add(doc, weights.title, matched);
                    }
                }
            }
        }
        if options.include_presenters {
            scan_contains(self.presenters(), &terms, MatchField::Presenter, weights.presenter, &mut acc);
        }
        if options.include_techniques {
            scan_contains(self.techniques(), &terms, MatchField::Technique, weights.technique, &mut acc);
        }
        if options.include_topics {
            scan_contains(self.topics(), &terms, MatchField::Topic, weights.topic, &mut acc);
        }

        let matched = acc.hits.len();
        let mut results: Vec<ScoredResult> = acc
            .hits
            .into_iter()
            .filter(|(doc, (score, _))| {
                *score >= options.min_score
                    && self
                        .document(*doc)
                        .is_some_and(|d| filters.admits(d, self.derived_topics(*doc)))
            })
            .filter_map(|(doc, (score, matches))| {
                self.document(doc).map(|document| ScoredResult {
                    document: Arc::clone(document),
                    score,
                    matches,
                    relevance: Relevance::from_score(score),
                })
            })
            .collect();

        // stable: equal scores stay in corpus order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(options.max_results);

        tracing::debug!(
            query = %query,
            terms = terms.len(),
            matched,
            returned = results.len(),
            "Search executed"
        );
        results
    }

    fn title_matches(&self, term: &str, fuzzy: bool) -> BTreeSet<DocId> {
        if !fuzzy {
            return self
                .terms()
                .get(&format!("{}:{}", TOPIC_FIELD, term))
                .cloned()
                .unwrap_or_default();
        }

        let prefix = format!("{}:", TOPIC_FIELD);
        let mut docs = BTreeSet::new();
        for (key, postings) in self.terms().iter() {
            if let Some(token) = key.strip_prefix(&prefix) {
                if token.contains(term) {
                    docs.extend(postings.iter().copied());
                }
            }
        }
        docs
    }
}

/// Substring containment of each term inside each index key
fn scan_contains(postings: &PostingMap, terms: &[String], field: MatchField, weight: f64, acc: &mut Accumulator) {
    for term in terms {
        for (key, docs) in postings.iter() {
            if !key.contains(term.as_str()) {
                continue;
            }
            let highlights = find_highlights(key, term);
            for &doc in docs {
                let matched = SearchMatch {
                    field,
                    value: key.to_string(),
                    highlights: highlights.clone(),
                };
                acc.add(doc, weight, matched);
            }
        }
    }
}
