//! Closed vocabulary used to derive topics from session titles

use serde::{Deserialize, Serialize};

/// Terms scanned for when no vocabulary is configured
pub const DEFAULT_TOPIC_TERMS: &[&str] = &[
    "phylogeny",
    "evolution",
    "genomics",
    "genetics",
    "dna",
    "rna",
    "protein",
    "sequence",
    "alignment",
    "tree",
    "species",
    "population",
    "selection",
    "mutation",
    "variation",
    "diversity",
    "conservation",
    "ecology",
    "bioinformatics",
    "analysis",
    "modeling",
    "simulation",
    "algorithm",
    "statistics",
    "bayesian",
    "likelihood",
    "bootstrap",
    "mcmc",
];

/// A fixed list of lower-case domain terms.
///
/// A term is a derived topic of a text when it occurs anywhere in the
/// lower-cased text, so `"rna"` also fires on "internal".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TopicVocabulary {
    terms: Vec<String>,
}

impl TopicVocabulary {
    /// Normalizes terms: trimmed, lower-cased, empties and duplicates dropped
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !normalized.contains(&term) {
                normalized.push(term);
            }
        }
        Self { terms: normalized }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Vocabulary terms found in `text`, in vocabulary order
    pub fn extract(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .filter(|term| lowered.contains(term.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for TopicVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_TERMS)
    }
}

impl From<Vec<String>> for TopicVocabulary {
    fn from(terms: Vec<String>) -> Self {
        Self::new(terms)
    }
}

impl From<TopicVocabulary> for Vec<String> {
    fn from(vocabulary: TopicVocabulary) -> Self {
        vocabulary.terms
    }
}
