//! Search options

use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};

/// Per-field score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    /// Topic/title token match
    pub title: f64,

    /// Presenter substring match
    pub presenter: f64,

    /// Technique tag substring match
    pub technique: f64,

    /// Derived topic substring match
    pub topic: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 3.0,
            presenter: 2.5,
            technique: 2.0,
            topic: 1.5,
        }
    }
}

/// Options controlling which fields are searched and how results are cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Search the topic/title field
    pub include_titles: bool,

    /// Search the presenter index
    pub include_presenters: bool,

    /// Search the technique index
    pub include_techniques: bool,

    /// Search the derived topic index
    pub include_topics: bool,

    /// Match title tokens by containment instead of equality
    pub fuzzy_match: bool,

    /// Maximum results to return
    pub max_results: usize,

    /// Results scoring below this are dropped
    pub min_score: f64,

    /// Field weights
    pub weights: FieldWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_titles: true,
            include_presenters: true,
            include_techniques: true,
            include_topics: true,
            fuzzy_match: true,
            max_results: 50,
            min_score: 0.1,
            weights: FieldWeights::default(),
        }
    }
}

impl SearchOptions {
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::new()
    }

    /// Reject option sets that would make every search empty or scores meaningless
    pub fn validate(&self) -> SearchResult<()> {
        if self.max_results == 0 {
            return Err(SearchError::InvalidConfiguration(
                "max_results must be greater than zero".to_string(),
            ));
        }
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(SearchError::InvalidConfiguration(format!(
                "min_score must be a non-negative number, got {}",
                self.min_score
            )));
        }
        let weights = [
            ("title", self.weights.title),
            ("presenter", self.weights.presenter),
            ("technique", self.weights.technique),
            ("topic", self.weights.topic),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SearchError::InvalidConfiguration(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

/// Builder for SearchOptions
pub struct SearchOptionsBuilder {
    options: SearchOptions,
}

impl SearchOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: SearchOptions::default(),
        }
    }

    pub fn include_titles(mut self, enabled: bool) -> Self {
        self.options.include_titles = enabled;
        self
    }

    pub fn include_presenters(mut self, enabled: bool) -> Self {
        self.options.include_presenters = enabled;
        self
    }

    pub fn include_techniques(mut self, enabled: bool) -> Self {
        self.options.include_techniques = enabled;
        self
    }

    pub fn include_topics(mut self, enabled: bool) -> Self {
        self.options.include_topics = enabled;
        self
    }

    pub fn fuzzy_match(mut self, enabled: bool) -> Self {
        self.options.fuzzy_match = enabled;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.options.max_results = max;
        self
    }

    pub fn min_score(mut self, min: f64) -> Self {
        self.options.min_score = min;
        self
    }

    pub fn weights(mut self, weights: FieldWeights) -> Self {
        self.options.weights = weights;
        self
    }

    pub fn build(self) -> SearchOptions {
        self.options
    }
}

impl Default for SearchOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.max_results, 50);
        assert_eq!(options.weights.title, 3.0);
        assert_eq!(options.weights.presenter, 2.5);
        assert_eq!(options.weights.topic, 1.5);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = SearchOptions::builder()
            .fuzzy_match(false)
            .include_presenters(false)
            .max_results(5)
            .build();
        assert!(!options.fuzzy_match);
        assert!(!options.include_presenters);
        assert_eq!(options.max_results, 5);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(SearchOptions::builder().max_results(0).build().validate().is_err());
        assert!(SearchOptions::builder().min_score(-1.0).build().validate().is_err());

        let weights = FieldWeights {
            presenter: f64::NAN,
            ..Default::default()
        };
        assert!(SearchOptions::builder().weights(weights).build().validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let options: SearchOptions = serde_json::from_str(r#"{"max_results": 10}"#).unwrap();
        assert_eq!(options.max_results, 10);
        assert!(options.fuzzy_match);
        assert_eq!(options.weights, FieldWeights::default());
    }
}
