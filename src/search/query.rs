//! Search queries and facet filters

use crate::models::{SessionDocument, SessionType};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Inclusive date range on the session date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Facet filters applied after text matching.
///
/// `None` leaves a facet unconstrained. `Some(set)` with a non-empty set
/// requires the document to match at least one member. An empty set is the
/// same as `None`: the builders normalise it away and `admits` ignores it.
/// Facets combine with AND.
///
/// Serialized lists that are empty deserialize to `None`, so a stored search
/// filters the same way after a reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Workshop identifiers, exact match
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "facet")]
    pub workshops: Option<BTreeSet<String>>,

    /// Presenter fragments, case-insensitive substring of any presenter or co-presenter
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "facet")]
    pub presenters: Option<BTreeSet<String>>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "facet")]
    pub session_types: Option<BTreeSet<SessionType>>,

    /// Derived topics
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "facet")]
    pub topics: Option<BTreeSet<String>>,

    /// Technique tags, case-insensitive
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "facet")]
    pub techniques: Option<BTreeSet<String>>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "facet")]
    pub years: Option<BTreeSet<i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

fn facet<'de, D, T>(deserializer: D) -> Result<Option<BTreeSet<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Ord,
{
    let values: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(values
        .filter(|values| !values.is_empty())
        .map(|values| values.into_iter().collect()))
}

fn collect(values: impl IntoIterator<Item = impl Into<String>>) -> Option<BTreeSet<String>> {
    non_empty(values.into_iter().map(Into::into).collect())
}

fn non_empty<T>(set: BTreeSet<T>) -> Option<BTreeSet<T>> {
    (!set.is_empty()).then_some(set)
}

/// The facet's set when it actually constrains anything
fn constraint<T>(facet: &Option<BTreeSet<T>>) -> Option<&BTreeSet<T>> {
    facet.as_ref().filter(|set| !set.is_empty())
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workshops(mut self, workshops: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.workshops = collect(workshops);
        self
    }

    pub fn with_presenters(mut self, presenters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.presenters = collect(presenters);
        self
    }

    pub fn with_session_types(mut self, types: impl IntoIterator<Item = SessionType>) -> Self {
        self.session_types = non_empty(types.into_iter().collect());
        self
    }

    pub fn with_topics(mut self, topics: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.topics = collect(topics);
        self
    }

    pub fn with_techniques(mut self, techniques: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.techniques = collect(techniques);
        self
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = non_empty(years.into_iter().collect());
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    /// True when no facet is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.active_facets() == 0
    }

    /// Number of constrained facets
    pub fn active_facets(&self) -> usize {
        [
            constraint(&self.workshops).is_some(),
            constraint(&self.presenters).is_some(),
            constraint(&self.session_types).is_some(),
            constraint(&self.topics).is_some(),
            constraint(&self.techniques).is_some(),
            constraint(&self.years).is_some(),
            self.date_range.is_some(),
        ]
        .iter()
        .filter(|&&active| active)
        .count()
    }

    /// Whether `document` passes every constrained facet.
    ///
    /// `derived_topics` are the topics the index derived from the document
    /// title. Sessions without a parseable date pass the date range.
    pub fn admits(&self, document: &SessionDocument, derived_topics: &[String]) -> bool {
        if let Some(workshops) = constraint(&self.workshops) {
            if !workshops.contains(&document.workshop_id) {
                return false;
            }
        }

        if let Some(presenters) = constraint(&self.presenters) {
            let own: Vec<String> = document.all_presenters().map(str::to_lowercase).collect();
            let hit = presenters.iter().any(|wanted| {
                let wanted = wanted.to_lowercase();
                own.iter().any(|presenter| presenter.contains(&wanted))
            });
            if !hit {
                return false;
            }
        }

        if let Some(types) = constraint(&self.session_types) {
            if !types.contains(&document.session_type) {
                return false;
            }
        }

        if let Some(years) = constraint(&self.years) {
            if !years.contains(&document.year) {
                return false;
            }
        }

        if let Some(topics) = constraint(&self.topics) {
            let hit = topics
                .iter()
                .any(|wanted| derived_topics.iter().any(|t| t.eq_ignore_ascii_case(wanted)));
            if !hit {
                return false;
            }
        }

        if let Some(techniques) = constraint(&self.techniques) {
            let hit = techniques.iter().any(|wanted| {
                let wanted = wanted.trim().to_lowercase();
                document
                    .techniques
                    .iter()
                    .any(|t| t.trim().to_lowercase() == wanted)
            });
            if !hit {
                return false;
            }
        }

        if let (Some(range), Some(date)) = (&self.date_range, document.parsed_date()) {
            if !range.contains(date) {
                return false;
            }
        }

        true
    }
}

/// Free-text query plus facet filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,

    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_workshops(mut self, workshops: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.filters = self.filters.with_workshops(workshops);
        self
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.filters = self.filters.with_years(years);
        self
    }
}
