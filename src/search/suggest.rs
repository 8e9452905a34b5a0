//! Autocomplete suggestions from the auxiliary indexes

use crate::search::index::{PostingMap, SearchIndex};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SuggestionType {
    Presenter,
    Technique,
    Topic,
}

impl SuggestionType {
    /// Group heading shown next to the suggestion
    pub fn category(&self) -> &'static str {
        match self {
            SuggestionType::Presenter => "Presenters",
            SuggestionType::Technique => "Techniques",
            SuggestionType::Topic => "Topics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    /// Documents carrying this value
    pub count: usize,
    pub category: String,
}

impl SearchIndex {
    /// Index keys containing `partial`, exact matches first, then by count.
    ///
    /// Presenters are scanned before techniques and topics; equal entries keep
    /// that order.
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<SearchSuggestion> {
        let needle = partial.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut suggestions = Vec::new();
        collect(self.presenters(), &needle, SuggestionType::Presenter, &mut suggestions);
        collect(self.techniques(), &needle, SuggestionType::Technique, &mut suggestions);
        collect(self.topics(), &needle, SuggestionType::Topic, &mut suggestions);

        suggestions.sort_by(|a, b| {
            let a_exact = a.text == needle;
            let b_exact = b.text == needle;
            b_exact.cmp(&a_exact).then(b.count.cmp(&a.count))
        });
        suggestions.truncate(limit);
        suggestions
    }
}

fn collect(postings: &PostingMap, needle: &str, kind: SuggestionType, out: &mut Vec<SearchSuggestion>) {
    for (key, docs) in postings.iter() {
        if docs.is_empty() || !key.contains(needle) {
            continue;
        }
        out.push(SearchSuggestion {
            text: key.to_string(),
            kind,
            count: docs.len(),
            category: kind.category().to_string(),
        });
    }
}
