use super::error::SavedSearchResult;
use super::model::SavedSearch;
use super::store::SavedSearchStore;
use crate::models::SessionType;
use crate::search::SearchFilters;
use once_cell::sync::Lazy;
use serde::Serialize;

/// Ready-made search offered to users with no saved searches yet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSearchTemplate {
    pub name: String,
    pub query: String,
    pub description: String,
    pub filters: SearchFilters,
}

impl QuickSearchTemplate {
    fn new(name: &str, query: &str, description: &str, filters: SearchFilters) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
            description: description.to_string(),
            filters,
        }
    }
}

pub static QUICK_SEARCH_TEMPLATES: Lazy<Vec<QuickSearchTemplate>> = Lazy::new(|| {
    vec![
        QuickSearchTemplate::new(
            "Phylogenetic Analysis",
            "phylogeny tree reconstruction",
            "Find sessions about phylogenetic tree reconstruction and analysis",
            SearchFilters::new()
                .with_session_types([SessionType::Lecture, SessionType::Practical])
                .with_topics(["phylogeny"]),
        ),
        QuickSearchTemplate::new(
            "Genomic Variants",
            "variant calling SNP mutation",
            "Sessions focused on variant calling and SNP analysis",
            SearchFilters::new()
                .with_session_types([SessionType::Practical])
                .with_topics(["genomics"]),
        ),
        QuickSearchTemplate::new(
            "Population Genetics",
            "population structure diversity",
            "Population genetics and structure analysis sessions",
            SearchFilters::new()
                .with_workshops(["wpsg"])
                .with_topics(["population"]),
        ),
        QuickSearchTemplate::new(
            "Bioinformatics Tools",
            "BLAST alignment tools software",
            "Hands-on sessions with bioinformatics tools and software",
            SearchFilters::new()
                .with_session_types([SessionType::Practical])
                .with_topics(["bioinformatics"]),
        ),
        QuickSearchTemplate::new(
            "Recent Advances",
            "",
            "Latest lectures from recent workshops",
            SearchFilters::new()
                .with_session_types([SessionType::Lecture])
                .with_years([2023, 2024, 2025]),
        ),
    ]
});

/// Case-insensitive lookup by template name
pub fn find_template(name: &str) -> Option<&'static QuickSearchTemplate> {
    let name = name.trim();
    QUICK_SEARCH_TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

impl SavedSearchStore {
    /// Save a template under its own name with a zero result count
    pub fn apply_template(&self, template: &QuickSearchTemplate) -> SavedSearchResult<SavedSearch> {
        self.save(&template.name, &template.query, template.filters.clone(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved::{MemoryStorage, SavedSearchConfig};

    #[test]
    fn test_templates_are_uniquely_named() {
        let mut names: Vec<_> = QUICK_SEARCH_TEMPLATES.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_find_template_ignores_case() {
        let template = find_template("population genetics").unwrap();
        assert_eq!(template.query, "population structure diversity");
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn test_apply_template_saves_it() {
        let store =
            SavedSearchStore::open(Box::new(MemoryStorage::new()), SavedSearchConfig::default())
                .unwrap();
        let template = find_template("Recent Advances").unwrap();

        let saved = store.apply_template(template).unwrap();
        assert_eq!(saved.name, "Recent Advances");
        assert_eq!(saved.result_count, 0);
        assert_eq!(saved.filters, template.filters);
    }
}
