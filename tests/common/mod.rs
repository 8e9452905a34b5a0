//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use workshop_archive_search::models::{SessionDocument, SessionType};
use workshop_archive_search::search::SearchService;

pub fn session(
    id: &str,
    workshop: &str,
    year: i32,
    topic: &str,
    session_type: SessionType,
    presenter: &str,
) -> SessionDocument {
    SessionDocument::new(id, workshop, year, topic, session_type).with_presenters(vec![presenter])
}

/// D1..D3: two phylogenetics sessions and an unrelated assembly practical
pub fn phylo_corpus() -> Vec<SessionDocument> {
    vec![
        session("d1", "wog", 2023, "Bayesian phylogenetics workshop", SessionType::Lecture, "smith-jane"),
        session("d2", "wpsg", 2024, "Genome assembly practical", SessionType::Practical, "doe-john"),
        session("d3", "wog", 2024, "Phylogenetic tree bootstrap methods", SessionType::Lab, "smith-jane"),
    ]
}

/// Six sessions over three workshops; smith-jane presents four of them
pub fn archive_corpus() -> Vec<SessionDocument> {
    vec![
        session("a1", "wog", 2022, "Bayesian phylogenetics workshop", SessionType::Lecture, "smith-jane")
            .with_techniques(vec!["BEAST"])
            .with_date("2022-05-10"),
        session("a2", "wpsg", 2023, "Population structure and admixture", SessionType::Lecture, "smith-jane")
            .with_co_presenters(vec!["doe-john"])
            .with_techniques(vec!["ADMIXTURE"])
            .with_date("2023-01-16"),
        session("a3", "wog", 2023, "Phylogenetic tree bootstrap methods", SessionType::Lab, "smith-jane")
            .with_techniques(vec!["RAxML"])
            .with_date("2023-05-12"),
        session("a4", "wpsg", 2024, "Genome assembly practical", SessionType::Practical, "doe-john")
            .with_techniques(vec!["SPAdes"])
            .with_date("2024-01-20"),
        session("a5", "wphylo", 2024, "Selection scans in population genomics", SessionType::Practical, "smith-jane")
            .with_co_presenters(vec!["lee-min"])
            .with_techniques(vec!["PAML"])
            .with_date("2024-06-03"),
        session("a6", "wog", 2024, "Welcome and orientation", SessionType::Orientation, "lee-min"),
    ]
}

pub fn service(documents: Vec<SessionDocument>) -> Arc<SearchService> {
    Arc::new(SearchService::new(Arc::new(documents)))
}
