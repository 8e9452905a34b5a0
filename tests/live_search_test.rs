//! Debounced search-as-you-type

mod common;

use common::{phylo_corpus, service};
use std::time::Duration;
use workshop_archive_search::search::{LiveSearch, SearchFilters, DEFAULT_DEBOUNCE};

fn ids(state: &workshop_archive_search::search::LiveSearchState) -> Vec<String> {
    state.results.iter().map(|r| r.document.id.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_only_the_last_keystroke_searches() {
    let live = LiveSearch::new(service(phylo_corpus()), DEFAULT_DEBOUNCE);
    let mut updates = live.subscribe();

    for partial in ["ph", "phy", "phylo"] {
        live.set_query(partial);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(live.is_pending());
    assert_eq!(live.current().generation, 0);

    updates.changed().await.unwrap();
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.generation, 1);
    assert_eq!(state.query, "phylo");
    assert_eq!(ids(&state), vec!["d1", "d3"]);

    // Nothing else was queued behind it
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(live.current().generation, 1);
}

#[tokio::test(start_paused = true)]
async fn test_filter_change_searches_immediately() {
    let live = LiveSearch::new(service(phylo_corpus()), DEFAULT_DEBOUNCE);

    live.set_query("smith");
    live.set_filters(SearchFilters::new().with_years([2024]));
    assert!(!live.is_pending());

    let state = live.current();
    assert_eq!(state.generation, 1);
    assert_eq!(state.query, "smith");
    assert_eq!(ids(&state), vec!["d3"]);

    // The debounced query search was superseded
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(live.current().generation, 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_publishes_empty_state() {
    let live = LiveSearch::new(service(phylo_corpus()), Duration::from_millis(50));

    live.set_query("phylo");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(live.current().results.len(), 2);

    live.set_query("genome");
    live.clear();
    let state = live.current();
    assert!(state.query.is_empty());
    assert!(state.results.is_empty());
    assert_eq!(state.generation, 2);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(live.current().generation, 2);
}

#[tokio::test(start_paused = true)]
async fn test_short_query_publishes_no_results() {
    let live = LiveSearch::new(service(phylo_corpus()), DEFAULT_DEBOUNCE);
    let mut updates = live.subscribe();

    live.set_query("ph");
    updates.changed().await.unwrap();
    assert!(updates.borrow().results.is_empty());
}
