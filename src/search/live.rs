//! Debounced search-as-you-type

use crate::search::debounce::Debouncer;
use crate::search::query::{SearchFilters, SearchQuery};
use crate::search::ranking::ScoredResult;
use crate::search::service::SearchService;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Delay between the last keystroke and the search it triggers
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Latest published search
#[derive(Debug, Clone, Default)]
pub struct LiveSearchState {
    pub query: String,
    pub filters: SearchFilters,
    pub results: Arc<Vec<ScoredResult>>,
    /// Incremented on every publish
    pub generation: u64,
}

#[derive(Default)]
struct Inputs {
    query: String,
    filters: SearchFilters,
}

struct Shared {
    service: Arc<SearchService>,
    inputs: Mutex<Inputs>,
    state: watch::Sender<LiveSearchState>,
}

impl Shared {
    /// Search with whatever the inputs hold right now and publish
    fn run(&self) {
        let query = {
            let inputs = self.inputs.lock();
            SearchQuery::new(inputs.query.clone()).with_filters(inputs.filters.clone())
        };
        let results = self.service.search(&query);
        tracing::debug!(query = %query.query, results = results.len(), "Live search published");

        self.state.send_modify(|state| {
            state.query = query.query;
            state.filters = query.filters;
            state.results = Arc::new(results);
            state.generation += 1;
        });
    }
}

/// Query input wired to a [`SearchService`].
///
/// Text changes are debounced; filter changes search immediately. Results
/// are published on a watch channel.
pub struct LiveSearch {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl LiveSearch {
    pub fn new(service: Arc<SearchService>, delay: Duration) -> Self {
        let (state, _) = watch::channel(LiveSearchState::default());
        Self {
            shared: Arc::new(Shared {
                service,
                inputs: Mutex::new(Inputs::default()),
                state,
            }),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveSearchState> {
        self.shared.state.subscribe()
    }

    pub fn current(&self) -> LiveSearchState {
        self.shared.state.borrow().clone()
    }

    /// Record the query text and schedule a search after the debounce delay
    pub fn set_query(&self, query: impl Into<String>) {
        self.shared.inputs.lock().query = query.into();
        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(async move {
            shared.run();
        });
    }

    /// Replace the filters and search right away with the latest query text
    pub fn set_filters(&self, filters: SearchFilters) {
        self.shared.inputs.lock().filters = filters;
        self.debouncer.cancel();
        self.shared.run();
    }

    /// Drop pending work and publish an empty state
    pub fn clear(&self) {
        self.debouncer.cancel();
        *self.shared.inputs.lock() = Inputs::default();
        self.shared.state.send_modify(|state| {
            state.query.clear();
            state.filters = SearchFilters::default();
            state.results = Arc::new(Vec::new());
            state.generation += 1;
        });
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
