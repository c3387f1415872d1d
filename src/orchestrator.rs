//! Query pipeline: debounce, validate, cache-or-fetch, publish.
//!
//! Every query that passes validation is tagged with a request id taken from
//! a monotonically increasing counter. A completion is applied only while its
//! id is still the latest accepted one, so a slow response can never overwrite
//! the results of a newer query. Late completions still populate the cache.

use crate::cache::QueryCache;
use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::error::{Rejection, SearchError};
use crate::events::{EventEmitter, SearchEvent};
use crate::fetch::Fetcher;
use crate::navigator::HighlightNavigator;
use crate::results::result_set;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Check a raw query against the length policy.
pub fn validate(query: &str, min_query_length: usize) -> Result<(), Rejection> {
    if query.trim().is_empty() {
        return Err(Rejection::Blank);
    }
    let len = query.chars().count();
    if len < min_query_length {
        return Err(Rejection::TooShort {
            len,
            min: min_query_length,
        });
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub struct SearchOrchestrator<R> {
    min_query_length: usize,
    cache: Mutex<QueryCache<R>>,
    fetcher: Arc<dyn Fetcher<R>>,
    events: Arc<EventEmitter<R>>,
    navigator: Arc<Mutex<HighlightNavigator<R>>>,
    debouncer: Debouncer,
    /// Set at teardown. Held while request ids, loading state, cache writes
    /// and published results change, so those transitions never interleave.
    torn_down: Mutex<bool>,
    latest_request: AtomicU64,
    loading: AtomicBool,
}

impl<R> std::fmt::Debug for SearchOrchestrator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("min_query_length", &self.min_query_length)
            .field("cached_queries", &lock(&self.cache).len())
            .field("latest_request", &self.latest_request.load(Ordering::SeqCst))
            .field("loading", &self.loading.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<R> SearchOrchestrator<R> {
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Id of the most recently accepted query, `0` before the first one.
    pub fn latest_request(&self) -> u64 {
        self.latest_request.load(Ordering::SeqCst)
    }

    /// Whether a debounced search is waiting to fire.
    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn is_torn_down(&self) -> bool {
        *lock(&self.torn_down)
    }

    /// Stop for good: cancel the pending search, retire the in-flight one and
    /// release the cache. Completions arriving afterwards are dropped without
    /// caching or publishing. Idempotent.
    pub fn teardown(&self) {
        let mut torn_down = lock(&self.torn_down);
        if !*torn_down {
            tracing::debug!(
                "Retiring request {}",
                self.latest_request.load(Ordering::SeqCst)
            );
        }
        *torn_down = true;
        self.loading.store(false, Ordering::SeqCst);
        self.debouncer.cancel();
        lock(&self.cache).clear();
    }

    /// Forget the cached results for `query`. Published results are kept.
    pub fn remove_from_cache(&self, query: &str) {
        lock(&self.cache).evict(query);
    }

    /// Forget every cached result. Published results are kept.
    pub fn remove_all_from_cache(&self) {
        lock(&self.cache).clear();
    }

    pub fn is_cached(&self, query: &str) -> bool {
        lock(&self.cache).get(query).is_some()
    }

    pub fn cached_queries(&self) -> usize {
        lock(&self.cache).len()
    }
}

impl<R> SearchOrchestrator<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Build an orchestrator publishing into `navigator` and announcing
    /// through `events`.
    pub fn new(
        config: &SearchConfig,
        fetcher: Arc<dyn Fetcher<R>>,
        events: Arc<EventEmitter<R>>,
        navigator: Arc<Mutex<HighlightNavigator<R>>>,
    ) -> Self {
        let cache = config
            .cache_capacity()
            .map_or_else(QueryCache::new, QueryCache::with_capacity);

        Self {
            min_query_length: config.min_query_length,
            cache: Mutex::new(cache),
            fetcher,
            events,
            navigator,
            debouncer: Debouncer::new(config.debounce_rate, config.debounce_after),
            torn_down: Mutex::new(false),
            latest_request: AtomicU64::new(0),
            loading: AtomicBool::new(false),
        }
    }

    /// Debounced entry point for raw input changes.
    ///
    /// The outcome is only observable through events; failures are logged.
    pub fn search(self: &Arc<Self>, query: impl Into<String>) {
        let query = query.into();
        if self.is_torn_down() {
            tracing::debug!("Ignoring '{}' after teardown", query);
            return;
        }

        let this = Arc::clone(self);
        self.debouncer.call(move || async move {
            match this.search_now(&query).await {
                Ok(_) => {}
                Err(e) if e.is_silent() => {
                    tracing::debug!("Search for '{}' ended: {}", query, e);
                }
                Err(e) => tracing::warn!("Search for '{}' failed: {}", query, e),
            }
        });
    }

    /// Run the pipeline for `query` immediately, bypassing the debouncer.
    ///
    /// Returns the records that were published.
    pub async fn search_now(&self, query: &str) -> Result<Vec<R>, SearchError> {
        if let Err(rejection) = validate(query, self.min_query_length) {
            tracing::debug!("Rejected query '{}': {}", query, rejection);
            return Err(rejection.into());
        }

        let request_id = {
            let torn_down = lock(&self.torn_down);
            if *torn_down {
                return Err(SearchError::TornDown);
            }
            let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            self.set_loading(true);

            let cached = lock(&self.cache)
                .get(query)
                .filter(|records| !records.is_empty())
                .map(<[R]>::to_vec);
            if let Some(records) = cached {
                tracing::debug!("Cache hit for '{}' ({} results)", query, records.len());
                self.set_loading(false);
                return self.publish(request_id, records);
            }
            request_id
        };

        tracing::debug!("Cache miss for '{}', request {}", query, request_id);
        let outcome = self.fetcher.request(query).await;

        let torn_down = lock(&self.torn_down);
        if *torn_down {
            tracing::debug!("Dropping request {} after teardown", request_id);
            return Err(SearchError::TornDown);
        }
        match outcome {
            Ok(records) => {
                lock(&self.cache).put(query, records.clone());
                if self.is_current(request_id) {
                    self.set_loading(false);
                }
                self.publish(request_id, records)
            }
            Err(e) => {
                if self.is_current(request_id) {
                    self.set_loading(false);
                }
                Err(e.into())
            }
        }
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.latest_request.load(Ordering::SeqCst) == request_id
    }

    /// Caller holds `torn_down`. Emits only when the state flips.
    fn set_loading(&self, loading: bool) {
        if self.loading.swap(loading, Ordering::SeqCst) != loading {
            self.events.emit(&SearchEvent::LoadingChanged(loading));
        }
    }

    /// Caller holds `torn_down`.
    fn publish(&self, request_id: u64, records: Vec<R>) -> Result<Vec<R>, SearchError> {
        let latest = self.latest_request();
        if latest != request_id {
            tracing::debug!(
                "Discarding results of request {} (latest is {})",
                request_id,
                latest
            );
            return Err(SearchError::Superseded { request_id, latest });
        }

        let hits = result_set(records.iter().cloned());
        lock(&self.navigator).replace(hits.clone());
        self.events.emit(&SearchEvent::ResultsChanged(hits));
        Ok(records)
    }

    /// Empty the published results. The cache is left alone.
    pub fn clear_results(&self) {
        let _torn_down = lock(&self.torn_down);
        lock(&self.navigator).replace(Vec::new());
        self.events.emit(&SearchEvent::ResultsChanged(Vec::new()));
    }
}
