//! The typeahead widget core.
//!
//! [`Typeahead`] is what a rendering layer drives: it forwards raw input to
//! the search pipeline, keyboard input to the highlight cursor, and reports
//! everything back through one [`EventEmitter`].

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::events::{EventEmitter, SearchEvent};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::navigator::{Direction, HighlightNavigator};
use crate::orchestrator::SearchOrchestrator;
use crate::results::Hit;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard};

/// Input events a rendering layer sends to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The text field now holds this value.
    TextChanged(String),
    /// Arrow key: `+1` down, `-1` up.
    Navigate(Direction),
    /// Terminal key, e.g. Enter.
    Commit,
    /// Pointer hovered or focused the result at this index.
    Highlight(usize),
    /// Pointer clicked the result at this index.
    Select(usize),
}

/// Typeahead state for one mounted widget.
///
/// Dropping the widget tears it down: the pending debounce timer is
/// cancelled, the in-flight search is retired and the cache is released.
///
/// Handlers run synchronously while the widget's state is locked and must not
/// call back into the widget. Subscribe through [`EventEmitter::channel`] to
/// react to events with further calls.
pub struct Typeahead<R> {
    config: SearchConfig,
    events: Arc<EventEmitter<R>>,
    navigator: Arc<Mutex<HighlightNavigator<R>>>,
    orchestrator: Arc<SearchOrchestrator<R>>,
}

impl<R> std::fmt::Debug for Typeahead<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeahead")
            .field("config", &self.config)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl<R> Typeahead<R>
where
    R: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Mount a widget backed by the default HTTP fetcher.
    pub fn with_http(config: SearchConfig) -> Self {
        let fetcher = HttpFetcher::new(&config);
        Self::mount(config, Arc::new(fetcher))
    }
}

impl<R> Typeahead<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Mount a widget with an empty cache and no results.
    pub fn mount(config: SearchConfig, fetcher: Arc<dyn Fetcher<R>>) -> Self {
        let events = Arc::new(EventEmitter::new());

        let scroll_offset = config.scroll_offset;
        let emitter = Arc::clone(&events);
        let navigator = Arc::new(Mutex::new(HighlightNavigator::with_observer(Arc::new(
            move |index: usize, record: &R| {
                emitter.emit(&SearchEvent::HighlightChanged {
                    index,
                    record: record.clone(),
                    scroll_offset,
                });
            },
        ))));

        let orchestrator = Arc::new(SearchOrchestrator::new(
            &config,
            fetcher,
            Arc::clone(&events),
            Arc::clone(&navigator),
        ));

        tracing::info!(
            "Mounted typeahead (min_query_length={}, debounce={:?}, trailing={})",
            config.min_query_length,
            config.debounce_rate,
            config.debounce_after
        );

        Self {
            config,
            events,
            navigator,
            orchestrator,
        }
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn events(&self) -> &EventEmitter<R> {
        &self.events
    }

    pub fn orchestrator(&self) -> &Arc<SearchOrchestrator<R>> {
        &self.orchestrator
    }

    fn navigator(&self) -> MutexGuard<'_, HighlightNavigator<R>> {
        self.navigator
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Route an input event to the matching action.
    pub fn handle(&self, event: InputEvent) {
        match event {
            InputEvent::TextChanged(query) => self.search(query),
            InputEvent::Navigate(direction) => {
                self.move_highlight(direction);
            }
            InputEvent::Commit => self.commit(),
            InputEvent::Highlight(index) => {
                self.highlight(index);
            }
            InputEvent::Select(index) => {
                self.select_result(index);
            }
        }
    }

    /// Debounced search for the current input value.
    pub fn search(&self, query: impl Into<String>) {
        self.orchestrator.search(query);
    }

    /// Search immediately, bypassing the debouncer.
    pub async fn search_now(&self, query: &str) -> Result<Vec<R>, SearchError> {
        self.orchestrator.search_now(query).await
    }

    /// Snapshot of the published results.
    pub fn results(&self) -> Vec<Hit<R>> {
        self.navigator().results().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn highlighted(&self) -> Option<(usize, R)> {
        self.navigator()
            .highlighted()
            .map(|(index, record)| (index, record.clone()))
    }

    /// Highlight the result at `index`.
    pub fn highlight(&self, index: usize) -> bool {
        self.navigator().highlight(Some(index))
    }

    /// Move the highlight one step; returns the new index.
    pub fn move_highlight(&self, direction: Direction) -> Option<usize> {
        self.navigator().move_highlight(direction)
    }

    /// Emit a selection for the highlighted result, if there is one.
    pub fn select_highlighted(&self) -> Option<R> {
        let selected = self.navigator().selected()?;
        tracing::debug!("Selecting highlighted result");
        self.events
            .emit(&SearchEvent::SelectionMade(selected.clone()));
        Some(selected)
    }

    /// Emit a selection for the result at `index`.
    pub fn select_result(&self, index: usize) -> Option<R> {
        let record = self
            .navigator()
            .results()
            .get(index)
            .map(|hit| hit.record.clone())?;
        self.events.emit(&SearchEvent::SelectionMade(record.clone()));
        Some(record)
    }

    /// Commit: selects the highlighted result, or emits a plain commit when
    /// nothing is highlighted.
    pub fn commit(&self) {
        if self.select_highlighted().is_none() {
            self.events.emit(&SearchEvent::Commit);
        }
    }

    pub fn clear_results(&self) {
        self.orchestrator.clear_results();
    }

    pub fn remove_from_cache(&self, query: &str) {
        self.orchestrator.remove_from_cache(query);
    }

    pub fn remove_all_from_cache(&self) {
        self.orchestrator.remove_all_from_cache();
    }
}

impl<R> Typeahead<R> {
    /// Stop searching and release the cache. A search still in flight
    /// completes without caching or publishing. Idempotent.
    pub fn teardown(&self) {
        self.orchestrator.teardown();
    }
}

impl<R> Drop for Typeahead<R> {
    fn drop(&mut self) {
        tracing::info!("Tearing down typeahead");
        self.teardown();
    }
}
