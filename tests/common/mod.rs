//! Shared test fixtures for integration tests.
//!
//! # Fixtures
//!
//! - `fetcher`: a [`ScriptedFetcher`] answering every query with three
//!   records, `"<query>/A"`, `"<query>/B"` and `"<query>/C"`.
//! - [`Harness`]: a mounted widget wired to a scripted fetcher, with every
//!   output event forwarded into a channel.
//!
//! Timing tests run with `start_paused = true`, so sleeps inside the fetcher
//! and the debouncer advance the mock clock instead of waiting.

use futures::future::BoxFuture;
use rstest::fixture;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use typeahead::events::ALL_EVENTS;
use typeahead::{EventKind, FetchError, Fetcher, SearchConfig, SearchEvent, Typeahead};

/// Fetcher with per-query latency and failures, recording every query it
/// receives.
#[derive(Default)]
pub struct ScriptedFetcher {
    calls: Mutex<Vec<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl ScriptedFetcher {
    pub fn delay(&self, query: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(query.to_string(), delay);
    }

    pub fn fail(&self, query: &str) {
        self.failing.lock().unwrap().insert(query.to_string());
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher<String> for ScriptedFetcher {
    fn request(&self, query: &str) -> BoxFuture<'static, Result<Vec<String>, FetchError>> {
        self.calls.lock().unwrap().push(query.to_string());
        let delay = self.delays.lock().unwrap().get(query).copied();
        let fails = self.failing.lock().unwrap().contains(query);
        let query = query.to_string();

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fails {
                return Err(FetchError::Status(500));
            }
            Ok(["A", "B", "C"]
                .iter()
                .map(|suffix| format!("{query}/{suffix}"))
                .collect())
        })
    }
}

#[fixture]
pub fn fetcher() -> Arc<ScriptedFetcher> {
    Arc::new(ScriptedFetcher::default())
}

pub struct Harness {
    pub widget: Typeahead<String>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub events: UnboundedReceiver<SearchEvent<String>>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl Harness {
    pub fn new(config: SearchConfig, fetcher: Arc<ScriptedFetcher>) -> Self {
        let widget = Typeahead::mount(config, Arc::clone(&fetcher) as Arc<dyn Fetcher<String>>);
        let (events, _) = widget.events().channel(&ALL_EVENTS);
        Self {
            widget,
            fetcher,
            events,
        }
    }

    /// Every event emitted since the last drain.
    pub fn drain(&mut self) -> Vec<SearchEvent<String>> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub fn drain_kinds(&mut self) -> Vec<EventKind> {
        self.drain().iter().map(SearchEvent::kind).collect()
    }

    /// Records of the published results, in order.
    pub fn result_records(&self) -> Vec<String> {
        self.widget
            .results()
            .into_iter()
            .map(|hit| hit.record)
            .collect()
    }

    pub fn highlighted_record(&self) -> Option<String> {
        self.widget.highlighted().map(|(_, record)| record)
    }

    pub fn highlight_count(&self) -> usize {
        self.widget
            .results()
            .iter()
            .filter(|hit| hit.is_highlighted)
            .count()
    }
}

#[fixture]
pub fn harness(fetcher: Arc<ScriptedFetcher>) -> Harness {
    Harness::new(SearchConfig::default(), fetcher)
}

/// Let the mock clock run for `duration`, then let spawned tasks settle.
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
    tokio::task::yield_now().await;
}
