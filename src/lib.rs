//! Typeahead search core.
//!
//! As the user types, queries are debounced, validated, answered from a
//! per-query cache or fetched from a remote source, and published as an
//! ordered result list with a keyboard-navigable highlight cursor.
//!
//! Rendering is left to the caller: it feeds [`InputEvent`]s into a
//! [`Typeahead`] and subscribes to [`SearchEvent`]s.

pub mod cache;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod fetch;
pub mod navigator;
pub mod orchestrator;
pub mod results;
pub mod tracing;
pub mod widget;

pub use cache::QueryCache;
pub use config::SearchConfig;
pub use error::{FetchError, Rejection, SearchError};
pub use events::{EventEmitter, EventKind, SearchEvent};
pub use fetch::{Fetcher, HttpFetcher, fetch_fn};
pub use navigator::{Direction, HighlightNavigator};
pub use orchestrator::SearchOrchestrator;
pub use results::{Highlightable, Hit, ResultSet};
pub use widget::{InputEvent, Typeahead};
