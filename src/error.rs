//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for application-level code (CLI, config files).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods.
pub type Result<T> = anyhow::Result<T>;

/// Why a query never entered the pipeline.
///
/// Rejections are not failures: they are logged at debug level and otherwise
/// leave every piece of state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("query is blank")]
    Blank,
    #[error("query has {len} characters, at least {min} required")]
    TooShort { len: usize, min: usize },
}

/// Failure of the pluggable fetch function.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No endpoint configured for the default HTTP fetcher.
    #[error("no endpoint configured")]
    NoEndpoint,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint answered with status {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The response was valid JSON but not list-shaped.
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("{0}")]
    Other(String),
}

/// Outcome of a search that did not publish results.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A newer query was accepted while this one was in flight.
    #[error("request {request_id} superseded by request {latest}")]
    Superseded { request_id: u64, latest: u64 },
    /// The widget was torn down before the search could finish.
    #[error("search abandoned after teardown")]
    TornDown,
}

impl SearchError {
    /// Rejections, superseded requests and teardown are part of normal flow.
    pub const fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::Superseded { .. } | Self::TornDown
        )
    }
}

/// Error returned when loading a [`SearchConfig`](crate::config::SearchConfig) fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
