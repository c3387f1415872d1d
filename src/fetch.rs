//! Pluggable fetch functions.
//!
//! The orchestrator only knows the [`Fetcher`] trait. Integrators either pass a
//! closure through [`fetch_fn`] or use the default [`HttpFetcher`], which issues
//! a GET with the query as a single parameter and expects a JSON list back.

use crate::config::SearchConfig;
use crate::error::FetchError;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;

/// Fetches the records matching a query from the remote source.
///
/// Ordering and relevance are entirely the remote source's business: the
/// returned order is the order results are shown in.
pub trait Fetcher<R>: Send + Sync {
    fn request(&self, query: &str) -> BoxFuture<'static, Result<Vec<R>, FetchError>>;
}

/// Adapter turning an async closure into a [`Fetcher`].
pub struct FnFetcher<F> {
    f: F,
}

/// Wrap `f` as a fetcher. The closure receives an owned copy of the query.
pub const fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

impl<R, F, Fut> Fetcher<R> for FnFetcher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<R>, FetchError>> + Send + 'static,
{
    fn request(&self, query: &str) -> BoxFuture<'static, Result<Vec<R>, FetchError>> {
        (self.f)(query.to_string()).boxed()
    }
}

/// Default fetcher: `GET <endpoint>?<query_param>=<query>`.
pub struct HttpFetcher<R = Value> {
    client: reqwest::Client,
    endpoint: Option<String>,
    query_param: String,
    result_key: Option<String>,
    _records: PhantomData<fn() -> R>,
}

impl<R> std::fmt::Debug for HttpFetcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("endpoint", &self.endpoint)
            .field("query_param", &self.query_param)
            .field("result_key", &self.result_key)
            .finish_non_exhaustive()
    }
}

impl<R> HttpFetcher<R> {
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            query_param: config.query_param.clone(),
            result_key: config.result_key.clone(),
            _records: PhantomData,
        }
    }
}

impl<R> Fetcher<R> for HttpFetcher<R>
where
    R: DeserializeOwned + Send + 'static,
{
    fn request(&self, query: &str) -> BoxFuture<'static, Result<Vec<R>, FetchError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let params = [(self.query_param.clone(), query.to_string())];
        let result_key = self.result_key.clone();

        async move {
            let endpoint = endpoint.ok_or(FetchError::NoEndpoint)?;
            tracing::debug!("GET {} {:?}", endpoint, params);

            let response = client.get(&endpoint).query(&params).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let body: Value = response.json().await?;
            extract_records(body, result_key.as_deref())
        }
        .boxed()
    }
}

/// Pull the record list out of a response body.
///
/// Without a `result_key` the body itself must be a list. With one, the body
/// must be an object holding a list under that key.
pub fn extract_records<R: DeserializeOwned>(
    body: Value,
    result_key: Option<&str>,
) -> Result<Vec<R>, FetchError> {
    let list = match result_key {
        None => body,
        Some(key) => match body {
            Value::Object(mut map) => map
                .remove(key)
                .ok_or_else(|| FetchError::Shape(format!("missing key '{}'", key)))?,
            other => {
                return Err(FetchError::Shape(format!(
                    "expected an object holding '{}', got {}",
                    key,
                    json_kind(&other)
                )));
            }
        },
    };

    if !list.is_array() {
        return Err(FetchError::Shape(format!(
            "expected a list, got {}",
            json_kind(&list)
        )));
    }
    Ok(serde_json::from_value(list)?)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
