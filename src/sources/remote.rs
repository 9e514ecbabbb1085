//! Remote lookups: request building, transport seam, and response normalization.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::config::{HttpMethod, RequestParams, Settings};
use crate::error::ControlError;
use crate::state::Row;
use crate::util::value_text;

/// Fully resolved outgoing request.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteRequest {
    /// Endpoint URL.
    pub url: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Parameters including the injected `query` and `limit`.
    pub params: Map<String, Value>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Performs remote lookups; the concrete transport is pluggable.
///
/// Implementations return the decoded JSON payload. Dropping the returned
/// future must abandon the request.
pub trait Transport: Send + Sync {
    /// What: Execute one request.
    ///
    /// Inputs:
    /// - `request`: Resolved request
    ///
    /// Output:
    /// - Future resolving to the JSON payload or a transport error.
    fn fetch(&self, request: RemoteRequest) -> BoxFuture<'static, Result<Value, ControlError>>;
}

/// Asynchronous, cancellable data source backed by a [`Transport`].
#[derive(Clone)]
pub struct RemoteSource {
    /// Endpoint URL.
    url: String,
    /// HTTP verb.
    method: HttpMethod,
    /// Extra parameters, resolved per query.
    params: RequestParams,
    /// Extra headers.
    headers: Vec<(String, String)>,
    /// Per-request timeout.
    timeout: Duration,
    /// Transport performing the call.
    transport: Arc<dyn Transport>,
}

impl RemoteSource {
    /// What: Create a remote source from the active settings.
    ///
    /// Inputs:
    /// - `settings`: Active (validated) settings
    /// - `transport`: Transport used for the call
    ///
    /// Output:
    /// - `RemoteSource` snapshotting the endpoint descriptor.
    #[must_use]
    pub fn from_settings(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: settings.ajax_url.clone().unwrap_or_default(),
            method: settings.ajax_method,
            params: settings.ajax_params.clone(),
            headers: settings.ajax_headers.clone(),
            timeout: settings.request_timeout,
            transport,
        }
    }

    /// What: Resolve the request for a query.
    ///
    /// Inputs:
    /// - `query`: Query text
    /// - `limit`: Maximum number of rows requested
    ///
    /// Output:
    /// - `RemoteRequest` whose parameters always carry `query` and `limit`.
    ///
    /// Details:
    /// - `query` and `limit` overwrite same-named entries from the configured parameters.
    #[must_use]
    pub fn build_request(&self, query: &str, limit: usize) -> RemoteRequest {
        let mut params = self.params.resolve(query);
        params.insert("query".into(), Value::String(query.to_string()));
        params.insert("limit".into(), Value::from(limit));
        RemoteRequest {
            url: self.url.clone(),
            method: self.method,
            params,
            headers: self.headers.clone(),
            timeout: self.timeout,
        }
    }

    /// What: Look up rows for a query.
    ///
    /// Inputs:
    /// - `query`: Query text
    /// - `limit`: Maximum number of rows kept
    ///
    /// Output:
    /// - Owned future resolving to normalized rows or an error.
    pub fn search(&self, query: &str, limit: usize) -> BoxFuture<'static, Result<Vec<Row>, ControlError>> {
        let request = self.build_request(query, limit);
        tracing::debug!(url = %request.url, query, limit, "remote search");
        let fetch = self.transport.fetch(request);
        async move { normalize_response(fetch.await?, limit) }.boxed()
    }
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("params", &self.params)
            .field("headers", &self.headers.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// What: Normalize an endpoint payload into at most `limit` rows.
///
/// Inputs:
/// - `payload`: Decoded JSON response
/// - `limit`: Maximum number of rows kept
///
/// Output:
/// - `Ok(rows)` for a bare array, `{ data: [...] }`, or `{ success: true, data?: [...] }`.
///
/// # Errors
/// - `ControlError::Transport` with the endpoint message when `success` is `false`.
/// - `ControlError::MalformedResponse` for any other shape.
///
/// Details:
/// - A success envelope without `data` (or with `data: null`) yields an empty result.
/// - Array entries that are not objects are skipped.
pub fn normalize_response(payload: Value, limit: usize) -> Result<Vec<Row>, ControlError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let envelope = map.contains_key("success");
            if envelope && map.get("success").and_then(Value::as_bool) == Some(false) {
                let message = map
                    .get("error")
                    .map(value_text)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "endpoint reported failure".to_string());
                return Err(ControlError::Transport { message });
            }
            match map.remove("data") {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) if envelope => Vec::new(),
                Some(other) => {
                    return Err(ControlError::MalformedResponse {
                        detail: format!("`data` is {}, expected an array", kind(&other)),
                    });
                }
                None => {
                    return Err(ControlError::MalformedResponse {
                        detail: "object response without `data`".to_string(),
                    });
                }
            }
        }
        other => {
            return Err(ControlError::MalformedResponse {
                detail: format!("response is {}, expected an array", kind(&other)),
            });
        }
    };
    let total = items.len();
    let mut rows: Vec<Row> = items.into_iter().filter_map(Row::from_value).collect();
    if rows.len() != total {
        tracing::warn!(skipped = total - rows.len(), "skipped non-object rows in response");
    }
    rows.truncate(limit);
    Ok(rows)
}

/// Short name of a JSON value's type for diagnostics.
const fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
