//! HTTP transport backed by a pooled `reqwest::Client`.

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use super::remote::{RemoteRequest, Transport};
use crate::config::HttpMethod;
use crate::error::ControlError;
use crate::util::value_text;

/// Transport issuing GET (query string) or POST (JSON body) requests.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    /// Shared client with connection pooling.
    client: reqwest::Client,
}

impl HttpTransport {
    /// What: Build a transport with the crate's default client settings.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - `HttpTransport` with a 15s connect timeout and a crate-identifying user agent.
    ///
    /// Details:
    /// - Falls back to `reqwest::Client::new()` if the builder fails.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .user_agent(format!("tablepick/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, request: RemoteRequest) -> BoxFuture<'static, Result<Value, ControlError>> {
        let client = self.client.clone();
        async move {
            let mut builder = match request.method {
                HttpMethod::Get => client.get(&request.url).query(&query_pairs(&request.params)),
                HttpMethod::Post => client.post(&request.url).json(&request.params),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            let resp = builder
                .timeout(request.timeout)
                .send()
                .await
                .map_err(ControlError::transport)?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ControlError::transport(format!("HTTP {status}")));
            }
            resp.json::<Value>()
                .await
                .map_err(|e| ControlError::MalformedResponse {
                    detail: format!("response body is not JSON: {e}"),
                })
        }
        .boxed()
    }
}

/// What: Flatten request parameters into query-string pairs.
///
/// Inputs:
/// - `params`: Parameter map
///
/// Output:
/// - `(name, text)` pairs; `null` values are dropped.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), value_text(v)))
        .collect()
}
