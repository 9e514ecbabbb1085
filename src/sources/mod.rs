//! Data sources: "given a query, produce up to N candidate rows".
//!
//! Two variants share one contract: [`LocalSource`] filters configured rows
//! synchronously, [`RemoteSource`] queries an endpoint through a pluggable
//! [`Transport`] and is cancellable by dropping or aborting its future.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::ControlError;
use crate::state::{RequestToken, Row};

mod http;
mod local;
mod remote;

pub use http::HttpTransport;
pub use local::{LocalSource, MatchPolicy};
pub use remote::{RemoteRequest, RemoteSource, Transport, normalize_response};

/// Result of a remote lookup, tagged with the token it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchOutcome {
    /// Token of the originating request.
    pub token: RequestToken,
    /// Query text of the originating request.
    pub query: String,
    /// Normalized rows or the failure.
    pub result: Result<Vec<Row>, ControlError>,
}

/// The active data source, resolved from settings at call time.
#[derive(Debug)]
pub enum DataSource<'a> {
    /// Synchronous in-memory filtering.
    Local(LocalSource<'a>),
    /// Asynchronous endpoint lookup.
    Remote(RemoteSource),
}

impl<'a> DataSource<'a> {
    /// What: Resolve the data source described by the settings.
    ///
    /// Inputs:
    /// - `settings`: Active settings
    /// - `transport`: Transport used when remote lookups are enabled
    ///
    /// Output:
    /// - `Remote` when `use_ajax` is set; `Local` otherwise.
    #[must_use]
    pub fn resolve(settings: &'a Settings, transport: &Arc<dyn Transport>) -> Self {
        if settings.use_ajax {
            Self::Remote(RemoteSource::from_settings(settings, Arc::clone(transport)))
        } else {
            Self::Local(LocalSource::from_settings(settings))
        }
    }

    /// Whether lookups go through the remote endpoint.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
