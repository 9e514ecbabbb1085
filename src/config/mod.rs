//! Control settings, partial updates, and validation.
//!
//! `Settings` carries every recognized option. Host callbacks are not part of
//! the settings; they subscribe to typed events on the control instead.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::state::{Column, IdentityStrategy, Row};

mod parse;

pub use parse::{columns_from_rows, load_rows, load_settings, parse_settings};

/// Default maximum number of rows per result set.
pub const DEFAULT_LIMIT: usize = 10;
/// Default input quiet period before a search is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
/// Default remote request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP verb used for remote lookups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    /// Parameters are sent as a query string.
    #[default]
    Get,
    /// Parameters are sent as a JSON body.
    Post,
}

impl HttpMethod {
    /// Parse `GET`/`POST` case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }
}

/// Builder computing request parameters from the query string.
pub type ParamBuilder = Arc<dyn Fn(&str) -> Map<String, Value> + Send + Sync>;

/// Extra remote request parameters: a fixed map or a function of the query.
#[derive(Clone)]
pub enum RequestParams {
    /// Same parameters for every request.
    Static(Map<String, Value>),
    /// Parameters computed from the query text at call time.
    Computed(ParamBuilder),
}

impl RequestParams {
    /// Wrap a parameter builder closure.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&str) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// What: Resolve the parameters for one request.
    ///
    /// Inputs:
    /// - `query`: Current query text
    ///
    /// Output:
    /// - Owned parameter map (a copy for `Static`, the builder output for `Computed`).
    #[must_use]
    pub fn resolve(&self, query: &str) -> Map<String, Value> {
        match self {
            Self::Static(map) => map.clone(),
            Self::Computed(f) => f(query),
        }
    }
}

impl Default for RequestParams {
    fn default() -> Self {
        Self::Static(Map::new())
    }
}

impl fmt::Debug for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Full configuration of one dropdown table control.
#[derive(Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Ordered table columns; keys must be unique.
    pub columns: Vec<Column>,
    /// Rows searched when remote lookups are disabled.
    pub data: Vec<Row>,
    /// Use the remote endpoint instead of `data`.
    pub use_ajax: bool,
    /// Remote endpoint URL.
    pub ajax_url: Option<String>,
    /// HTTP verb for remote lookups.
    pub ajax_method: HttpMethod,
    /// Extra request parameters (static or computed).
    pub ajax_params: RequestParams,
    /// Extra request headers.
    pub ajax_headers: Vec<(String, String)>,
    /// Per-request timeout for remote lookups.
    pub request_timeout: Duration,
    /// Minimum query length (in characters) before a remote lookup is issued.
    pub min_length: usize,
    /// Input quiet period before a debounced search fires.
    pub debounce: Duration,
    /// Maximum number of rows in a result set.
    pub limit: usize,
    /// Allow several rows to be selected.
    pub multiselect: bool,
    /// Identity and extra fields carried by rows but not shown as columns.
    pub hidden_fields: Vec<String>,
    /// Explicit identity strategy; overrides the first hidden field.
    pub identity: Option<IdentityStrategy>,
    /// Column whose value becomes the input text after a single-select commit.
    pub default_column: Option<String>,
    /// Columns consulted by local matching; empty means all columns.
    pub searchable_columns: Vec<String>,
    /// Match without case folding.
    pub case_sensitive: bool,
    /// Require whole-value equality instead of substring containment.
    pub exact_match: bool,
    /// Close the list after a single-select commit.
    pub close_on_select: bool,
    /// Narrow the held rows locally while the query is below `min_length`.
    pub keep_open_while_typing: bool,
    /// Hide already-selected rows from the presented result set.
    pub hide_preselected: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            data: Vec::new(),
            use_ajax: false,
            ajax_url: None,
            ajax_method: HttpMethod::Get,
            ajax_params: RequestParams::default(),
            ajax_headers: Vec::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            min_length: 1,
            debounce: DEFAULT_DEBOUNCE,
            limit: DEFAULT_LIMIT,
            multiselect: false,
            hidden_fields: Vec::new(),
            identity: None,
            default_column: None,
            searchable_columns: Vec::new(),
            case_sensitive: false,
            exact_match: false,
            close_on_select: true,
            keep_open_while_typing: false,
            hide_preselected: false,
        }
    }
}

impl Settings {
    /// What: Create local-source settings with the given columns and rows.
    ///
    /// Inputs:
    /// - `columns`: Ordered column list
    /// - `data`: Rows to search
    ///
    /// Output:
    /// - `Settings` with every other option at its default.
    #[must_use]
    pub fn local(columns: Vec<Column>, data: Vec<Row>) -> Self {
        Self {
            columns,
            data,
            ..Self::default()
        }
    }

    /// What: Create remote-source settings for the given endpoint.
    ///
    /// Inputs:
    /// - `columns`: Ordered column list
    /// - `url`: Endpoint queried with `query` and `limit` parameters
    ///
    /// Output:
    /// - `Settings` with `use_ajax` enabled.
    #[must_use]
    pub fn remote(columns: Vec<Column>, url: impl Into<String>) -> Self {
        Self {
            columns,
            use_ajax: true,
            ajax_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Key of the column whose value becomes the input text on commit.
    #[must_use]
    pub fn default_column_key(&self) -> Option<&str> {
        self.default_column
            .as_deref()
            .or_else(|| self.columns.first().map(|c| c.key.as_str()))
    }

    /// Keys consulted by local matching, in column order.
    #[must_use]
    pub fn searchable_keys(&self) -> Vec<&str> {
        if self.searchable_columns.is_empty() {
            self.columns.iter().map(|c| c.key.as_str()).collect()
        } else {
            self.searchable_columns.iter().map(String::as_str).collect()
        }
    }

    /// Column by key.
    #[must_use]
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// What: Validate the settings and resolve the identity strategy.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - `Ok(IdentityStrategy)` when usable; `Err(ConfigError)` describing the first problem.
    ///
    /// # Errors
    /// - No columns, empty or duplicate column keys.
    /// - `default_column`/`searchable_columns` naming an unknown column.
    /// - `limit` of zero.
    /// - Remote lookups without a parseable `ajax_url`.
    /// - Multi-select with neither `identity` nor `hidden_fields`.
    ///
    /// Details:
    /// - Identity resolution order: explicit `identity`, then the first hidden field,
    ///   then structural equality for single-select only.
    pub fn validate(&self) -> Result<IdentityStrategy, ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }
        let mut seen = HashSet::new();
        for (index, column) in self.columns.iter().enumerate() {
            if column.key.trim().is_empty() {
                return Err(ConfigError::EmptyColumnKey { index });
            }
            if !seen.insert(column.key.as_str()) {
                return Err(ConfigError::DuplicateColumn {
                    key: column.key.clone(),
                });
            }
        }
        if let Some(key) = &self.default_column
            && !seen.contains(key.as_str())
        {
            return Err(ConfigError::UnknownColumn {
                option: "default_column",
                key: key.clone(),
            });
        }
        if let Some(key) = self
            .searchable_columns
            .iter()
            .find(|k| !seen.contains(k.as_str()))
        {
            return Err(ConfigError::UnknownColumn {
                option: "searchable_columns",
                key: key.clone(),
            });
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.use_ajax {
            let url = self
                .ajax_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or(ConfigError::MissingEndpoint)?;
            reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidEndpoint {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        }
        self.resolve_identity()
    }

    /// Identity strategy derived from `identity`, `hidden_fields`, and `multiselect`.
    fn resolve_identity(&self) -> Result<IdentityStrategy, ConfigError> {
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }
        if let Some(field) = self.hidden_fields.first() {
            return Ok(IdentityStrategy::Field(field.clone()));
        }
        if self.multiselect {
            return Err(ConfigError::MissingIdentity);
        }
        Ok(IdentityStrategy::Structural)
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Clone, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SettingsPatch {
    /// Replace the columns.
    pub columns: Option<Vec<Column>>,
    /// Replace the local rows.
    pub data: Option<Vec<Row>>,
    /// Switch between local and remote lookups.
    pub use_ajax: Option<bool>,
    /// Replace the endpoint.
    pub ajax_url: Option<String>,
    /// Replace the HTTP verb.
    pub ajax_method: Option<HttpMethod>,
    /// Replace the request parameters.
    pub ajax_params: Option<RequestParams>,
    /// Replace the request headers.
    pub ajax_headers: Option<Vec<(String, String)>>,
    /// Replace the request timeout.
    pub request_timeout: Option<Duration>,
    /// Replace the minimum query length.
    pub min_length: Option<usize>,
    /// Replace the debounce interval.
    pub debounce: Option<Duration>,
    /// Replace the result limit.
    pub limit: Option<usize>,
    /// Switch single/multi select.
    pub multiselect: Option<bool>,
    /// Replace the hidden fields.
    pub hidden_fields: Option<Vec<String>>,
    /// Replace the explicit identity strategy.
    pub identity: Option<IdentityStrategy>,
    /// Replace the default column.
    pub default_column: Option<String>,
    /// Replace the searchable columns.
    pub searchable_columns: Option<Vec<String>>,
    /// Toggle case-sensitive matching.
    pub case_sensitive: Option<bool>,
    /// Toggle exact matching.
    pub exact_match: Option<bool>,
    /// Toggle close-on-select.
    pub close_on_select: Option<bool>,
    /// Toggle keep-open-while-typing.
    pub keep_open_while_typing: Option<bool>,
    /// Toggle hide-preselected.
    pub hide_preselected: Option<bool>,
}

impl SettingsPatch {
    /// Whether applying this patch changes where rows come from.
    #[must_use]
    pub const fn touches_source(&self) -> bool {
        self.data.is_some()
            || self.use_ajax.is_some()
            || self.ajax_url.is_some()
            || self.ajax_method.is_some()
            || self.ajax_params.is_some()
            || self.ajax_headers.is_some()
    }

    /// What: Produce new settings by overlaying this patch on `base`.
    ///
    /// Inputs:
    /// - `base`: Currently active settings
    ///
    /// Output:
    /// - Merged `Settings`; `base` is left untouched so a failed validation can be discarded.
    #[must_use]
    pub fn apply_to(self, base: &Settings) -> Settings {
        let mut out = base.clone();
        if let Some(v) = self.columns {
            out.columns = v;
        }
        if let Some(v) = self.data {
            out.data = v;
        }
        if let Some(v) = self.use_ajax {
            out.use_ajax = v;
        }
        if let Some(v) = self.ajax_url {
            out.ajax_url = Some(v);
        }
        if let Some(v) = self.ajax_method {
            out.ajax_method = v;
        }
        if let Some(v) = self.ajax_params {
            out.ajax_params = v;
        }
        if let Some(v) = self.ajax_headers {
            out.ajax_headers = v;
        }
        if let Some(v) = self.request_timeout {
            out.request_timeout = v;
        }
        if let Some(v) = self.min_length {
            out.min_length = v;
        }
        if let Some(v) = self.debounce {
            out.debounce = v;
        }
        if let Some(v) = self.limit {
            out.limit = v;
        }
        if let Some(v) = self.multiselect {
            out.multiselect = v;
        }
        if let Some(v) = self.hidden_fields {
            out.hidden_fields = v;
        }
        if let Some(v) = self.identity {
            out.identity = Some(v);
        }
        if let Some(v) = self.default_column {
            out.default_column = Some(v);
        }
        if let Some(v) = self.searchable_columns {
            out.searchable_columns = v;
        }
        if let Some(v) = self.case_sensitive {
            out.case_sensitive = v;
        }
        if let Some(v) = self.exact_match {
            out.exact_match = v;
        }
        if let Some(v) = self.close_on_select {
            out.close_on_select = v;
        }
        if let Some(v) = self.keep_open_while_typing {
            out.keep_open_while_typing = v;
        }
        if let Some(v) = self.hide_preselected {
            out.hide_preselected = v;
        }
        out
    }
}
