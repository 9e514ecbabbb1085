//! Error taxonomy for the dropdown table control.
//!
//! Only [`ConfigError`] prevents a control from becoming usable. Every other
//! failure is reported through `ControlEvent::Error` and leaves the control
//! in an `Open` state showing an empty result.

use std::fmt;

/// What: Invalid or incomplete configuration detected at construction or on update.
///
/// Inputs: Generated by settings validation and `.conf` parsing.
///
/// Output: Implements `Display`/`Error` for ergonomic propagation.
///
/// Details:
/// - Returned by `DropdownTable::new` and `DropdownTable::update_settings`.
/// - A failed update leaves the previously active settings untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No columns were configured.
    NoColumns,
    /// A column was configured with an empty key.
    EmptyColumnKey {
        /// Position of the offending column.
        index: usize,
    },
    /// Two columns share the same key.
    DuplicateColumn {
        /// The duplicated key.
        key: String,
    },
    /// An option references a column key that is not configured.
    UnknownColumn {
        /// Option name that holds the reference.
        option: &'static str,
        /// The unknown key.
        key: String,
    },
    /// `limit` must be at least one.
    ZeroLimit,
    /// Remote lookups were enabled without an endpoint.
    MissingEndpoint,
    /// The remote endpoint could not be parsed as a URL.
    InvalidEndpoint {
        /// Raw endpoint text.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// Multi-select needs an identity field or an explicit structural identity.
    MissingIdentity,
    /// A configuration value could not be parsed.
    InvalidValue {
        /// Setting key as written in the file.
        key: String,
        /// Raw value.
        value: String,
    },
    /// A configuration or data file could not be read or decoded.
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColumns => write!(f, "at least one column must be configured"),
            Self::EmptyColumnKey { index } => write!(f, "column #{index} has an empty key"),
            Self::DuplicateColumn { key } => write!(f, "column key \"{key}\" is configured twice"),
            Self::UnknownColumn { option, key } => {
                write!(f, "{option} references unknown column \"{key}\"")
            }
            Self::ZeroLimit => write!(f, "limit must be at least 1"),
            Self::MissingEndpoint => write!(f, "use_ajax is enabled but no ajax_url is set"),
            Self::InvalidEndpoint { url, reason } => {
                write!(f, "ajax_url \"{url}\" is not a valid URL: {reason}")
            }
            Self::MissingIdentity => write!(
                f,
                "multiselect requires hidden_fields or an explicit identity strategy"
            ),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value \"{value}\" for setting \"{key}\"")
            }
            Self::Io { path, message } => write!(f, "failed to load {path}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// What: Runtime failure surfaced by the control.
///
/// Inputs: Produced by remote lookups, response normalization, and settings validation.
///
/// Output: Delivered through `ControlEvent::Error`; never returned from intent handlers.
///
/// Details:
/// - `Cancelled` marks a superseded request and is discarded silently.
/// - `Transport` and `MalformedResponse` leave the control `Open` with an empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Fatal configuration problem.
    Configuration(ConfigError),
    /// The remote lookup failed or the endpoint reported `success = false`.
    Transport {
        /// Human-readable failure description.
        message: String,
    },
    /// The endpoint answered with a payload that is not a list of rows.
    MalformedResponse {
        /// What was wrong with the payload.
        detail: String,
    },
    /// The request was superseded or aborted.
    Cancelled,
}

impl ControlError {
    /// What: Build a transport error from any displayable cause.
    ///
    /// Inputs:
    /// - `cause`: Underlying error or message
    ///
    /// Output:
    /// - `ControlError::Transport` carrying the rendered message.
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport {
            message: cause.to_string(),
        }
    }

    /// Whether this error should be silently discarded instead of surfaced.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "configuration error: {err}"),
            Self::Transport { message } => write!(f, "remote lookup failed: {message}"),
            Self::MalformedResponse { detail } => write!(f, "malformed response: {detail}"),
            Self::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Transport { .. } | Self::MalformedResponse { .. } | Self::Cancelled => None,
        }
    }
}

impl From<ConfigError> for ControlError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value)
    }
}
