//! Command-line argument definition and settings assembly.

use std::path::PathBuf;

use clap::Parser;
use tablepick::config::{self, Settings};
use tablepick::error::ConfigError;

/// tablepick - search a table of rows and pick one or more of them
#[derive(Parser, Debug)]
#[command(name = "tablepick")]
#[command(version)]
#[command(about = "Search a table of rows from a JSON file or an HTTP endpoint and pick rows", long_about = None)]
pub struct Args {
    /// Settings file (`key = value` format)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file with an array of row objects to search locally
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Endpoint queried with `query` and `limit` parameters
    #[arg(short, long)]
    pub url: Option<String>,

    /// Allow selecting several rows
    #[arg(short, long)]
    pub multiselect: bool,

    /// Initial query text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to this file instead of the default location
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Effective log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        if self.verbose { "debug" } else { &self.log_level }
    }
}

/// What: Assemble settings from the config file and command-line overrides.
///
/// Inputs:
/// - `args`: Parsed arguments
///
/// Output:
/// - Settings ready for validation by the control.
///
/// # Errors
/// - `ConfigError` when the config or data file cannot be read or parsed.
///
/// Details:
/// - `--data` replaces configured rows; `--url` switches to remote lookups.
/// - Without configured columns, columns are inferred from the first row.
/// - `--multiselect` without an identity uses the first column as identity field.
pub fn build_settings(args: &Args) -> Result<Settings, ConfigError> {
    let mut settings = match &args.config {
        Some(path) => config::load_settings(path)?,
        None => Settings::default(),
    };
    if let Some(path) = &args.data {
        settings.data = config::load_rows(path)?;
    }
    if let Some(url) = &args.url {
        settings.use_ajax = true;
        settings.ajax_url = Some(url.clone());
    }
    if settings.columns.is_empty() {
        settings.columns = config::columns_from_rows(&settings.data);
    }
    if args.multiselect {
        settings.multiselect = true;
        if settings.identity.is_none() && settings.hidden_fields.is_empty() {
            settings.identity = settings
                .columns
                .first()
                .map(|c| tablepick::state::IdentityStrategy::Field(c.key.clone()));
        }
    }
    Ok(settings)
}
