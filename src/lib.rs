//! Library entry for tablepick: a search-and-select dropdown table control.
//!
//! The control turns typed text into at most one live lookup against local
//! rows or a remote endpoint, presents the matches as a table, and manages a
//! single or multi selection. [`DropdownTable`] is the public entry point;
//! the `tablepick` binary drives it from a terminal UI.

pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod logic;
pub mod sources;
pub mod state;
pub mod ui;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use config::{Settings, SettingsPatch};
pub use control::DropdownTable;
pub use error::{ConfigError, ControlError};
pub use events::{ControlEvent, Key};
pub use state::{Column, Row};
