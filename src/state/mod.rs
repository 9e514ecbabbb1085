//! Modularized state module.
//!
//! This splits the original monolithic state into value types and the owned
//! controller state, re-exporting the public API so callers can depend on
//! `crate::state::*` without caring about the internal layout.

pub mod control_state;
pub mod types;

pub use control_state::{ControlState, PendingInput};
pub use types::{
    CellRenderer, Column, ColumnWidth, ControlSnapshot, IdentityStrategy, Lifecycle,
    RequestToken, Row, SortDirection, SortState,
};
