//! Core non-UI logic split into modular submodules.
//!
//! Every function here is a synchronous transition over [`ControlState`];
//! the only asynchronous work is the remote lookup spawned by
//! [`query::submit`], whose outcome comes back through the fetch channel.
//!
//! [`ControlState`]: crate::state::ControlState

pub mod lifecycle;
pub mod navigation;
pub mod query;
pub mod selection;
pub mod sort;

// Re-export public APIs to keep call sites short (crate::logic::...)
pub use lifecycle::{close, transition};
pub use navigation::{cancel, clamp_highlight, confirm, hover, leave, move_down, move_up};
pub use query::{
    apply_fetch_outcome, debounce_deadline, fire_pending, on_input, replace_results, submit, tick,
};
pub use selection::{clear, commit, dedupe_selection, select_all, select_single, toggle};
pub use sort::{apply_sort, compare_values, resort, sort_by_column};
