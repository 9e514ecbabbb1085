use crate::logic::{lifecycle, selection};
use crate::state::{ControlState, Lifecycle};

/// What: Move the highlight one row down.
///
/// Inputs:
/// - `state`: Control state
///
/// Details:
/// - From no highlight goes to the first row; clamps at the last row without wrapping.
/// - Ignored unless the list is open.
pub fn move_down(state: &mut ControlState) {
    if state.lifecycle != Lifecycle::Open {
        return;
    }
    let len = state.presented_len();
    state.highlight = match (len, state.highlight) {
        (0, _) => None,
        (_, None) => Some(0),
        (n, Some(i)) => Some((i + 1).min(n - 1)),
    };
}

/// What: Move the highlight one row up.
///
/// Inputs:
/// - `state`: Control state
///
/// Details:
/// - From no highlight goes to the last row; clamps at the first row without wrapping.
/// - Ignored unless the list is open.
pub fn move_up(state: &mut ControlState) {
    if state.lifecycle != Lifecycle::Open {
        return;
    }
    let len = state.presented_len();
    state.highlight = match (len, state.highlight) {
        (0, _) => None,
        (n, None) => Some(n - 1),
        (_, Some(i)) => Some(i.saturating_sub(1)),
    };
}

/// What: Commit the highlighted row.
///
/// Inputs:
/// - `state`: Control state
///
/// Output:
/// - `true` if a highlighted row was committed.
pub fn confirm(state: &mut ControlState) -> bool {
    if state.lifecycle != Lifecycle::Open {
        return false;
    }
    match state.highlight {
        Some(i) => selection::commit(state, i),
        None => false,
    }
}

/// Close the list without touching the selection.
pub fn cancel(state: &mut ControlState) -> bool {
    lifecycle::close(state)
}

/// Highlight the hovered row when it exists.
pub fn hover(state: &mut ControlState, index: usize) {
    if state.lifecycle == Lifecycle::Open && index < state.presented_len() {
        state.highlight = Some(index);
    }
}

/// Drop the highlight when the pointer leaves the rows.
pub const fn leave(state: &mut ControlState) {
    state.highlight = None;
}

/// What: Keep the highlight within the presented rows.
///
/// Inputs:
/// - `state`: Control state
///
/// Details:
/// - An empty presentation drops the highlight; an overshooting index moves to the last row.
pub fn clamp_highlight(state: &mut ControlState) {
    let len = state.presented_len();
    if let Some(i) = state.highlight {
        state.highlight = if len == 0 { None } else { Some(i.min(len - 1)) };
    }
}
