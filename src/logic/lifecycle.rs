use crate::events::ControlEvent;
use crate::state::{ControlState, Lifecycle};

/// What: Move the control to a new lifecycle state.
///
/// Inputs:
/// - `state`: Control state
/// - `to`: Target lifecycle state
///
/// Output:
/// - `true` if the state changed.
///
/// Details:
/// - Entering `Open` emits `Open`; entering `Closed` emits `Close` and drops the highlight.
/// - Re-entering the current state is a no-op and emits nothing.
pub fn transition(state: &mut ControlState, to: Lifecycle) -> bool {
    let from = state.lifecycle;
    if from == to {
        return false;
    }
    state.lifecycle = to;
    tracing::debug!(?from, ?to, "lifecycle transition");
    match to {
        Lifecycle::Open => state.emit(ControlEvent::Open),
        Lifecycle::Closed => {
            state.highlight = None;
            state.emit(ControlEvent::Close);
        }
        Lifecycle::Loading => {}
    }
    true
}

/// What: Hide the result list.
///
/// Inputs:
/// - `state`: Control state
///
/// Output:
/// - `true` if the control was not already closed.
///
/// Details:
/// - Aborts any in-flight lookup and drops pending debounced input first.
pub fn close(state: &mut ControlState) -> bool {
    state.abort_in_flight();
    state.pending_input = None;
    transition(state, Lifecycle::Closed)
}
