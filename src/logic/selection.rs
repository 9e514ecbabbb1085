use crate::events::ControlEvent;
use crate::logic::lifecycle;
use crate::state::{ControlState, Row};
use crate::util::summary_label;

/// What: Commit a row in single-select mode.
///
/// Inputs:
/// - `state`: Control state
/// - `row`: Row being committed
///
/// Details:
/// - Replaces the selection with `[row]` and mirrors the default column's text into the input.
/// - Emits `Select` then `SelectionChange`; closes when `close_on_select` is set.
pub fn select_single(state: &mut ControlState, row: Row) {
    let text = state
        .settings
        .default_column_key()
        .map(|key| row.text(key))
        .unwrap_or_default();
    state.input = text;
    state.selection = vec![row.clone()];
    tracing::debug!(value = %state.input, "row selected");
    state.emit(ControlEvent::Select(row));
    let snapshot = state.selection.clone();
    state.emit(ControlEvent::SelectionChange(snapshot));
    if state.settings.close_on_select {
        lifecycle::close(state);
    }
}

/// What: Add or remove a row from the multi-select set.
///
/// Inputs:
/// - `state`: Control state
/// - `row`: Row to toggle
/// - `included`: `true` to add, `false` to remove
///
/// Output:
/// - `true` if the selection set changed.
///
/// Details:
/// - Adding a present row and removing an absent one leave the set unchanged.
/// - Every call refreshes the summary label and emits `SelectionChange`.
pub fn toggle(state: &mut ControlState, row: &Row, included: bool) -> bool {
    let identity = &state.identity;
    let pos = state.selection.iter().position(|s| identity.same(s, row));
    let changed = match (included, pos) {
        (true, None) => {
            state.selection.push(row.clone());
            true
        }
        (false, Some(i)) => {
            state.selection.remove(i);
            true
        }
        _ => false,
    };
    after_multi_change(state);
    changed
}

/// What: Select every presented row in multi-select mode.
///
/// Inputs:
/// - `state`: Control state
///
/// Output:
/// - Number of rows newly added; always `0` in single-select mode.
pub fn select_all(state: &mut ControlState) -> usize {
    if !state.settings.multiselect {
        return 0;
    }
    let fresh: Vec<Row> = state
        .presented()
        .into_iter()
        .filter(|r| !state.is_selected(r))
        .cloned()
        .collect();
    let added = fresh.len();
    state.selection.extend(fresh);
    after_multi_change(state);
    added
}

/// What: Empty the selection set.
///
/// Inputs:
/// - `state`: Control state
///
/// Details:
/// - Resets the summary label in multi-select mode; emits `SelectionChange` with an empty set.
pub fn clear(state: &mut ControlState) {
    state.selection.clear();
    if state.settings.multiselect {
        state.input.clear();
    }
    state.emit(ControlEvent::SelectionChange(Vec::new()));
}

/// What: Commit the presented row at `index` according to the selection mode.
///
/// Inputs:
/// - `state`: Control state
/// - `index`: Index into the presented rows
///
/// Output:
/// - `true` if a row existed at `index`.
///
/// Details:
/// - Single-select commits the row; multi-select flips its membership.
pub fn commit(state: &mut ControlState, index: usize) -> bool {
    let Some(row) = state.presented_row(index).cloned() else {
        return false;
    };
    if state.settings.multiselect {
        let included = !state.is_selected(&row);
        toggle(state, &row, included);
    } else {
        select_single(state, row);
    }
    true
}

/// What: Drop selected rows that collide under the current identity strategy.
///
/// Inputs:
/// - `state`: Control state whose identity was just replaced
///
/// Output:
/// - `true` if any row was dropped.
///
/// Details:
/// - The first row of each identity key is kept; insertion order is preserved.
/// - Listeners are notified only when the set changed.
pub fn dedupe_selection(state: &mut ControlState) -> bool {
    let before = state.selection.len();
    let mut kept: Vec<Row> = Vec::with_capacity(before);
    for row in std::mem::take(&mut state.selection) {
        if !kept.iter().any(|k| state.identity.same(k, &row)) {
            kept.push(row);
        }
    }
    state.selection = kept;
    let dropped = before - state.selection.len();
    if dropped == 0 {
        return false;
    }
    tracing::debug!(dropped, "selection collapsed under new identity");
    if state.settings.multiselect {
        after_multi_change(state);
    } else {
        let snapshot = state.selection.clone();
        state.emit(ControlEvent::SelectionChange(snapshot));
    }
    true
}

/// Refresh the summary label, clamp the highlight, and notify listeners.
fn after_multi_change(state: &mut ControlState) {
    state.input = if state.selection.is_empty() {
        String::new()
    } else {
        summary_label(state.selection.len())
    };
    crate::logic::navigation::clamp_highlight(state);
    let snapshot = state.selection.clone();
    state.emit(ControlEvent::SelectionChange(snapshot));
}
