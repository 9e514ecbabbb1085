//! Renderer intents: keys, pointer, focus, and header clicks.
//!
//! Each handler is a no-op while the control is disabled or destroyed.

use crossterm::event::KeyCode;

use crate::logic::{navigation, query, selection, sort};
use crate::state::{ControlState, Lifecycle};

/// Keys the control reacts to; text editing arrives through `on_input`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Highlight the next row.
    Down,
    /// Highlight the previous row.
    Up,
    /// Commit the highlighted row.
    Enter,
    /// Close without committing.
    Escape,
    /// Focus leaves the control.
    Tab,
    /// Anything else.
    Other,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Down => Self::Down,
            KeyCode::Up => Self::Up,
            KeyCode::Enter => Self::Enter,
            KeyCode::Esc => Self::Escape,
            KeyCode::Tab | KeyCode::BackTab => Self::Tab,
            _ => Self::Other,
        }
    }
}

/// What: Handle a navigation key.
///
/// Inputs:
/// - `state`: Control state
/// - `key`: Key pressed while the input has focus
///
/// Output:
/// - `true` if the key was consumed.
///
/// Details:
/// - Down/Up move the highlight, Enter commits it, Escape and Tab close the list.
pub fn on_key(state: &mut ControlState, key: Key) -> bool {
    if !state.is_active() {
        return false;
    }
    match key {
        Key::Down => {
            navigation::move_down(state);
            true
        }
        Key::Up => {
            navigation::move_up(state);
            true
        }
        Key::Enter => navigation::confirm(state),
        Key::Escape | Key::Tab => navigation::cancel(state),
        Key::Other => false,
    }
}

/// Pointer entered the presented row at `index`.
pub fn on_row_hover(state: &mut ControlState, index: usize) {
    if state.is_active() {
        navigation::hover(state, index);
    }
}

/// Pointer left the rows.
pub fn on_row_leave(state: &mut ControlState) {
    if state.is_active() {
        navigation::leave(state);
    }
}

/// What: Commit the clicked row.
///
/// Inputs:
/// - `state`: Control state
/// - `index`: Index into the presented rows
///
/// Output:
/// - `true` if a row was committed or toggled.
///
/// Details:
/// - Only an open list accepts clicks, matching keyboard confirm.
pub fn on_row_click(state: &mut ControlState, index: usize) -> bool {
    if !state.is_active() || state.lifecycle != Lifecycle::Open {
        return false;
    }
    state.highlight = Some(index).filter(|i| *i < state.presented_len());
    selection::commit(state, index)
}

/// What: Handle an interaction outside the control's bounds.
///
/// Inputs:
/// - `state`: Control state
///
/// Output:
/// - `true` if the list was closed.
///
/// Details:
/// - Ignored once the outside listener has been detached.
pub fn on_outside_interaction(state: &mut ControlState) -> bool {
    if !state.is_active() || !state.outside.is_attached() {
        return false;
    }
    crate::logic::close(state)
}

/// What: Run an immediate search when the input gains focus.
///
/// Inputs:
/// - `state`: Control state
///
/// Details:
/// - In multi-select mode a summary label in the input is searched as empty text.
pub fn on_focus(state: &mut ControlState) {
    if !state.is_active() {
        return;
    }
    let text = if state.settings.multiselect && crate::util::is_summary_label(&state.input) {
        String::new()
    } else {
        state.input.clone()
    };
    query::submit(state, &text);
}

/// Sort by the clicked column header.
pub fn on_column_header_click(state: &mut ControlState, key: &str) -> bool {
    state.is_active() && sort::sort_by_column(state, key)
}
