use std::time::Instant;

use crate::error::ControlError;
use crate::events::ControlEvent;
use crate::logic::{lifecycle, sort};
use crate::sources::{DataSource, FetchOutcome, MatchPolicy, RemoteSource};
use crate::state::{ControlState, Lifecycle, PendingInput, Row};
use crate::util::is_summary_label;

/// What: Record typed text and (re)start the debounce window.
///
/// Inputs:
/// - `state`: Control state
/// - `text`: Current input text
/// - `now`: Time of the keystroke
///
/// Output:
/// - `true` if a debounced submit was scheduled.
///
/// Details:
/// - Any earlier pending input is replaced, never stacked.
/// - In multi-select mode, text shaped like the selection summary is ignored.
pub fn on_input(state: &mut ControlState, text: &str, now: Instant) -> bool {
    if !state.is_active() {
        return false;
    }
    state.pending_input = None;
    if state.settings.multiselect && is_summary_label(text) {
        tracing::debug!(text, "ignoring summary label input");
        return false;
    }
    state.input = text.to_string();
    state.pending_input = Some(PendingInput {
        text: text.to_string(),
        deadline: now + state.settings.debounce,
    });
    true
}

/// Deadline of the pending debounced submit, if any.
#[must_use]
pub fn debounce_deadline(state: &ControlState) -> Option<Instant> {
    state.pending_input.as_ref().map(|p| p.deadline)
}

/// What: Fire the pending submit once its quiet period has elapsed.
///
/// Inputs:
/// - `state`: Control state
/// - `now`: Current time
///
/// Output:
/// - `true` if a submit fired.
pub fn tick(state: &mut ControlState, now: Instant) -> bool {
    let due = state
        .pending_input
        .as_ref()
        .is_some_and(|pending| pending.deadline <= now);
    due && fire_pending(state)
}

/// What: Fire the pending submit immediately, regardless of its deadline.
///
/// Inputs:
/// - `state`: Control state
///
/// Output:
/// - `true` if there was pending input.
pub fn fire_pending(state: &mut ControlState) -> bool {
    match state.pending_input.take() {
        Some(pending) => {
            submit(state, &pending.text);
            true
        }
        None => false,
    }
}

/// What: Run a query immediately, bypassing the debounce.
///
/// Inputs:
/// - `state`: Control state
/// - `text`: Query text
///
/// Details:
/// - Local sources filter synchronously and open the list.
/// - Remote sources below `min_length` never issue a call.
pub fn submit(state: &mut ControlState, text: &str) {
    if !state.is_active() {
        return;
    }
    state.pending_input = None;
    let limit = state.settings.limit;
    let local = match DataSource::resolve(&state.settings, &state.transport) {
        DataSource::Local(local) => Ok(local.search(text, limit)),
        DataSource::Remote(remote) => Err(remote),
    };
    match local {
        Ok(rows) => {
            let count = rows.len();
            replace_results(state, rows);
            lifecycle::transition(state, Lifecycle::Open);
            state.emit(ControlEvent::DataLoad {
                query: text.to_string(),
                count,
            });
        }
        Err(remote) => submit_remote(state, text, &remote),
    }
}

/// What: Gate a remote query on `min_length` and issue it when allowed.
///
/// Inputs:
/// - `state`: Control state
/// - `text`: Query text
/// - `remote`: Source snapshot built from the active settings
///
/// Details:
/// - Any in-flight lookup is aborted first; its token stops being current.
/// - Short non-empty text narrows the held rows when `keep_open_while_typing`
///   allows it, otherwise the list closes. Empty text always closes.
fn submit_remote(state: &mut ControlState, text: &str, remote: &RemoteSource) {
    state.abort_in_flight();
    if text.chars().count() < state.settings.min_length {
        let keep = state.settings.keep_open_while_typing
            && state.lifecycle == Lifecycle::Open
            && !state.results.is_empty();
        if !text.is_empty() && keep {
            narrow_results(state, text);
        } else {
            tracing::debug!(text, min_length = state.settings.min_length, "query below minimum length");
            lifecycle::close(state);
        }
        return;
    }
    let token = state.allocate_token();
    lifecycle::transition(state, Lifecycle::Loading);
    state.emit(ControlEvent::Loading {
        query: text.to_string(),
        token,
    });
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(%token, "remote lookup issued outside a tokio runtime");
        apply_fetch_outcome(
            state,
            FetchOutcome {
                token,
                query: text.to_string(),
                result: Err(ControlError::transport("no async runtime available")),
            },
        );
        return;
    };
    let search = remote.search(text, state.settings.limit);
    let tx = state.fetch_tx.clone();
    let query = text.to_string();
    tracing::info!(%token, query = %query, "issuing remote lookup");
    let handle = runtime.spawn(async move {
        let result = search.await;
        let _ = tx.send(FetchOutcome {
            token,
            query,
            result,
        });
    });
    state.in_flight = Some(handle.abort_handle());
}

/// What: Apply the outcome of a remote lookup if it is still current.
///
/// Inputs:
/// - `state`: Control state
/// - `outcome`: Token-tagged result from a lookup task
///
/// Output:
/// - `true` if the outcome was applied; `false` if it was stale and discarded.
///
/// Details:
/// - Success replaces the result set and opens the list.
/// - Failures emit `Error`, clear the result set, and still open the list.
/// - A cancellation for the current token closes silently.
pub fn apply_fetch_outcome(state: &mut ControlState, outcome: FetchOutcome) -> bool {
    if state.destroyed || state.latest_token != Some(outcome.token) {
        tracing::debug!(token = %outcome.token, query = %outcome.query, "discarding stale lookup result");
        return false;
    }
    state.in_flight = None;
    match outcome.result {
        Ok(rows) => {
            let count = rows.len();
            replace_results(state, rows);
            lifecycle::transition(state, Lifecycle::Open);
            tracing::debug!(token = %outcome.token, count, "applied lookup result");
            state.emit(ControlEvent::DataLoad {
                query: outcome.query,
                count,
            });
        }
        Err(err) if err.is_cancellation() => {
            tracing::debug!(token = %outcome.token, "lookup cancelled");
            lifecycle::close(state);
        }
        Err(err) => {
            tracing::warn!(token = %outcome.token, query = %outcome.query, error = %err, "remote lookup failed");
            replace_results(state, Vec::new());
            lifecycle::transition(state, Lifecycle::Open);
            state.emit(ControlEvent::Error(err));
        }
    }
    true
}

/// What: Replace the result set and reset the highlight.
///
/// Inputs:
/// - `state`: Control state
/// - `rows`: New rows
///
/// Details:
/// - Truncates to `limit`, remembers the source order, and re-applies the active sort.
pub fn replace_results(state: &mut ControlState, mut rows: Vec<Row>) {
    rows.truncate(state.settings.limit);
    state.source_order = rows;
    sort::resort(state);
    state.highlight = None;
}

/// Filter the currently held rows without a new lookup.
fn narrow_results(state: &mut ControlState, text: &str) {
    let rows = MatchPolicy::from_settings(&state.settings).filter(
        &state.source_order,
        text,
        state.settings.limit,
    );
    tracing::debug!(text, kept = rows.len(), "narrowed held results");
    replace_results(state, rows);
}
