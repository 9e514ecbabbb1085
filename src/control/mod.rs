//! `DropdownTable`: the public operational API of one control instance.
//!
//! The facade owns the [`ControlState`] and the receiving end of the fetch
//! channel. Hosts either drive it synchronously (local data, explicit
//! `tick`/`fire_debounce`) or from a tokio event loop that awaits
//! [`DropdownTable::debounce_deadline`] and the fetch receiver.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::config::{Settings, SettingsPatch};
use crate::error::ConfigError;
use crate::events::{ControlEvent, Key, ListenerId, intents};
use crate::logic;
use crate::sources::{FetchOutcome, HttpTransport, Transport};
use crate::state::{ControlSnapshot, ControlState, Lifecycle, Row};


/// A search-and-select dropdown table control.
#[derive(Debug)]
pub struct DropdownTable {
    /// Owned controller state.
    state: ControlState,
    /// Outcomes of remote lookups; `None` once handed to the host.
    fetch_rx: Option<mpsc::UnboundedReceiver<FetchOutcome>>,
}

impl DropdownTable {
    /// What: Create a control using the default HTTP transport.
    ///
    /// Inputs:
    /// - `settings`: Initial settings
    ///
    /// Output:
    /// - Closed, enabled control with an empty selection.
    ///
    /// # Errors
    /// - `ConfigError` when the settings do not validate.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        Self::with_transport(settings, Arc::new(HttpTransport::new()))
    }

    /// What: Create a control with a custom transport.
    ///
    /// Inputs:
    /// - `settings`: Initial settings
    /// - `transport`: Transport for remote lookups
    ///
    /// Output:
    /// - Closed, enabled control with an empty selection.
    ///
    /// # Errors
    /// - `ConfigError` when the settings do not validate.
    pub fn with_transport(
        settings: Settings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let (state, fetch_rx) = ControlState::new(settings, transport)?;
        tracing::info!(
            columns = state.settings.columns.len(),
            remote = state.settings.use_ajax,
            multiselect = state.settings.multiselect,
            "dropdown table created"
        );
        Ok(Self {
            state,
            fetch_rx: Some(fetch_rx),
        })
    }

    /// Read-only view of the controller state.
    #[must_use]
    pub const fn state(&self) -> &ControlState {
        &self.state
    }

    /// Owned copy of the displayable state.
    #[must_use]
    pub fn snapshot(&self) -> ControlSnapshot {
        self.state.snapshot()
    }

    /// Register a callback listener.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ControlEvent) + Send + 'static,
    {
        self.state.events.subscribe(listener)
    }

    /// Register a channel listener.
    pub fn subscribe_channel(&mut self) -> (ListenerId, mpsc::UnboundedReceiver<ControlEvent>) {
        self.state.events.subscribe_channel()
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.state.events.unsubscribe(id)
    }

    // ---- query ----

    /// Record typed text; a search fires after the debounce window.
    pub fn on_input(&mut self, text: &str) -> bool {
        self.on_input_at(text, Instant::now())
    }

    /// Record typed text observed at `now`.
    pub fn on_input_at(&mut self, text: &str, now: Instant) -> bool {
        logic::on_input(&mut self.state, text, now)
    }

    /// Fire the debounced search if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        logic::tick(&mut self.state, now)
    }

    /// Fire the debounced search now.
    pub fn fire_debounce(&mut self) -> bool {
        logic::fire_pending(&mut self.state)
    }

    /// Deadline of the pending debounced search.
    #[must_use]
    pub fn debounce_deadline(&self) -> Option<Instant> {
        logic::debounce_deadline(&self.state)
    }

    /// Run a search immediately.
    pub fn submit(&mut self, text: &str) {
        logic::submit(&mut self.state, text);
    }

    /// Apply a lookup outcome received from the fetch channel.
    pub fn apply_fetch_outcome(&mut self, outcome: FetchOutcome) -> bool {
        logic::apply_fetch_outcome(&mut self.state, outcome)
    }

    /// What: Hand the fetch receiver to a host event loop.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - The receiver on first call; `None` afterwards.
    ///
    /// Details:
    /// - Once taken, [`DropdownTable::next_fetch`] no longer resolves outcomes.
    pub fn take_fetch_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<FetchOutcome>> {
        self.fetch_rx.take()
    }

    /// Whether a remote lookup is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.state.in_flight.is_some()
    }

    /// What: Wait until the current remote lookup settles.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - `true` if an outcome was applied; `false` if nothing was in flight.
    ///
    /// Details:
    /// - Stale outcomes received on the way are discarded.
    pub async fn next_fetch(&mut self) -> bool {
        loop {
            if self.state.in_flight.is_none() {
                return false;
            }
            let Some(rx) = self.fetch_rx.as_mut() else {
                return false;
            };
            let Some(outcome) = rx.recv().await else {
                return false;
            };
            if logic::apply_fetch_outcome(&mut self.state, outcome) {
                return true;
            }
        }
    }

    // ---- intents ----

    /// Handle a navigation key.
    pub fn on_key(&mut self, key: Key) -> bool {
        intents::on_key(&mut self.state, key)
    }

    /// Pointer entered a row.
    pub fn on_row_hover(&mut self, index: usize) {
        intents::on_row_hover(&mut self.state, index);
    }

    /// Pointer left the rows.
    pub fn on_row_leave(&mut self) {
        intents::on_row_leave(&mut self.state);
    }

    /// A row was clicked.
    pub fn on_row_click(&mut self, index: usize) -> bool {
        intents::on_row_click(&mut self.state, index)
    }

    /// An interaction happened outside the control.
    pub fn on_outside_interaction(&mut self) -> bool {
        intents::on_outside_interaction(&mut self.state)
    }

    /// The input gained focus.
    pub fn on_focus(&mut self) {
        intents::on_focus(&mut self.state);
    }

    /// A column header was clicked.
    pub fn on_column_header_click(&mut self, key: &str) -> bool {
        intents::on_column_header_click(&mut self.state, key)
    }

    // ---- lifecycle ----

    /// Show the list by searching the current value.
    pub fn open(&mut self) {
        intents::on_focus(&mut self.state);
    }

    /// Hide the list.
    pub fn close(&mut self) -> bool {
        logic::close(&mut self.state)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    // ---- selection ----

    /// Copy of the selection set in insertion order.
    #[must_use]
    pub fn selected_rows(&self) -> Vec<Row> {
        self.state.selection.clone()
    }

    /// Empty the selection set.
    pub fn clear_selection(&mut self) {
        logic::clear(&mut self.state);
    }

    /// Add or remove a row from the multi-select set.
    pub fn toggle(&mut self, row: &Row, included: bool) -> bool {
        logic::toggle(&mut self.state, row, included)
    }

    /// Select every presented row (multi-select only).
    pub fn select_all(&mut self) -> usize {
        logic::select_all(&mut self.state)
    }

    // ---- value ----

    /// Current input text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.state.input
    }

    /// What: Set the input text and search it immediately.
    ///
    /// Inputs:
    /// - `text`: New input text
    pub fn set_value(&mut self, text: &str) {
        self.state.input = text.to_string();
        logic::submit(&mut self.state, text);
    }

    /// Re-run the search for the current value.
    pub fn refresh(&mut self) {
        let text = self.state.input.clone();
        logic::submit(&mut self.state, &text);
    }

    // ---- configuration ----

    /// What: Replace the local rows.
    ///
    /// Inputs:
    /// - `rows`: New row collection
    ///
    /// Details:
    /// - Re-runs the current query when the list is open over a local source.
    pub fn update_data(&mut self, rows: Vec<Row>) {
        tracing::debug!(rows = rows.len(), "data replaced");
        self.state.settings.data = rows;
        if !self.state.settings.use_ajax && self.state.lifecycle == Lifecycle::Open {
            self.refresh();
        }
    }

    /// What: Apply a partial settings update.
    ///
    /// Inputs:
    /// - `patch`: Fields to change
    ///
    /// # Errors
    /// - `ConfigError` when the patched settings do not validate; nothing changes then.
    ///
    /// Details:
    /// - Changing the data source aborts the in-flight lookup and closes a loading list.
    /// - Results are cut to a smaller `limit`; a sort on a removed column is dropped.
    /// - Turning multi-select off keeps only the most recent selection.
    /// - A new identity strategy collapses selected rows that now share a key, keeping the first.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<(), ConfigError> {
        let touches_source = patch.touches_source();
        let next = patch.apply_to(&self.state.settings);
        let identity = next.validate()?;
        let identity_changed = identity != self.state.identity;
        self.state.settings = next;
        self.state.identity = identity;
        let state = &mut self.state;
        if touches_source {
            state.abort_in_flight();
            if state.lifecycle == Lifecycle::Loading {
                logic::close(state);
            }
        }
        if state
            .sort
            .as_ref()
            .is_some_and(|s| state.settings.column(&s.column).is_none())
        {
            state.sort = None;
        }
        state.source_order.truncate(state.settings.limit);
        logic::resort(state);
        logic::clamp_highlight(state);
        if identity_changed {
            logic::dedupe_selection(state);
        }
        if !state.settings.multiselect && state.selection.len() > 1 {
            let keep = state.selection.split_off(state.selection.len() - 1);
            state.selection = keep;
            let snapshot = state.selection.clone();
            state.emit(ControlEvent::SelectionChange(snapshot));
        }
        tracing::info!(touches_source, "settings updated");
        Ok(())
    }

    // ---- enable / teardown ----

    /// Close the list and ignore further intents.
    pub fn disable(&mut self) {
        logic::close(&mut self.state);
        self.state.disabled = true;
        tracing::debug!("control disabled");
    }

    /// Accept intents again.
    pub fn enable(&mut self) {
        self.state.disabled = false;
        tracing::debug!("control enabled");
    }

    /// Whether intents are ignored.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.state.disabled
    }

    /// What: Tear the control down.
    ///
    /// Inputs: None.
    ///
    /// Details:
    /// - Drops pending input, aborts the in-flight lookup, closes the list,
    ///   detaches the outside listener and every event listener.
    /// - Further calls are ignored.
    pub fn destroy(&mut self) {
        if self.state.destroyed {
            return;
        }
        logic::close(&mut self.state);
        self.state.outside.detach();
        self.state.events.clear();
        self.state.results.clear();
        self.state.source_order.clear();
        self.state.destroyed = true;
        tracing::info!("dropdown table destroyed");
    }
}

impl Drop for DropdownTable {
    fn drop(&mut self) {
        self.state.abort_in_flight();
    }
}
