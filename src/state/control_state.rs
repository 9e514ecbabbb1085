//! Central `ControlState` container owned by one dropdown table instance.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::config::Settings;
use crate::error::ConfigError;
use crate::events::{ControlEvent, EventBus, OutsideListener};
use crate::sources::{FetchOutcome, Transport};
use crate::state::types::{
    ControlSnapshot, IdentityStrategy, Lifecycle, RequestToken, Row, SortState,
};

/// Debounced input waiting for its quiet period to elapse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingInput {
    /// Text to submit.
    pub text: String,
    /// Instant at which the submit fires.
    pub deadline: Instant,
}

/// State shared by the query, selection, navigation, and sort logic.
///
/// All mutation happens synchronously in the owning task. Remote lookups run
/// as spawned tasks that report back through `fetch_tx`; their outcomes are
/// applied only when their token equals `latest_token`.
pub struct ControlState {
    /// Active, validated settings.
    pub settings: Settings,
    /// Identity strategy resolved from the settings.
    pub identity: IdentityStrategy,
    /// Transport used for remote lookups.
    pub transport: Arc<dyn Transport>,
    /// Current input text.
    pub input: String,
    /// Current result set, at most `settings.limit` rows, in source or sort order.
    pub results: Vec<Row>,
    /// The result set as delivered by the data source, before any sort.
    pub source_order: Vec<Row>,
    /// Highlighted index into the presented rows; `None` means nothing highlighted.
    pub highlight: Option<usize>,
    /// Selected rows, unique by identity, in insertion order.
    pub selection: Vec<Row>,
    /// Presentation state of the result list.
    pub lifecycle: Lifecycle,
    /// Active column sort.
    pub sort: Option<SortState>,
    /// Debounced input waiting to be submitted.
    pub pending_input: Option<PendingInput>,
    /// Next token value to hand out.
    pub next_token: u64,
    /// Token of the most recently issued remote request.
    pub latest_token: Option<RequestToken>,
    /// Abort handle of the in-flight remote task for `latest_token`.
    pub in_flight: Option<AbortHandle>,
    /// Intents and submits are ignored while set.
    pub disabled: bool,
    /// Set once the control has been torn down.
    pub destroyed: bool,
    /// Registered event listeners.
    pub events: EventBus,
    /// Outside-interaction registration for this instance.
    pub outside: OutsideListener,
    /// Sender handed to remote lookup tasks.
    pub fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl ControlState {
    /// What: Validate settings and build a fresh state.
    ///
    /// Inputs:
    /// - `settings`: Initial settings
    /// - `transport`: Transport for remote lookups
    ///
    /// Output:
    /// - `(state, receiver)`; the receiver yields outcomes of remote lookups.
    ///
    /// # Errors
    /// - Any `ConfigError` reported by [`Settings::validate`].
    pub fn new(
        settings: Settings,
        transport: Arc<dyn Transport>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FetchOutcome>), ConfigError> {
        let identity = settings.validate()?;
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let mut outside = OutsideListener::default();
        outside.attach();
        let state = Self {
            settings,
            identity,
            transport,
            input: String::new(),
            results: Vec::new(),
            source_order: Vec::new(),
            highlight: None,
            selection: Vec::new(),
            lifecycle: Lifecycle::Closed,
            sort: None,
            pending_input: None,
            next_token: 1,
            latest_token: None,
            in_flight: None,
            disabled: false,
            destroyed: false,
            events: EventBus::default(),
            outside,
            fetch_tx,
        };
        Ok((state, fetch_rx))
    }

    /// Whether the control currently reacts to intents and submits.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.disabled && !self.destroyed
    }

    /// Deliver an event to all listeners.
    pub fn emit(&mut self, event: ControlEvent) {
        self.events.emit(&event);
    }

    /// Whether a row with the same identity is selected.
    #[must_use]
    pub fn is_selected(&self, row: &Row) -> bool {
        self.selection.iter().any(|s| self.identity.same(s, row))
    }

    /// Whether `row` is excluded from presentation by `hide_preselected`.
    fn is_hidden(&self, row: &Row) -> bool {
        self.settings.hide_preselected && self.is_selected(row)
    }

    /// Rows currently presented, in display order.
    #[must_use]
    pub fn presented(&self) -> Vec<&Row> {
        self.results.iter().filter(|r| !self.is_hidden(r)).collect()
    }

    /// Number of presented rows.
    #[must_use]
    pub fn presented_len(&self) -> usize {
        self.results.iter().filter(|r| !self.is_hidden(r)).count()
    }

    /// Presented row at `index`.
    #[must_use]
    pub fn presented_row(&self, index: usize) -> Option<&Row> {
        self.results
            .iter()
            .filter(|r| !self.is_hidden(r))
            .nth(index)
    }

    /// What: Hand out the next request token and make it current.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - Fresh, strictly increasing `RequestToken`.
    pub fn allocate_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.latest_token = Some(token);
        token
    }

    /// What: Abort the in-flight remote lookup and invalidate its token.
    ///
    /// Inputs: None.
    ///
    /// Output:
    /// - `true` if a request was in flight.
    ///
    /// Details:
    /// - Clearing `latest_token` guarantees a response that slips past the abort is discarded.
    pub fn abort_in_flight(&mut self) -> bool {
        self.latest_token = None;
        match self.in_flight.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!("aborted in-flight lookup");
                true
            }
            None => false,
        }
    }

    /// Copy of the state for renderers and hosts.
    #[must_use]
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            result_set: self.presented().into_iter().cloned().collect(),
            highlight: self.highlight,
            selection: self.selection.clone(),
            lifecycle: self.lifecycle,
            sort: self.sort.clone(),
            value: self.input.clone(),
            disabled: self.disabled,
        }
    }
}

impl std::fmt::Debug for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlState")
            .field("input", &self.input)
            .field("results", &self.results.len())
            .field("highlight", &self.highlight)
            .field("selection", &self.selection.len())
            .field("lifecycle", &self.lifecycle)
            .field("sort", &self.sort)
            .field("latest_token", &self.latest_token)
            .field("disabled", &self.disabled)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
