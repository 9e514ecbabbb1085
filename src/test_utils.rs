//! Test utilities for common test setup.
//!
//! This module provides shared fixtures used across the unit test modules.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::config::Settings;
use crate::error::ControlError;
use crate::events::ControlEvent;
use crate::sources::{RemoteRequest, Transport};
use crate::state::{Column, ControlState, Row};

/// Transport that fails every call; for controls that never go remote.
pub struct NullTransport;

impl Transport for NullTransport {
    fn fetch(&self, _request: RemoteRequest) -> BoxFuture<'static, Result<Value, ControlError>> {
        async { Err(ControlError::transport("no transport configured")) }.boxed()
    }
}

/// What: Columns of the invoice fixture.
///
/// Inputs: None
///
/// Output: `no`, `customer`, `amount` columns; `amount` is sortable.
pub fn invoice_columns() -> Vec<Column> {
    vec![
        Column::new("no", "Invoice"),
        Column::new("customer", "Customer"),
        Column::new("amount", "Amount"),
    ]
}

/// What: Invoice fixture rows with unique `id` fields.
///
/// Inputs: None
///
/// Output: Five rows; two numbers start with `INV-2024`.
pub fn invoice_rows() -> Vec<Row> {
    [
        json!({"id": 1, "no": "INV-2023-010", "customer": "Acme", "amount": 30}),
        json!({"id": 2, "no": "INV-2024-001", "customer": "Globex", "amount": 10}),
        json!({"id": 3, "no": "INV-2024-002", "customer": "Initech", "amount": 20}),
        json!({"id": 4, "no": "CRN-2024-001", "customer": "Acme", "amount": 5}),
        json!({"id": 5, "no": "INV-2022-777", "customer": "Umbrella", "amount": 100}),
    ]
    .into_iter()
    .filter_map(Row::from_value)
    .collect()
}

/// What: Local settings over the invoice fixture.
///
/// Inputs: None
///
/// Output: Settings with `id` as hidden identity field.
pub fn invoice_settings() -> Settings {
    let mut settings = Settings::local(invoice_columns(), invoice_rows());
    settings.hidden_fields = vec!["id".into()];
    settings
}

/// What: Build a validated state that never reaches a network.
///
/// Inputs:
/// - `settings`: Settings to validate
///
/// Output: `ControlState`; the fetch receiver is dropped.
pub fn new_state(settings: Settings) -> ControlState {
    let (state, _rx) = ControlState::new(settings, Arc::new(NullTransport)).expect("valid settings");
    state
}

/// What: Record every event emitted by the state.
///
/// Inputs:
/// - `state`: State to observe
///
/// Output: Shared vector receiving cloned events.
pub fn record(state: &mut ControlState) -> Arc<Mutex<Vec<ControlEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    state.events.subscribe(move |e| {
        sink.lock().expect("event log").push(e.clone());
    });
    log
}
