//! Shared fixtures for control integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use tablepick::events::ControlEvent;
use tablepick::sources::{RemoteRequest, Transport};
use tablepick::{Column, ControlError, DropdownTable, Row, Settings};

/// Transport answering from a script keyed by the `query` parameter.
#[derive(Default)]
pub struct ScriptedTransport {
    /// Payload and delay per query text.
    responses: Mutex<HashMap<String, (Value, Duration)>>,
    /// Requests seen so far.
    requests: Mutex<Vec<RemoteRequest>>,
    /// Number of `fetch` calls.
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `query` with `payload` after `delay`.
    pub fn respond(&self, query: &str, payload: Value, delay: Duration) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(query.to_string(), (payload, delay));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Transport for ScriptedTransport {
    fn fetch(&self, request: RemoteRequest) -> BoxFuture<'static, Result<Value, ControlError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let query = request
            .params
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.requests.lock().expect("requests lock").push(request);
        let scripted = self
            .responses
            .lock()
            .expect("responses lock")
            .get(&query)
            .cloned();
        async move {
            match scripted {
                Some((payload, delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(payload)
                }
                None => Err(ControlError::transport(format!("no script for \"{query}\""))),
            }
        }
        .boxed()
    }
}

pub fn rows(values: Vec<Value>) -> Vec<Row> {
    values.into_iter().filter_map(Row::from_value).collect()
}

/// Two people, identified by `id`, shown by `name`.
pub fn people_settings() -> Settings {
    let mut settings = Settings::local(
        vec![Column::new("name", "Name")],
        rows(vec![
            json!({"id": 1, "name": "Alice"}),
            json!({"id": 2, "name": "Bob"}),
        ]),
    );
    settings.hidden_fields = vec!["id".into()];
    settings
}

/// Invoice lines with three amounts for sorting.
pub fn invoice_rows() -> Vec<Row> {
    rows(vec![
        json!({"id": 1, "no": "INV-1", "amount": 30}),
        json!({"id": 2, "no": "INV-2", "amount": 10}),
        json!({"id": 3, "no": "INV-3", "amount": 20}),
    ])
}

pub fn invoice_columns() -> Vec<Column> {
    vec![Column::new("no", "No"), Column::new("amount", "Amount")]
}

/// Remote settings against the scripted transport.
pub fn remote_table(transport: &Arc<ScriptedTransport>, min_length: usize) -> DropdownTable {
    let mut settings = Settings::remote(invoice_columns(), "https://example.test/invoice.php");
    settings.hidden_fields = vec!["id".into()];
    settings.min_length = min_length;
    let transport: Arc<dyn Transport> = transport.clone();
    DropdownTable::with_transport(settings, transport).expect("valid remote settings")
}

/// Record every event emitted by `table`.
pub fn record(table: &mut DropdownTable) -> Arc<Mutex<Vec<ControlEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    table.subscribe(move |e| sink.lock().expect("events lock").push(e.clone()));
    seen
}

pub fn amounts(table: &DropdownTable) -> Vec<i64> {
    table
        .snapshot()
        .result_set
        .iter()
        .filter_map(|r| r.get("amount").and_then(Value::as_i64))
        .collect()
}

/// Guard against hanging tests.
pub const WAIT: Duration = Duration::from_secs(5);
