//! Remote lookups against a scripted transport.

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tablepick::events::ControlEvent;
use tablepick::sources::FetchOutcome;
use tablepick::state::{Lifecycle, RequestToken};
use tablepick::{ControlError, SettingsPatch};

use super::support::{ScriptedTransport, WAIT, amounts, record, remote_table, rows};

/// Token announced by the `Loading` event for `query`.
fn loading_token(events: &[ControlEvent], query: &str) -> Option<RequestToken> {
    events.iter().find_map(|e| match e {
        ControlEvent::Loading { query: q, token } if q == query => Some(*token),
        _ => None,
    })
}

#[tokio::test]
/// What: A query shorter than the minimum length issues no request.
///
/// Inputs:
/// - `min_length = 3`; input `ab` debounced and fired.
///
/// Output:
/// - No transport call; control stays closed.
async fn remote_min_length_blocks_request() {
    let transport = ScriptedTransport::new();
    let mut table = remote_table(&transport, 3);
    assert!(table.on_input("ab"));
    assert!(table.fire_debounce());
    assert_eq!(transport.calls(), 0);
    assert_eq!(table.lifecycle(), Lifecycle::Closed);
    assert!(!table.is_loading());
}

#[tokio::test]
/// What: Only the latest of two overlapping lookups is applied.
///
/// Inputs:
/// - `a` answered slowly with one row, `ab` answered at once with another.
///
/// Output:
/// - Results come from `ab`; a late outcome for `a` is discarded.
async fn remote_latest_request_wins() {
    let transport = ScriptedTransport::new();
    transport.respond(
        "a",
        json!([{"id": 1, "no": "INV-1", "amount": 30}]),
        Duration::from_millis(200),
    );
    transport.respond(
        "ab",
        json!({"data": [{"id": 2, "no": "INV-2", "amount": 10}]}),
        Duration::ZERO,
    );
    let mut table = remote_table(&transport, 1);
    let events = record(&mut table);

    table.submit("a");
    assert_eq!(table.lifecycle(), Lifecycle::Loading);
    table.submit("ab");
    assert_eq!(transport.calls(), 2);

    let applied = tokio::time::timeout(WAIT, table.next_fetch())
        .await
        .expect("lookup settles");
    assert!(applied);
    assert_eq!(table.lifecycle(), Lifecycle::Open);
    assert_eq!(amounts(&table), vec![10]);

    let stale = loading_token(&events.lock().expect("events lock"), "a").expect("token for a");
    let late = FetchOutcome {
        token: stale,
        query: "a".into(),
        result: Ok(rows(vec![json!({"id": 1, "no": "INV-1", "amount": 30})])),
    };
    assert!(!table.apply_fetch_outcome(late));
    assert_eq!(amounts(&table), vec![10]);

    let seen = events.lock().expect("events lock");
    let loads: Vec<&ControlEvent> = seen
        .iter()
        .filter(|e| matches!(e, ControlEvent::DataLoad { .. }))
        .collect();
    assert_eq!(
        loads,
        vec![&ControlEvent::DataLoad {
            query: "ab".into(),
            count: 1
        }]
    );
}

#[tokio::test]
/// What: A superseded lookup never reaches the fetch channel.
///
/// Inputs:
/// - Host-owned receiver; `a` (slow) superseded by `ab` (fast).
///
/// Output:
/// - Exactly one outcome arrives, tagged with the `ab` query.
async fn remote_superseded_lookup_is_aborted() {
    let transport = ScriptedTransport::new();
    transport.respond("a", json!([]), Duration::from_millis(100));
    transport.respond("ab", json!([]), Duration::from_millis(10));
    let mut table = remote_table(&transport, 1);
    let mut rx = table.take_fetch_receiver().expect("receiver");
    assert!(table.take_fetch_receiver().is_none());

    table.submit("a");
    table.submit("ab");
    let outcome = tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("outcome arrives")
        .expect("channel open");
    assert_eq!(outcome.query, "ab");
    assert!(table.apply_fetch_outcome(outcome));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
/// What: Rapid typing produces exactly one request for the final text.
///
/// Inputs:
/// - `a`, `ab`, `abc` typed 100 ms apart; ticks before and after the quiet period.
///
/// Output:
/// - One transport call carrying `query = abc` and the default `limit`.
async fn remote_debounce_coalesces_keystrokes() {
    let transport = ScriptedTransport::new();
    transport.respond(
        "abc",
        json!({"success": true, "data": [{"id": 3, "no": "INV-3", "amount": 20}]}),
        Duration::ZERO,
    );
    let mut table = remote_table(&transport, 1);
    let t0 = Instant::now();
    table.on_input_at("a", t0);
    table.on_input_at("ab", t0 + Duration::from_millis(100));
    table.on_input_at("abc", t0 + Duration::from_millis(200));

    assert!(!table.tick(t0 + Duration::from_millis(300)));
    assert_eq!(transport.calls(), 0);
    assert!(table.tick(t0 + Duration::from_millis(500)));
    assert!(table.debounce_deadline().is_none());
    assert_eq!(transport.calls(), 1);

    let request = transport.requests().pop().expect("one request");
    assert_eq!(request.params.get("query"), Some(&json!("abc")));
    assert_eq!(request.params.get("limit"), Some(&json!(10)));

    assert!(
        tokio::time::timeout(WAIT, table.next_fetch())
            .await
            .expect("lookup settles")
    );
    assert_eq!(amounts(&table), vec![20]);
}

#[tokio::test]
/// What: A failure envelope surfaces as an error and an empty open list.
///
/// Inputs:
/// - Endpoint answers `{ success: false, error: "boom" }`.
///
/// Output:
/// - `Error(Transport)` event; lifecycle `Open`; no rows.
async fn remote_failure_envelope_opens_empty() {
    let transport = ScriptedTransport::new();
    transport.respond(
        "acme",
        json!({"success": false, "error": "boom"}),
        Duration::ZERO,
    );
    let mut table = remote_table(&transport, 1);
    let events = record(&mut table);
    table.submit("acme");
    assert!(
        tokio::time::timeout(WAIT, table.next_fetch())
            .await
            .expect("lookup settles")
    );
    assert_eq!(table.lifecycle(), Lifecycle::Open);
    assert!(table.snapshot().result_set.is_empty());
    assert!(events.lock().expect("events lock").contains(&ControlEvent::Error(
        ControlError::Transport {
            message: "boom".into()
        }
    )));
}

#[tokio::test]
/// What: A payload that is not a row list is reported as malformed.
async fn remote_malformed_payload_reports_error() {
    let transport = ScriptedTransport::new();
    transport.respond("acme", Value::String("nope".into()), Duration::ZERO);
    let mut table = remote_table(&transport, 1);
    let events = record(&mut table);
    table.submit("acme");
    assert!(
        tokio::time::timeout(WAIT, table.next_fetch())
            .await
            .expect("lookup settles")
    );
    assert!(events
        .lock()
        .expect("events lock")
        .iter()
        .any(|e| matches!(e, ControlEvent::Error(ControlError::MalformedResponse { .. }))));
    assert_eq!(table.lifecycle(), Lifecycle::Open);
}

#[tokio::test]
/// What: Destroying a loading control drops its lookup and goes quiet.
///
/// Inputs:
/// - Slow lookup in flight; `destroy()`.
///
/// Output:
/// - Nothing in flight; `next_fetch` resolves `false`; later intents are ignored.
async fn remote_destroy_aborts_lookup() {
    let transport = ScriptedTransport::new();
    transport.respond("acme", json!([]), Duration::from_millis(200));
    let mut table = remote_table(&transport, 1);
    table.submit("acme");
    assert!(table.is_loading());
    table.destroy();
    assert!(!table.is_loading());
    assert_eq!(table.lifecycle(), Lifecycle::Closed);
    assert!(!table.next_fetch().await);
    assert!(!table.on_input("acme"));
}

#[tokio::test]
/// What: Typing below the minimum length narrows held remote rows instead of closing.
///
/// Inputs:
/// - `min_length = 3`, `keep_open_while_typing`; `inv` answered with three rows,
///   then `in` and finally the empty string submitted.
///
/// Output:
/// - `in` keeps the two invoices without a second request, stays open, and drops
///   the highlight; the empty string closes the list.
async fn remote_short_query_narrows_held_rows() {
    let transport = ScriptedTransport::new();
    transport.respond(
        "inv",
        json!([
            {"id": 1, "no": "INV-1", "amount": 30},
            {"id": 2, "no": "CRN-1", "amount": 5},
            {"id": 3, "no": "INV-2", "amount": 10}
        ]),
        Duration::ZERO,
    );
    let mut table = remote_table(&transport, 3);
    table
        .update_settings(SettingsPatch {
            keep_open_while_typing: Some(true),
            ..Default::default()
        })
        .expect("valid patch");

    table.submit("inv");
    let applied = tokio::time::timeout(WAIT, table.next_fetch())
        .await
        .expect("lookup settles");
    assert!(applied);
    assert_eq!(amounts(&table), vec![30, 5, 10]);
    table.on_row_hover(1);
    assert_eq!(table.snapshot().highlight, Some(1));

    table.submit("in");
    assert_eq!(transport.calls(), 1);
    assert_eq!(amounts(&table), vec![30, 10]);
    assert_eq!(table.lifecycle(), Lifecycle::Open);
    assert_eq!(table.snapshot().highlight, None);
    assert!(!table.is_loading());

    table.submit("");
    assert_eq!(transport.calls(), 1);
    assert_eq!(table.lifecycle(), Lifecycle::Closed);
}
