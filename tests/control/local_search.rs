//! Local searches, selection, and sorting driven through the public API.

use serde_json::json;
use tablepick::events::ControlEvent;
use tablepick::state::{Lifecycle, SortDirection};
use tablepick::{DropdownTable, Key, Settings};

use super::support::{amounts, invoice_columns, invoice_rows, people_settings, record};

#[test]
/// What: Typing `al` over Alice/Bob and committing selects Alice.
///
/// Inputs:
/// - Local source with two rows; `on_input("al")`, debounce fired, Down, Enter.
///
/// Output:
/// - One presented row; `Select(Alice)` emitted; value `Alice`; list closed.
fn local_type_and_pick() {
    let mut table = DropdownTable::new(people_settings()).expect("valid settings");
    let events = record(&mut table);

    assert!(table.on_input("al"));
    assert_eq!(table.lifecycle(), Lifecycle::Closed);
    assert!(table.fire_debounce());
    let snap = table.snapshot();
    assert_eq!(snap.lifecycle, Lifecycle::Open);
    assert_eq!(snap.result_set.len(), 1);
    assert_eq!(snap.result_set[0].text("name"), "Alice");

    assert!(table.on_key(Key::Down));
    assert!(table.on_key(Key::Enter));
    assert_eq!(table.value(), "Alice");
    assert_eq!(table.lifecycle(), Lifecycle::Closed);
    let selected = table.selected_rows();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].get("id"), Some(&json!(1)));

    let seen = events.lock().expect("events lock");
    assert!(seen.contains(&ControlEvent::DataLoad {
        query: "al".into(),
        count: 1
    }));
    let select_at = seen
        .iter()
        .position(|e| matches!(e, ControlEvent::Select(_)))
        .expect("select emitted");
    assert!(matches!(seen[select_at + 1], ControlEvent::SelectionChange(ref rows) if rows.len() == 1));
    assert_eq!(seen.last(), Some(&ControlEvent::Close));
}

#[test]
/// What: Multi-select clicks toggle rows in and out of the selection.
///
/// Inputs:
/// - Multi-select over Alice/Bob; click row 0, row 1, row 0 again.
///
/// Output:
/// - Selection grows to both rows, then shrinks to Bob; list stays open;
///   the input carries a summary label.
fn local_multiselect_toggles() {
    let mut settings = people_settings();
    settings.multiselect = true;
    let mut table = DropdownTable::new(settings).expect("valid settings");
    table.open();
    assert_eq!(table.lifecycle(), Lifecycle::Open);

    assert!(table.on_row_click(0));
    assert!(table.on_row_click(1));
    assert_eq!(table.selected_rows().len(), 2);
    assert_eq!(table.value(), "2 items selected");

    assert!(table.on_row_click(0));
    let selected = table.selected_rows();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].text("name"), "Bob");
    assert_eq!(table.value(), "1 item selected");
    assert_eq!(table.lifecycle(), Lifecycle::Open);

    table.clear_selection();
    assert!(table.selected_rows().is_empty());
}

#[test]
/// What: Header clicks sort ascending, then descending, keeping the highlight on its row.
///
/// Inputs:
/// - Amounts 30, 10, 20; highlight on the 30 row; header `amount` clicked twice.
///
/// Output:
/// - `[10, 20, 30]` then `[30, 20, 10]`; highlight follows the 30 row.
fn local_sort_by_header() {
    let mut table =
        DropdownTable::new(Settings::local(invoice_columns(), invoice_rows())).expect("valid settings");
    table.open();
    assert_eq!(amounts(&table), vec![30, 10, 20]);
    table.on_row_hover(0);

    assert!(table.on_column_header_click("amount"));
    assert_eq!(amounts(&table), vec![10, 20, 30]);
    assert_eq!(table.snapshot().highlight, Some(2));
    assert_eq!(
        table.snapshot().sort.map(|s| s.direction),
        Some(SortDirection::Ascending)
    );

    assert!(table.on_column_header_click("amount"));
    assert_eq!(amounts(&table), vec![30, 20, 10]);
    assert_eq!(table.snapshot().highlight, Some(0));
    assert!(!table.on_column_header_click("missing"));
}

#[test]
/// What: Outside clicks close the list; a disabled control ignores input.
///
/// Inputs:
/// - Open list, outside interaction; then disable and type.
///
/// Output:
/// - Closed after the outside click; no pending search while disabled.
fn local_outside_click_and_disable() {
    let mut table = DropdownTable::new(people_settings()).expect("valid settings");
    table.open();
    assert!(table.on_outside_interaction());
    assert_eq!(table.lifecycle(), Lifecycle::Closed);

    table.disable();
    assert!(!table.on_input("bo"));
    assert!(table.debounce_deadline().is_none());
    table.enable();
    assert!(table.on_input("bo"));
    assert!(table.debounce_deadline().is_some());
}
