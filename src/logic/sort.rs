use std::cmp::Ordering;

use serde_json::Value;

use crate::state::{ControlState, Row, SortDirection, SortState};
use crate::util::{value_number, value_text};

/// What: Compare two cell values for sorting.
///
/// Inputs:
/// - `a`, `b`: Cell values; missing cells compare as empty text
///
/// Output:
/// - Numeric ordering when both sides are numeric (numeric strings included);
///   case-insensitive text ordering otherwise.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    if let (Some(x), Some(y)) = (value_number(a), value_number(b)) {
        return x.total_cmp(&y);
    }
    value_text(a)
        .to_lowercase()
        .cmp(&value_text(b).to_lowercase())
}

/// What: Sort rows in place by a column.
///
/// Inputs:
/// - `rows`: Rows to reorder
/// - `sort`: Column key and direction
///
/// Details:
/// - Stable: rows with equal keys keep their prior relative order in both directions.
/// - Callers sort a copy of the source order so ties follow the source, not an earlier sort.
pub fn apply_sort(rows: &mut [Row], sort: &SortState) {
    rows.sort_by(|a, b| {
        let ord = compare_values(a.get(&sort.column), b.get(&sort.column));
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Rebuild the presented order from the source order and the active sort.
pub fn resort(state: &mut ControlState) {
    let mut rows = state.source_order.clone();
    if let Some(active) = &state.sort {
        apply_sort(&mut rows, active);
    }
    state.results = rows;
}

/// What: Sort the result set by a column, toggling direction on repeat.
///
/// Inputs:
/// - `state`: Control state
/// - `key`: Column key
///
/// Output:
/// - `true` if the result set was re-sorted.
///
/// Details:
/// - First invocation sorts ascending; invoking again on the same column flips the direction.
/// - Unknown or non-sortable columns are ignored.
/// - Preserves the highlighted row by identity when it is still presented.
pub fn sort_by_column(state: &mut ControlState, key: &str) -> bool {
    match state.settings.column(key) {
        Some(column) if column.sortable => {}
        Some(_) => {
            tracing::debug!(column = key, "column is not sortable");
            return false;
        }
        None => {
            tracing::warn!(column = key, "sort requested on unknown column");
            return false;
        }
    }
    let direction = match &state.sort {
        Some(current) if current.column == key => current.direction.flipped(),
        _ => SortDirection::Ascending,
    };
    let sort = SortState {
        column: key.to_string(),
        direction,
    };
    let prev = state
        .highlight
        .and_then(|i| state.presented_row(i))
        .cloned();
    state.sort = Some(sort);
    resort(state);
    if let Some(prev) = prev {
        let identity = &state.identity;
        let pos = state.presented().iter().position(|r| identity.same(r, &prev));
        state.highlight = pos;
    }
    tracing::debug!(column = key, ?direction, "sorted results");
    true
}
