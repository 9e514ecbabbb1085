//! Small utility helpers for value conversion, numeric parsing, and label formatting.
//!
//! The functions in this module are lightweight and used on hot paths by the
//! local matcher, the sort engine, and the renderer.

pub mod config;

use serde_json::Value;

/// What: Convert a row field value into the text used for matching and display.
///
/// Inputs:
/// - `v`: JSON value held by a row field.
///
/// Output:
/// - Returns the textual form of the value.
///
/// Details:
/// - Strings are returned as-is (no surrounding quotes).
/// - Numbers and booleans use their JSON rendering.
/// - `null` becomes `""` so missing and null fields behave the same.
/// - Arrays and objects fall back to compact JSON.
#[must_use]
pub fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

/// What: Interpret a value as a number for sorting.
///
/// Inputs:
/// - `v`: JSON value held by a row field.
///
/// Output:
/// - `Some(f64)` for JSON numbers and for strings that parse as a finite float; `None` otherwise.
///
/// Details:
/// - Numeric strings such as `"33579.04"` count as numbers because remote endpoints often
///   serialize amounts as strings.
/// - Empty and whitespace-only strings are not numeric.
#[must_use]
pub fn value_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            t.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// What: Format the multi-select summary shown in the input field.
///
/// Inputs:
/// - `count`: Number of selected rows
///
/// Output:
/// - `""` for zero, `"1 item selected"` for one, `"N items selected"` otherwise.
#[must_use]
pub fn summary_label(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "1 item selected".to_string(),
        n => format!("{n} items selected"),
    }
}

/// What: Detect text that has the shape of a multi-select summary label.
///
/// Inputs:
/// - `text`: Raw input text
///
/// Output:
/// - `true` when `text` reads like `"N item(s) selected"`.
///
/// Details:
/// - Used to avoid re-triggering a search when the input shows the computed summary.
/// - Leading/trailing whitespace is ignored; the count must be a plain non-negative integer.
#[must_use]
pub fn is_summary_label(text: &str) -> bool {
    let Some((count, rest)) = text.trim().split_once(' ') else {
        return false;
    };
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(rest.trim(), "item selected" | "items selected")
}

/// What: Parse a boolean-like configuration value.
///
/// Inputs:
/// - `val`: Raw value text
///
/// Output:
/// - `Some(true)` for `true/1/yes/on`, `Some(false)` for `false/0/no/off`, `None` otherwise.
#[must_use]
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
