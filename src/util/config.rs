//! Configuration file parsing utilities.
//!
//! This module provides helpers for parsing `.conf` files with common
//! patterns like comment skipping, inline comments, and key-value parsing.

/// What: Check if a line should be skipped (empty or comment).
///
/// Inputs:
/// - `line`: Line to check
///
/// Output:
/// - `true` if the line should be skipped, `false` otherwise
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
#[must_use]
pub fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Parse a key-value pair from a line.
///
/// Inputs:
/// - `line`: Line containing key=value format
///
/// Output:
/// - `Some((key, value))` if parsing succeeds, `None` otherwise
///
/// Details:
/// - Splits on the first `=` character, so values may contain `=` themselves
/// - Normalizes the key to lowercase snake case (`.`, `-`, and spaces become `_`)
/// - Strips trailing inline comments from the value
#[must_use]
pub fn parse_key_value(line: &str) -> Option<(String, String)> {
    let (raw_key, raw_val) = line.trim().split_once('=')?;
    let key = raw_key
        .trim()
        .to_lowercase()
        .replace(['.', '-', ' '], "_");
    if key.is_empty() {
        return None;
    }
    Some((key, strip_inline_comment(raw_val).to_string()))
}

/// What: Remove a trailing ` #` or ` //` comment from a value.
///
/// Inputs:
/// - `s`: Raw value text
///
/// Output:
/// - Trimmed value without the comment.
///
/// Details:
/// - Only a marker preceded by whitespace starts a comment, so URLs such as
///   `https://host/path#frag` survive intact.
#[must_use]
pub fn strip_inline_comment(s: &str) -> &str {
    let mut end = s.len();
    for marker in [" #", "\t#", " //", "\t//"] {
        if let Some(i) = s.find(marker) {
            end = end.min(i);
        }
    }
    s[..end].trim()
}

/// What: Split a list value on commas, dropping empty entries.
///
/// Inputs:
/// - `val`: Value such as `"id, customerId"`
///
/// Output:
/// - Trimmed, non-empty entries in order.
#[must_use]
pub fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
