//! In-memory filtering over configured rows.

use crate::config::Settings;
use crate::state::Row;

/// Matching rules applied to row fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchPolicy<'a> {
    /// Field keys consulted, in column order.
    pub keys: Vec<&'a str>,
    /// Compare without case folding.
    pub case_sensitive: bool,
    /// Require the whole field text to equal the query.
    pub exact_match: bool,
}

impl<'a> MatchPolicy<'a> {
    /// What: Build the policy from the active settings.
    ///
    /// Inputs:
    /// - `settings`: Active settings
    ///
    /// Output:
    /// - Policy over `searchable_columns` (or all columns) with the configured flags.
    #[must_use]
    pub fn from_settings(settings: &'a Settings) -> Self {
        Self {
            keys: settings.searchable_keys(),
            case_sensitive: settings.case_sensitive,
            exact_match: settings.exact_match,
        }
    }

    /// What: Decide whether a row matches the query.
    ///
    /// Inputs:
    /// - `row`: Candidate row
    /// - `query`: Query text
    ///
    /// Output:
    /// - `true` when any searchable field matches.
    ///
    /// Details:
    /// - Default: case-insensitive substring containment, so an empty query matches every row.
    /// - `case_sensitive` disables case folding.
    /// - `exact_match` switches containment to equality after the configured folding.
    /// - Missing fields read as empty text.
    #[must_use]
    pub fn matches(&self, row: &Row, query: &str) -> bool {
        let needle = self.fold(query);
        self.keys.iter().any(|key| {
            let hay = self.fold(&row.text(key));
            if self.exact_match {
                hay == needle
            } else {
                hay.contains(needle.as_str())
            }
        })
    }

    /// What: Filter rows in source order, keeping at most `limit`.
    ///
    /// Inputs:
    /// - `rows`: Candidate rows
    /// - `query`: Query text
    /// - `limit`: Maximum number of rows to keep
    ///
    /// Output:
    /// - Cloned matching rows, source order preserved.
    #[must_use]
    pub fn filter(&self, rows: &[Row], query: &str, limit: usize) -> Vec<Row> {
        rows.iter()
            .filter(|row| self.matches(row, query))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Apply the configured case folding.
    fn fold(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }
}

/// Synchronous data source over an in-memory row collection.
#[derive(Clone, Debug)]
pub struct LocalSource<'a> {
    /// Rows in source order.
    rows: &'a [Row],
    /// Matching rules.
    policy: MatchPolicy<'a>,
}

impl<'a> LocalSource<'a> {
    /// Create a local source over the configured rows.
    #[must_use]
    pub fn from_settings(settings: &'a Settings) -> Self {
        Self {
            rows: &settings.data,
            policy: MatchPolicy::from_settings(settings),
        }
    }

    /// What: Compute the result set for a query.
    ///
    /// Inputs:
    /// - `query`: Query text
    /// - `limit`: Maximum number of rows
    ///
    /// Output:
    /// - Matching rows truncated to `limit`, in source order.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<Row> {
        let rows = self.policy.filter(self.rows, query, limit);
        tracing::debug!(query, matched = rows.len(), total = self.rows.len(), "local search");
        rows
    }
}
