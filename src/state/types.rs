//! Core value types used by the dropdown table state.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::util::value_text;

/// Width hint handed to the renderer for a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Let the renderer distribute remaining space.
    #[default]
    Auto,
    /// Fixed width in renderer units (terminal cells for the bundled UI).
    Fixed(u16),
    /// Percentage of the available width.
    Percent(u16),
}

impl ColumnWidth {
    /// What: Parse a width hint from configuration text.
    ///
    /// Inputs:
    /// - `s`: `"auto"`, a plain integer (`"12"`), or a percentage (`"30%"`)
    ///
    /// Output:
    /// - `Some(ColumnWidth)` when recognized; `None` otherwise.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        if let Some(pct) = t.strip_suffix('%') {
            return pct.trim().parse::<u16>().ok().filter(|p| *p <= 100).map(Self::Percent);
        }
        t.parse::<u16>().ok().map(Self::Fixed)
    }
}

/// Cell formatter invoked with `(value, row, index)`.
pub type CellRenderer = Arc<dyn Fn(&Value, &Row, usize) -> String + Send + Sync>;

/// One configured table column.
///
/// Columns are configured once, in display order, with unique keys.
#[derive(Clone)]
pub struct Column {
    /// Row field shown in this column.
    pub key: String,
    /// Header text.
    pub title: String,
    /// Whether clicking the header sorts by this column.
    pub sortable: bool,
    /// Width hint for the renderer.
    pub width: ColumnWidth,
    /// Optional custom cell formatter.
    pub render: Option<CellRenderer>,
}

impl Column {
    /// What: Create a sortable, auto-width column without a custom formatter.
    ///
    /// Inputs:
    /// - `key`: Row field name
    /// - `title`: Header text
    ///
    /// Output:
    /// - New `Column`.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            sortable: true,
            width: ColumnWidth::Auto,
            render: None,
        }
    }

    /// Set whether the column reacts to header clicks.
    #[must_use]
    pub const fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Set the width hint.
    #[must_use]
    pub const fn width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    /// Install a custom cell formatter.
    #[must_use]
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Row, usize) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(f));
        self
    }

    /// What: Produce the display text of this column for a row.
    ///
    /// Inputs:
    /// - `row`: Row being rendered
    /// - `index`: Position of the row in the presented result set
    ///
    /// Output:
    /// - Formatter output when configured; plain value text otherwise (empty when missing).
    #[must_use]
    pub fn cell_text(&self, row: &Row, index: usize) -> String {
        let value = row.get(&self.key).unwrap_or(&Value::Null);
        self.render
            .as_ref()
            .map_or_else(|| value_text(value), |f| f(value, row, index))
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A candidate record: a mapping from field name to JSON value.
///
/// The control never assumes a shape beyond the configured columns and
/// identity fields; missing fields read as `null`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// What: Convert a JSON value into a row.
    ///
    /// Inputs:
    /// - `value`: Any JSON value
    ///
    /// Output:
    /// - `Some(Row)` for JSON objects; `None` for every other shape.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Field value by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field value rendered as text; `""` when missing.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.0.get(key).map(value_text).unwrap_or_default()
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the row into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Presentation state of the result list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// Nothing presented, no loading indicator, no highlight.
    #[default]
    Closed,
    /// A remote lookup for the current token is in flight.
    Loading,
    /// Results (possibly empty) are presented.
    Open,
}

/// Monotonic identifier of an issued remote request, used only for staleness checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of the active column sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Active sort column and direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortState {
    /// Key of the sorted column.
    pub column: String,
    /// Current direction.
    pub direction: SortDirection,
}

/// How two rows are decided to be the same record for selection purposes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// Rows with equal values in this field are the same record.
    Field(String),
    /// Rows with equal field maps are the same record.
    Structural,
}

impl IdentityStrategy {
    /// What: Decide whether two rows denote the same record.
    ///
    /// Inputs:
    /// - `a`, `b`: Rows to compare
    ///
    /// Output:
    /// - `true` when the rows share the identity key.
    ///
    /// Details:
    /// - For `Field`, rows that both lack the field fall back to structural equality so
    ///   two unrelated keyless rows are never merged.
    #[must_use]
    pub fn same(&self, a: &Row, b: &Row) -> bool {
        match self {
            Self::Field(key) => match (a.get(key), b.get(key)) {
                (Some(x), Some(y)) => x == y,
                (None, None) => a == b,
                _ => false,
            },
            Self::Structural => a == b,
        }
    }
}

/// Read-only snapshot handed to the renderer and host application.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSnapshot {
    /// Rows currently presented, in display order.
    pub result_set: Vec<Row>,
    /// Highlighted row index into `result_set`; `None` means nothing highlighted.
    pub highlight: Option<usize>,
    /// Selected rows in insertion order.
    pub selection: Vec<Row>,
    /// Presentation state.
    pub lifecycle: Lifecycle,
    /// Active sort, if any.
    pub sort: Option<SortState>,
    /// Current input text.
    pub value: String,
    /// Whether the control currently ignores intents.
    pub disabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    /// What: Width hints parse from auto, fixed, and percentage spellings.
    fn types_column_width_parse() {
        assert_eq!(ColumnWidth::parse("auto"), Some(ColumnWidth::Auto));
        assert_eq!(ColumnWidth::parse("12"), Some(ColumnWidth::Fixed(12)));
        assert_eq!(ColumnWidth::parse("30%"), Some(ColumnWidth::Percent(30)));
        assert_eq!(ColumnWidth::parse("130%"), None);
        assert_eq!(ColumnWidth::parse("wide"), None);
    }

    #[test]
    /// What: Cell text uses the formatter when present and empty text for missing fields.
    ///
    /// Inputs:
    /// - Row with `amount` only; plain `name` column and formatted `amount` column.
    ///
    /// Output:
    /// - `""` for the missing name, formatter output for the amount.
    fn types_cell_text_formatter_and_missing() {
        let row = Row::new().with("amount", 10);
        let name = Column::new("name", "Name");
        let amount = Column::new("amount", "Amount").render(|v, _row, i| format!("{i}:{v}"));
        assert_eq!(name.cell_text(&row, 0), "");
        assert_eq!(amount.cell_text(&row, 3), "3:10");
    }

    #[test]
    /// What: Rows only come from JSON objects.
    fn types_row_from_value_requires_object() {
        assert!(Row::from_value(json!({"id": 1})).is_some());
        assert!(Row::from_value(json!([1, 2])).is_none());
        assert!(Row::from_value(json!("x")).is_none());
    }

    #[test]
    /// What: Field identity compares the key; keyless rows fall back to structural equality.
    ///
    /// Inputs:
    /// - Rows sharing `id` with different names, and two keyless rows.
    ///
    /// Output:
    /// - Same id means same record; distinct keyless rows stay distinct.
    fn types_identity_field_and_fallback() {
        let by_id = IdentityStrategy::Field("id".into());
        let a = Row::new().with("id", 1).with("name", "Alice");
        let a2 = Row::new().with("id", 1).with("name", "Alice (renamed)");
        let b = Row::new().with("id", 2).with("name", "Bob");
        assert!(by_id.same(&a, &a2));
        assert!(!by_id.same(&a, &b));

        let x = Row::new().with("name", "x");
        let y = Row::new().with("name", "y");
        assert!(!by_id.same(&x, &y));
        assert!(by_id.same(&x, &x.clone()));
        assert!(!IdentityStrategy::Structural.same(&a, &a2));
    }
}
