//! Loading settings from a `key = value` configuration file.
//!
//! Example:
//!
//! ```text
//! # invoices.conf
//! column = invoiceNo | Invoice No
//! column = amount | Amount | sortable | 12
//! hidden_fields = id
//! ajax_url = https://example.test/invoice.php
//! min_length = 2
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::{Map, Value};

use super::{HttpMethod, RequestParams, Settings};
use crate::error::ConfigError;
use crate::state::{Column, ColumnWidth, IdentityStrategy, Row};
use crate::util::config::{parse_key_value, skip_comment_or_empty, split_list};
use crate::util::parse_bool;

/// What: Read and parse a settings file.
///
/// Inputs:
/// - `path`: Location of the `.conf` file
///
/// Output:
/// - Parsed `Settings` (not yet validated).
///
/// # Errors
/// - `ConfigError::Io` when the file (or a referenced `data_file`) cannot be read or decoded.
/// - `ConfigError::InvalidValue` for malformed values.
///
/// Details:
/// - A relative `data_file` is resolved against the directory containing `path`.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let settings = parse_settings(&content, base_dir)?;
    tracing::info!(
        path = %path.display(),
        columns = settings.columns.len(),
        remote = settings.use_ajax,
        "loaded settings"
    );
    Ok(settings)
}

/// What: Parse settings from configuration text.
///
/// Inputs:
/// - `content`: File contents
/// - `base_dir`: Directory used to resolve relative `data_file` paths
///
/// Output:
/// - Parsed `Settings` (not yet validated).
///
/// # Errors
/// - `ConfigError::InvalidValue` for malformed values; `ConfigError::Io` for unreadable data files.
///
/// Details:
/// - Unknown keys are logged and ignored.
/// - Setting `ajax_url` also enables remote lookups unless `use_ajax = false` follows.
pub fn parse_settings(content: &str, base_dir: &Path) -> Result<Settings, ConfigError> {
    let mut out = Settings::default();
    let mut params = Map::new();
    for line in content.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((key, val)) = parse_key_value(line) else {
            tracing::debug!(line = line.trim(), "ignoring line without '='");
            continue;
        };
        apply_setting(&mut out, &mut params, &key, &val, base_dir)?;
    }
    if !params.is_empty() {
        out.ajax_params = RequestParams::Static(params);
    }
    Ok(out)
}

/// Apply one `key = value` pair onto `out`.
fn apply_setting(
    out: &mut Settings,
    params: &mut Map<String, Value>,
    key: &str,
    val: &str,
    base_dir: &Path,
) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: val.to_string(),
    };
    match key {
        "column" => out.columns.push(parse_column(val).ok_or_else(invalid)?),
        "data_file" | "data" => out.data = load_rows(&base_dir.join(val))?,
        "use_ajax" => out.use_ajax = parse_bool(val).ok_or_else(invalid)?,
        "ajax_url" | "ajax" => {
            out.ajax_url = Some(val.to_string());
            out.use_ajax = true;
        }
        "ajax_method" => out.ajax_method = HttpMethod::parse(val).ok_or_else(invalid)?,
        "ajax_header" => {
            let (name, value) = val.split_once(':').ok_or_else(invalid)?;
            out.ajax_headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
        "ajax_param" => {
            let (name, value) = val.split_once('=').ok_or_else(invalid)?;
            params.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
        }
        "request_timeout_secs" => {
            out.request_timeout = Duration::from_secs(val.parse().map_err(|_| invalid())?);
        }
        "min_length" => out.min_length = val.parse().map_err(|_| invalid())?,
        "debounce_ms" | "debounce_time" => {
            out.debounce = Duration::from_millis(val.parse().map_err(|_| invalid())?);
        }
        "limit" => out.limit = val.parse().map_err(|_| invalid())?,
        "multiselect" => out.multiselect = parse_bool(val).ok_or_else(invalid)?,
        "hidden_fields" | "hidden_field" => out.hidden_fields = split_list(val),
        "identity" => {
            out.identity = Some(match val {
                "structural" => IdentityStrategy::Structural,
                field if !field.is_empty() => IdentityStrategy::Field(field.to_string()),
                _ => return Err(invalid()),
            });
        }
        "default_column" => out.default_column = Some(val.to_string()),
        "searchable_columns" => out.searchable_columns = split_list(val),
        "case_sensitive" => out.case_sensitive = parse_bool(val).ok_or_else(invalid)?,
        "exact_match" => out.exact_match = parse_bool(val).ok_or_else(invalid)?,
        "close_on_select" => out.close_on_select = parse_bool(val).ok_or_else(invalid)?,
        "keep_open_while_typing" => {
            out.keep_open_while_typing = parse_bool(val).ok_or_else(invalid)?;
        }
        "hide_preselected" => out.hide_preselected = parse_bool(val).ok_or_else(invalid)?,
        other => tracing::warn!(key = other, "ignoring unknown setting"),
    }
    Ok(())
}

/// What: Parse a `key | Title [| sortable|unsortable] [| width]` column description.
///
/// Inputs:
/// - `val`: Column description text
///
/// Output:
/// - `Some(Column)` when the key is present and every option is recognized.
fn parse_column(val: &str) -> Option<Column> {
    let mut parts = val.split('|').map(str::trim);
    let key = parts.next().filter(|k| !k.is_empty())?;
    let title = parts.next().filter(|t| !t.is_empty()).unwrap_or(key);
    let mut column = Column::new(key, title);
    for opt in parts {
        match opt.to_ascii_lowercase().as_str() {
            "sortable" => column.sortable = true,
            "unsortable" | "nosort" => column.sortable = false,
            other => column.width = ColumnWidth::parse(other)?,
        }
    }
    Some(column)
}

/// What: Load local rows from a JSON file holding an array of objects.
///
/// Inputs:
/// - `path`: JSON file path
///
/// Output:
/// - Rows in file order; non-object entries are skipped with a warning.
///
/// # Errors
/// - `ConfigError::Io` when the file cannot be read, is not JSON, or is not an array.
pub fn load_rows(path: &Path) -> Result<Vec<Row>, ConfigError> {
    let io_err = |message: String| ConfigError::Io {
        path: path.display().to_string(),
        message,
    };
    let body = fs::read_to_string(path).map_err(|e| io_err(e.to_string()))?;
    let value: Value = serde_json::from_str(&body).map_err(|e| io_err(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(io_err("expected a JSON array of objects".to_string()));
    };
    let total = items.len();
    let rows: Vec<Row> = items.into_iter().filter_map(Row::from_value).collect();
    if rows.len() != total {
        tracing::warn!(
            path = %path.display(),
            skipped = total - rows.len(),
            "skipped non-object rows"
        );
    }
    Ok(rows)
}

/// What: Derive one auto-width column per field of the first row.
///
/// Inputs:
/// - `rows`: Rows to inspect
///
/// Output:
/// - Columns titled after their keys, in field order; empty when `rows` is empty.
#[must_use]
pub fn columns_from_rows(rows: &[Row]) -> Vec<Column> {
    rows.first()
        .map(|row| {
            row.fields()
                .keys()
                .map(|key| Column::new(key.clone(), key.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    /// What: Columns are inferred from the first row's fields.
    fn parse_columns_from_rows() {
        let rows: Vec<Row> = [json!({"id": 1, "name": "Alice"}), json!({"other": true})]
            .into_iter()
            .filter_map(Row::from_value)
            .collect();
        let keys: Vec<String> = columns_from_rows(&rows).into_iter().map(|c| c.key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"id".to_string()));
        assert!(keys.contains(&"name".to_string()));
        assert!(columns_from_rows(&[]).is_empty());
    }

    #[test]
    /// What: A full settings file maps onto every option.
    ///
    /// Inputs:
    /// - Columns with options, remote endpoint, header, params, and policy flags.
    ///
    /// Output:
    /// - Matching `Settings` fields.
    fn parse_settings_full_file() {
        let text = "\
# invoices
column = invoiceNo | Invoice No
column = amount | Amount | unsortable | 12
column = customerName | Customer | 40%
ajax_url = https://example.test/invoice.php  # endpoint
ajax_method = post
ajax_header = X-Api-Key: secret
ajax_param = scope=open
min_length = 2
debounce_ms = 100
limit = 5
multiselect = yes
hidden_fields = id, customerId
searchable_columns = invoiceNo, customerName
case_sensitive = on
keep_open_while_typing = true
hide_preselected = 1
close_on_select = false
request_timeout_secs = 7
mystery = 1
";
        let s = parse_settings(text, Path::new(".")).expect("parses");
        assert_eq!(s.columns.len(), 3);
        assert_eq!(s.columns[0].title, "Invoice No");
        assert!(!s.columns[1].sortable);
        assert_eq!(s.columns[1].width, ColumnWidth::Fixed(12));
        assert_eq!(s.columns[2].width, ColumnWidth::Percent(40));
        assert!(s.use_ajax);
        assert_eq!(s.ajax_url.as_deref(), Some("https://example.test/invoice.php"));
        assert_eq!(s.ajax_method, HttpMethod::Post);
        assert_eq!(s.ajax_headers, vec![("X-Api-Key".into(), "secret".into())]);
        assert_eq!(s.ajax_params.resolve("q").get("scope"), Some(&json!("open")));
        assert_eq!(s.min_length, 2);
        assert_eq!(s.debounce, Duration::from_millis(100));
        assert_eq!(s.limit, 5);
        assert!(s.multiselect);
        assert_eq!(s.hidden_fields, vec!["id", "customerId"]);
        assert_eq!(s.searchable_columns, vec!["invoiceNo", "customerName"]);
        assert!(s.case_sensitive);
        assert!(s.keep_open_while_typing);
        assert!(s.hide_preselected);
        assert!(!s.close_on_select);
        assert_eq!(s.request_timeout, Duration::from_secs(7));
        assert!(s.validate().is_ok());
    }

    #[test]
    /// What: Malformed values are reported with their key.
    fn parse_settings_invalid_values() {
        let err = parse_settings("limit = many", Path::new(".")).expect_err("fails");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "limit".into(),
                value: "many".into()
            }
        );
        assert!(parse_settings("column = id | Id | huge", Path::new(".")).is_err());
        assert!(parse_settings("ajax_header = no-colon", Path::new(".")).is_err());
        assert!(parse_settings("multiselect = perhaps", Path::new(".")).is_err());
    }

    #[test]
    /// What: Column specs default the title to the key.
    fn parse_column_defaults_title() {
        let c = parse_column("name").expect("column");
        assert_eq!(c.key, "name");
        assert_eq!(c.title, "name");
        assert!(c.sortable);
        assert!(parse_column(" | Title").is_none());
    }

    #[test]
    /// What: Relative data files load next to the config file and skip non-objects.
    ///
    /// Inputs:
    /// - Temp dir with `rows.json` holding two objects and one number, and a config referencing it.
    ///
    /// Output:
    /// - Two rows loaded; a missing data file yields `ConfigError::Io`.
    fn load_settings_with_data_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("rows.json"),
            r#"[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"},3]"#,
        )
        .expect("write rows");
        let conf = dir.path().join("people.conf");
        std::fs::write(&conf, "column = name | Name\ndata_file = rows.json\n").expect("write conf");
        let s = load_settings(&conf).expect("loads");
        assert_eq!(s.data.len(), 2);
        assert_eq!(s.data[1].text("name"), "Bob");
        assert!(!s.use_ajax);

        std::fs::write(&conf, "column = name\ndata_file = missing.json\n").expect("write conf");
        assert!(matches!(load_settings(&conf), Err(ConfigError::Io { .. })));
    }
}
