//! Command-line interface for Form Answers.

pub mod context;
pub mod entries;
pub mod error;
pub mod export;
pub mod forms;
pub mod output;
pub mod remove;

use serde_json::Value;

/// One answer value as a single table cell.
pub(crate) fn table_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
