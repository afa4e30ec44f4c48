//! Tabular view of a list of submissions.
//!
//! Metadata columns come first, then the union of all flattened answer keys in
//! first-seen order. A submission without a given key gets an empty cell.

use chrono::SecondsFormat;
use formanswers_protocol::{Answers, Submission};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const SUBMIT_UID_COLUMN: &str = "submit_uid";
pub const FORM_COLUMN: &str = "form";
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Joins array elements into one cell.
pub const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    columns: Vec<String>,
    metadata_columns: usize,
    rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn build(submissions: &[Submission], use_submit_uid: bool) -> Self {
        let mut columns: Vec<String> = Vec::new();
        if use_submit_uid {
            columns.push(SUBMIT_UID_COLUMN.to_string());
        }
        columns.push(FORM_COLUMN.to_string());
        columns.push(CREATED_AT_COLUMN.to_string());
        let metadata_columns = columns.len();

        let flattened: Vec<Vec<(String, String)>> = submissions
            .iter()
            .map(|submission| flatten(submission.answers()))
            .collect();

        let mut answer_index: HashMap<&str, usize> = HashMap::new();
        for fields in &flattened {
            for (key, _) in fields {
                if !answer_index.contains_key(key.as_str()) {
                    answer_index.insert(key.as_str(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = submissions
            .iter()
            .zip(&flattened)
            .map(|(submission, fields)| {
                let mut row = vec![String::new(); columns.len()];
                let mut slot = 0;
                if use_submit_uid {
                    row[slot] = submission.submit_uid.to_string();
                    slot += 1;
                }
                row[slot] = submission.form_name.clone();
                row[slot + 1] = submission
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true);
                for (key, value) in fields {
                    if let Some(&index) = answer_index.get(key.as_str()) {
                        row[index] = value.clone();
                    }
                }
                row
            })
            .collect();

        Self {
            columns,
            metadata_columns,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Answer columns only, in output order.
    pub fn answer_columns(&self) -> &[String] {
        &self.columns[self.metadata_columns..]
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flatten answers into `(column, cell)` pairs, preserving key order.
///
/// A literal `a.b` key and a nested `{"a": {"b": ..}}` produce the same path;
/// later occurrences get a `#2`, `#3`, ... suffix so no value is lost.
pub fn flatten(answers: &Answers) -> Vec<(String, String)> {
    let mut raw = Vec::with_capacity(answers.len());
    for (key, value) in answers.iter() {
        flatten_value(key.to_string(), value, &mut raw);
    }

    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for (key, cell) in raw {
        let mut column = key.clone();
        let mut n = 2;
        while seen.contains(&column) {
            column = format!("{}#{}", key, n);
            n += 1;
        }
        seen.insert(column.clone());
        out.push((column, cell));
    }
    out
}

fn flatten_value(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (child, nested) in map {
                flatten_value(format!("{}.{}", key, child), nested, out);
            }
        }
        other => out.push((key, cell_text(other))),
    }
}

/// Text of a single cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => item.to_string(),
                scalar => cell_text(scalar),
            })
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Value::Object(map) if map.is_empty() => String::new(),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use formanswers_protocol::{PageScope, SubmissionId};

    fn submission(id: i64, raw: &str) -> Submission {
        let answers = Answers::from_json(raw).unwrap();
        Submission::new(
            SubmissionId::new(id),
            id,
            PageScope::new(5),
            "contact",
            answers,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_flatten_nested_and_lists() {
        let answers = Answers::from_json(
            r#"{
                "name": "A",
                "address": {"city": "Bern", "zip": 3000},
                "topics": ["news", "events"],
                "agree": true,
                "note": null
            }"#,
        )
        .unwrap();

        let flat = flatten(&answers);
        let pairs: Vec<(&str, &str)> = flat.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("name", "A"),
                ("address.city", "Bern"),
                ("address.zip", "3000"),
                ("topics", "news, events"),
                ("agree", "true"),
                ("note", ""),
            ]
        );
    }

    #[test]
    fn test_dotted_key_and_nested_path_keep_both_values() {
        let rows = vec![submission(1, r#"{"a.b": "literal", "a": {"b": "nested"}}"#)];
        let table = ExportTable::build(&rows, false);

        assert_eq!(table.answer_columns(), &["a.b", "a.b#2"]);
        assert_eq!(table.rows()[0][2..], ["literal", "nested"]);
    }

    #[test]
    fn test_column_union_first_seen_order() {
        let rows = vec![
            submission(1, r#"{"name": "A"}"#),
            submission(2, r#"{"name": "B", "email": "x"}"#),
        ];
        let table = ExportTable::build(&rows, false);

        assert_eq!(table.columns(), &["form", "created_at", "name", "email"]);
        assert_eq!(table.answer_columns(), &["name", "email"]);
        assert_eq!(table.rows()[0], vec!["contact", "2024-05-01T08:30:00Z", "A", ""]);
        assert_eq!(table.rows()[1][3], "x");
    }

    #[test]
    fn test_submit_uid_column_is_optional() {
        let rows = vec![submission(7, r#"{"name": "A"}"#)];

        let with_uid = ExportTable::build(&rows, true);
        assert_eq!(with_uid.columns()[0], SUBMIT_UID_COLUMN);
        assert_eq!(with_uid.rows()[0][0], "7");

        let without = ExportTable::build(&rows, false);
        assert!(!without.columns().iter().any(|c| c == SUBMIT_UID_COLUMN));
    }

    #[test]
    fn test_empty_input_keeps_metadata_header() {
        let table = ExportTable::build(&[], false);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["form", "created_at"]);
    }
}
