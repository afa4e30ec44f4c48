//! Export demand: what to select and how to render it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::defaults::DEFAULT_EXPORT_STEM;
use crate::fingerprint::FieldFingerprint;
use crate::naming::safe_file_stem;
use crate::types::PageScope;

/// Target encoding of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Comma (or otherwise) separated values.
    #[default]
    DelimitedText,
    /// Single-sheet XLSX workbook.
    Spreadsheet,
    /// XML document, one element per submission.
    MarkupXml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::DelimitedText => "csv",
            OutputFormat::Spreadsheet => "xlsx",
            OutputFormat::MarkupXml => "xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::DelimitedText => "text/csv",
            OutputFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::MarkupXml => "application/xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "delimited" | "delimited_text" => Ok(OutputFormat::DelimitedText),
            "xls" | "xlsx" | "spreadsheet" => Ok(OutputFormat::Spreadsheet),
            "xml" | "markup" | "markup_xml" => Ok(OutputFormat::MarkupXml),
            _ => Err(format!(
                "Invalid output format: '{}'. Expected: csv, xlsx, or xml",
                s
            )),
        }
    }
}

/// Filter and output specification for one export request.
///
/// Built per request and discarded afterwards. Empty sets mean "no restriction".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub page_scope: PageScope,
    #[serde(default)]
    pub form_names: BTreeSet<String>,
    /// Restrict to structural variants of the selected forms.
    #[serde(default)]
    pub field_fingerprints: BTreeSet<FieldFingerprint>,
    /// Inclusive lower bound on the submission date.
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the submission date.
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub exported_only: bool,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub file_name_hint: String,
    #[serde(default)]
    pub charset: String,
}

impl Demand {
    pub fn new(page_scope: PageScope, output_format: OutputFormat) -> Self {
        Self {
            page_scope,
            form_names: BTreeSet::new(),
            field_fingerprints: BTreeSet::new(),
            date_from: None,
            date_to: None,
            exported_only: false,
            include_deleted: false,
            output_format,
            file_name_hint: String::new(),
            charset: String::new(),
        }
    }

    pub fn with_form(mut self, form_name: impl Into<String>) -> Self {
        self.form_names.insert(form_name.into());
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: FieldFingerprint) -> Self {
        self.field_fingerprints.insert(fingerprint);
        self
    }

    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn exported_only(mut self, exported_only: bool) -> Self {
        self.exported_only = exported_only;
        self
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    pub fn with_file_name(mut self, hint: impl Into<String>) -> Self {
        self.file_name_hint = hint.into();
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Suggested download name: sanitized hint plus the format extension.
    pub fn file_name(&self) -> String {
        let stem = safe_file_stem(&self.file_name_hint);
        let stem = if stem.is_empty() {
            DEFAULT_EXPORT_STEM.to_string()
        } else {
            stem
        };
        format!("{}.{}", stem, self.output_format.extension())
    }
}
