//! Export renderers for Form Answers.
//!
//! [`render`] turns a list of submissions into one downloadable document:
//! - CSV through the `csv` crate, transcoded to the requested charset
//! - a single-sheet XLSX workbook (inline strings, deterministic zip)
//! - an XML document that keeps nested answers nested
//!
//! Rendering is pure: it never touches submission state and equal inputs give
//! equal bytes. [`write_export`] stores the result atomically.

pub mod charset;
mod delimited;
pub mod markup;
pub mod output;
pub mod spreadsheet;
pub mod table;

use formanswers_protocol::defaults::{DEFAULT_CHARSET, DEFAULT_CSV_DELIMITER, DEFAULT_SHEET_NAME};
use formanswers_protocol::{Demand, OutputFormat, Submission};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub use charset::Charset;
pub use output::{write_export, ExportFile};
pub use table::ExportTable;

/// Errors returned while rendering or writing an export.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported charset: '{0}'")]
    UnknownCharset(String),

    #[error("Character '{character}' cannot be encoded as {charset}")]
    Unencodable { charset: String, character: char },

    #[error("Invalid CSV delimiter: {0:?}")]
    InvalidDelimiter(char),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet packaging error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write export {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Installation-wide export options.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Add the per-form running number as the first column.
    pub use_submit_uid: bool,
    /// Charset used when the demand does not name one.
    pub default_charset: String,
    pub csv_delimiter: char,
    pub sheet_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            use_submit_uid: false,
            default_charset: DEFAULT_CHARSET.to_string(),
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

/// A rendered document ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedExport {
    pub bytes: Vec<u8>,
    /// Suggested file name, extension included.
    pub file_name: String,
    pub content_type: &'static str,
    /// Charset of `bytes`.
    pub charset: String,
}

/// Render `submissions` in the format and charset named by `demand`.
///
/// An empty list still yields a valid document (header-only CSV or sheet,
/// empty XML root).
pub fn render(
    submissions: &[Submission],
    demand: &Demand,
    settings: &ExportSettings,
) -> RenderResult<RenderedExport> {
    let charset = resolve_charset(demand, settings)?;

    let (bytes, charset) = match demand.output_format {
        OutputFormat::DelimitedText => {
            let table = ExportTable::build(submissions, settings.use_submit_uid);
            (delimited::render(&table, settings.csv_delimiter, charset)?, charset)
        }
        OutputFormat::Spreadsheet => {
            let table = ExportTable::build(submissions, settings.use_submit_uid);
            (spreadsheet::render(&table, &settings.sheet_name)?, Charset::Utf8)
        }
        OutputFormat::MarkupXml => (markup::render(submissions, charset), charset),
    };

    let export = RenderedExport {
        bytes,
        file_name: demand.file_name(),
        content_type: demand.output_format.content_type(),
        charset: charset.label().to_string(),
    };

    info!(
        format = %demand.output_format,
        entries = submissions.len(),
        bytes = export.bytes.len(),
        file = %export.file_name,
        charset = %export.charset,
        "Export rendered"
    );
    Ok(export)
}

/// Demand charset, else the configured default, else iso-8859-1.
fn resolve_charset(demand: &Demand, settings: &ExportSettings) -> RenderResult<Charset> {
    let label = if !demand.charset.trim().is_empty() {
        demand.charset.as_str()
    } else if !settings.default_charset.trim().is_empty() {
        settings.default_charset.as_str()
    } else {
        DEFAULT_CHARSET
    };
    Charset::from_label(label).ok_or_else(|| RenderError::UnknownCharset(label.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use formanswers_protocol::{Answers, PageScope, SubmissionId};
    use std::io::Read;

    fn submissions() -> Vec<Submission> {
        [r#"{"name":"A"}"#, r#"{"name":"B","email":"x"}"#]
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                Submission::new(
                    SubmissionId::new(i as i64 + 1),
                    i as i64 + 1,
                    PageScope::new(5),
                    "contact",
                    Answers::from_json(raw).unwrap(),
                    Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
                )
            })
            .collect()
    }

    fn demand(format: OutputFormat) -> Demand {
        Demand::new(PageScope::new(5), format)
    }

    #[test]
    fn test_csv_defaults_to_latin1() {
        let export = render(&submissions(), &demand(OutputFormat::DelimitedText), &ExportSettings::default())
            .unwrap();
        assert_eq!(export.charset, "iso-8859-1");
        assert_eq!(export.file_name, "export.csv");
        assert_eq!(export.content_type, "text/csv");
    }

    #[test]
    fn test_demand_charset_wins_over_settings() {
        let settings = ExportSettings {
            default_charset: "windows-1252".to_string(),
            ..ExportSettings::default()
        };
        let by_settings = render(&[], &demand(OutputFormat::DelimitedText), &settings).unwrap();
        assert_eq!(by_settings.charset, "windows-1252");

        let by_demand = render(
            &[],
            &demand(OutputFormat::DelimitedText).with_charset("UTF-8"),
            &settings,
        )
        .unwrap();
        assert_eq!(by_demand.charset, "utf-8");
    }

    #[test]
    fn test_unknown_charset_is_an_error() {
        let err = render(
            &submissions(),
            &demand(OutputFormat::MarkupXml).with_charset("ebcdic"),
            &ExportSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnknownCharset(ref c) if c == "ebcdic"));
    }

    #[test]
    fn test_file_name_from_hint() {
        let export = render(
            &submissions(),
            &demand(OutputFormat::MarkupXml).with_file_name("contact answers"),
            &ExportSettings::default(),
        )
        .unwrap();
        assert_eq!(export.file_name, "contact_answers.xml");
        assert_eq!(export.content_type, "application/xml");
    }

    #[test]
    fn test_spreadsheet_is_utf8_zip_with_sheet() {
        let export = render(
            &submissions(),
            &demand(OutputFormat::Spreadsheet),
            &ExportSettings::default(),
        )
        .unwrap();
        assert_eq!(export.charset, "utf-8");
        assert_eq!(export.file_name, "export.xlsx");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(export.bytes)).unwrap();
        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert!(sheet.contains(">email<"));
        assert!(sheet.contains(r#"<c r="D3" t="inlineStr"><is><t xml:space="preserve">x</t>"#));
        assert!(archive.by_name("[Content_Types].xml").is_ok());
    }

    #[test]
    fn test_render_is_deterministic() {
        for format in [
            OutputFormat::DelimitedText,
            OutputFormat::Spreadsheet,
            OutputFormat::MarkupXml,
        ] {
            let first = render(&submissions(), &demand(format), &ExportSettings::default()).unwrap();
            let second = render(&submissions(), &demand(format), &ExportSettings::default()).unwrap();
            assert_eq!(first.bytes, second.bytes, "{format} output differs");
        }
    }

    #[test]
    fn test_empty_input_renders_valid_documents() {
        let csv = render(&[], &demand(OutputFormat::DelimitedText), &ExportSettings::default()).unwrap();
        assert_eq!(csv.bytes, b"form,created_at\n");

        let xml = render(&[], &demand(OutputFormat::MarkupXml), &ExportSettings::default()).unwrap();
        assert!(xml.bytes.ends_with(b"<formEntries/>\n"));

        let xlsx = render(&[], &demand(OutputFormat::Spreadsheet), &ExportSettings::default()).unwrap();
        assert!(zip::ZipArchive::new(std::io::Cursor::new(xlsx.bytes)).is_ok());
    }
}
