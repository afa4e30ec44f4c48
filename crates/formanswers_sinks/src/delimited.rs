//! Delimited text (CSV) renderer.

use tracing::debug;

use crate::charset::Charset;
use crate::table::ExportTable;
use crate::{RenderError, RenderResult};

pub(crate) fn render(
    table: &ExportTable,
    delimiter: char,
    charset: Charset,
) -> RenderResult<Vec<u8>> {
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(RenderError::InvalidDelimiter(delimiter));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    let text = writer.into_inner().map_err(|err| err.into_error())?;
    // csv only writes back the UTF-8 it was given
    let text = String::from_utf8(text)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

    let bytes = charset
        .encode(&text)
        .map_err(|character| RenderError::Unencodable {
            charset: charset.label().to_string(),
            character,
        })?;

    debug!(rows = table.rows().len(), columns = table.columns().len(), %charset, "Rendered CSV");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use formanswers_protocol::{Answers, PageScope, Submission, SubmissionId};

    fn table(raw: &[&str]) -> ExportTable {
        let rows: Vec<Submission> = raw
            .iter()
            .enumerate()
            .map(|(i, answers)| {
                Submission::new(
                    SubmissionId::new(i as i64 + 1),
                    i as i64 + 1,
                    PageScope::new(5),
                    "contact",
                    Answers::from_json(answers).unwrap(),
                    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
                )
            })
            .collect();
        ExportTable::build(&rows, false)
    }

    #[test]
    fn test_header_and_rows() {
        let bytes = render(
            &table(&[r#"{"name":"A"}"#, r#"{"name":"B","email":"x"}"#]),
            ',',
            Charset::Utf8,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "form,created_at,name,email\n\
             contact,2024-01-02T03:04:05Z,A,\n\
             contact,2024-01-02T03:04:05Z,B,x\n"
        );
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let bytes = render(&table(&[r#"{"msg":"a, \"b\""}"#]), ',', Charset::Utf8).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("\"a, \"\"b\"\"\"\n"), "got: {text}");
    }

    #[test]
    fn test_custom_delimiter() {
        let bytes = render(&table(&[r#"{"name":"A"}"#]), ';', Charset::Utf8).unwrap();
        assert!(String::from_utf8(bytes).unwrap().starts_with("form;created_at;name\n"));
    }

    #[test]
    fn test_rejects_bad_delimiter() {
        let err = render(&table(&[]), '€', Charset::Utf8).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDelimiter('€')));
    }

    #[test]
    fn test_latin1_output() {
        let bytes = render(&table(&[r#"{"city":"Zürich"}"#]), ',', Charset::Latin1).unwrap();
        assert!(bytes.ends_with(b"Z\xFCrich\n"));
    }

    #[test]
    fn test_unencodable_character_fails() {
        let err = render(&table(&[r#"{"price":"5 €"}"#]), ',', Charset::Latin1).unwrap_err();
        match err {
            RenderError::Unencodable { charset, character } => {
                assert_eq!(charset, "iso-8859-1");
                assert_eq!(character, '€');
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
