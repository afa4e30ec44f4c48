//! XML renderer and the escaping helpers shared with the spreadsheet writer.
//!
//! Answers keep their shape here: nested objects become nested elements and
//! arrays become repeated `<item>` children.

use chrono::SecondsFormat;
use formanswers_protocol::Submission;
use serde_json::Value;
use tracing::debug;

use crate::charset::Charset;

const ROOT_TAG: &str = "formEntries";
const ENTRY_TAG: &str = "formEntry";
const ITEM_TAG: &str = "item";
const INDENT: &str = "  ";

pub(crate) fn render(submissions: &[Submission], charset: Charset) -> Vec<u8> {
    let mut doc = String::new();
    doc.push_str(&format!(
        "<?xml version=\"1.0\" encoding=\"{}\"?>\n",
        charset.label()
    ));

    if submissions.is_empty() {
        doc.push_str(&format!("<{}/>\n", ROOT_TAG));
    } else {
        doc.push_str(&format!("<{}>\n", ROOT_TAG));
        for submission in submissions {
            write_entry(&mut doc, submission, charset);
        }
        doc.push_str(&format!("</{}>\n", ROOT_TAG));
    }

    debug!(entries = submissions.len(), %charset, "Rendered XML");
    charset.encode_with_char_refs(&doc)
}

fn write_entry(doc: &mut String, submission: &Submission, charset: Charset) {
    doc.push_str(&format!(
        "{}<{} uid=\"{}\" submitUid=\"{}\" form=\"{}\" createdAt=\"{}\"",
        INDENT,
        ENTRY_TAG,
        submission.id,
        submission.submit_uid,
        escape_attr(&submission.form_name),
        submission
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    ));

    if submission.answers().is_empty() {
        doc.push_str("/>\n");
        return;
    }

    doc.push_str(">\n");
    for (key, value) in submission.answers().iter() {
        write_value(doc, &element_name(key, charset), value, 2, charset);
    }
    doc.push_str(&format!("{}</{}>\n", INDENT, ENTRY_TAG));
}

fn write_value(doc: &mut String, tag: &str, value: &Value, depth: usize, charset: Charset) {
    let indent = INDENT.repeat(depth);
    match value {
        Value::Object(map) if !map.is_empty() => {
            doc.push_str(&format!("{}<{}>\n", indent, tag));
            for (child, nested) in map {
                write_value(doc, &element_name(child, charset), nested, depth + 1, charset);
            }
            doc.push_str(&format!("{}</{}>\n", indent, tag));
        }
        Value::Array(items) if !items.is_empty() => {
            doc.push_str(&format!("{}<{}>\n", indent, tag));
            for item in items {
                write_value(doc, ITEM_TAG, item, depth + 1, charset);
            }
            doc.push_str(&format!("{}</{}>\n", indent, tag));
        }
        Value::Null | Value::Object(_) | Value::Array(_) => {
            doc.push_str(&format!("{}<{}/>\n", indent, tag));
        }
        Value::String(s) => {
            doc.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, escape_text(s), tag));
        }
        scalar => {
            doc.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, scalar, tag));
        }
    }
}

/// Turn an arbitrary field name into a valid XML element name.
///
/// Invalid characters, and characters `charset` cannot encode, become `_`.
/// Character references are not allowed in names. A name that cannot start an
/// element or that starts with `xml` (any case) gets a leading `_`. Empty
/// names become `_`.
pub fn element_name(raw: &str, charset: Charset) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| {
            if is_name_char(c) && charset.can_encode(c) {
                c
            } else {
                '_'
            }
        })
        .collect();

    let needs_prefix = match name.chars().next() {
        None => true,
        Some(first) => !is_name_start_char(first),
    } || name.to_ascii_lowercase().starts_with("xml");

    if needs_prefix {
        name.insert(0, '_');
    }
    name
}

// Namespace colons are excluded so field names never introduce prefixes
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Characters allowed in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Escape character data. Characters XML cannot carry at all are dropped.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in escape_text(raw).chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}
