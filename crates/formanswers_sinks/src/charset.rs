//! Output charsets.
//!
//! Exports are built as UTF-8 text and transcoded at the end. Only single-byte
//! Western charsets and UTF-8 are supported.

use std::fmt;

/// Supported export charsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Latin1,
    Windows1252,
    UsAscii,
}

impl Charset {
    /// Resolve a charset label, case-insensitively, including common aliases.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
                Some(Charset::Latin1)
            }
            "windows-1252" | "cp1252" | "win1252" => Some(Charset::Windows1252),
            "us-ascii" | "ascii" => Some(Charset::UsAscii),
            _ => None,
        }
    }

    /// Canonical label, as written into XML declarations.
    pub fn label(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "iso-8859-1",
            Charset::Windows1252 => "windows-1252",
            Charset::UsAscii => "us-ascii",
        }
    }

    /// Byte for `ch` in a single-byte charset. `None` if not representable.
    fn single_byte(&self, ch: char) -> Option<u8> {
        let code = ch as u32;
        match self {
            Charset::Utf8 => None,
            Charset::UsAscii => (code < 0x80).then_some(code as u8),
            Charset::Latin1 => (code < 0x100).then_some(code as u8),
            Charset::Windows1252 => {
                if code < 0x80 || (0xA0..0x100).contains(&code) {
                    Some(code as u8)
                } else {
                    windows_1252_high(ch)
                }
            }
        }
    }

    pub fn can_encode(&self, ch: char) -> bool {
        matches!(self, Charset::Utf8) || self.single_byte(ch).is_some()
    }

    /// Encode text, failing on the first character the charset cannot hold.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, char> {
        if let Charset::Utf8 = self {
            return Ok(text.as_bytes().to_vec());
        }
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            out.push(self.single_byte(ch).ok_or(ch)?);
        }
        Ok(out)
    }

    /// Encode text, writing unrepresentable characters as `&#N;` references.
    ///
    /// Only valid for markup where character references are meaningful.
    pub fn encode_with_char_refs(&self, text: &str) -> Vec<u8> {
        if let Charset::Utf8 = self {
            return text.as_bytes().to_vec();
        }
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            match self.single_byte(ch) {
                Some(byte) => out.push(byte),
                None => out.extend_from_slice(format!("&#{};", ch as u32).as_bytes()),
            }
        }
        out
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The 0x80..0x9F block of windows-1252 (five slots are unassigned).
fn windows_1252_high(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
