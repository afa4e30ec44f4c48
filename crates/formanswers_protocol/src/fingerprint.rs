//! Field fingerprints.
//!
//! A fingerprint identifies the *set of field names* in a submission, not its
//! content. Submissions of a form whose layout changed over time end up with
//! different fingerprints, which lets the operator tell the variants apart.
//!
//! Digest: MD5 over the field names concatenated without separator, rendered as
//! 32 lowercase hex characters. Names are concatenated in byte-lexicographic
//! order so the fingerprint depends on the key set alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::answers::Answers;

/// MD5 of the empty string: the fingerprint of an empty or undecodable payload.
pub const EMPTY_FINGERPRINT: &str = "d41d8cd98f00b204e9800998ecf8427e";

/// Error returned when a string is not a 32-character hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid field fingerprint '{value}': expected 32 hex characters")]
pub struct FingerprintParseError {
    value: String,
}

/// Hex MD5 digest identifying which fields a submission contains.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldFingerprint(String);

impl FieldFingerprint {
    pub fn parse(value: &str) -> Result<Self, FingerprintParseError> {
        let value = value.trim();
        if value.len() == 32 && value.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(FingerprintParseError {
                value: value.to_string(),
            })
        }
    }

    pub fn empty() -> Self {
        Self(EMPTY_FINGERPRINT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty_set(&self) -> bool {
        self.0 == EMPTY_FINGERPRINT
    }
}

impl fmt::Display for FieldFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FieldFingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn digest(input: &str) -> FieldFingerprint {
    FieldFingerprint(format!("{:x}", md5::compute(input.as_bytes())))
}

/// Fingerprint the key set of an answer payload.
///
/// Names are concatenated in byte order, so the value depends only on the key
/// set. Hashes taken over keys in submission order (as older data may carry)
/// differ whenever that order was not already sorted.
pub fn fingerprint(answers: &Answers) -> FieldFingerprint {
    let mut names: Vec<&str> = answers.keys().collect();
    names.sort_unstable();
    digest(&names.concat())
}

/// Fingerprint a raw JSON payload.
///
/// A payload that does not decode to a JSON object degrades to the fingerprint
/// of the empty field set instead of failing the caller.
pub fn fingerprint_json(raw: &str) -> FieldFingerprint {
    match Answers::from_json(raw) {
        Ok(answers) => fingerprint(&answers),
        Err(err) => {
            debug!(error = %err, "Answers payload not decodable, using empty fingerprint");
            FieldFingerprint::empty()
        }
    }
}

/// Hash an opaque, already-known string.
///
/// This is NOT the same operation as [`fingerprint`]: passing an existing
/// fingerprint here yields a hash of that hash. It exists for callers that
/// supply the fingerprint source themselves (see
/// [`Submission::set_field_fingerprint`](crate::Submission::set_field_fingerprint)).
pub fn rehash(opaque: &str) -> FieldFingerprint {
    digest(opaque)
}
