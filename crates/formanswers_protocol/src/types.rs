//! Submission model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::answers::Answers;
use crate::fingerprint::{fingerprint, rehash, FieldFingerprint};

/// Error returned when parsing a numeric identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

macro_rules! define_row_id {
    ($name:ident, $label:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|e| IdParseError::new(format!("Invalid {} '{}': {}", $label, s, e)))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_row_id!(SubmissionId, "submission ID");
define_row_id!(PageScope, "page scope");

impl PageScope {
    /// Scopes are page ids; zero and negatives never hold submissions.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

/// Payload for creating a submission. The store assigns everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub page_scope: PageScope,
    pub form_name: String,
    pub answers: Answers,
    /// Original submission time for imported entries; `None` means now.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewSubmission {
    pub fn new(page_scope: PageScope, form_name: impl Into<String>, answers: Answers) -> Self {
        Self {
            page_scope,
            form_name: form_name.into(),
            answers,
            created_at: None,
        }
    }

    pub fn submitted_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// A stored form submission.
///
/// `answers` and `field_fingerprint` are private so the fingerprint can only
/// change together with the answers (or through the explicit rehash path).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    /// Running number per (page scope, form name), starting at 1.
    pub submit_uid: i64,
    pub page_scope: PageScope,
    pub form_name: String,
    answers: Answers,
    field_fingerprint: FieldFingerprint,
    pub exported: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        id: SubmissionId,
        submit_uid: i64,
        page_scope: PageScope,
        form_name: impl Into<String>,
        answers: Answers,
        created_at: DateTime<Utc>,
    ) -> Self {
        let field_fingerprint = fingerprint(&answers);
        Self {
            id,
            submit_uid,
            page_scope,
            form_name: form_name.into(),
            answers,
            field_fingerprint,
            exported: false,
            deleted: false,
            created_at,
        }
    }

    /// Replace the stored fingerprint with a value loaded from storage.
    ///
    /// Rows written through [`Submission::set_field_fingerprint`] carry a
    /// fingerprint that cannot be derived from their answers.
    pub fn with_stored_fingerprint(mut self, stored: FieldFingerprint) -> Self {
        self.field_fingerprint = stored;
        self
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn field_fingerprint(&self) -> &FieldFingerprint {
        &self.field_fingerprint
    }

    /// Replace the answers and recompute the fingerprint.
    pub fn set_answers(&mut self, answers: Answers) {
        self.field_fingerprint = fingerprint(&answers);
        self.answers = answers;
    }

    /// Set the fingerprint from a caller-supplied source string.
    ///
    /// The source is hashed again, so passing an existing fingerprint yields a
    /// different value than [`fingerprint`] over the same answers. Prefer
    /// [`Submission::set_answers`]; this path only exists for imports that carry
    /// their own fingerprint source.
    pub fn set_field_fingerprint(&mut self, source: &str) {
        self.field_fingerprint = rehash(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(answers: Answers) -> Submission {
        Submission::new(
            SubmissionId::new(1),
            1,
            PageScope::new(5),
            "contact",
            answers,
            Utc::now(),
        )
    }

    #[test]
    fn test_new_computes_fingerprint() {
        let answers: Answers = [("name", "A")].into_iter().collect();
        let entry = submission(answers.clone());
        assert_eq!(entry.field_fingerprint(), &fingerprint(&answers));
        assert!(!entry.exported);
        assert!(!entry.deleted);
    }

    #[test]
    fn test_set_answers_recomputes_fingerprint() {
        let mut entry = submission([("name", "A")].into_iter().collect());
        let before = entry.field_fingerprint().clone();

        let updated: Answers = [("name", "A"), ("email", "x")].into_iter().collect();
        entry.set_answers(updated.clone());

        assert_ne!(entry.field_fingerprint(), &before);
        assert_eq!(entry.field_fingerprint(), &fingerprint(&updated));
    }

    #[test]
    fn test_set_field_fingerprint_rehashes_source() {
        let mut entry = submission([("name", "A")].into_iter().collect());
        let derived = entry.field_fingerprint().clone();

        entry.set_field_fingerprint(derived.as_str());

        assert_eq!(entry.field_fingerprint(), &rehash(derived.as_str()));
        assert_ne!(entry.field_fingerprint(), &derived);
    }

    #[test]
    fn test_ids_parse_and_display() {
        let id: SubmissionId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<PageScope>().is_err());
        assert!(PageScope::new(5).is_valid());
        assert!(!PageScope::new(0).is_valid());
    }
}
