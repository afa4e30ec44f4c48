//! Query parameters and aggregate views over the submission table.

use chrono::{DateTime, Utc};
use formanswers_protocol::{FieldFingerprint, PageScope};
use serde::Serialize;

/// Store-level filter. Every set field narrows the result; empty lists mean
/// "no restriction". Results are always ordered by id ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionQuery {
    pub page_scope: PageScope,
    pub form_names: Vec<String>,
    pub field_fingerprints: Vec<FieldFingerprint>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub created_before: Option<DateTime<Utc>>,
    pub exported_only: bool,
    pub include_deleted: bool,
}

impl SubmissionQuery {
    /// All live submissions of one scope.
    pub fn for_scope(page_scope: PageScope) -> Self {
        Self {
            page_scope,
            form_names: Vec::new(),
            field_fingerprints: Vec::new(),
            created_from: None,
            created_before: None,
            exported_only: false,
            include_deleted: false,
        }
    }

    pub fn with_form(mut self, form_name: impl Into<String>) -> Self {
        self.form_names.push(form_name.into());
        self
    }
}

/// Submission counts for one form in one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub page_scope: PageScope,
    pub form_name: String,
    /// Rows not soft-deleted.
    pub active: u64,
    /// Active rows already exported.
    pub exported: u64,
    /// Soft-deleted rows waiting for a purge.
    pub deleted: u64,
}

impl ScopeSummary {
    /// Active rows never exported.
    pub fn pending(&self) -> u64 {
        self.active.saturating_sub(self.exported)
    }
}
