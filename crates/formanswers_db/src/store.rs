//! Storage abstraction for submissions.
//!
//! Application code (lifecycle, CLI) is written against this trait so the
//! SQLite backend can be swapped, and so tests can inject failing stores.

use async_trait::async_trait;
use formanswers_protocol::{
    Answers, FieldFingerprint, NewSubmission, PageScope, Submission, SubmissionId,
};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::query::{ScopeSummary, SubmissionQuery};

/// Persistence capability set for form submissions.
///
/// Bulk operations (`soft_delete`, `purge_soft_deleted`, `mark_exported`) are
/// atomic at the store level; callers never read-then-write.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission and return its id.
    ///
    /// Fails with `Validation` when the form name is blank or the page scope
    /// is not positive.
    async fn create(&self, submission: NewSubmission) -> Result<SubmissionId>;

    async fn get(&self, id: SubmissionId) -> Result<Option<Submission>>;

    /// Replace the answers of a submission, recomputing its fingerprint.
    async fn update_answers(&self, id: SubmissionId, answers: Answers) -> Result<()>;

    /// Submissions matching every set predicate, ordered by id.
    async fn find(&self, query: &SubmissionQuery) -> Result<Vec<Submission>>;

    async fn count_soft_deleted(&self, page_scope: PageScope) -> Result<u64>;

    /// Mark every live submission of `form_name` in `page_scope` as deleted.
    /// Returns the number of rows newly marked; repeating the call returns 0.
    async fn soft_delete(&self, form_name: &str, page_scope: PageScope) -> Result<u64>;

    /// Physically remove the soft-deleted rows of a scope. Irreversible.
    async fn purge_soft_deleted(&self, page_scope: PageScope) -> Result<u64>;

    /// Set `exported` on exactly these submissions, all or nothing.
    async fn mark_exported(&self, ids: &[SubmissionId]) -> Result<u64>;

    async fn list_distinct_form_names(&self, page_scope: PageScope) -> Result<BTreeSet<String>>;

    /// Structurally distinct variants of a form, across all scopes.
    async fn list_distinct_field_fingerprints(
        &self,
        form_name: &str,
    ) -> Result<BTreeSet<FieldFingerprint>>;

    /// Per scope and form counts, ordered by scope then form name.
    async fn scope_overview(&self) -> Result<Vec<ScopeSummary>>;
}
