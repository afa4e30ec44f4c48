//! Lifecycle operations on submissions: export-and-mark, soft delete, purge.
//!
//! Every bulk change is a single store operation. Nothing here reads rows and
//! writes them back.

use formanswers_db::{ScopeSummary, SubmissionStore};
use formanswers_protocol::{
    Demand, FieldFingerprint, NewSubmission, PageScope, Submission, SubmissionId,
};
use formanswers_sinks::{render, ExportSettings, RenderedExport};
use std::collections::BTreeSet;
use tracing::{error, info};

use crate::demand::resolve;
use crate::error::{Error, Result};

/// Whether the exported rows were flagged after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkingStatus {
    Marked(u64),
    /// Rendering succeeded but flagging did not; the rows stay unexported.
    Failed(String),
}

/// A rendered export whose rows are not flagged yet.
///
/// Hand it to [`LifecycleManager::mark_delivered`] once the document has
/// reached its destination.
#[derive(Debug, Clone)]
pub struct PendingExport {
    pub page_scope: PageScope,
    pub export: RenderedExport,
    /// Rows in the export, in output order.
    pub submission_ids: Vec<SubmissionId>,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub export: RenderedExport,
    /// Rows in the export, in output order.
    pub submission_ids: Vec<SubmissionId>,
    pub marking: MarkingStatus,
}

pub struct LifecycleManager<S: SubmissionStore> {
    store: S,
    settings: ExportSettings,
}

impl<S: SubmissionStore> LifecycleManager<S> {
    pub fn new(store: S, settings: ExportSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submissions a demand selects, without rendering anything.
    pub async fn select(&self, demand: &Demand) -> Result<Vec<Submission>> {
        let query = resolve(demand)?;
        Ok(self.store.find(&query).await?)
    }

    /// Render the selected submissions without flagging them.
    ///
    /// Returns [`Error::NoEntries`] when the demand matches nothing.
    pub async fn prepare_export(&self, demand: &Demand) -> Result<PendingExport> {
        let submissions = self.select(demand).await?;
        if submissions.is_empty() {
            info!(scope = %demand.page_scope, "Export matched no entries");
            return Err(Error::NoEntries);
        }

        let export = render(&submissions, demand, &self.settings)?;
        Ok(PendingExport {
            page_scope: demand.page_scope,
            export,
            submission_ids: submissions.iter().map(|s| s.id).collect(),
        })
    }

    /// Flag the rows of a delivered export as exported.
    ///
    /// A failure here does not discard the document; it is reported in
    /// [`ExportOutcome::marking`] and the rows stay pending.
    pub async fn mark_delivered(&self, pending: PendingExport) -> ExportOutcome {
        let PendingExport {
            page_scope,
            export,
            submission_ids,
        } = pending;

        let marking = match self.store.mark_exported(&submission_ids).await {
            Ok(marked) => MarkingStatus::Marked(marked),
            Err(err) => {
                error!(
                    scope = %page_scope,
                    entries = submission_ids.len(),
                    error = %err,
                    "Export delivered but entries could not be marked as exported"
                );
                MarkingStatus::Failed(err.to_string())
            }
        };

        info!(
            scope = %page_scope,
            file = %export.file_name,
            entries = submission_ids.len(),
            marked = matches!(marking, MarkingStatus::Marked(_)),
            "Export finished"
        );

        ExportOutcome {
            export,
            submission_ids,
            marking,
        }
    }

    /// Render the selected submissions and flag them as exported.
    pub async fn export_and_mark(&self, demand: &Demand) -> Result<ExportOutcome> {
        let pending = self.prepare_export(demand).await?;
        Ok(self.mark_delivered(pending).await)
    }

    /// Soft-delete every entry of one form in one scope. Nothing is purged.
    pub async fn delete_form_variant(&self, form_name: &str, page_scope: PageScope) -> Result<u64> {
        let marked = self.store.soft_delete(form_name, page_scope).await?;
        info!(form = form_name, scope = %page_scope, marked, "Form entries marked deleted");
        Ok(marked)
    }

    /// Physically remove the soft-deleted entries of a scope.
    ///
    /// A scope without soft-deleted entries is left alone and yields 0.
    pub async fn purge_marked_deleted(&self, page_scope: PageScope) -> Result<u64> {
        let pending = self.store.count_soft_deleted(page_scope).await?;
        if pending == 0 {
            info!(scope = %page_scope, "Nothing to purge");
            return Ok(0);
        }
        let removed = self.store.purge_soft_deleted(page_scope).await?;
        info!(scope = %page_scope, removed, "Purged deleted form entries");
        Ok(removed)
    }

    pub async fn overview(&self) -> Result<Vec<ScopeSummary>> {
        Ok(self.store.scope_overview().await?)
    }

    pub async fn show(&self, id: SubmissionId) -> Result<Option<Submission>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn pending_purge_count(&self, page_scope: PageScope) -> Result<u64> {
        Ok(self.store.count_soft_deleted(page_scope).await?)
    }

    pub async fn form_names(&self, page_scope: PageScope) -> Result<BTreeSet<String>> {
        Ok(self.store.list_distinct_form_names(page_scope).await?)
    }

    pub async fn form_variants(&self, form_name: &str) -> Result<BTreeSet<FieldFingerprint>> {
        Ok(self.store.list_distinct_field_fingerprints(form_name).await?)
    }

    pub async fn submit(&self, submission: NewSubmission) -> Result<SubmissionId> {
        Ok(self.store.create(submission).await?)
    }
}
