//! SQLite implementation of [`SubmissionStore`].

use async_trait::async_trait;
use formanswers_protocol::{
    fingerprint, Answers, FieldFingerprint, NewSubmission, PageScope, Submission, SubmissionId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::error::{DbError, Result};
use crate::query::{ScopeSummary, SubmissionQuery};
use crate::store::SubmissionStore;
use crate::FormAnswersDb;

/// Stay well below SQLite's bound-parameter limit when expanding `IN (...)`.
const MARK_CHUNK_SIZE: usize = 500;

#[async_trait]
impl SubmissionStore for FormAnswersDb {
    async fn create(&self, submission: NewSubmission) -> Result<SubmissionId> {
        let form_name = submission.form_name.trim();
        if form_name.is_empty() {
            return Err(DbError::validation("form name must not be empty"));
        }
        if !submission.page_scope.is_valid() {
            return Err(DbError::validation(format!(
                "page scope must be positive, got {}",
                submission.page_scope
            )));
        }

        let answers_json = submission.answers.to_json()?;
        let field_fingerprint = fingerprint(&submission.answers);
        let now = Self::now_millis();
        let created_at = submission
            .created_at
            .map(|ts| ts.timestamp_millis())
            .unwrap_or(now);

        // Single statement so the submit_uid sequence cannot race
        let result = sqlx::query(
            r#"
            INSERT INTO fa_form_entries
                (page_scope, form_name, submit_uid, answers, field_fingerprint, created_at, updated_at)
            SELECT ?, ?, COALESCE(MAX(submit_uid), 0) + 1, ?, ?, ?, ?
            FROM fa_form_entries
            WHERE page_scope = ? AND form_name = ?
            "#,
        )
        .bind(submission.page_scope.get())
        .bind(form_name)
        .bind(&answers_json)
        .bind(field_fingerprint.as_str())
        .bind(created_at)
        .bind(now)
        .bind(submission.page_scope.get())
        .bind(form_name)
        .execute(&self.pool)
        .await?;

        let id = SubmissionId::new(result.last_insert_rowid());
        debug!(
            id = %id,
            scope = %submission.page_scope,
            form = form_name,
            fingerprint = %field_fingerprint,
            "Submission stored"
        );
        Ok(id)
    }

    async fn get(&self, id: SubmissionId) -> Result<Option<Submission>> {
        let row = sqlx::query("SELECT * FROM fa_form_entries WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_submission).transpose()
    }

    async fn update_answers(&self, id: SubmissionId, answers: Answers) -> Result<()> {
        let answers_json = answers.to_json()?;
        let field_fingerprint = fingerprint(&answers);

        let result = sqlx::query(
            r#"
            UPDATE fa_form_entries SET
                answers = ?,
                field_fingerprint = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&answers_json)
        .bind(field_fingerprint.as_str())
        .bind(Self::now_millis())
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("Submission {}", id)));
        }
        Ok(())
    }

    async fn find(&self, query: &SubmissionQuery) -> Result<Vec<Submission>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM fa_form_entries WHERE page_scope = ");
        builder.push_bind(query.page_scope.get());

        if !query.include_deleted {
            builder.push(" AND deleted = 0");
        }
        if query.exported_only {
            builder.push(" AND exported = 1");
        }
        if !query.form_names.is_empty() {
            builder.push(" AND form_name IN (");
            let mut names = builder.separated(", ");
            for name in &query.form_names {
                names.push_bind(name.clone());
            }
            names.push_unseparated(")");
        }
        if !query.field_fingerprints.is_empty() {
            builder.push(" AND field_fingerprint IN (");
            let mut prints = builder.separated(", ");
            for print in &query.field_fingerprints {
                prints.push_bind(print.as_str().to_string());
            }
            prints.push_unseparated(")");
        }
        if let Some(from) = query.created_from {
            builder.push(" AND created_at >= ");
            builder.push_bind(from.timestamp_millis());
        }
        if let Some(before) = query.created_before {
            builder.push(" AND created_at < ");
            builder.push_bind(before.timestamp_millis());
        }
        builder.push(" ORDER BY id ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_submission).collect()
    }

    async fn count_soft_deleted(&self, page_scope: PageScope) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM fa_form_entries WHERE page_scope = ? AND deleted = 1",
        )
        .bind(page_scope.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn soft_delete(&self, form_name: &str, page_scope: PageScope) -> Result<u64> {
        let form_name = form_name.trim();
        if form_name.is_empty() {
            return Err(DbError::validation("form name must not be empty"));
        }

        let result = sqlx::query(
            r#"
            UPDATE fa_form_entries SET
                deleted = 1,
                updated_at = ?
            WHERE form_name = ? AND page_scope = ? AND deleted = 0
            "#,
        )
        .bind(Self::now_millis())
        .bind(form_name)
        .bind(page_scope.get())
        .execute(&self.pool)
        .await?;

        let marked = result.rows_affected();
        info!(form = form_name, scope = %page_scope, marked, "Soft-deleted form entries");
        Ok(marked)
    }

    async fn purge_soft_deleted(&self, page_scope: PageScope) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM fa_form_entries WHERE page_scope = ? AND deleted = 1")
                .bind(page_scope.get())
                .execute(&self.pool)
                .await?;

        let removed = result.rows_affected();
        info!(scope = %page_scope, removed, "Purged soft-deleted form entries");
        Ok(removed)
    }

    async fn mark_exported(&self, ids: &[SubmissionId]) -> Result<u64> {
        let unique: BTreeSet<i64> = ids.iter().map(|id| id.get()).collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let expected = unique.len() as u64;
        let now = Self::now_millis();
        let ordered: Vec<i64> = unique.into_iter().collect();

        let mut tx = self.pool.begin().await?;
        let mut matched = 0u64;

        for chunk in ordered.chunks(MARK_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("UPDATE fa_form_entries SET exported = 1, updated_at = ");
            builder.push_bind(now);
            builder.push(" WHERE id IN (");
            let mut bound = builder.separated(", ");
            for id in chunk {
                bound.push_bind(*id);
            }
            bound.push_unseparated(")");

            let result = builder.build().execute(&mut *tx).await?;
            matched += result.rows_affected();
        }

        if matched != expected {
            tx.rollback().await?;
            warn!(expected, matched, "Mark exported rolled back, submissions vanished");
            return Err(DbError::PartialUpdate { expected, matched });
        }

        tx.commit().await?;
        debug!(marked = matched, "Marked submissions as exported");
        Ok(matched)
    }

    async fn list_distinct_form_names(&self, page_scope: PageScope) -> Result<BTreeSet<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT form_name FROM fa_form_entries
            WHERE page_scope = ? AND deleted = 0
            "#,
        )
        .bind(page_scope.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    async fn list_distinct_field_fingerprints(
        &self,
        form_name: &str,
    ) -> Result<BTreeSet<FieldFingerprint>> {
        let prints: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT field_fingerprint FROM fa_form_entries
            WHERE form_name = ? AND deleted = 0
            "#,
        )
        .bind(form_name)
        .fetch_all(&self.pool)
        .await?;

        prints
            .iter()
            .map(|raw| parse_fingerprint(raw))
            .collect()
    }

    async fn scope_overview(&self) -> Result<Vec<ScopeSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT
                page_scope,
                form_name,
                SUM(CASE WHEN deleted = 0 THEN 1 ELSE 0 END) AS active,
                SUM(CASE WHEN deleted = 0 AND exported = 1 THEN 1 ELSE 0 END) AS exported,
                SUM(CASE WHEN deleted = 1 THEN 1 ELSE 0 END) AS deleted
            FROM fa_form_entries
            GROUP BY page_scope, form_name
            ORDER BY page_scope ASC, form_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ScopeSummary> {
                Ok(ScopeSummary {
                    page_scope: PageScope::new(row.try_get("page_scope")?),
                    form_name: row.try_get("form_name")?,
                    active: row.try_get::<i64, _>("active")? as u64,
                    exported: row.try_get::<i64, _>("exported")? as u64,
                    deleted: row.try_get::<i64, _>("deleted")? as u64,
                })
            })
            .collect()
    }
}

fn parse_fingerprint(raw: &str) -> Result<FieldFingerprint> {
    FieldFingerprint::parse(raw).map_err(|e| DbError::invalid_state(e.to_string()))
}

fn row_to_submission(row: &SqliteRow) -> Result<Submission> {
    let id = SubmissionId::new(row.try_get("id")?);
    let answers_raw: String = row.try_get("answers")?;
    // Rows written by other tools may hold anything; keep them exportable
    let answers = match Answers::from_json(&answers_raw) {
        Ok(answers) => answers,
        Err(err) => {
            warn!(id = %id, error = %err, "Stored answers are not a JSON object");
            Answers::new()
        }
    };
    let stored_print: String = row.try_get("field_fingerprint")?;
    let created_at = FormAnswersDb::millis_to_datetime(row.try_get("created_at")?)?;

    let mut submission = Submission::new(
        id,
        row.try_get("submit_uid")?,
        PageScope::new(row.try_get("page_scope")?),
        row.try_get::<String, _>("form_name")?,
        answers,
        created_at,
    )
    .with_stored_fingerprint(parse_fingerprint(&stored_print)?);
    submission.exported = row.try_get::<i64, _>("exported")? != 0;
    submission.deleted = row.try_get::<i64, _>("deleted")? != 0;

    Ok(submission)
}
