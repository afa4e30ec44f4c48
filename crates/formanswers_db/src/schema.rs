//! Database schema creation.
//!
//! All CREATE TABLE statements live here.

use crate::error::Result;
use crate::FormAnswersDb;
use tracing::debug;

impl FormAnswersDb {
    /// Ensure all tables exist.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        // WAL lets readers keep browsing while an export marks rows
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await?;

        self.create_form_entry_tables().await?;

        debug!("Database schema verified");
        Ok(())
    }

    async fn create_form_entry_tables(&self) -> Result<()> {
        // One row per form submission. `deleted` is a soft delete flag; rows
        // only disappear through an explicit purge.
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS fa_form_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                page_scope INTEGER NOT NULL,
                form_name TEXT NOT NULL,
                submit_uid INTEGER NOT NULL,
                answers TEXT NOT NULL DEFAULT '{}',
                field_fingerprint TEXT NOT NULL,
                exported INTEGER NOT NULL DEFAULT 0,
                deleted INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(page_scope, form_name, submit_uid)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_form_entries_scope ON fa_form_entries(page_scope, deleted)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_form_entries_form ON fa_form_entries(form_name, field_fingerprint)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_form_entries_created ON fa_form_entries(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
