//! Submission store for Form Answers.
//!
//! This crate is the only place that talks to the database. Everything above it
//! goes through the [`SubmissionStore`] trait, which [`FormAnswersDb`] implements
//! on top of SQLite.
//!
//! # Usage
//!
//! ```rust,ignore
//! use formanswers_db::{FormAnswersDb, SubmissionQuery, SubmissionStore};
//! use formanswers_protocol::PageScope;
//!
//! let db = FormAnswersDb::open("~/.formanswers/formanswers.sqlite3").await?;
//! let entries = db.find(&SubmissionQuery::for_scope(PageScope::new(5))).await?;
//! ```

mod error;
mod query;
mod schema;
mod store;
mod submissions;

pub use error::{DbError, Result};
pub use query::{ScopeSummary, SubmissionQuery};
pub use store::SubmissionStore;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed submission store.
#[derive(Clone)]
pub struct FormAnswersDb {
    pool: SqlitePool,
}

impl FormAnswersDb {
    /// Open or create a database at the given path.
    ///
    /// Creates all tables if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened");

        Ok(db)
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool is
    /// capped at one connection.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Get the underlying connection pool (escape hatch for complex queries).
    ///
    /// Prefer the [`SubmissionStore`] methods.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

// Timestamp utilities
impl FormAnswersDb {
    /// Current time as milliseconds since Unix epoch.
    pub fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Convert stored milliseconds back to a timestamp.
    pub fn millis_to_datetime(millis: i64) -> Result<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| DbError::invalid_state(format!("Timestamp out of range: {}", millis)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_database() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nested").join("test.db");

        let db = FormAnswersDb::open(&db_path).await.unwrap();
        assert!(db_path.exists());

        db.close().await;
    }

    #[tokio::test]
    async fn test_reopen_keeps_schema_and_rows() {
        use formanswers_protocol::{Answers, NewSubmission, PageScope};

        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("test.db");

        let db = FormAnswersDb::open(&db_path).await.unwrap();
        db.create(NewSubmission::new(PageScope::new(1), "contact", Answers::new()))
            .await
            .unwrap();
        db.close().await;

        let db = FormAnswersDb::open(&db_path).await.unwrap();
        assert_eq!(db.list_distinct_form_names(PageScope::new(1)).await.unwrap().len(), 1);
        db.close().await;
    }

    #[test]
    fn test_millis_roundtrip() {
        let now = FormAnswersDb::now_millis();
        let dt = FormAnswersDb::millis_to_datetime(now).unwrap();
        assert_eq!(dt.timestamp_millis(), now);
        assert!(FormAnswersDb::millis_to_datetime(i64::MAX).is_err());
    }
}
