//! Per-invocation state shared by all commands.

use anyhow::{Context, Result};
use formanswers::{FormAnswersConfig, FormAnswersDb, LifecycleManager};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::HelpfulError;

pub struct CliContext {
    pub config: FormAnswersConfig,
}

impl CliContext {
    /// Resolve configuration; `--db` wins over the configured database path.
    pub fn load(config_path: Option<&Path>, db_override: Option<PathBuf>) -> Result<Self> {
        let mut config =
            FormAnswersConfig::discover(config_path).context("Failed to load configuration")?;
        if let Some(db) = db_override {
            config.database_path = db;
        }
        debug!(db = %config.database_path.display(), "Configuration resolved");
        Ok(Self { config })
    }

    pub fn db_path(&self) -> &Path {
        &self.config.database_path
    }

    pub async fn manager(&self) -> Result<LifecycleManager<FormAnswersDb>> {
        let db = FormAnswersDb::open(self.db_path())
            .await
            .map_err(|e| HelpfulError::database_unavailable(self.db_path(), e))?;
        Ok(LifecycleManager::new(db, self.config.export_settings()))
    }
}

/// Drive one command on a single-threaded runtime.
pub fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    rt.block_on(future)
}
