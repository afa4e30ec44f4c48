//! Error taxonomy for application-level operations.

use formanswers_db::DbError;
use formanswers_sinks::RenderError;
use thiserror::Error;

use crate::demand::InvalidDemand;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller input rejected before anything was stored.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid export demand: {0}")]
    InvalidDemand(#[from] InvalidDemand),

    #[error("Storage error: {0}")]
    Storage(#[source] DbError),

    /// The demand matched nothing. Not a failure of the system.
    #[error("No entries found with your criteria")]
    NoEntries,

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    pub fn is_no_entries(&self) -> bool {
        matches!(self, Error::NoEntries)
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(message) => Error::Validation(message),
            other => Error::Storage(other),
        }
    }
}
