//! Form Answers: store, export and clean up web form submissions.
//!
//! The crate ties the workspace together:
//! - [`demand::resolve`] turns an export [`Demand`] into a store query
//! - [`LifecycleManager`] runs export-and-mark, soft delete and purge against
//!   any [`SubmissionStore`]
//! - [`FormAnswersConfig`] holds the installation settings
//!
//! The `formanswers` binary is a thin CLI over these.

pub mod config;
pub mod demand;
pub mod error;
pub mod lifecycle;

pub use config::{ConfigError, ExportConfig, FormAnswersConfig};
pub use demand::{resolve, InvalidDemand};
pub use error::{Error, Result};
pub use lifecycle::{ExportOutcome, LifecycleManager, MarkingStatus, PendingExport};

pub use formanswers_db::{FormAnswersDb, ScopeSummary, SubmissionQuery, SubmissionStore};
pub use formanswers_protocol::{
    Answers, Demand, FieldFingerprint, NewSubmission, OutputFormat, PageScope, Submission,
    SubmissionId,
};
pub use formanswers_sinks::{ExportSettings, RenderedExport};
