//! Shared data model for Form Answers.
//!
//! Every crate in the workspace speaks in these types:
//!
//! - [`Submission`]: one stored form submission
//! - [`Answers`]: the ordered field → value payload of a submission
//! - [`FieldFingerprint`]: hash identifying *which* fields a submission has
//! - [`Demand`]: a caller's filter + output specification for exports
//!
//! The fingerprint functions live in [`fingerprint`] and are re-exported here.

pub mod answers;
pub mod defaults;
pub mod demand;
pub mod fingerprint;
pub mod naming;
pub mod types;

pub use answers::Answers;
pub use demand::{Demand, OutputFormat};
pub use fingerprint::{fingerprint, fingerprint_json, rehash, FieldFingerprint, FingerprintParseError};
pub use types::{IdParseError, NewSubmission, PageScope, Submission, SubmissionId};
