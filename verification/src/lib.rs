//! Instructor verification workflow.
//!
//! A candidate proves six things independently: email and phone (one-time
//! codes), personal details, an identity document, a selfie, and at least
//! one education certificate. Each step's completion flag is derived from
//! its sub-object; the overall status follows from the flags until an admin
//! decides (approve, reject, suspend).
//!
//! All writes go through [`mutation::apply_mutation`], which recomputes the
//! education aggregate, the completion flags, the progress percentage and
//! the automatic status before a change is kept. A failed operation leaves
//! the record as it was, except that a wrong code still counts as an
//! attempt.
//!
//! [`VerificationService`] composes the core with the storage, delivery and
//! clock boundaries.

pub mod admin;
pub mod candidate;
pub mod certificate;
pub mod error;
pub mod history;
pub mod mutation;
pub mod progress;
pub mod record;
pub mod service;
pub mod status;
pub mod step_verifier;
pub mod summary;

pub use admin::{AdminActionHandler, DocumentStep};
pub use candidate::{CandidateActions, IdDocument};
pub use certificate::{CertificateEvaluator, CertificateSubmission};
pub use error::{ServiceError, VerificationError};
pub use history::{Actor, HistoryAction, HistoryEntry, HistoryLog, HistoryStep};
pub use mutation::{apply_mutation, effective_status};
pub use progress::recompute_progress;
pub use record::{
    AdminReview, Certificate, ChannelVerification, CompletedSteps, EducationVerification,
    IdDocumentType, IdVerification, PersonalInfo, PostalAddress, ReviewDecision,
    SelfieVerification, Step, Suspension, VerificationRecord,
};
pub use service::VerificationService;
pub use status::StatusTransitioner;
pub use step_verifier::StepVerifier;
pub use summary::{CertificateCounts, VerificationSummary};
