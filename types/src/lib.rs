//! Fundamental types for the Credo instructor verification workflow.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, timestamps and the clock seam, document references, status enums,
//! and the tunable verification parameters.

pub mod channel;
pub mod clock;
pub mod document;
pub mod error;
pub mod ids;
pub mod params;
pub mod state;
pub mod time;

pub use channel::Channel;
pub use clock::{Clock, SystemClock};
pub use document::DocumentRef;
pub use error::IdError;
pub use ids::{AdminId, CandidateId, CertificateId};
pub use params::VerificationParams;
pub use state::{CertificateStatus, CertificateType, EducationStatus, VerificationStatus};
pub use time::Timestamp;
