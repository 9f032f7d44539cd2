use credo_notify::NotifyError;
use credo_store::StoreError;
use credo_types::{CandidateId, CertificateId, CertificateStatus, Channel, VerificationStatus};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VerificationError {
    #[error("no {0} code has been issued")]
    NoCodeIssued(Channel),

    #[error("{0} code has expired")]
    CodeExpired(Channel),

    #[error("{channel} code does not match ({remaining_attempts} attempts left)")]
    CodeMismatch {
        channel: Channel,
        remaining_attempts: u32,
    },

    #[error("too many wrong {0} codes; request a new code")]
    AttemptsExceeded(Channel),

    #[error("{0} is already verified")]
    ChannelAlreadyVerified(Channel),

    #[error("a {channel} code was sent recently; retry in {retry_after_secs}s")]
    ResendTooSoon {
        channel: Channel,
        retry_after_secs: u64,
    },

    #[error("code generation failed: {0}")]
    CodeGeneration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("certificate {0} not found")]
    CertificateNotFound(CertificateId),

    #[error("certificate {certificate} was already reviewed ({status})")]
    AlreadyReviewed {
        certificate: CertificateId,
        status: CertificateStatus,
    },

    #[error("certificate limit of {0} reached")]
    CertificateLimitReached(usize),

    #[error("cannot {action} while verification is {from}")]
    IllegalStatusTransition {
        from: VerificationStatus,
        action: &'static str,
    },
}

impl VerificationError {
    /// Whether the failed operation's changes to the record are still kept.
    ///
    /// Only a wrong code does this: the attempt counter must advance even
    /// though the check failed. Every other error leaves the record untouched.
    pub fn commits_record(&self) -> bool {
        matches!(self, Self::CodeMismatch { .. })
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Errors from the load → mutate → save service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("no verification record for candidate {0}")]
    RecordNotFound(CandidateId),

    #[error("candidate {0} already has a verification record")]
    RecordExists(CandidateId),

    #[error("record encoding error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for ServiceError {
    fn from(e: bincode::Error) -> Self {
        ServiceError::Serialization(e.to_string())
    }
}

impl ServiceError {
    /// The workflow error inside, if this is one.
    pub fn as_verification(&self) -> Option<&VerificationError> {
        match self {
            Self::Verification(e) => Some(e),
            _ => None,
        }
    }
}
