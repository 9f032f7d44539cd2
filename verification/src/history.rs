//! Append-only audit trail of every state-changing action.

use credo_types::{AdminId, CandidateId, Channel, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Step;

/// Which part of the record an entry concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStep {
    Email,
    Phone,
    PersonalInfo,
    IdDocument,
    Selfie,
    EducationCertificate,
    /// The record as a whole: creation, status changes, admin decisions.
    Overall,
}

impl HistoryStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::PersonalInfo => "personal_info",
            Self::IdDocument => "id_document",
            Self::Selfie => "selfie",
            Self::EducationCertificate => "education_certificate",
            Self::Overall => "overall",
        }
    }
}

impl From<Step> for HistoryStep {
    fn from(step: Step) -> Self {
        match step {
            Step::Email => Self::Email,
            Step::Phone => Self::Phone,
            Step::PersonalInfo => Self::PersonalInfo,
            Step::IdDocument => Self::IdDocument,
            Step::Selfie => Self::Selfie,
            Step::EducationCertificate => Self::EducationCertificate,
        }
    }
}

impl From<Channel> for HistoryStep {
    fn from(channel: Channel) -> Self {
        Step::from(channel).into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    SendCode,
    VerifyCode,
    UpdatePersonalInfo,
    SubmitDocument,
    DocumentCheck,
    SubmitCertificate,
    ReviewCertificate,
    StatusChanged,
    Resubmit,
    Approve,
    Reject,
    RequestInfo,
    Suspend,
    Reinstate,
    SuspensionExpired,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::SendCode => "send_code",
            Self::VerifyCode => "verify_code",
            Self::UpdatePersonalInfo => "update_personal_info",
            Self::SubmitDocument => "submit_document",
            Self::DocumentCheck => "document_check",
            Self::SubmitCertificate => "submit_certificate",
            Self::ReviewCertificate => "review_certificate",
            Self::StatusChanged => "status_changed",
            Self::Resubmit => "resubmit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::RequestInfo => "request_info",
            Self::Suspend => "suspend",
            Self::Reinstate => "reinstate",
            Self::SuspensionExpired => "suspension_expired",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performed an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Candidate(CandidateId),
    Admin(AdminId),
    /// Automatic transitions and external checks without an admin identity.
    System,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Candidate(id) => write!(f, "candidate:{id}"),
            Self::Admin(id) => write!(f, "admin:{id}"),
            Self::System => f.write_str(AdminId::SYSTEM),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: HistoryStep,
    pub action: HistoryAction,
    pub status: String,
    pub timestamp: Timestamp,
    pub details: Option<String>,
    pub performed_by: Actor,
}

/// Ordered entries; the only write is [`HistoryLog::append`], and it is
/// crate-private.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog(Vec<HistoryEntry>);

impl HistoryLog {
    pub(crate) fn append(&mut self, entry: HistoryEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.0.last()
    }

    /// Entries recorded for one action, oldest first.
    pub fn with_action(&self, action: HistoryAction) -> impl Iterator<Item = &HistoryEntry> {
        self.0.iter().filter(move |e| e.action == action)
    }
}

/// Mask an email address or phone number for the audit trail.
pub fn mask_destination(destination: &str) -> String {
    let d = destination.trim();
    if let Some((local, domain)) = d.split_once('@') {
        let first: String = local.chars().take(1).collect();
        return format!("{first}***@{domain}");
    }
    let chars: Vec<char> = d.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    // At least one character is always hidden.
    let head_len = (chars.len() - 3).min(3);
    let head: String = chars[..head_len].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - head_len - 2))
}
