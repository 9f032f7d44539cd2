//! The verification record: all state for one candidate's verification attempt.
//!
//! Sub-objects are plain data and readable through shared references only.
//! Every write goes through the operations in this crate, which finish with
//! [`crate::mutation::apply_mutation`] so the derived fields
//! (`completed_steps`, `progress_percentage`, education aggregates and the
//! automatic status) can never drift from the state they are derived from.

use chrono::NaiveDate;
use credo_types::{
    AdminId, CandidateId, CertificateId, CertificateStatus, CertificateType, Channel,
    DocumentRef, EducationStatus, Timestamp, VerificationStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::history::{Actor, HistoryAction, HistoryEntry, HistoryLog, HistoryStep};
use crate::status::StatusTransitioner;

/// The six independently tracked verification milestones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Email,
    Phone,
    PersonalInfo,
    IdDocument,
    Selfie,
    EducationCertificate,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Email,
        Step::Phone,
        Step::PersonalInfo,
        Step::IdDocument,
        Step::Selfie,
        Step::EducationCertificate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::PersonalInfo => "personal_info",
            Self::IdDocument => "id_document",
            Self::Selfie => "selfie",
            Self::EducationCertificate => "education_certificate",
        }
    }
}

impl From<Channel> for Step {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Email => Step::Email,
            Channel::Phone => Step::Phone,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the email or phone code protocol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelVerification {
    /// Address or number the last code was sent to.
    pub destination: Option<String>,
    pub is_verified: bool,
    pub(crate) code: Option<String>,
    pub code_expires_at: Option<Timestamp>,
    /// Wrong guesses in the current code cycle.
    pub attempts: u32,
    pub verified_at: Option<Timestamp>,
    pub last_code_sent_at: Option<Timestamp>,
}

impl ChannelVerification {
    /// Whether a code has been issued and not yet consumed.
    pub fn has_pending_code(&self) -> bool {
        self.code.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<PostalAddress>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl PersonalInfo {
    /// First name, last name and date of birth are all present.
    pub fn is_complete(&self) -> bool {
        present(&self.first_name) && present(&self.last_name) && self.date_of_birth.is_some()
    }
}

/// Kind of government-issued identity document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdDocumentType {
    Passport,
    NationalId,
    DriversLicense,
    ResidencePermit,
}

impl IdDocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::NationalId => "national_id",
            Self::DriversLicense => "drivers_license",
            Self::ResidencePermit => "residence_permit",
        }
    }
}

impl std::str::FromStr for IdDocumentType {
    type Err = credo_types::IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "passport" => Ok(Self::Passport),
            "national_id" => Ok(Self::NationalId),
            "drivers_license" => Ok(Self::DriversLicense),
            "residence_permit" => Ok(Self::ResidencePermit),
            _ => Err(credo_types::IdError::UnknownVariant {
                kind: "id document type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdVerification {
    pub document_type: Option<IdDocumentType>,
    pub front: Option<DocumentRef>,
    pub back: Option<DocumentRef>,
    pub submitted_at: Option<Timestamp>,
    /// Set only by the external document check or an admin.
    pub is_verified: bool,
    pub verified_at: Option<Timestamp>,
}

impl IdVerification {
    pub fn is_submitted(&self) -> bool {
        self.front.as_ref().is_some_and(DocumentRef::is_present)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfieVerification {
    pub image: Option<DocumentRef>,
    pub submitted_at: Option<Timestamp>,
    /// Set only by the external liveness/face-match check or an admin.
    pub is_verified: bool,
    pub verified_at: Option<Timestamp>,
}

impl SelfieVerification {
    pub fn is_submitted(&self) -> bool {
        self.image.as_ref().is_some_and(DocumentRef::is_present)
    }
}

/// One submitted education credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub certificate_type: CertificateType,
    pub institution: String,
    pub field_of_study: String,
    pub graduation_year: i32,
    pub gpa: Option<f32>,
    pub document: DocumentRef,
    pub verification_status: CertificateStatus,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Timestamp,
    pub verified_at: Option<Timestamp>,
    pub verified_by: Option<AdminId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationVerification {
    /// Append-only from the candidate's side, in submission order.
    pub certificates: Vec<Certificate>,
    pub minimum_requirement_met: bool,
    pub overall_status: EducationStatus,
}

impl EducationVerification {
    pub fn certificate(&self, id: &CertificateId) -> Option<&Certificate> {
        self.certificates.iter().find(|c| &c.id == id)
    }

    pub fn count_with_status(&self, status: CertificateStatus) -> usize {
        self.certificates
            .iter()
            .filter(|c| c.verification_status == status)
            .count()
    }
}

/// Derived per-step completion flags. Never set by callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSteps {
    pub email: bool,
    pub phone: bool,
    pub personal_info: bool,
    pub id_document: bool,
    pub selfie: bool,
    pub education_certificate: bool,
}

impl CompletedSteps {
    pub fn get(&self, step: Step) -> bool {
        match step {
            Step::Email => self.email,
            Step::Phone => self.phone,
            Step::PersonalInfo => self.personal_info,
            Step::IdDocument => self.id_document,
            Step::Selfie => self.selfie,
            Step::EducationCertificate => self.education_certificate,
        }
    }

    pub fn count(&self) -> usize {
        Step::ALL.iter().filter(|s| self.get(**s)).count()
    }

    pub fn all(&self) -> bool {
        self.count() == Step::ALL.len()
    }

    pub fn none(&self) -> bool {
        self.count() == 0
    }

    /// Steps still outstanding, in fixed step order.
    pub fn pending(&self) -> Vec<Step> {
        Step::ALL.into_iter().filter(|s| !self.get(*s)).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    InfoRequested,
    Suspended,
    Reinstated,
}

/// The most recent admin decision on the record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminReview {
    pub reviewed_by: AdminId,
    pub reviewed_at: Timestamp,
    pub decision: ReviewDecision,
    pub feedback: Option<String>,
    pub allow_resubmission: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspension {
    pub reason: String,
    pub suspended_by: AdminId,
    pub suspended_at: Timestamp,
    /// `None` is an indefinite suspension.
    pub duration_days: Option<u32>,
    /// Status held when the suspension started.
    pub prior_status: VerificationStatus,
    /// Resubmission allowance held when the suspension started.
    pub prior_resubmission_allowed: bool,
}

impl Suspension {
    /// When a timed suspension lapses.
    pub fn lifts_at(&self) -> Option<Timestamp> {
        self.duration_days.map(|days| {
            self.suspended_at
                .plus_secs(u64::from(days) * credo_types::time::SECS_PER_DAY)
        })
    }

    pub fn has_lapsed(&self, now: Timestamp) -> bool {
        self.lifts_at().is_some_and(|at| now >= at)
    }

    /// Status and resubmission allowance once the suspension ends.
    ///
    /// A rejection survives the suspension; anything else falls back to the
    /// automatic rule for `steps`.
    pub fn restored(&self, steps: &CompletedSteps) -> (VerificationStatus, bool) {
        match self.prior_status {
            VerificationStatus::Rejected => {
                (VerificationStatus::Rejected, self.prior_resubmission_allowed)
            }
            _ => (StatusTransitioner::automatic_status(steps), false),
        }
    }
}

/// All state for one candidate's verification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub(crate) candidate: CandidateId,
    pub(crate) email: ChannelVerification,
    pub(crate) phone: ChannelVerification,
    pub(crate) personal_info: PersonalInfo,
    pub(crate) id_verification: IdVerification,
    pub(crate) selfie_verification: SelfieVerification,
    pub(crate) education: EducationVerification,
    pub(crate) completed_steps: CompletedSteps,
    pub(crate) status: VerificationStatus,
    pub(crate) progress_percentage: u8,
    pub(crate) history: HistoryLog,
    pub(crate) admin_review: Option<AdminReview>,
    pub(crate) suspension: Option<Suspension>,
    pub(crate) resubmission_allowed: bool,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
    /// Storage version this value was loaded at; 0 for a never-stored record.
    #[serde(skip)]
    pub(crate) version: u64,
}

impl VerificationRecord {
    /// A fresh record with every step outstanding.
    pub fn new(candidate: CandidateId, now: Timestamp) -> Self {
        let mut history = HistoryLog::default();
        history.append(HistoryEntry {
            step: HistoryStep::Overall,
            action: HistoryAction::Created,
            status: VerificationStatus::Pending.as_str().to_string(),
            timestamp: now,
            details: None,
            performed_by: Actor::Candidate(candidate.clone()),
        });
        Self {
            candidate,
            email: ChannelVerification::default(),
            phone: ChannelVerification::default(),
            personal_info: PersonalInfo::default(),
            id_verification: IdVerification::default(),
            selfie_verification: SelfieVerification::default(),
            education: EducationVerification::default(),
            completed_steps: CompletedSteps::default(),
            status: VerificationStatus::Pending,
            progress_percentage: 0,
            history,
            admin_review: None,
            suspension: None,
            resubmission_allowed: false,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn candidate(&self) -> &CandidateId {
        &self.candidate
    }

    pub fn channel(&self, channel: Channel) -> &ChannelVerification {
        match channel {
            Channel::Email => &self.email,
            Channel::Phone => &self.phone,
        }
    }

    pub(crate) fn channel_mut(&mut self, channel: Channel) -> &mut ChannelVerification {
        match channel {
            Channel::Email => &mut self.email,
            Channel::Phone => &mut self.phone,
        }
    }

    pub fn personal_info(&self) -> &PersonalInfo {
        &self.personal_info
    }

    pub fn id_verification(&self) -> &IdVerification {
        &self.id_verification
    }

    pub fn selfie_verification(&self) -> &SelfieVerification {
        &self.selfie_verification
    }

    pub fn education(&self) -> &EducationVerification {
        &self.education
    }

    pub fn completed_steps(&self) -> CompletedSteps {
        self.completed_steps
    }

    pub fn status(&self) -> VerificationStatus {
        self.status
    }

    pub fn progress_percentage(&self) -> u8 {
        self.progress_percentage
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn admin_review(&self) -> Option<&AdminReview> {
        self.admin_review.as_ref()
    }

    pub fn suspension(&self) -> Option<&Suspension> {
        self.suspension.as_ref()
    }

    pub fn resubmission_allowed(&self) -> bool {
        self.resubmission_allowed
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn log(
        &mut self,
        step: HistoryStep,
        action: HistoryAction,
        status: impl Into<String>,
        details: Option<String>,
        performed_by: Actor,
        now: Timestamp,
    ) {
        self.history.append(HistoryEntry {
            step,
            action,
            status: status.into(),
            timestamp: now,
            details,
            performed_by,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_pending_with_creation_entry() {
        let record = VerificationRecord::new(CandidateId::new("c1").unwrap(), Timestamp::new(5));
        assert_eq!(record.status(), VerificationStatus::Pending);
        assert_eq!(record.progress_percentage(), 0);
        assert!(record.completed_steps().none());
        assert_eq!(record.history().entries().len(), 1);
        assert_eq!(record.history().last().unwrap().action, HistoryAction::Created);
    }

    #[test]
    fn personal_info_completeness_ignores_blank_names() {
        let mut info = PersonalInfo {
            first_name: Some("Ada".into()),
            last_name: Some("  ".into()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
            ..Default::default()
        };
        assert!(!info.is_complete());
        info.last_name = Some("Lovelace".into());
        assert!(info.is_complete());
        info.date_of_birth = None;
        assert!(!info.is_complete());
    }

    #[test]
    fn timed_suspension_lapses_after_duration() {
        let s = Suspension {
            reason: "fraud review".into(),
            suspended_by: AdminId::new("admin").unwrap(),
            suspended_at: Timestamp::new(1_000),
            duration_days: Some(2),
            prior_status: VerificationStatus::InProgress,
            prior_resubmission_allowed: false,
        };
        assert_eq!(s.lifts_at(), Some(Timestamp::new(1_000 + 2 * 86_400)));
        assert!(!s.has_lapsed(Timestamp::new(1_000 + 2 * 86_400 - 1)));
        assert!(s.has_lapsed(Timestamp::new(1_000 + 2 * 86_400)));

        let indefinite = Suspension {
            duration_days: None,
            ..s
        };
        assert!(!indefinite.has_lapsed(Timestamp::new(u64::MAX)));
    }

    #[test]
    fn ending_a_suspension_keeps_a_rejection() {
        let complete = CompletedSteps {
            email: true,
            phone: true,
            personal_info: true,
            id_document: true,
            selfie: true,
            education_certificate: true,
        };
        let mut s = Suspension {
            reason: "identity dispute".into(),
            suspended_by: AdminId::new("admin").unwrap(),
            suspended_at: Timestamp::new(0),
            duration_days: None,
            prior_status: VerificationStatus::Rejected,
            prior_resubmission_allowed: true,
        };
        assert_eq!(s.restored(&complete), (VerificationStatus::Rejected, true));

        s.prior_status = VerificationStatus::InProgress;
        assert_eq!(s.restored(&complete), (VerificationStatus::UnderReview, false));
    }

    #[test]
    fn pending_steps_follow_step_order() {
        let steps = CompletedSteps {
            email: true,
            selfie: true,
            ..Default::default()
        };
        assert_eq!(
            steps.pending(),
            vec![
                Step::Phone,
                Step::PersonalInfo,
                Step::IdDocument,
                Step::EducationCertificate
            ]
        );
        assert_eq!(steps.count(), 2);
    }
}
