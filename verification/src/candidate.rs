//! Candidate-side step operations.

use chrono::{DateTime, NaiveDate, Utc};
use credo_types::{CertificateId, DocumentRef, Timestamp, VerificationParams, VerificationStatus};
use serde::{Deserialize, Serialize};

use crate::certificate::{CertificateEvaluator, CertificateSubmission};
use crate::error::VerificationError;
use crate::history::{Actor, HistoryAction, HistoryStep};
use crate::mutation::apply_mutation;
use crate::record::{IdDocumentType, PersonalInfo, Step, VerificationRecord};
use crate::status::StatusTransitioner;

/// An identity document upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdDocument {
    pub document_type: IdDocumentType,
    pub front: DocumentRef,
    pub back: Option<DocumentRef>,
}

/// Gate every candidate edit on the record's overall status.
///
/// A rejection that allowed resubmission re-opens the record here, once.
pub(crate) fn ensure_candidate_may_edit(
    record: &mut VerificationRecord,
    action: &'static str,
    now: Timestamp,
) -> Result<(), VerificationError> {
    match record.status {
        VerificationStatus::Rejected if record.resubmission_allowed => {
            StatusTransitioner::ensure_legal(record.status, VerificationStatus::InProgress, action)?;
            record.status = VerificationStatus::InProgress;
            record.resubmission_allowed = false;
            let actor = Actor::Candidate(record.candidate.clone());
            record.log(
                HistoryStep::Overall,
                HistoryAction::Resubmit,
                VerificationStatus::InProgress.as_str(),
                None,
                actor,
                now,
            );
            Ok(())
        }
        from @ (VerificationStatus::Approved
        | VerificationStatus::Rejected
        | VerificationStatus::Suspended) => {
            Err(VerificationError::IllegalStatusTransition { from, action })
        }
        _ => Ok(()),
    }
}

/// The UTC calendar date `now` falls on.
fn date_of(now: Timestamp) -> Option<NaiveDate> {
    i64::try_from(now.as_secs())
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.date_naive())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct CandidateActions {
    params: VerificationParams,
    evaluator: CertificateEvaluator,
}

impl CandidateActions {
    pub fn new(params: &VerificationParams) -> Self {
        Self {
            params: params.clone(),
            evaluator: CertificateEvaluator::new(params),
        }
    }

    /// Replace the personal details. Names are trimmed.
    pub fn update_personal_info(
        &self,
        record: &mut VerificationRecord,
        info: PersonalInfo,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let info = PersonalInfo {
            first_name: trimmed(info.first_name),
            last_name: trimmed(info.last_name),
            date_of_birth: info.date_of_birth,
            phone_number: trimmed(info.phone_number),
            address: info.address,
        };
        if info.first_name.is_none() {
            return Err(VerificationError::validation("first name is required"));
        }
        if info.last_name.is_none() {
            return Err(VerificationError::validation("last name is required"));
        }
        let Some(dob) = info.date_of_birth else {
            return Err(VerificationError::validation("date of birth is required"));
        };
        if date_of(now).is_some_and(|today| dob > today) {
            return Err(VerificationError::Validation(format!(
                "date of birth {dob} is in the future"
            )));
        }

        apply_mutation(record, &self.evaluator, now, |r| {
            ensure_candidate_may_edit(r, "update personal info", now)?;
            r.personal_info = info;
            let actor = Actor::Candidate(r.candidate.clone());
            r.log(
                Step::PersonalInfo.into(),
                HistoryAction::UpdatePersonalInfo,
                "complete",
                None,
                actor,
                now,
            );
            Ok(())
        })
    }

    /// Store a new identity document. Any earlier check result is cleared.
    pub fn submit_id_document(
        &self,
        record: &mut VerificationRecord,
        document: IdDocument,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        if !document.front.is_present() {
            return Err(VerificationError::validation("document front image is required"));
        }
        let back = document.back.filter(DocumentRef::is_present);

        apply_mutation(record, &self.evaluator, now, |r| {
            ensure_candidate_may_edit(r, "submit an id document", now)?;
            let id = &mut r.id_verification;
            id.document_type = Some(document.document_type);
            id.front = Some(document.front);
            id.back = back;
            id.submitted_at = Some(now);
            id.is_verified = false;
            id.verified_at = None;

            let actor = Actor::Candidate(r.candidate.clone());
            r.log(
                Step::IdDocument.into(),
                HistoryAction::SubmitDocument,
                "submitted",
                Some(document.document_type.as_str().to_string()),
                actor,
                now,
            );
            Ok(())
        })
    }

    /// Store a new selfie. Any earlier check result is cleared.
    pub fn submit_selfie(
        &self,
        record: &mut VerificationRecord,
        image: DocumentRef,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        if !image.is_present() {
            return Err(VerificationError::validation("selfie image is required"));
        }

        apply_mutation(record, &self.evaluator, now, |r| {
            ensure_candidate_may_edit(r, "submit a selfie", now)?;
            let selfie = &mut r.selfie_verification;
            selfie.image = Some(image);
            selfie.submitted_at = Some(now);
            selfie.is_verified = false;
            selfie.verified_at = None;

            let actor = Actor::Candidate(r.candidate.clone());
            r.log(
                Step::Selfie.into(),
                HistoryAction::SubmitDocument,
                "submitted",
                None,
                actor,
                now,
            );
            Ok(())
        })
    }

    /// Append a `pending` certificate under the caller-assigned `id`.
    pub fn submit_certificate(
        &self,
        record: &mut VerificationRecord,
        submission: CertificateSubmission,
        id: CertificateId,
        now: Timestamp,
    ) -> Result<CertificateId, VerificationError> {
        submission.validate(&self.params, now)?;
        let max = self.params.max_certificates;

        apply_mutation(record, &self.evaluator, now, |r| {
            ensure_candidate_may_edit(r, "submit a certificate", now)?;
            if r.education.certificates.len() >= max {
                return Err(VerificationError::CertificateLimitReached(max));
            }
            if r.education.certificate(&id).is_some() {
                return Err(VerificationError::Validation(format!(
                    "certificate {id} already submitted"
                )));
            }

            let details = format!(
                "{} from {}",
                submission.certificate_type.as_str(),
                submission.institution.trim()
            );
            r.education
                .certificates
                .push(submission.into_certificate(id, now));

            let actor = Actor::Candidate(r.candidate.clone());
            r.log(
                Step::EducationCertificate.into(),
                HistoryAction::SubmitCertificate,
                "pending",
                Some(details),
                actor,
                now,
            );
            Ok(id)
        })
    }
}
