//! Admin decisions on a record and on individual certificates.
//!
//! Every operation here attributes its history entry to the acting admin
//! (or, for document checks, to whichever actor reported the outcome).

use std::fmt;
use std::str::FromStr;

use credo_types::{
    AdminId, CertificateId, CertificateStatus, IdError, Timestamp, VerificationParams,
    VerificationStatus,
};
use serde::{Deserialize, Serialize};

use crate::certificate::CertificateEvaluator;
use crate::error::VerificationError;
use crate::history::{Actor, HistoryAction, HistoryStep};
use crate::mutation::apply_mutation;
use crate::record::{AdminReview, ReviewDecision, Step, Suspension, VerificationRecord};
use crate::status::StatusTransitioner;

/// Steps whose completion depends on an external document check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStep {
    IdDocument,
    Selfie,
}

impl DocumentStep {
    pub fn as_str(&self) -> &'static str {
        Step::from(*self).as_str()
    }
}

impl From<DocumentStep> for Step {
    fn from(step: DocumentStep) -> Self {
        match step {
            DocumentStep::IdDocument => Step::IdDocument,
            DocumentStep::Selfie => Step::Selfie,
        }
    }
}

impl fmt::Display for DocumentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStep {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "id_document" | "id" => Ok(Self::IdDocument),
            "selfie" => Ok(Self::Selfie),
            _ => Err(IdError::UnknownVariant {
                kind: "document step",
                value: s.to_string(),
            }),
        }
    }
}

fn required(text: &str, what: &str) -> Result<String, VerificationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(VerificationError::Validation(format!("{what} is required")));
    }
    Ok(text.to_string())
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn record_review(
    record: &mut VerificationRecord,
    admin: &AdminId,
    decision: ReviewDecision,
    feedback: Option<String>,
    allow_resubmission: bool,
    now: Timestamp,
) {
    record.admin_review = Some(AdminReview {
        reviewed_by: admin.clone(),
        reviewed_at: now,
        decision,
        feedback,
        allow_resubmission,
    });
}

pub struct AdminActionHandler {
    evaluator: CertificateEvaluator,
}

impl AdminActionHandler {
    pub fn new(params: &VerificationParams) -> Self {
        Self {
            evaluator: CertificateEvaluator::new(params),
        }
    }

    /// Approve a record that is under review.
    pub fn approve(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        feedback: Option<String>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let feedback = non_blank(feedback);
        apply_mutation(record, &self.evaluator, now, |r| {
            StatusTransitioner::ensure_legal(r.status, VerificationStatus::Approved, "approve")?;
            r.status = VerificationStatus::Approved;
            r.resubmission_allowed = false;
            record_review(r, &admin, ReviewDecision::Approved, feedback.clone(), false, now);
            r.log(
                HistoryStep::Overall,
                HistoryAction::Approve,
                VerificationStatus::Approved.as_str(),
                feedback,
                Actor::Admin(admin),
                now,
            );
            Ok(())
        })
    }

    /// Reject a record that is under review.
    pub fn reject(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        reason: &str,
        allow_resubmission: bool,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let reason = required(reason, "rejection reason")?;
        apply_mutation(record, &self.evaluator, now, |r| {
            StatusTransitioner::ensure_legal(r.status, VerificationStatus::Rejected, "reject")?;
            r.status = VerificationStatus::Rejected;
            r.resubmission_allowed = allow_resubmission;
            record_review(
                r,
                &admin,
                ReviewDecision::Rejected,
                Some(reason.clone()),
                allow_resubmission,
                now,
            );
            let details = if allow_resubmission {
                format!("{reason} (resubmission allowed)")
            } else {
                reason
            };
            r.log(
                HistoryStep::Overall,
                HistoryAction::Reject,
                VerificationStatus::Rejected.as_str(),
                Some(details),
                Actor::Admin(admin),
                now,
            );
            Ok(())
        })
    }

    /// Ask the candidate for more information. The status does not change.
    pub fn request_more_info(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        message: &str,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let message = required(message, "message")?;
        apply_mutation(record, &self.evaluator, now, |r| {
            if r.status != VerificationStatus::UnderReview {
                return Err(VerificationError::IllegalStatusTransition {
                    from: r.status,
                    action: "request more info",
                });
            }
            record_review(
                r,
                &admin,
                ReviewDecision::InfoRequested,
                Some(message.clone()),
                false,
                now,
            );
            r.log(
                HistoryStep::Overall,
                HistoryAction::RequestInfo,
                r.status.as_str(),
                Some(message),
                Actor::Admin(admin),
                now,
            );
            Ok(())
        })
    }

    /// Suspend a record. `duration_days = None` suspends indefinitely.
    pub fn suspend(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        reason: &str,
        duration_days: Option<u32>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let reason = required(reason, "suspension reason")?;
        if duration_days == Some(0) {
            return Err(VerificationError::validation(
                "suspension duration must be at least one day",
            ));
        }
        apply_mutation(record, &self.evaluator, now, |r| {
            StatusTransitioner::ensure_legal(r.status, VerificationStatus::Suspended, "suspend")?;
            r.suspension = Some(Suspension {
                reason: reason.clone(),
                suspended_by: admin.clone(),
                suspended_at: now,
                duration_days,
                prior_status: r.status,
                prior_resubmission_allowed: r.resubmission_allowed,
            });
            r.status = VerificationStatus::Suspended;
            r.resubmission_allowed = false;
            record_review(r, &admin, ReviewDecision::Suspended, Some(reason.clone()), false, now);
            let details = match duration_days {
                Some(days) => format!("{reason} ({days} days)"),
                None => format!("{reason} (indefinite)"),
            };
            r.log(
                HistoryStep::Overall,
                HistoryAction::Suspend,
                VerificationStatus::Suspended.as_str(),
                Some(details),
                Actor::Admin(admin),
                now,
            );
            Ok(())
        })
    }

    /// Lift a suspension.
    ///
    /// A record suspended while rejected goes back to `rejected` with its
    /// resubmission allowance; any other record returns to whatever the
    /// completed steps imply.
    pub fn reinstate(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let note = non_blank(note);
        apply_mutation(record, &self.evaluator, now, |r| {
            if r.status != VerificationStatus::Suspended {
                return Err(VerificationError::IllegalStatusTransition {
                    from: r.status,
                    action: "reinstate",
                });
            }
            let (next, resubmission_allowed) = match r.suspension.as_ref() {
                Some(suspension) => suspension.restored(&r.completed_steps),
                None => (StatusTransitioner::automatic_status(&r.completed_steps), false),
            };
            StatusTransitioner::ensure_legal(r.status, next, "reinstate")?;
            r.status = next;
            r.resubmission_allowed = resubmission_allowed;
            r.suspension = None;
            record_review(r, &admin, ReviewDecision::Reinstated, note.clone(), false, now);
            r.log(
                HistoryStep::Overall,
                HistoryAction::Reinstate,
                next.as_str(),
                note,
                Actor::Admin(admin),
                now,
            );
            Ok(())
        })
    }

    /// Decide one certificate.
    ///
    /// Only a `pending` certificate may be decided unless `allow_rereview`
    /// is set. Rejection and clarification requests need notes.
    pub fn review_certificate(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        certificate_id: CertificateId,
        new_status: CertificateStatus,
        notes: Option<String>,
        allow_rereview: bool,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let notes = non_blank(notes);
        match new_status {
            CertificateStatus::Pending => {
                return Err(VerificationError::validation(
                    "a review must move the certificate out of pending",
                ));
            }
            CertificateStatus::Rejected | CertificateStatus::NeedsClarification
                if notes.is_none() =>
            {
                return Err(VerificationError::Validation(format!(
                    "notes are required to mark a certificate {new_status}"
                )));
            }
            _ => {}
        }

        apply_mutation(record, &self.evaluator, now, |r| {
            let certificate = r
                .education
                .certificates
                .iter_mut()
                .find(|c| c.id == certificate_id)
                .ok_or(VerificationError::CertificateNotFound(certificate_id))?;
            let current = certificate.verification_status;
            if current != CertificateStatus::Pending && !allow_rereview {
                return Err(VerificationError::AlreadyReviewed {
                    certificate: certificate_id,
                    status: current,
                });
            }

            certificate.verification_status = new_status;
            certificate.verified_at = Some(now);
            certificate.verified_by = Some(admin.clone());
            certificate.notes = notes.clone();
            certificate.rejection_reason = match new_status {
                CertificateStatus::Rejected => notes.clone(),
                _ => None,
            };

            let details = match notes {
                Some(notes) => format!("certificate {certificate_id}: {notes}"),
                None => format!("certificate {certificate_id}"),
            };
            r.log(
                Step::EducationCertificate.into(),
                HistoryAction::ReviewCertificate,
                new_status.as_str(),
                Some(details),
                Actor::Admin(admin),
                now,
            );
            Ok(())
        })
    }

    pub fn verify_certificate(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        certificate_id: CertificateId,
        notes: Option<String>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.review_certificate(
            record,
            admin,
            certificate_id,
            CertificateStatus::Verified,
            notes,
            false,
            now,
        )
    }

    pub fn reject_certificate(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        certificate_id: CertificateId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.review_certificate(
            record,
            admin,
            certificate_id,
            CertificateStatus::Rejected,
            Some(reason.to_string()),
            false,
            now,
        )
    }

    pub fn request_certificate_clarification(
        &self,
        record: &mut VerificationRecord,
        admin: AdminId,
        certificate_id: CertificateId,
        message: &str,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        self.review_certificate(
            record,
            admin,
            certificate_id,
            CertificateStatus::NeedsClarification,
            Some(message.to_string()),
            false,
            now,
        )
    }

    /// Record the outcome of the external id or selfie check.
    ///
    /// `performed_by` is the check service (`Actor::System`) or an admin
    /// overriding it.
    pub fn record_document_check(
        &self,
        record: &mut VerificationRecord,
        step: DocumentStep,
        verified: bool,
        performed_by: Actor,
        notes: Option<String>,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let notes = non_blank(notes);
        apply_mutation(record, &self.evaluator, now, |r| {
            let (submitted, is_verified, verified_at) = match step {
                DocumentStep::IdDocument => (
                    r.id_verification.is_submitted(),
                    &mut r.id_verification.is_verified,
                    &mut r.id_verification.verified_at,
                ),
                DocumentStep::Selfie => (
                    r.selfie_verification.is_submitted(),
                    &mut r.selfie_verification.is_verified,
                    &mut r.selfie_verification.verified_at,
                ),
            };
            if !submitted {
                return Err(VerificationError::Validation(format!(
                    "no {step} has been submitted"
                )));
            }
            *is_verified = verified;
            *verified_at = verified.then_some(now);

            r.log(
                Step::from(step).into(),
                HistoryAction::DocumentCheck,
                if verified { "verified" } else { "failed" },
                notes,
                performed_by,
                now,
            );
            Ok(())
        })
    }
}
