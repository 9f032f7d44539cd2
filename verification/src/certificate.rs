//! Education sub-workflow: certificate acceptance and aggregate status.

use chrono::{DateTime, Datelike, Utc};
use credo_types::{
    CertificateId, CertificateStatus, CertificateType, DocumentRef, EducationStatus, Timestamp,
    VerificationParams,
};
use serde::{Deserialize, Serialize};

use crate::error::VerificationError;
use crate::record::{Certificate, VerificationRecord};

/// What a candidate supplies when submitting a certificate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertificateSubmission {
    pub certificate_type: CertificateType,
    pub institution: String,
    pub field_of_study: String,
    pub graduation_year: i32,
    pub gpa: Option<f32>,
    pub document: DocumentRef,
}

/// The calendar year `now` falls in (UTC).
pub(crate) fn year_of(now: Timestamp) -> i32 {
    i64::try_from(now.as_secs())
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.year())
        .unwrap_or(1970)
}

impl CertificateSubmission {
    pub fn validate(&self, params: &VerificationParams, now: Timestamp) -> Result<(), VerificationError> {
        if self.institution.trim().is_empty() {
            return Err(VerificationError::validation("institution is required"));
        }
        if self.field_of_study.trim().is_empty() {
            return Err(VerificationError::validation("field of study is required"));
        }
        let latest_year = year_of(now) + 1;
        if !(params.min_graduation_year..=latest_year).contains(&self.graduation_year) {
            return Err(VerificationError::Validation(format!(
                "graduation year {} outside {}..={}",
                self.graduation_year, params.min_graduation_year, latest_year
            )));
        }
        if let Some(gpa) = self.gpa {
            if !gpa.is_finite() || gpa < 0.0 || gpa > params.max_gpa {
                return Err(VerificationError::Validation(format!(
                    "gpa {gpa} outside 0..={}",
                    params.max_gpa
                )));
            }
        }
        if !self.document.is_present() {
            return Err(VerificationError::validation("certificate document is required"));
        }
        Ok(())
    }

    pub(crate) fn into_certificate(self, id: CertificateId, now: Timestamp) -> Certificate {
        Certificate {
            id,
            certificate_type: self.certificate_type,
            institution: self.institution.trim().to_string(),
            field_of_study: self.field_of_study.trim().to_string(),
            graduation_year: self.graduation_year,
            gpa: self.gpa,
            document: self.document,
            verification_status: CertificateStatus::Pending,
            notes: None,
            rejection_reason: None,
            submitted_at: now,
            verified_at: None,
            verified_by: None,
        }
    }
}

/// Evaluates certificates against the acceptance rules.
#[derive(Clone, Debug)]
pub struct CertificateEvaluator {
    accepted_types: Vec<CertificateType>,
}

impl CertificateEvaluator {
    pub fn new(params: &VerificationParams) -> Self {
        Self {
            accepted_types: params.accepted_certificate_types.clone(),
        }
    }

    pub fn is_accepted_type(&self, certificate_type: CertificateType) -> bool {
        self.accepted_types.contains(&certificate_type)
    }

    /// Whether a single certificate counts towards the minimum requirement.
    ///
    /// Pending certificates count: an upload of an accepted type unblocks the
    /// step before review, and admin review later narrows it.
    pub fn counts_towards_minimum(&self, certificate: &Certificate) -> bool {
        self.is_accepted_type(certificate.certificate_type)
            && matches!(
                certificate.verification_status,
                CertificateStatus::Pending | CertificateStatus::Verified
            )
            && certificate.document.is_present()
    }

    pub fn check_minimum_requirement(&self, certificates: &[Certificate]) -> bool {
        certificates.iter().any(|c| self.counts_towards_minimum(c))
    }

    /// Aggregate status of the education sub-workflow.
    ///
    /// One verified certificate approves education regardless of the rest.
    pub fn aggregate_education_status(
        certificates: &[Certificate],
        minimum_requirement_met: bool,
    ) -> EducationStatus {
        let any = |status: CertificateStatus| {
            certificates.iter().any(|c| c.verification_status == status)
        };
        if any(CertificateStatus::Verified) {
            EducationStatus::Approved
        } else if any(CertificateStatus::Pending) && minimum_requirement_met {
            EducationStatus::UnderReview
        } else if any(CertificateStatus::Rejected) && !any(CertificateStatus::Pending) {
            EducationStatus::Rejected
        } else {
            EducationStatus::Incomplete
        }
    }

    /// Recompute `minimum_requirement_met`, `overall_status` and the education
    /// completion flag. Idempotent.
    pub fn update_education_status(&self, record: &mut VerificationRecord) {
        let met = self.check_minimum_requirement(&record.education.certificates);
        record.education.minimum_requirement_met = met;
        record.education.overall_status =
            Self::aggregate_education_status(&record.education.certificates, met);
        record.completed_steps.education_certificate = met;
    }
}
