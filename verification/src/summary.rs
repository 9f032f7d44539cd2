//! The read-only candidate-facing projection of a record.

use credo_types::{CandidateId, CertificateStatus, EducationStatus, Timestamp, VerificationStatus};
use serde::Serialize;

use crate::mutation::effective_status;
use crate::record::{CompletedSteps, Step, VerificationRecord};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CertificateCounts {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
    pub needs_clarification: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub candidate: CandidateId,
    /// Status as of the read time; a lapsed suspension is already lifted here.
    pub status: VerificationStatus,
    pub progress_percentage: u8,
    pub completed_steps: CompletedSteps,
    pub pending_steps: Vec<Step>,
    pub education_status: EducationStatus,
    pub certificates: CertificateCounts,
    pub suspended_until: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl VerificationSummary {
    pub fn from_record(record: &VerificationRecord, now: Timestamp) -> Self {
        let education = record.education();
        let status = effective_status(record, now);
        let suspended_until = match status {
            VerificationStatus::Suspended => record.suspension().and_then(|s| s.lifts_at()),
            _ => None,
        };
        Self {
            candidate: record.candidate().clone(),
            status,
            progress_percentage: record.progress_percentage(),
            completed_steps: record.completed_steps(),
            pending_steps: record.completed_steps().pending(),
            education_status: education.overall_status,
            certificates: CertificateCounts {
                total: education.certificates.len(),
                pending: education.count_with_status(CertificateStatus::Pending),
                verified: education.count_with_status(CertificateStatus::Verified),
                rejected: education.count_with_status(CertificateStatus::Rejected),
                needs_clarification: education
                    .count_with_status(CertificateStatus::NeedsClarification),
            },
            suspended_until,
            updated_at: record.updated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_types::{AdminId, VerificationParams};

    use crate::admin::AdminActionHandler;

    #[test]
    fn fresh_record_summary() {
        let record = VerificationRecord::new(CandidateId::new("c").unwrap(), Timestamp::new(10));
        let summary = VerificationSummary::from_record(&record, Timestamp::new(10));
        assert_eq!(summary.status, VerificationStatus::Pending);
        assert_eq!(summary.progress_percentage, 0);
        assert_eq!(summary.pending_steps, Step::ALL.to_vec());
        assert_eq!(summary.education_status, EducationStatus::Incomplete);
        assert_eq!(summary.certificates, CertificateCounts::default());
    }

    #[test]
    fn lapsed_suspension_reads_as_lifted() {
        let mut record =
            VerificationRecord::new(CandidateId::new("c").unwrap(), Timestamp::new(0));
        AdminActionHandler::new(&VerificationParams::default())
            .suspend(
                &mut record,
                AdminId::new("a").unwrap(),
                "review",
                Some(2),
                Timestamp::new(0),
            )
            .unwrap();

        let during = VerificationSummary::from_record(&record, Timestamp::new(86_400));
        assert_eq!(during.status, VerificationStatus::Suspended);
        assert_eq!(during.suspended_until, Some(Timestamp::new(2 * 86_400)));

        let after = VerificationSummary::from_record(&record, Timestamp::new(2 * 86_400));
        assert_eq!(after.status, VerificationStatus::Pending);
        assert_eq!(after.suspended_until, None);
    }

    #[test]
    fn serializes_with_snake_case_names() {
        let record = VerificationRecord::new(CandidateId::new("c").unwrap(), Timestamp::new(0));
        let json = serde_json::to_value(VerificationSummary::from_record(&record, Timestamp::new(0)))
            .unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["pending_steps"][0], "email");
    }
}
