//! Status enums for verification records, the education sub-workflow and
//! individual certificates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::IdError;

/// The overall state of a verification record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No step completed yet.
    #[default]
    Pending,
    /// At least one step completed, but not all.
    InProgress,
    /// Every step completed; awaiting an admin decision.
    UnderReview,
    /// Admin approved: the candidate has teaching privileges.
    Approved,
    /// Admin rejected. Resubmission may or may not be allowed.
    Rejected,
    /// Admin suspended, indefinitely or for a fixed number of days.
    Suspended,
}

impl VerificationStatus {
    /// Statuses set by an admin decision. The automatic transition rule never
    /// overrides them.
    pub fn is_admin_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Suspended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The aggregate status of the education sub-workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    #[default]
    Incomplete,
}

impl EducationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for EducationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of a single submitted certificate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
    NeedsClarification,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::NeedsClarification => "needs_clarification",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            "needs_clarification" | "clarify" => Ok(Self::NeedsClarification),
            other => Err(IdError::UnknownVariant {
                kind: "certificate status",
                value: other.to_string(),
            }),
        }
    }
}

/// Kind of education or teaching credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateType {
    HighSchoolDiploma,
    AssociateDegree,
    BachelorDegree,
    MasterDegree,
    Doctorate,
    ProfessionalCertification,
    TeachingCertificate,
    TeachingLicense,
    VocationalCertificate,
    OnlineCourseCertificate,
    LanguageProficiency,
    Other,
}

impl CertificateType {
    pub const ALL: [CertificateType; 12] = [
        Self::HighSchoolDiploma,
        Self::AssociateDegree,
        Self::BachelorDegree,
        Self::MasterDegree,
        Self::Doctorate,
        Self::ProfessionalCertification,
        Self::TeachingCertificate,
        Self::TeachingLicense,
        Self::VocationalCertificate,
        Self::OnlineCourseCertificate,
        Self::LanguageProficiency,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighSchoolDiploma => "high_school_diploma",
            Self::AssociateDegree => "associate_degree",
            Self::BachelorDegree => "bachelor_degree",
            Self::MasterDegree => "master_degree",
            Self::Doctorate => "doctorate",
            Self::ProfessionalCertification => "professional_certification",
            Self::TeachingCertificate => "teaching_certificate",
            Self::TeachingLicense => "teaching_license",
            Self::VocationalCertificate => "vocational_certificate",
            Self::OnlineCourseCertificate => "online_course_certificate",
            Self::LanguageProficiency => "language_proficiency",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateType {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or(IdError::UnknownVariant {
                kind: "certificate type",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_decisions_are_admin_decided() {
        assert!(VerificationStatus::Approved.is_admin_decided());
        assert!(VerificationStatus::Rejected.is_admin_decided());
        assert!(VerificationStatus::Suspended.is_admin_decided());
        assert!(!VerificationStatus::UnderReview.is_admin_decided());
        assert!(!VerificationStatus::InProgress.is_admin_decided());
        assert!(!VerificationStatus::Pending.is_admin_decided());
    }

    #[test]
    fn certificate_type_parses_every_name() {
        for t in CertificateType::ALL {
            assert_eq!(t.as_str().parse::<CertificateType>().unwrap(), t);
        }
        assert_eq!(
            "Master-Degree".parse::<CertificateType>().unwrap(),
            CertificateType::MasterDegree
        );
        assert!("bootcamp".parse::<CertificateType>().is_err());
    }
}
