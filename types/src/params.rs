//! Verification parameters: code protocol limits and education acceptance rules.
//!
//! Every field has a serde default so a partial `[params]` table in a config
//! file only overrides what it names.

use crate::CertificateType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationParams {
    // ── Code protocol ────────────────────────────────────────────────────
    /// Lifetime of a one-time code in seconds. Default: 10 minutes.
    #[serde(default = "default_code_ttl_secs")]
    pub code_ttl_secs: u64,

    /// Wrong guesses allowed per code cycle before further checks are refused.
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,

    /// Number of decimal digits in a generated code.
    #[serde(default = "default_code_length")]
    pub code_length: u32,

    /// Minimum spacing between two code sends on the same channel.
    #[serde(default = "default_resend_cooldown_secs")]
    pub resend_cooldown_secs: u64,

    // ── Education ────────────────────────────────────────────────────────
    /// Certificate types that can satisfy the minimum education requirement.
    #[serde(default = "default_accepted_certificate_types")]
    pub accepted_certificate_types: Vec<CertificateType>,

    /// Upper bound on certificates a candidate may submit.
    #[serde(default = "default_max_certificates")]
    pub max_certificates: usize,

    /// Earliest graduation year accepted on a submission.
    #[serde(default = "default_min_graduation_year")]
    pub min_graduation_year: i32,

    /// Largest GPA value accepted on a submission.
    #[serde(default = "default_max_gpa")]
    pub max_gpa: f32,
}

fn default_code_ttl_secs() -> u64 {
    600
}

fn default_max_code_attempts() -> u32 {
    3
}

fn default_code_length() -> u32 {
    6
}

fn default_resend_cooldown_secs() -> u64 {
    60
}

fn default_accepted_certificate_types() -> Vec<CertificateType> {
    CertificateType::ALL
        .into_iter()
        .filter(|t| *t != CertificateType::Other)
        .collect()
}

fn default_max_certificates() -> usize {
    20
}

fn default_min_graduation_year() -> i32 {
    1950
}

fn default_max_gpa() -> f32 {
    10.0
}

impl VerificationParams {
    pub fn accepts(&self, certificate_type: CertificateType) -> bool {
        self.accepted_certificate_types.contains(&certificate_type)
    }
}

impl Default for VerificationParams {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl_secs(),
            max_code_attempts: default_max_code_attempts(),
            code_length: default_code_length(),
            resend_cooldown_secs: default_resend_cooldown_secs(),
            accepted_certificate_types: default_accepted_certificate_types(),
            max_certificates: default_max_certificates(),
            min_graduation_year: default_min_graduation_year(),
            max_gpa: default_max_gpa(),
        }
    }
}
