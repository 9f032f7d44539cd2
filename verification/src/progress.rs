//! Step-completion flags and the overall completion percentage.

use crate::record::{CompletedSteps, Step, VerificationRecord};

/// Derive the six completion flags from the underlying sub-objects.
///
/// `education_certificate` mirrors `minimum_requirement_met`, which the
/// certificate evaluator keeps current.
pub fn completed_steps(record: &VerificationRecord) -> CompletedSteps {
    CompletedSteps {
        email: record.email.is_verified,
        phone: record.phone.is_verified,
        personal_info: record.personal_info.is_complete(),
        id_document: record.id_verification.is_verified,
        selfie: record.selfie_verification.is_verified,
        education_certificate: record.education.minimum_requirement_met,
    }
}

/// `round(100 * completed / 6)`, rounding halves up.
pub fn percentage(completed: usize) -> u8 {
    let total = Step::ALL.len();
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

/// Recompute the flags and the percentage in place.
pub fn recompute_progress(record: &mut VerificationRecord) {
    let steps = completed_steps(record);
    record.completed_steps = steps;
    record.progress_percentage = percentage(steps.count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use credo_types::{CandidateId, Timestamp};

    #[test]
    fn percentage_table() {
        let expected = [0, 17, 33, 50, 67, 83, 100];
        for (n, want) in expected.into_iter().enumerate() {
            assert_eq!(percentage(n), want, "{n} of 6");
        }
    }

    #[test]
    fn flags_follow_sub_objects() {
        let mut record = VerificationRecord::new(CandidateId::new("c").unwrap(), Timestamp::new(0));
        record.email.is_verified = true;
        record.personal_info.first_name = Some("Ada".into());
        record.personal_info.last_name = Some("Lovelace".into());
        record.personal_info.date_of_birth = NaiveDate::from_ymd_opt(1990, 12, 10);
        recompute_progress(&mut record);

        let steps = record.completed_steps();
        assert!(steps.email && steps.personal_info);
        assert!(!steps.phone && !steps.id_document && !steps.selfie);
        assert_eq!(record.progress_percentage(), 33);

        record.email.is_verified = false;
        recompute_progress(&mut record);
        assert!(!record.completed_steps().email);
        assert_eq!(record.progress_percentage(), 17);
    }
}
