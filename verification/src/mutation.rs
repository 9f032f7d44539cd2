//! The single write path for verification records.
//!
//! Every operation runs its change against a draft copy. On success the
//! draft is finished (education aggregates, progress, automatic status) and
//! replaces the record; on failure the draft is discarded, except for errors
//! whose [`VerificationError::commits_record`] is true.

use credo_types::{Timestamp, VerificationStatus};

use crate::certificate::CertificateEvaluator;
use crate::error::VerificationError;
use crate::history::{Actor, HistoryAction, HistoryStep};
use crate::progress::recompute_progress;
use crate::record::VerificationRecord;
use crate::status::StatusTransitioner;

/// Run `f` against `record` and recompute every derived field.
pub fn apply_mutation<T>(
    record: &mut VerificationRecord,
    evaluator: &CertificateEvaluator,
    now: Timestamp,
    f: impl FnOnce(&mut VerificationRecord) -> Result<T, VerificationError>,
) -> Result<T, VerificationError> {
    let mut draft = record.clone();
    lift_lapsed_suspension(&mut draft, now);

    let result = f(&mut draft);
    let keep = match &result {
        Ok(_) => true,
        Err(e) => e.commits_record(),
    };
    if keep {
        finish(&mut draft, evaluator, now);
        *record = draft;
    }
    result
}

fn finish(record: &mut VerificationRecord, evaluator: &CertificateEvaluator, now: Timestamp) {
    evaluator.update_education_status(record);
    recompute_progress(record);
    StatusTransitioner::apply(record, now);
    record.updated_at = now;
}

/// A timed suspension whose period is over no longer holds the status.
pub(crate) fn lift_lapsed_suspension(record: &mut VerificationRecord, now: Timestamp) {
    if record.status != VerificationStatus::Suspended {
        return;
    }
    let Some(suspension) = record.suspension.as_ref() else {
        return;
    };
    if !suspension.has_lapsed(now) {
        return;
    }
    let (next, resubmission_allowed) = suspension.restored(&record.completed_steps);
    record.status = next;
    record.resubmission_allowed = resubmission_allowed;
    record.suspension = None;
    record.log(
        HistoryStep::Overall,
        HistoryAction::SuspensionExpired,
        next.as_str(),
        None,
        Actor::System,
        now,
    );
}

/// The status a reader should see at `now`, accounting for a lapsed suspension.
pub fn effective_status(record: &VerificationRecord, now: Timestamp) -> VerificationStatus {
    match (record.status, record.suspension.as_ref()) {
        (VerificationStatus::Suspended, Some(s)) if s.has_lapsed(now) => {
            s.restored(&record.completed_steps).0
        }
        (status, _) => status,
    }
}
