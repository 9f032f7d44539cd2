//! Overall status: the automatic rule and the legal transition graph.
//!
//! ```text
//! pending ⇄ in_progress ⇄ under_review → approved | rejected | suspended
//! rejected → in_progress          (resubmission, if allowed)
//! suspended → pending | in_progress | under_review   (reinstatement)
//! suspended → rejected     (a suspended rejection stays rejected)
//! any except approved/suspended → suspended
//! ```

use credo_types::{Timestamp, VerificationStatus};

use crate::error::VerificationError;
use crate::history::{Actor, HistoryAction, HistoryStep};
use crate::record::{CompletedSteps, VerificationRecord};

pub struct StatusTransitioner;

impl StatusTransitioner {
    /// The status implied by the completion flags alone.
    pub fn automatic_status(steps: &CompletedSteps) -> VerificationStatus {
        if steps.all() {
            VerificationStatus::UnderReview
        } else if steps.none() {
            VerificationStatus::Pending
        } else {
            VerificationStatus::InProgress
        }
    }

    /// Whether `from → to` is an edge of the status graph.
    pub fn is_legal(from: VerificationStatus, to: VerificationStatus) -> bool {
        use VerificationStatus::*;
        if from == to {
            return false;
        }
        match (from, to) {
            (Pending | InProgress | UnderReview, Pending | InProgress | UnderReview) => true,
            (UnderReview, Approved | Rejected) => true,
            (Pending | InProgress | UnderReview | Rejected, Suspended) => true,
            (Rejected, InProgress) => true,
            (Suspended, Pending | InProgress | UnderReview | Rejected) => true,
            _ => false,
        }
    }

    pub fn ensure_legal(
        from: VerificationStatus,
        to: VerificationStatus,
        action: &'static str,
    ) -> Result<(), VerificationError> {
        if Self::is_legal(from, to) {
            Ok(())
        } else {
            Err(VerificationError::IllegalStatusTransition { from, action })
        }
    }

    /// Apply the automatic rule unless an admin decision holds the status.
    ///
    /// Appends a `status_changed` history entry when the status moves.
    /// Returns the previous status if it changed.
    pub fn apply(record: &mut VerificationRecord, now: Timestamp) -> Option<VerificationStatus> {
        if record.status.is_admin_decided() {
            return None;
        }
        let next = Self::automatic_status(&record.completed_steps);
        if next == record.status {
            return None;
        }
        let previous = record.status;
        record.status = next;
        record.log(
            HistoryStep::Overall,
            HistoryAction::StatusChanged,
            next.as_str(),
            Some(format!("{previous} -> {next}")),
            Actor::System,
            now,
        );
        Some(previous)
    }
}
