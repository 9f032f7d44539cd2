//! One-time code protocol for the email and phone steps.
//!
//! Both channels run the same protocol; every side effect stays inside the
//! named channel's sub-object.

use credo_otp::CodeSource;
use credo_types::{Channel, Timestamp, VerificationParams};

use crate::candidate::ensure_candidate_may_edit;
use crate::certificate::CertificateEvaluator;
use crate::error::VerificationError;
use crate::history::{mask_destination, Actor, HistoryAction};
use crate::mutation::apply_mutation;
use crate::record::VerificationRecord;

pub struct StepVerifier {
    params: VerificationParams,
    evaluator: CertificateEvaluator,
}

impl StepVerifier {
    pub fn new(params: &VerificationParams) -> Self {
        Self {
            params: params.clone(),
            evaluator: CertificateEvaluator::new(params),
        }
    }

    /// Issue a fresh code for `channel` and return it for out-of-band delivery.
    ///
    /// Starts a new code cycle: any previous code is replaced and the
    /// attempt counter goes back to zero.
    pub fn generate_code(
        &self,
        record: &mut VerificationRecord,
        channel: Channel,
        destination: &str,
        source: &impl CodeSource,
        now: Timestamp,
    ) -> Result<String, VerificationError> {
        apply_mutation(record, &self.evaluator, now, |r| {
            ensure_candidate_may_edit(r, "request a code", now)?;

            let destination = destination.trim();
            if destination.is_empty() {
                return Err(VerificationError::Validation(format!(
                    "{channel} destination is required"
                )));
            }

            let state = r.channel(channel);
            if state.is_verified {
                return Err(VerificationError::ChannelAlreadyVerified(channel));
            }
            if let Some(sent_at) = state.last_code_sent_at {
                let elapsed = sent_at.elapsed_since(now);
                if elapsed < self.params.resend_cooldown_secs {
                    return Err(VerificationError::ResendTooSoon {
                        channel,
                        retry_after_secs: self.params.resend_cooldown_secs - elapsed,
                    });
                }
            }

            let code = source
                .generate(self.params.code_length)
                .map_err(|e| VerificationError::CodeGeneration(e.to_string()))?;

            let state = r.channel_mut(channel);
            state.destination = Some(destination.to_string());
            state.code = Some(code.clone());
            state.code_expires_at = Some(now.plus_secs(self.params.code_ttl_secs));
            state.attempts = 0;
            state.last_code_sent_at = Some(now);

            let actor = Actor::Candidate(r.candidate.clone());
            r.log(
                channel.into(),
                HistoryAction::SendCode,
                "sent",
                Some(format!("code sent to {}", mask_destination(destination))),
                actor,
                now,
            );
            Ok(code)
        })
    }

    /// Check a candidate-supplied code.
    ///
    /// A wrong code increments the attempt counter and that increment is
    /// kept even though the call fails.
    pub fn verify_code(
        &self,
        record: &mut VerificationRecord,
        channel: Channel,
        candidate_code: &str,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let max_attempts = self.params.max_code_attempts;
        apply_mutation(record, &self.evaluator, now, |r| {
            ensure_candidate_may_edit(r, "verify a code", now)?;
            let actor = Actor::Candidate(r.candidate.clone());

            let state = r.channel_mut(channel);
            let expected = state
                .code
                .clone()
                .ok_or(VerificationError::NoCodeIssued(channel))?;
            if state.code_expires_at.is_some_and(|expires| now > expires) {
                return Err(VerificationError::CodeExpired(channel));
            }
            if state.attempts >= max_attempts {
                return Err(VerificationError::AttemptsExceeded(channel));
            }

            if candidate_code.trim() != expected {
                state.attempts += 1;
                let attempts = state.attempts;
                r.log(
                    channel.into(),
                    HistoryAction::VerifyCode,
                    "failed",
                    Some(format!("attempt {attempts} of {max_attempts}")),
                    actor,
                    now,
                );
                return Err(VerificationError::CodeMismatch {
                    channel,
                    remaining_attempts: max_attempts.saturating_sub(attempts),
                });
            }

            state.is_verified = true;
            state.verified_at = Some(now);
            state.code = None;
            state.code_expires_at = None;
            state.attempts = 0;
            r.log(
                channel.into(),
                HistoryAction::VerifyCode,
                "success",
                None,
                actor,
                now,
            );
            Ok(())
        })
    }
}
