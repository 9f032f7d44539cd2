//! Load → mutate → save composition over the storage, delivery and clock
//! boundaries.
//!
//! Every call reads the candidate's record, runs one workflow operation,
//! and writes the record back with the version it was read at. Two callers
//! racing on one candidate cannot both win: the second save fails with
//! [`StoreError::Conflict`] and the caller retries from a fresh read.

use credo_notify::{validate_destination, CodeNotifier};
use credo_otp::CodeSource;
use credo_store::{RecordStore, StoreError};
use credo_types::{
    AdminId, CandidateId, CertificateId, CertificateStatus, Channel, Clock, DocumentRef,
    Timestamp, VerificationParams, VerificationStatus,
};

use crate::admin::{AdminActionHandler, DocumentStep};
use crate::candidate::{CandidateActions, IdDocument};
use crate::certificate::CertificateSubmission;
use crate::error::{ServiceError, VerificationError};
use crate::history::{Actor, HistoryEntry};
use crate::record::{PersonalInfo, VerificationRecord};
use crate::step_verifier::StepVerifier;
use crate::summary::VerificationSummary;

pub struct VerificationService<S, N, C, R> {
    store: S,
    notifier: N,
    clock: C,
    codes: R,
    params: VerificationParams,
    steps: StepVerifier,
    candidate: CandidateActions,
    admin: AdminActionHandler,
}

impl<S, N, C, R> VerificationService<S, N, C, R>
where
    S: RecordStore,
    N: CodeNotifier,
    C: Clock,
    R: CodeSource,
{
    pub fn new(store: S, notifier: N, clock: C, codes: R, params: VerificationParams) -> Self {
        Self {
            steps: StepVerifier::new(&params),
            candidate: CandidateActions::new(&params),
            admin: AdminActionHandler::new(&params),
            store,
            notifier,
            clock,
            codes,
            params,
        }
    }

    pub fn params(&self) -> &VerificationParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Create the record for a candidate. Fails if one already exists.
    pub fn start(&self, candidate: &CandidateId) -> Result<VerificationRecord, ServiceError> {
        let mut record = VerificationRecord::new(candidate.clone(), self.clock.now());
        match self.save(&mut record) {
            Ok(()) => {
                tracing::info!(candidate = %candidate, "verification record created");
                Ok(record)
            }
            Err(ServiceError::Store(StoreError::Duplicate(_))) => {
                Err(ServiceError::RecordExists(candidate.clone()))
            }
            Err(e) => Err(e),
        }
    }

    /// The stored record, as last saved.
    pub fn load(&self, candidate: &CandidateId) -> Result<VerificationRecord, ServiceError> {
        let stored = self
            .store
            .get_record(candidate)?
            .ok_or_else(|| ServiceError::RecordNotFound(candidate.clone()))?;
        let mut record: VerificationRecord = bincode::deserialize(&stored.data)?;
        record.version = stored.version;
        Ok(record)
    }

    fn save(&self, record: &mut VerificationRecord) -> Result<(), ServiceError> {
        let bytes = bincode::serialize(record)?;
        let expected = (record.version > 0).then_some(record.version);
        let version = self.store.put_record(&record.candidate, expected, &bytes)?;
        record.version = version;
        Ok(())
    }

    /// Run one operation against the stored record and persist the outcome.
    fn mutate<T>(
        &self,
        candidate: &CandidateId,
        operation: &'static str,
        f: impl FnOnce(&mut VerificationRecord, Timestamp) -> Result<T, VerificationError>,
    ) -> Result<T, ServiceError> {
        let now = self.clock.now();
        let mut record = self.load(candidate)?;
        match f(&mut record, now) {
            Ok(value) => {
                self.save(&mut record)?;
                tracing::debug!(
                    candidate = %candidate,
                    operation,
                    status = %record.status(),
                    progress = record.progress_percentage(),
                    version = record.version(),
                    "record updated"
                );
                Ok(value)
            }
            Err(e) if e.commits_record() => {
                self.save(&mut record)?;
                tracing::debug!(candidate = %candidate, operation, error = %e, "failure recorded");
                Err(e.into())
            }
            Err(e) => {
                tracing::debug!(candidate = %candidate, operation, error = %e, "operation refused");
                Err(e.into())
            }
        }
    }

    /// Issue a code and deliver it. Returns when the code expires.
    ///
    /// The record is only saved once delivery has succeeded, so a failed
    /// send leaves the previous code cycle intact.
    pub fn send_code(
        &self,
        candidate: &CandidateId,
        channel: Channel,
        destination: &str,
    ) -> Result<Timestamp, ServiceError> {
        validate_destination(channel, destination)?;
        let now = self.clock.now();
        let mut record = self.load(candidate)?;
        let code = self
            .steps
            .generate_code(&mut record, channel, destination, &self.codes, now)?;

        if let Err(e) = self.notifier.send_code(channel, destination.trim(), &code) {
            tracing::warn!(candidate = %candidate, %channel, error = %e, "code delivery failed");
            return Err(e.into());
        }
        self.save(&mut record)?;

        let expires_at = now.plus_secs(self.params.code_ttl_secs);
        tracing::info!(candidate = %candidate, %channel, source = self.codes.name(), "code sent");
        Ok(expires_at)
    }

    pub fn verify_code(
        &self,
        candidate: &CandidateId,
        channel: Channel,
        code: &str,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "verify_code", |r, now| {
            self.steps.verify_code(r, channel, code, now)
        })?;
        tracing::info!(candidate = %candidate, %channel, "channel verified");
        Ok(())
    }

    pub fn update_personal_info(
        &self,
        candidate: &CandidateId,
        info: PersonalInfo,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "update_personal_info", |r, now| {
            self.candidate.update_personal_info(r, info, now)
        })
    }

    pub fn submit_id_document(
        &self,
        candidate: &CandidateId,
        document: IdDocument,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "submit_id_document", |r, now| {
            self.candidate.submit_id_document(r, document, now)
        })
    }

    pub fn submit_selfie(&self, candidate: &CandidateId, image: DocumentRef) -> Result<(), ServiceError> {
        self.mutate(candidate, "submit_selfie", |r, now| {
            self.candidate.submit_selfie(r, image, now)
        })
    }

    /// Submit a certificate under a freshly generated id.
    pub fn submit_certificate(
        &self,
        candidate: &CandidateId,
        submission: CertificateSubmission,
    ) -> Result<CertificateId, ServiceError> {
        let id = CertificateId::generate();
        self.mutate(candidate, "submit_certificate", |r, now| {
            self.candidate.submit_certificate(r, submission, id, now)
        })
    }

    pub fn record_document_check(
        &self,
        candidate: &CandidateId,
        step: DocumentStep,
        verified: bool,
        performed_by: Actor,
        notes: Option<String>,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "record_document_check", |r, now| {
            self.admin
                .record_document_check(r, step, verified, performed_by, notes, now)
        })
    }

    pub fn approve(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        feedback: Option<String>,
    ) -> Result<(), ServiceError> {
        let by = admin.clone();
        self.mutate(candidate, "approve", |r, now| {
            self.admin.approve(r, admin, feedback, now)
        })?;
        tracing::info!(candidate = %candidate, admin = %by, "verification approved");
        Ok(())
    }

    pub fn reject(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        reason: &str,
        allow_resubmission: bool,
    ) -> Result<(), ServiceError> {
        let by = admin.clone();
        self.mutate(candidate, "reject", |r, now| {
            self.admin.reject(r, admin, reason, allow_resubmission, now)
        })?;
        tracing::info!(
            candidate = %candidate,
            admin = %by,
            allow_resubmission,
            "verification rejected"
        );
        Ok(())
    }

    pub fn request_more_info(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        message: &str,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "request_more_info", |r, now| {
            self.admin.request_more_info(r, admin, message, now)
        })
    }

    pub fn suspend(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        reason: &str,
        duration_days: Option<u32>,
    ) -> Result<(), ServiceError> {
        let by = admin.clone();
        self.mutate(candidate, "suspend", |r, now| {
            self.admin.suspend(r, admin, reason, duration_days, now)
        })?;
        tracing::warn!(candidate = %candidate, admin = %by, ?duration_days, "verification suspended");
        Ok(())
    }

    pub fn reinstate(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        note: Option<String>,
    ) -> Result<(), ServiceError> {
        let by = admin.clone();
        self.mutate(candidate, "reinstate", |r, now| {
            self.admin.reinstate(r, admin, note, now)
        })?;
        tracing::info!(candidate = %candidate, admin = %by, "verification reinstated");
        Ok(())
    }

    pub fn review_certificate(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        certificate_id: CertificateId,
        new_status: CertificateStatus,
        notes: Option<String>,
        allow_rereview: bool,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "review_certificate", |r, now| {
            self.admin.review_certificate(
                r,
                admin,
                certificate_id,
                new_status,
                notes,
                allow_rereview,
                now,
            )
        })
    }

    pub fn verify_certificate(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        certificate_id: CertificateId,
        notes: Option<String>,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "verify_certificate", |r, now| {
            self.admin.verify_certificate(r, admin, certificate_id, notes, now)
        })
    }

    pub fn reject_certificate(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        certificate_id: CertificateId,
        reason: &str,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "reject_certificate", |r, now| {
            self.admin.reject_certificate(r, admin, certificate_id, reason, now)
        })
    }

    pub fn request_certificate_clarification(
        &self,
        candidate: &CandidateId,
        admin: AdminId,
        certificate_id: CertificateId,
        message: &str,
    ) -> Result<(), ServiceError> {
        self.mutate(candidate, "request_certificate_clarification", |r, now| {
            self.admin
                .request_certificate_clarification(r, admin, certificate_id, message, now)
        })
    }

    pub fn summary(&self, candidate: &CandidateId) -> Result<VerificationSummary, ServiceError> {
        let record = self.load(candidate)?;
        Ok(VerificationSummary::from_record(&record, self.clock.now()))
    }

    pub fn history(&self, candidate: &CandidateId) -> Result<Vec<HistoryEntry>, ServiceError> {
        Ok(self.load(candidate)?.history().entries().to_vec())
    }

    /// Summaries of every record waiting for an admin decision, in candidate order.
    pub fn under_review(&self) -> Result<Vec<VerificationSummary>, ServiceError> {
        let now = self.clock.now();
        let mut queue = Vec::new();
        for candidate in self.store.list_candidates()? {
            let summary = VerificationSummary::from_record(&self.load(&candidate)?, now);
            if summary.status == VerificationStatus::UnderReview {
                queue.push(summary);
            }
        }
        Ok(queue)
    }
}
