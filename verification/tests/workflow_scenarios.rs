//! End-to-end scenarios through `VerificationService`:
//! candidate steps → certificate review → admin decision → storage readback.
//!
//! The nullable clock, code source, notifier and store make every run
//! deterministic; one scenario repeats the flow against LMDB.

use chrono::NaiveDate;
use credo_nullables::{NullClock, NullCodeSource, NullNotifier, NullRecordStore};
use credo_store::{RecordStore, StoreError};
use credo_store_lmdb::LmdbEnvironment;
use credo_types::{
    AdminId, CandidateId, CertificateId, CertificateStatus, CertificateType, Channel,
    DocumentRef, EducationStatus, Timestamp, VerificationParams, VerificationStatus,
};
use credo_verification::{
    Actor, CertificateSubmission, DocumentStep, HistoryAction, IdDocument, IdDocumentType,
    PersonalInfo, ServiceError, Step, VerificationError, VerificationService,
};

// 2024-06-01T00:00:00Z
const START: u64 = 1_717_200_000;

type TestService = VerificationService<NullRecordStore, NullNotifier, NullClock, NullCodeSource>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn service() -> TestService {
    VerificationService::new(
        NullRecordStore::new(),
        NullNotifier::new(),
        NullClock::new(START),
        NullCodeSource::new(["482913", "105577", "733104", "290846"]),
        VerificationParams::default(),
    )
}

fn candidate(name: &str) -> CandidateId {
    CandidateId::new(name).unwrap()
}

fn admin() -> AdminId {
    AdminId::new("admin-ops-1").unwrap()
}

fn personal_info() -> PersonalInfo {
    PersonalInfo {
        first_name: Some("Amara".into()),
        last_name: Some("Okafor".into()),
        date_of_birth: NaiveDate::from_ymd_opt(1988, 3, 14),
        ..Default::default()
    }
}

fn certificate() -> CertificateSubmission {
    CertificateSubmission {
        certificate_type: CertificateType::TeachingCertificate,
        institution: "University of Lagos".into(),
        field_of_study: "Education".into(),
        graduation_year: 2011,
        gpa: Some(4.2),
        document: DocumentRef::new("https://files.example/cert.pdf", "cert-7781"),
    }
}

fn verify_channel(s: &TestService, c: &CandidateId, channel: Channel, destination: &str) {
    s.send_code(c, channel, destination).unwrap();
    let code = s.notifier().last_code(channel).unwrap();
    s.verify_code(c, channel, &code).unwrap();
}

/// Email, phone, personal info, id document and selfie: five of six steps.
fn complete_five_steps(s: &TestService, c: &CandidateId) {
    verify_channel(s, c, Channel::Email, "amara@example.org");
    verify_channel(s, c, Channel::Phone, "+2348012345678");
    s.update_personal_info(c, personal_info()).unwrap();
    s.submit_id_document(
        c,
        IdDocument {
            document_type: IdDocumentType::Passport,
            front: DocumentRef::new("https://files.example/id-front.jpg", "id-f"),
            back: None,
        },
    )
    .unwrap();
    s.record_document_check(c, DocumentStep::IdDocument, true, Actor::System, None)
        .unwrap();
    s.submit_selfie(c, DocumentRef::new("https://files.example/selfie.jpg", "selfie"))
        .unwrap();
    s.record_document_check(c, DocumentStep::Selfie, true, Actor::System, None)
        .unwrap();
}

/// A record with every step complete and one verified certificate.
fn bring_to_review(s: &TestService, c: &CandidateId) -> CertificateId {
    s.start(c).unwrap();
    complete_five_steps(s, c);
    let id = s.submit_certificate(c, certificate()).unwrap();
    s.verify_certificate(c, admin(), id, None).unwrap();
    id
}

// ---------------------------------------------------------------------------
// 1. Progress and automatic status
// ---------------------------------------------------------------------------

#[test]
fn five_steps_then_education_reaches_review() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    complete_five_steps(&s, &c);

    let summary = s.summary(&c).unwrap();
    assert_eq!(summary.progress_percentage, 83);
    assert_eq!(summary.status, VerificationStatus::InProgress);
    assert_eq!(summary.pending_steps, vec![Step::EducationCertificate]);

    let id = s.submit_certificate(&c, certificate()).unwrap();
    s.verify_certificate(&c, admin(), id, Some("registry confirmed".into()))
        .unwrap();

    let summary = s.summary(&c).unwrap();
    assert_eq!(summary.progress_percentage, 100);
    assert_eq!(summary.status, VerificationStatus::UnderReview);
    assert_eq!(summary.education_status, EducationStatus::Approved);
    assert_eq!(summary.certificates.verified, 1);
    assert!(summary.pending_steps.is_empty());

    assert_eq!(s.under_review().unwrap().len(), 1);
}

#[test]
fn pending_certificate_counts_before_review() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    complete_five_steps(&s, &c);
    s.submit_certificate(&c, certificate()).unwrap();

    let summary = s.summary(&c).unwrap();
    assert_eq!(summary.progress_percentage, 100);
    assert_eq!(summary.education_status, EducationStatus::UnderReview);
    assert_eq!(summary.status, VerificationStatus::UnderReview);
}

#[test]
fn approval_path() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);

    s.approve(&c, admin(), Some("welcome aboard".into())).unwrap();
    let record = s.load(&c).unwrap();
    assert_eq!(record.status(), VerificationStatus::Approved);
    assert_eq!(record.admin_review().unwrap().reviewed_by, admin());
    assert!(s.under_review().unwrap().is_empty());

    // Candidate edits are closed once approved.
    let err = s.update_personal_info(&c, personal_info()).unwrap_err();
    assert!(matches!(
        err.as_verification(),
        Some(VerificationError::IllegalStatusTransition {
            from: VerificationStatus::Approved,
            ..
        })
    ));
}

// ---------------------------------------------------------------------------
// 2. Code protocol through the service
// ---------------------------------------------------------------------------

#[test]
fn code_expires_after_ten_minutes_and_one_second() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();

    let expires_at = s.send_code(&c, Channel::Email, "amara@example.org").unwrap();
    assert_eq!(expires_at, Timestamp::new(START + 600));
    let code = s.notifier().last_code(Channel::Email).unwrap();

    s.clock().advance(601);
    let err = s.verify_code(&c, Channel::Email, &code).unwrap_err();
    assert_eq!(
        err.as_verification(),
        Some(&VerificationError::CodeExpired(Channel::Email))
    );
    assert!(!s.load(&c).unwrap().channel(Channel::Email).is_verified);
}

#[test]
fn wrong_attempts_are_persisted_and_lock_the_code() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    s.send_code(&c, Channel::Phone, "+2348012345678").unwrap();
    let code = s.notifier().last_code(Channel::Phone).unwrap();

    for _ in 0..3 {
        let err = s.verify_code(&c, Channel::Phone, "000000").unwrap_err();
        assert!(matches!(
            err.as_verification(),
            Some(VerificationError::CodeMismatch { .. })
        ));
    }
    let record = s.load(&c).unwrap();
    assert_eq!(record.channel(Channel::Phone).attempts, 3);
    assert_eq!(
        record
            .history()
            .with_action(HistoryAction::VerifyCode)
            .filter(|e| e.status == "failed")
            .count(),
        3
    );

    let err = s.verify_code(&c, Channel::Phone, &code).unwrap_err();
    assert_eq!(
        err.as_verification(),
        Some(&VerificationError::AttemptsExceeded(Channel::Phone))
    );

    s.clock().advance(60);
    s.send_code(&c, Channel::Phone, "+2348012345678").unwrap();
    let fresh = s.notifier().last_code(Channel::Phone).unwrap();
    s.verify_code(&c, Channel::Phone, &fresh).unwrap();
    assert!(s.load(&c).unwrap().completed_steps().phone);
}

#[test]
fn failed_delivery_keeps_previous_state() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    let before = s.load(&c).unwrap();

    s.notifier().set_failing(true);
    let err = s.send_code(&c, Channel::Email, "amara@example.org").unwrap_err();
    assert!(matches!(err, ServiceError::Notify(_)));

    let after = s.load(&c).unwrap();
    assert_eq!(after, before);
    assert_eq!(after.version(), before.version());
    assert!(!after.channel(Channel::Email).has_pending_code());
}

#[test]
fn malformed_destination_is_refused() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    assert!(matches!(
        s.send_code(&c, Channel::Email, "not-an-address"),
        Err(ServiceError::Notify(_))
    ));
    assert!(s.notifier().sent().is_empty());
}

// ---------------------------------------------------------------------------
// 3. Admin decisions
// ---------------------------------------------------------------------------

#[test]
fn approving_a_pending_record_changes_nothing() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    let before = s.load(&c).unwrap();

    let err = s.approve(&c, admin(), None).unwrap_err();
    assert_eq!(
        err.as_verification(),
        Some(&VerificationError::IllegalStatusTransition {
            from: VerificationStatus::Pending,
            action: "approve",
        })
    );
    assert_eq!(s.load(&c).unwrap(), before);
}

#[test]
fn rejection_with_resubmission_reopens_the_record() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);

    s.reject(&c, admin(), "passport photo unreadable", true).unwrap();
    assert_eq!(s.summary(&c).unwrap().status, VerificationStatus::Rejected);

    s.submit_id_document(
        &c,
        IdDocument {
            document_type: IdDocumentType::Passport,
            front: DocumentRef::new("https://files.example/id-front-2.jpg", "id-f2"),
            back: None,
        },
    )
    .unwrap();

    let record = s.load(&c).unwrap();
    assert_eq!(record.status(), VerificationStatus::InProgress);
    assert!(!record.resubmission_allowed());
    assert_eq!(record.progress_percentage(), 83);
    assert_eq!(record.history().with_action(HistoryAction::Resubmit).count(), 1);
}

#[test]
fn resubmission_that_keeps_every_step_returns_to_review() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);
    s.reject(&c, admin(), "name does not match certificate", true)
        .unwrap();

    let mut corrected = personal_info();
    corrected.last_name = Some("Okafor-Bello".into());
    s.update_personal_info(&c, corrected).unwrap();

    let record = s.load(&c).unwrap();
    assert_eq!(record.status(), VerificationStatus::UnderReview);
    assert_eq!(record.progress_percentage(), 100);
    assert!(!record.resubmission_allowed());

    let entries = record.history().entries();
    let reopened = entries
        .iter()
        .position(|e| e.action == HistoryAction::Resubmit)
        .unwrap();
    assert_eq!(entries[reopened].status, "in_progress");
    let last = entries.last().unwrap();
    assert_eq!(last.action, HistoryAction::StatusChanged);
    assert_eq!(last.status, "under_review");
    assert!(reopened < entries.len() - 1);

    assert_eq!(s.under_review().unwrap().len(), 1);
}

#[test]
fn rejection_without_resubmission_is_final_for_the_candidate() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);
    s.reject(&c, admin(), "credential could not be confirmed", false)
        .unwrap();

    let err = s
        .submit_selfie(&c, DocumentRef::new("https://files.example/s2.jpg", "s2"))
        .unwrap_err();
    assert!(matches!(
        err.as_verification(),
        Some(VerificationError::IllegalStatusTransition { .. })
    ));
}

#[test]
fn timed_suspension_lapses() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    s.update_personal_info(&c, personal_info()).unwrap();
    s.suspend(&c, admin(), "duplicate account check", Some(1)).unwrap();
    assert_eq!(s.summary(&c).unwrap().status, VerificationStatus::Suspended);

    s.clock().advance(86_400);
    assert_eq!(s.summary(&c).unwrap().status, VerificationStatus::InProgress);

    s.send_code(&c, Channel::Email, "amara@example.org").unwrap();
    let record = s.load(&c).unwrap();
    assert_eq!(record.status(), VerificationStatus::InProgress);
    assert!(record.suspension().is_none());
    let lapsed = record
        .history()
        .with_action(HistoryAction::SuspensionExpired)
        .next()
        .unwrap();
    assert_eq!(lapsed.performed_by, Actor::System);
}

#[test]
fn reinstatement_restores_automatic_status() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);
    s.suspend(&c, admin(), "complaint received", None).unwrap();
    s.reinstate(&c, admin(), Some("complaint unfounded".into()))
        .unwrap();
    assert_eq!(s.summary(&c).unwrap().status, VerificationStatus::UnderReview);
}

#[test]
fn lapsed_suspension_keeps_a_final_rejection() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);
    s.reject(&c, admin(), "credential could not be confirmed", false)
        .unwrap();
    s.suspend(&c, admin(), "fraud referral", Some(1)).unwrap();

    s.clock().advance(86_400);
    assert_eq!(s.summary(&c).unwrap().status, VerificationStatus::Rejected);
    assert!(s.under_review().unwrap().is_empty());

    let err = s
        .submit_selfie(&c, DocumentRef::new("https://files.example/s3.jpg", "s3"))
        .unwrap_err();
    assert_eq!(
        err.as_verification(),
        Some(&VerificationError::IllegalStatusTransition {
            from: VerificationStatus::Rejected,
            action: "submit a selfie",
        })
    );

    let err = s
        .request_more_info(&c, admin(), "anything to add?")
        .unwrap_err();
    assert!(matches!(
        err.as_verification(),
        Some(VerificationError::IllegalStatusTransition {
            from: VerificationStatus::Rejected,
            ..
        })
    ));
}

#[test]
fn reinstating_a_rejected_record_keeps_the_rejection() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);
    s.reject(&c, admin(), "credential could not be confirmed", false)
        .unwrap();
    s.suspend(&c, admin(), "fraud referral", None).unwrap();
    s.reinstate(&c, admin(), None).unwrap();

    let record = s.load(&c).unwrap();
    assert_eq!(record.status(), VerificationStatus::Rejected);
    assert!(!record.resubmission_allowed());
    assert!(s.under_review().unwrap().is_empty());
}

#[test]
fn certificate_decisions_are_single_shot() {
    let s = service();
    let c = candidate("amara");
    let id = bring_to_review(&s, &c);

    let err = s
        .reject_certificate(&c, admin(), id, "second thoughts")
        .unwrap_err();
    assert_eq!(
        err.as_verification(),
        Some(&VerificationError::AlreadyReviewed {
            certificate: id,
            status: CertificateStatus::Verified,
        })
    );

    s.review_certificate(
        &c,
        admin(),
        id,
        CertificateStatus::NeedsClarification,
        Some("send the transcript".into()),
        true,
    )
    .unwrap();
    let summary = s.summary(&c).unwrap();
    assert_eq!(summary.certificates.needs_clarification, 1);
    assert_eq!(summary.education_status, EducationStatus::Incomplete);
    // Education no longer counts, so the record falls back to in_progress.
    assert_eq!(summary.status, VerificationStatus::InProgress);
}

#[test]
fn history_attributes_every_actor() {
    let s = service();
    let c = candidate("amara");
    bring_to_review(&s, &c);
    s.request_more_info(&c, admin(), "please upload a clearer selfie")
        .unwrap();

    let history = s.history(&c).unwrap();
    assert!(history.iter().any(|e| e.performed_by == Actor::Candidate(c.clone())));
    assert!(history.iter().any(|e| e.performed_by == Actor::System));
    let last = history.last().unwrap();
    assert_eq!(last.action, HistoryAction::RequestInfo);
    assert_eq!(last.performed_by, Actor::Admin(admin()));
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

// ---------------------------------------------------------------------------
// 4. Storage boundary
// ---------------------------------------------------------------------------

#[test]
fn one_record_per_candidate() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    assert!(matches!(s.start(&c), Err(ServiceError::RecordExists(_))));
    assert!(matches!(
        s.summary(&candidate("nobody")),
        Err(ServiceError::RecordNotFound(_))
    ));
}

#[test]
fn stale_write_is_refused() {
    let s = service();
    let c = candidate("amara");
    s.start(&c).unwrap();
    let stale = s.load(&c).unwrap();
    s.update_personal_info(&c, personal_info()).unwrap();

    let err = s
        .store()
        .put_record(&c, Some(stale.version()), b"stale")
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert!(s.load(&c).unwrap().completed_steps().personal_info);
}

#[test]
fn lmdb_backed_service_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let c = candidate("amara");

    {
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env");
        let s = VerificationService::new(
            env.record_store(),
            NullNotifier::new(),
            NullClock::new(START),
            NullCodeSource::constant("314159"),
            VerificationParams::default(),
        );
        s.start(&c).unwrap();
        s.send_code(&c, Channel::Email, "amara@example.org").unwrap();
        s.verify_code(&c, Channel::Email, "314159").unwrap();
        s.update_personal_info(&c, personal_info()).unwrap();
    }

    let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("reopen env");
    let s = VerificationService::new(
        env.record_store(),
        NullNotifier::new(),
        NullClock::new(START + 5),
        NullCodeSource::constant("000000"),
        VerificationParams::default(),
    );
    let summary = s.summary(&c).unwrap();
    assert_eq!(summary.progress_percentage, 33);
    assert_eq!(summary.status, VerificationStatus::InProgress);
    assert_eq!(s.load(&c).unwrap().version(), 4);
    assert_eq!(s.store().list_candidates().unwrap(), vec![c]);
}
