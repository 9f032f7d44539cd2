//! credo: command line for instructor verification records.
//!
//! Each invocation opens the LMDB environment in the data directory, runs
//! one workflow operation, and prints the result as JSON on stdout. Logs
//! go to stderr.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use credo_notify::ConsoleNotifier;
use credo_otp::OsCodeSource;
use credo_store_lmdb::{LmdbEnvironment, LmdbRecordStore};
use credo_types::{
    AdminId, CandidateId, CertificateId, CertificateStatus, CertificateType, Channel, Clock,
    DocumentRef, SystemClock,
};
use credo_utils::{format_remaining, init_logging, LogFormat};
use credo_verification::{
    Actor, CertificateSubmission, DocumentStep, IdDocument, IdDocumentType, PersonalInfo,
    PostalAddress, VerificationService,
};
use serde::Serialize;

use crate::config::CliConfig;

type Service = VerificationService<LmdbRecordStore, ConsoleNotifier, SystemClock, OsCodeSource>;

#[derive(Parser)]
#[command(name = "credo", about = "Instructor verification records")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; flags
    /// and environment variables override them.
    #[arg(long, env = "CREDO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the record database.
    #[arg(long, env = "CREDO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in MiB.
    #[arg(long, env = "CREDO_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CREDO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CREDO_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the verification record for a candidate.
    Init { candidate: CandidateId },

    /// Issue and deliver a one-time code.
    SendCode {
        candidate: CandidateId,
        channel: Channel,
        destination: String,
    },

    /// Check a one-time code.
    VerifyCode {
        candidate: CandidateId,
        channel: Channel,
        code: String,
    },

    /// Replace the candidate's personal details.
    PersonalInfo {
        candidate: CandidateId,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Date of birth, YYYY-MM-DD.
        #[arg(long)]
        dob: NaiveDate,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },

    /// Record an identity document upload.
    SubmitId {
        candidate: CandidateId,
        #[arg(long = "type")]
        document_type: IdDocumentType,
        #[arg(long)]
        front_url: String,
        #[arg(long)]
        front_id: String,
        #[arg(long, requires = "back_id")]
        back_url: Option<String>,
        #[arg(long, requires = "back_url")]
        back_id: Option<String>,
    },

    /// Record a selfie upload.
    SubmitSelfie {
        candidate: CandidateId,
        #[arg(long)]
        url: String,
        #[arg(long)]
        storage_id: String,
    },

    /// Record the outcome of an id or selfie check.
    DocumentCheck {
        candidate: CandidateId,
        step: DocumentStep,
        /// Mark the check as failed instead of passed.
        #[arg(long)]
        failed: bool,
        /// Admin overriding the automated check; omitted means the check service.
        #[arg(long)]
        admin: Option<AdminId>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Submit an education certificate.
    SubmitCertificate {
        candidate: CandidateId,
        #[arg(long = "type")]
        certificate_type: CertificateType,
        #[arg(long)]
        institution: String,
        #[arg(long)]
        field: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        gpa: Option<f32>,
        #[arg(long)]
        url: String,
        #[arg(long)]
        storage_id: String,
    },

    /// Decide one certificate.
    ReviewCertificate {
        candidate: CandidateId,
        certificate: CertificateId,
        /// verified, rejected or needs_clarification.
        status: CertificateStatus,
        #[arg(long)]
        admin: AdminId,
        #[arg(long)]
        notes: Option<String>,
        /// Allow changing a certificate that was already decided.
        #[arg(long)]
        rereview: bool,
    },

    /// Approve a record under review.
    Approve {
        candidate: CandidateId,
        #[arg(long)]
        admin: AdminId,
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Reject a record under review.
    Reject {
        candidate: CandidateId,
        #[arg(long)]
        admin: AdminId,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        allow_resubmission: bool,
    },

    /// Ask the candidate for more information.
    RequestInfo {
        candidate: CandidateId,
        #[arg(long)]
        admin: AdminId,
        #[arg(long)]
        message: String,
    },

    /// Suspend a record, indefinitely unless --days is given.
    Suspend {
        candidate: CandidateId,
        #[arg(long)]
        admin: AdminId,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        days: Option<u32>,
    },

    /// Lift a suspension.
    Reinstate {
        candidate: CandidateId,
        #[arg(long)]
        admin: AdminId,
        #[arg(long)]
        note: Option<String>,
    },

    /// Print the candidate-facing summary.
    Summary { candidate: CandidateId },

    /// Print the audit history.
    History { candidate: CandidateId },

    /// List records waiting for an admin decision.
    Queue,

    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(mb) = cli.map_size_mb {
        config.map_size_mb = mb;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn open_service(config: &CliConfig) -> anyhow::Result<Service> {
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening record database in {}", config.data_dir.display()))?;
    tracing::debug!(path = %env.path().display(), "record database open");
    Ok(VerificationService::new(
        env.record_store(),
        ConsoleNotifier,
        SystemClock,
        OsCodeSource,
        config.params.clone(),
    ))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn empty_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let service = open_service(&config)?;
    run(&service, cli.command)
}

fn run(service: &Service, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init { candidate } => {
            service.start(&candidate)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::SendCode {
            candidate,
            channel,
            destination,
        } => {
            let expires_at = service.send_code(&candidate, channel, &destination)?;
            print_json(&serde_json::json!({
                "channel": channel,
                "expires_at": expires_at,
                "expires_in": format_remaining(expires_at, service.clock().now()),
            }))
        }
        Command::VerifyCode {
            candidate,
            channel,
            code,
        } => {
            service.verify_code(&candidate, channel, &code)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::PersonalInfo {
            candidate,
            first_name,
            last_name,
            dob,
            phone,
            street,
            city,
            region,
            postal_code,
            country,
        } => {
            let address = PostalAddress {
                street: empty_to_none(street),
                city: empty_to_none(city),
                region: empty_to_none(region),
                postal_code: empty_to_none(postal_code),
                country: empty_to_none(country),
            };
            let has_address = address != PostalAddress::default();
            service.update_personal_info(
                &candidate,
                PersonalInfo {
                    first_name: Some(first_name),
                    last_name: Some(last_name),
                    date_of_birth: Some(dob),
                    phone_number: phone,
                    address: has_address.then_some(address),
                },
            )?;
            print_json(&service.summary(&candidate)?)
        }
        Command::SubmitId {
            candidate,
            document_type,
            front_url,
            front_id,
            back_url,
            back_id,
        } => {
            let back = back_url.zip(back_id).map(|(url, id)| DocumentRef::new(url, id));
            service.submit_id_document(
                &candidate,
                IdDocument {
                    document_type,
                    front: DocumentRef::new(front_url, front_id),
                    back,
                },
            )?;
            print_json(&service.summary(&candidate)?)
        }
        Command::SubmitSelfie {
            candidate,
            url,
            storage_id,
        } => {
            service.submit_selfie(&candidate, DocumentRef::new(url, storage_id))?;
            print_json(&service.summary(&candidate)?)
        }
        Command::DocumentCheck {
            candidate,
            step,
            failed,
            admin,
            notes,
        } => {
            let performed_by = admin.map_or(Actor::System, Actor::Admin);
            service.record_document_check(&candidate, step, !failed, performed_by, notes)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::SubmitCertificate {
            candidate,
            certificate_type,
            institution,
            field,
            year,
            gpa,
            url,
            storage_id,
        } => {
            let id = service.submit_certificate(
                &candidate,
                CertificateSubmission {
                    certificate_type,
                    institution,
                    field_of_study: field,
                    graduation_year: year,
                    gpa,
                    document: DocumentRef::new(url, storage_id),
                },
            )?;
            print_json(&serde_json::json!({
                "certificate_id": id,
                "summary": service.summary(&candidate)?,
            }))
        }
        Command::ReviewCertificate {
            candidate,
            certificate,
            status,
            admin,
            notes,
            rereview,
        } => {
            service.review_certificate(&candidate, admin, certificate, status, notes, rereview)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::Approve {
            candidate,
            admin,
            feedback,
        } => {
            service.approve(&candidate, admin, feedback)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::Reject {
            candidate,
            admin,
            reason,
            allow_resubmission,
        } => {
            service.reject(&candidate, admin, &reason, allow_resubmission)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::RequestInfo {
            candidate,
            admin,
            message,
        } => {
            service.request_more_info(&candidate, admin, &message)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::Suspend {
            candidate,
            admin,
            reason,
            days,
        } => {
            service.suspend(&candidate, admin, &reason, days)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::Reinstate {
            candidate,
            admin,
            note,
        } => {
            service.reinstate(&candidate, admin, note)?;
            print_json(&service.summary(&candidate)?)
        }
        Command::Summary { candidate } => print_json(&service.summary(&candidate)?),
        Command::History { candidate } => print_json(&service.history(&candidate)?),
        Command::Queue => print_json(&service.under_review()?),
        Command::Config => Ok(()),
    }
}
