//! Main entry point for the outreach binary
//!
//! Wires the real services into a campaign run, imports a spreadsheet
//! baseline, or reports the current store status.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use outreach::{
    config::{self, CampaignConfig, StoragePaths},
    is_complete,
    services::{
        spreadsheet, RealAuditLog, RealContactRepository, SmtpMailTransport, SystemClock,
        TemplateComposer,
    },
    Campaign, ContactRepository, ContactStore, OutreachResult,
};
use shared::{logging, run_debug, run_info, RunId};

/// Paced, resumable outreach to company HR contacts
#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Sends paced outreach mail to HR contacts and tracks progress per slot")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Contact store path (overrides CONTACTS_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Audit log path (overrides OUTBOX_LOG_PATH)
    #[arg(long, global = true)]
    pub audit_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the configured sessions against the contact store
    Run,
    /// Build the contact store from a spreadsheet
    Import {
        /// Workbook to read (.xlsx, .xls, .ods)
        #[arg(long)]
        xlsx: PathBuf,

        /// Sheet name, defaults to the first sheet
        #[arg(long)]
        sheet: Option<String>,

        /// Replace an existing contact store
        #[arg(long)]
        force: bool,
    },
    /// Print per-status counts and whether the campaign is complete
    Status,
}

#[tokio::main]
async fn main() -> OutreachResult<()> {
    let args = Args::parse();

    RunId::init();
    logging::init_tracing_with_level(Some(&args.log_level));
    config::load_dotenv();

    let paths = StoragePaths::from_env().with_overrides(args.store.clone(), args.audit_log.clone());

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(paths).await,
        Command::Import { xlsx, sheet, force } => import(paths, xlsx, sheet, force).await,
        Command::Status => status(paths).await,
    }
}

async fn run(paths: StoragePaths) -> OutreachResult<()> {
    let mut config = CampaignConfig::from_env()?;
    config.store_path = paths.store;
    config.audit_log_path = paths.audit_log;

    run_debug!(
        "Sessions: {:?}, per session {}-{}, delay {}-{}s",
        config
            .sessions
            .iter()
            .map(|s| s.duration.as_secs() / 60)
            .collect::<Vec<_>>(),
        config.per_session.min,
        config.per_session.max,
        config.pacing.delay.min,
        config.pacing.delay.max
    );

    let repository = RealContactRepository::new(config.store_path.clone());
    let audit = RealAuditLog::new(config.audit_log_path.clone());
    let transport = SmtpMailTransport::new(&config.smtp, &config.sender.address, &config.sender_password)?;
    let composer = TemplateComposer::new(config.templates.clone());

    let mut campaign = Campaign::new(config, repository, audit, transport, composer, SystemClock);
    let report = campaign.run().await?;

    logging::log_success(&format!(
        "{} mails sent across {} sessions, campaign {}",
        report.total_sent(),
        report.sessions.len(),
        if report.complete { "complete" } else { "still in progress" }
    ));
    Ok(())
}

async fn import(paths: StoragePaths, xlsx: PathBuf, sheet: Option<String>, force: bool) -> OutreachResult<()> {
    let rows = spreadsheet::read_workbook(&xlsx, sheet.as_deref())?;
    let store = ContactStore::new(rows);
    let repository = RealContactRepository::new(paths.store);
    repository.create(&store, force).await?;

    logging::log_success(&format!(
        "Imported {} companies into {} ({})",
        store.len(),
        repository.path().display(),
        store.status_counts()
    ));
    Ok(())
}

async fn status(paths: StoragePaths) -> OutreachResult<()> {
    let store = RealContactRepository::new(paths.store).load().await?;
    let entries = RealAuditLog::new(paths.audit_log).read_all().await?;

    run_info!("📊 {}", store.status_counts());
    run_info!("📜 {} audit entries", entries.len());
    if let Some(last) = entries.last() {
        run_info!(
            "Last attempt: {} {} <{}> {:?} at {}",
            last.company,
            last.slot,
            last.hr_email,
            last.status,
            last.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if is_complete(&store) {
        logging::log_success("Campaign complete");
    } else {
        run_info!("⏳ {} slots still open", store.status_counts().open());
    }
    Ok(())
}
