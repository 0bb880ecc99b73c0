//! Campaign configuration
//!
//! All tunables are read once at startup into a [`CampaignConfig`] value and
//! passed down explicitly; no component reads the environment on its own.
//!
//! ## Configuration Sources
//! Values are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Environment variables take precedence over .env file values.
//!
//! ## Required Keys
//! - `SENDER_EMAIL`: sender address, also the SMTP user
//! - `SENDER_PASSWORD`: SMTP password or app password

use rand::Rng;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{OutreachError, OutreachResult};
use crate::traits::SenderIdentity;

const DEFAULT_STORE_PATH: &str = "contacts.json";
const DEFAULT_AUDIT_LOG_PATH: &str = "outbox_log.jsonl";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_RESUME_PDF_PATH: &str = "./Resume.pdf";
const DEFAULT_ATTACHMENT_PREFIX: &str = "Resume";
const DEFAULT_SESSION_DURATIONS_MIN: &str = "120,60,120";
/// Longest accepted session, one week
const MAX_SESSION_MINUTES: u64 = 7 * 24 * 60;
const DEFAULT_PER_SESSION: (usize, usize) = (15, 25);
const DEFAULT_DELAY_SECONDS: (u64, u64) = (120, 360);
const DEFAULT_SESSION_GAP_SECONDS: (u64, u64) = (60, 180);

/// Extra 0..=59 seconds added on top of every base delay
pub const DELAY_JITTER_MAX_SECONDS: u64 = 59;

pub const DEFAULT_SUBJECT_TEMPLATE: &str = "Internship application – {company}";

pub const DEFAULT_BODY_TEMPLATE_LINK: &str = "{greeting}\n\n\
I'm a final-year student and I'd love to be considered for an internship with {company}.\n\
Here's my resume: {resume_link}\n\n\
Thank you for your time!";

pub const DEFAULT_BODY_TEMPLATE_ATTACH: &str = "{greeting}\n\n\
I'm a final-year student and I'd love to be considered for an internship with {company}.\n\
I've attached my resume for your review.\n\n\
Thank you for your time!";

/// Closed integer range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub fn new(min: usize, max: usize) -> OutreachResult<Self> {
        if min > max {
            return Err(OutreachError::config(
                "count range",
                format!("min {min} is greater than max {max}"),
            ));
        }
        Ok(Self { min, max })
    }

    /// Draw uniformly from the closed range
    pub fn draw<G: Rng + ?Sized>(&self, rng: &mut G) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

/// Closed range of whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondsRange {
    pub min: u64,
    pub max: u64,
}

impl SecondsRange {
    pub fn new(min: u64, max: u64) -> OutreachResult<Self> {
        if min > max {
            return Err(OutreachError::config(
                "seconds range",
                format!("min {min} is greater than max {max}"),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn draw<G: Rng + ?Sized>(&self, rng: &mut G) -> Duration {
        Duration::from_secs(rng.gen_range(self.min..=self.max))
    }
}

/// Local time-of-day window `[start_hour, end_hour)` a session may start in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl HourWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> OutreachResult<Self> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(OutreachError::config(
                "SESSION_START_WINDOWS",
                format!("invalid hour window {start_hour}-{end_hour}"),
            ));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }
}

impl FromStr for HourWindow {
    type Err = OutreachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.trim().split_once('-').ok_or_else(|| {
            OutreachError::config("SESSION_START_WINDOWS", format!("expected START-END, got '{s}'"))
        })?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|_| {
                OutreachError::config("SESSION_START_WINDOWS", format!("invalid hour '{part}'"))
            })
        };
        HourWindow::new(parse(start)?, parse(end)?)
    }
}

/// One session of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSpec {
    pub duration: Duration,
    pub start_window: Option<HourWindow>,
}

/// Inter-send delay parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub delay: SecondsRange,
    pub jitter_max_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
}

/// Inputs for the message composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSettings {
    pub subject: String,
    pub body_link: String,
    pub body_attachment: String,
    pub resume_link: String,
    pub resume_pdf_path: PathBuf,
    pub attachment_prefix: String,
}

/// Secret value that never shows up in debug output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

/// Where the snapshot and audit log live
///
/// Resolvable without credentials, for commands that never send mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub store: PathBuf,
    pub audit_log: PathBuf,
}

impl StoragePaths {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            store: PathBuf::from(get("CONTACTS_STORE_PATH").unwrap_or_else(|| DEFAULT_STORE_PATH.to_string())),
            audit_log: PathBuf::from(
                get("OUTBOX_LOG_PATH").unwrap_or_else(|| DEFAULT_AUDIT_LOG_PATH.to_string()),
            ),
        }
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(mut self, store: Option<PathBuf>, audit_log: Option<PathBuf>) -> Self {
        if let Some(store) = store {
            self.store = store;
        }
        if let Some(audit_log) = audit_log {
            self.audit_log = audit_log;
        }
        self
    }
}

/// Everything the campaign needs, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConfig {
    pub store_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub sender: SenderIdentity,
    pub sender_password: Secret,
    pub summary_recipient: Option<String>,
    pub smtp: SmtpSettings,
    pub templates: TemplateSettings,
    pub sessions: Vec<SessionSpec>,
    pub per_session: CountRange,
    pub pacing: PacingConfig,
    pub session_gap: SecondsRange,
    pub daily_target: Option<usize>,
    pub max_consecutive_failures: Option<u32>,
}

/// Load `.env` into the process environment if one is present
///
/// Silently does nothing when no file is found.
pub fn load_dotenv() {
    let _ = dotenv::dotenv();
}

impl CampaignConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> OutreachResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> OutreachResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sender_address = get("SENDER_EMAIL").ok_or_else(|| OutreachError::MissingCredential {
            name: "SENDER_EMAIL".to_string(),
        })?;
        let sender_password = get("SENDER_PASSWORD").ok_or_else(|| OutreachError::MissingCredential {
            name: "SENDER_PASSWORD".to_string(),
        })?;

        let durations = parse_list::<u64>(
            "SESSION_DURATIONS_MIN",
            &get("SESSION_DURATIONS_MIN").unwrap_or_else(|| DEFAULT_SESSION_DURATIONS_MIN.to_string()),
        )?;
        if durations.is_empty() || durations.contains(&0) {
            return Err(OutreachError::config(
                "SESSION_DURATIONS_MIN",
                "at least one session with a non-zero duration is required",
            ));
        }
        if let Some(&minutes) = durations.iter().find(|&&m| m > MAX_SESSION_MINUTES) {
            return Err(OutreachError::config(
                "SESSION_DURATIONS_MIN",
                format!("{minutes} minutes exceeds the {MAX_SESSION_MINUTES} minute limit"),
            ));
        }

        let windows = match get("SESSION_START_WINDOWS") {
            Some(raw) => {
                let windows = raw
                    .split(',')
                    .map(HourWindow::from_str)
                    .collect::<OutreachResult<Vec<_>>>()?;
                if windows.len() != durations.len() {
                    return Err(OutreachError::config(
                        "SESSION_START_WINDOWS",
                        format!(
                            "{} windows given for {} sessions",
                            windows.len(),
                            durations.len()
                        ),
                    ));
                }
                windows.into_iter().map(Some).collect()
            }
            None => vec![None; durations.len()],
        };

        let sessions = durations
            .into_iter()
            .zip(windows)
            .map(|(minutes, start_window)| SessionSpec {
                duration: Duration::from_secs(minutes * 60),
                start_window,
            })
            .collect();

        let per_session = CountRange::new(
            parse_or("PER_SESSION_MIN", get("PER_SESSION_MIN"), DEFAULT_PER_SESSION.0)?,
            parse_or("PER_SESSION_MAX", get("PER_SESSION_MAX"), DEFAULT_PER_SESSION.1)?,
        )
        .map_err(|e| rename_field(e, "PER_SESSION_MIN/PER_SESSION_MAX"))?;

        let delay = SecondsRange::new(
            parse_or("MIN_DELAY_SECONDS", get("MIN_DELAY_SECONDS"), DEFAULT_DELAY_SECONDS.0)?,
            parse_or("MAX_DELAY_SECONDS", get("MAX_DELAY_SECONDS"), DEFAULT_DELAY_SECONDS.1)?,
        )
        .map_err(|e| rename_field(e, "MIN_DELAY_SECONDS/MAX_DELAY_SECONDS"))?;

        let session_gap = SecondsRange::new(
            parse_or(
                "SESSION_GAP_MIN_SECONDS",
                get("SESSION_GAP_MIN_SECONDS"),
                DEFAULT_SESSION_GAP_SECONDS.0,
            )?,
            parse_or(
                "SESSION_GAP_MAX_SECONDS",
                get("SESSION_GAP_MAX_SECONDS"),
                DEFAULT_SESSION_GAP_SECONDS.1,
            )?,
        )
        .map_err(|e| rename_field(e, "SESSION_GAP_MIN_SECONDS/SESSION_GAP_MAX_SECONDS"))?;

        let daily_target = parse_optional::<usize>("DAILY_TARGET", get("DAILY_TARGET"))?;
        if daily_target == Some(0) {
            return Err(OutreachError::config("DAILY_TARGET", "must be greater than zero"));
        }

        let max_consecutive_failures =
            parse_optional::<u32>("MAX_CONSECUTIVE_FAILURES", get("MAX_CONSECUTIVE_FAILURES"))?;
        if max_consecutive_failures == Some(0) {
            return Err(OutreachError::config(
                "MAX_CONSECUTIVE_FAILURES",
                "must be greater than zero",
            ));
        }

        let paths = StoragePaths::from_lookup(&lookup);

        Ok(Self {
            store_path: paths.store,
            audit_log_path: paths.audit_log,
            sender: SenderIdentity {
                address: sender_address,
                display_name: get("SENDER_NAME"),
            },
            sender_password: Secret::new(sender_password),
            summary_recipient: get("SUMMARY_EMAIL"),
            smtp: SmtpSettings {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_or("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
            },
            templates: TemplateSettings {
                subject: get("SUBJECT_TEMPLATE")
                    .map(|t| unescape(&t))
                    .unwrap_or_else(|| DEFAULT_SUBJECT_TEMPLATE.to_string()),
                body_link: get("BODY_TEMPLATE_LINK")
                    .map(|t| unescape(&t))
                    .unwrap_or_else(|| DEFAULT_BODY_TEMPLATE_LINK.to_string()),
                body_attachment: get("BODY_TEMPLATE_ATTACH")
                    .map(|t| unescape(&t))
                    .unwrap_or_else(|| DEFAULT_BODY_TEMPLATE_ATTACH.to_string()),
                resume_link: get("DRIVE_RESUME_LINK").unwrap_or_default(),
                resume_pdf_path: PathBuf::from(
                    get("RESUME_PDF_PATH").unwrap_or_else(|| DEFAULT_RESUME_PDF_PATH.to_string()),
                ),
                attachment_prefix: get("ATTACHMENT_PREFIX")
                    .unwrap_or_else(|| DEFAULT_ATTACHMENT_PREFIX.to_string()),
            },
            sessions,
            per_session,
            pacing: PacingConfig {
                delay,
                jitter_max_secs: DELAY_JITTER_MAX_SECONDS,
            },
            session_gap,
            daily_target,
            max_consecutive_failures,
        })
    }

    /// Whether sessions wait for time-of-day windows instead of running back to back
    pub fn uses_start_windows(&self) -> bool {
        self.sessions.iter().any(|s| s.start_window.is_some())
    }
}

fn parse_or<T: FromStr>(field: &str, raw: Option<String>, default: T) -> OutreachResult<T> {
    Ok(parse_optional(field, raw)?.unwrap_or(default))
}

fn parse_optional<T: FromStr>(field: &str, raw: Option<String>) -> OutreachResult<Option<T>> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| OutreachError::config(field, format!("invalid value '{value}'")))
    })
    .transpose()
}

fn parse_list<T: FromStr>(field: &str, raw: &str) -> OutreachResult<Vec<T>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>()
                .map_err(|_| OutreachError::config(field, format!("invalid entry '{part}'")))
        })
        .collect()
}

fn rename_field(error: OutreachError, field: &str) -> OutreachError {
    match error {
        OutreachError::ConfigurationError { message, .. } => OutreachError::config(field, message),
        other => other,
    }
}

/// `.env` values carry newlines as literal `\n`
fn unescape(template: &str) -> String {
    template.replace("\\n", "\n").replace("\\t", "\t")
}
