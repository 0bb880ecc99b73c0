//! Outreach campaign library
//!
//! Resumable, human-paced mail outreach to the HR contacts of a company
//! table. Scheduling lives in `scheduler`, the run driver in `campaign`, and all
//! I/O sits behind the traits in `traits` with production implementations in
//! `services`.

pub mod campaign;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod traits;

// Re-export commonly used types
pub use campaign::{Campaign, RunReport};
pub use config::{CampaignConfig, StoragePaths};
pub use error::{OutreachError, OutreachResult};
pub use scheduler::{is_complete, select_eligible, SessionOutcome, SessionPlan, StopReason};
pub use state::{ContactStore, StatusCounts};
pub use traits::{AuditSink, Clock, ContactRepository, MailTransport, MessageComposer};
