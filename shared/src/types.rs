//! Core types used throughout the outreach campaign

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::SharedError;

/// Number of HR contact slots carried by every company row
pub const SLOTS_PER_ROW: usize = 3;

/// Company name used when the source row has none
pub const UNKNOWN_COMPANY: &str = "UnknownCompany";

/// Global run ID singleton - set once per process
static RUN_ID: OnceLock<RunId> = OnceLock::new();

/// Identifier of one process run, stamped on log lines and audit entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Initialize the global run ID. Later calls return the first value.
    pub fn init() -> &'static RunId {
        RUN_ID.get_or_init(RunId::new)
    }

    /// Get the global run ID, initializing it on first use
    pub fn current() -> &'static RunId {
        Self::init()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "run_{}", &simple[..8])
    }
}

/// Send status of one HR slot
///
/// `Sent` and `NotApplicable` are terminal. Everything else is still owed an
/// attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Unset,
    Pending,
    Sent,
    Failed,
    NotApplicable,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 5] = [
        SlotStatus::Unset,
        SlotStatus::Pending,
        SlotStatus::Sent,
        SlotStatus::Failed,
        SlotStatus::NotApplicable,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, SlotStatus::Sent | SlotStatus::NotApplicable)
    }

    /// Whether a slot in this status may move to `next`
    pub fn can_transition_to(self, next: SlotStatus) -> bool {
        match (self, next) {
            (SlotStatus::Sent | SlotStatus::NotApplicable, _) => false,
            (_, SlotStatus::Sent | SlotStatus::NotApplicable | SlotStatus::Failed) => true,
            (SlotStatus::Failed, SlotStatus::Pending) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Unset => write!(f, "unset"),
            SlotStatus::Pending => write!(f, "pending"),
            SlotStatus::Sent => write!(f, "sent"),
            SlotStatus::Failed => write!(f, "failed"),
            SlotStatus::NotApplicable => write!(f, "not_applicable"),
        }
    }
}

impl FromStr for SlotStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unset" | "" => Ok(SlotStatus::Unset),
            "pending" => Ok(SlotStatus::Pending),
            "sent" => Ok(SlotStatus::Sent),
            "failed" => Ok(SlotStatus::Failed),
            "not_applicable" | "na" => Ok(SlotStatus::NotApplicable),
            _ => Err(SharedError::InvalidStatus {
                input: s.to_string(),
            }),
        }
    }
}

/// Which of the three HR slots of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotId {
    #[serde(rename = "HR1")]
    Hr1,
    #[serde(rename = "HR2")]
    Hr2,
    #[serde(rename = "HR3")]
    Hr3,
}

impl SlotId {
    pub const ALL: [SlotId; SLOTS_PER_ROW] = [SlotId::Hr1, SlotId::Hr2, SlotId::Hr3];

    pub fn index(self) -> usize {
        match self {
            SlotId::Hr1 => 0,
            SlotId::Hr2 => 1,
            SlotId::Hr3 => 2,
        }
    }

    /// 1-based slot number as used in spreadsheet column names
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HR{}", self.number())
    }
}

/// One HR contact sub-record of a company row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub status: SlotStatus,
}

impl HrSlot {
    pub fn new(name: Option<String>, email: Option<String>, status: SlotStatus) -> Self {
        Self {
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            status,
        }
    }

    /// Trimmed email, empty when absent
    pub fn email_str(&self) -> &str {
        self.email.as_deref().map(str::trim).unwrap_or("")
    }

    /// An email counts only when present and not the literal `"0"`
    pub fn has_usable_email(&self) -> bool {
        is_usable_email(self.email_str())
    }
}

/// Blank cells and the literal `"0"` both mean "no contact"
pub fn is_usable_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email != "0"
}

/// One company with its three HR slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    pub company_name: String,
    pub slots: [HrSlot; SLOTS_PER_ROW],
}

impl ContactRow {
    pub fn new(company_name: impl Into<String>, slots: [HrSlot; SLOTS_PER_ROW]) -> Self {
        let mut row = Self {
            company_name: company_name.into(),
            slots,
        };
        row.normalize();
        row
    }

    /// Trim the company name and fall back to the placeholder when empty
    pub fn normalize(&mut self) {
        let trimmed = self.company_name.trim();
        self.company_name = if trimmed.is_empty() {
            UNKNOWN_COMPANY.to_string()
        } else {
            trimmed.to_string()
        };
    }

    pub fn slot(&self, id: SlotId) -> &HrSlot {
        &self.slots[id.index()]
    }
}

/// Reference to one slot of one row in a contact store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef {
    pub row: usize,
    pub slot: SlotId,
}

impl SlotRef {
    pub fn new(row: usize, slot: SlotId) -> Self {
        Self { row, slot }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} {}", self.row, self.slot)
    }
}

/// Who a mail is addressed to, resolved from a store slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactIdentity {
    pub company: String,
    pub slot: SlotId,
    pub hr_name: Option<String>,
    pub hr_email: String,
}

impl ContactIdentity {
    pub fn from_row(row: &ContactRow, slot: SlotId) -> Self {
        let hr = row.slot(slot);
        Self {
            company: row.company_name.clone(),
            slot,
            hr_name: hr.name.clone(),
            hr_email: hr.email_str().to_string(),
        }
    }
}

/// How the resume travels with the mail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Link,
    Attachment,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Link => write!(f, "link"),
            DeliveryMode::Attachment => write!(f, "attachment"),
        }
    }
}

/// Outcome recorded for one attempt in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Sent,
    Failed,
    NotApplicable,
}

/// Append-only record of one send attempt
///
/// `detail` is present exactly when the status is `Failed` or
/// `NotApplicable`; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub run_id: RunId,
    pub session: u32,
    pub timestamp: DateTime<Local>,
    pub company: String,
    pub slot: SlotId,
    pub hr_name: Option<String>,
    pub hr_email: String,
    pub status: AuditStatus,
    pub mode: Option<DeliveryMode>,
    pub detail: Option<String>,
}

impl AuditEntry {
    pub fn sent(
        run_id: RunId,
        session: u32,
        timestamp: DateTime<Local>,
        contact: &ContactIdentity,
        mode: DeliveryMode,
    ) -> Self {
        Self::build(run_id, session, timestamp, contact, AuditStatus::Sent, Some(mode), None)
    }

    pub fn failed(
        run_id: RunId,
        session: u32,
        timestamp: DateTime<Local>,
        contact: &ContactIdentity,
        mode: DeliveryMode,
        error: impl Into<String>,
    ) -> Self {
        Self::build(
            run_id,
            session,
            timestamp,
            contact,
            AuditStatus::Failed,
            Some(mode),
            Some(error.into()),
        )
    }

    pub fn not_applicable(
        run_id: RunId,
        session: u32,
        timestamp: DateTime<Local>,
        contact: &ContactIdentity,
        reason: impl Into<String>,
    ) -> Self {
        Self::build(
            run_id,
            session,
            timestamp,
            contact,
            AuditStatus::NotApplicable,
            None,
            Some(reason.into()),
        )
    }

    fn build(
        run_id: RunId,
        session: u32,
        timestamp: DateTime<Local>,
        contact: &ContactIdentity,
        status: AuditStatus,
        mode: Option<DeliveryMode>,
        detail: Option<String>,
    ) -> Self {
        Self {
            run_id,
            session,
            timestamp,
            company: contact.company.clone(),
            slot: contact.slot,
            hr_name: contact.hr_name.clone(),
            hr_email: contact.hr_email.clone(),
            status,
            mode,
            detail,
        }
    }
}
