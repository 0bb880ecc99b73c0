//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the campaign talks to sits behind one of these traits:
//! the contact repository, the audit sink, the mail transport, the message
//! composer and the clock. Production implementations live in `services`,
//! tests inject mocks or in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use shared::{AuditEntry, ContactIdentity, DeliveryMode};
use std::fmt;
use std::time::Duration;

use crate::error::OutreachResult;
use crate::state::ContactStore;

/// Error reported by the mail transport for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub reason: String,
}

impl TransportFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Sender shown in the `From` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub address: String,
    pub display_name: Option<String>,
}

/// File attached to an outgoing mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Subject, body and optional attachment produced by the composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
    /// Mode actually used; may differ from the requested one after a fallback
    pub mode: DeliveryMode,
}

/// A mail ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: SenderIdentity,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

impl OutgoingMail {
    pub fn new(from: SenderIdentity, to: impl Into<String>, message: ComposedMessage) -> Self {
        Self {
            from,
            to: to.into(),
            subject: message.subject,
            body: message.body,
            attachment: message.attachment,
        }
    }

    /// Plain-text mail without attachment, used for operator notifications
    pub fn plain(
        from: SenderIdentity,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }
}

/// Durable snapshot of the contact store
///
/// `save` replaces the whole snapshot; a reader after a successful save sees
/// exactly that state and never a partially written one.
#[mockall::automock]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Load the store at run start
    async fn load(&self) -> OutreachResult<ContactStore>;

    /// Overwrite the snapshot with the current in-memory state
    async fn save(&self, store: &ContactStore) -> OutreachResult<()>;
}

/// Append-only audit log of send attempts
#[mockall::automock]
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one entry, creating the log on first write
    async fn append(&self, entry: &AuditEntry) -> OutreachResult<()>;
}

/// Outbound mail boundary
///
/// One call sends one message once. No retries happen behind this trait.
#[mockall::automock]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportFailure>;
}

/// Builds the subject, body and attachment for one contact
#[mockall::automock]
#[async_trait]
pub trait MessageComposer: Send + Sync {
    /// Compose a message for `contact`, preferring `mode`
    async fn compose(
        &self,
        contact: &ContactIdentity,
        mode: DeliveryMode,
    ) -> OutreachResult<ComposedMessage>;
}

/// Wall clock and the pacing sleep
#[mockall::automock]
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    async fn sleep(&self, duration: Duration);
}
