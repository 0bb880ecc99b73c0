//! Operator notifications
//!
//! Session summaries and the campaign completion notice go through the same
//! mail transport as outreach mail. Without a summary recipient they are
//! logged instead. Delivery failures are logged and never fatal.

use shared::{run_info, run_warn};

use crate::scheduler::send_loop::SessionOutcome;
use crate::state::StatusCounts;
use crate::traits::{MailTransport, OutgoingMail, SenderIdentity};

/// Subject and body of one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

pub fn session_summary(outcome: &SessionOutcome) -> Notice {
    let last = match &outcome.last_sent {
        Some(contact) => format!(
            "Last contacted: {} / {} / {}",
            contact.company,
            contact.hr_name.as_deref().unwrap_or("Hiring Manager"),
            contact.hr_email
        ),
        None => "Last contacted: none".to_string(),
    };

    Notice {
        subject: format!("Outreach session {} summary", outcome.session_no),
        body: format!(
            "Session {} finished: {}.\n\n\
             Planned: {} of {} eligible\n\
             Attempted: {}\n\
             Sent: {}\n\
             Failed: {}\n\
             Not applicable: {}\n\
             {}\n",
            outcome.session_no,
            outcome.stop_reason,
            outcome.planned,
            outcome.pool_size,
            outcome.attempted,
            outcome.sent,
            outcome.failed,
            outcome.not_applicable,
            last
        ),
    }
}

pub fn campaign_complete(counts: &StatusCounts) -> Notice {
    Notice {
        subject: "Outreach campaign complete".to_string(),
        body: format!(
            "Every HR contact has been sent or marked not applicable.\n\n\
             Sent: {}\n\
             Not applicable: {}\n",
            counts.sent, counts.not_applicable
        ),
    }
}

pub struct Notifier<'a, T: MailTransport> {
    transport: &'a T,
    sender: &'a SenderIdentity,
    recipient: Option<&'a str>,
}

impl<'a, T: MailTransport> Notifier<'a, T> {
    pub fn new(transport: &'a T, sender: &'a SenderIdentity, recipient: Option<&'a str>) -> Self {
        Self {
            transport,
            sender,
            recipient,
        }
    }

    pub async fn session_finished(&self, outcome: &SessionOutcome) -> bool {
        self.deliver(session_summary(outcome)).await
    }

    pub async fn campaign_finished(&self, counts: &StatusCounts) -> bool {
        self.deliver(campaign_complete(counts)).await
    }

    /// Send `notice` to the operator; returns whether a mail went out
    async fn deliver(&self, notice: Notice) -> bool {
        let Some(recipient) = self.recipient else {
            run_warn!(
                "📭 No SUMMARY_EMAIL configured, notice not mailed: {}\n{}",
                notice.subject,
                notice.body
            );
            return false;
        };

        let mail = OutgoingMail::plain(self.sender.clone(), recipient, notice.subject, notice.body);
        match self.transport.send(&mail).await {
            Ok(()) => {
                run_info!("📨 Notification sent to {}: {}", recipient, mail.subject);
                true
            }
            Err(failure) => {
                run_warn!("⚠️ Notification to {} failed: {}", recipient, failure);
                false
            }
        }
    }
}
