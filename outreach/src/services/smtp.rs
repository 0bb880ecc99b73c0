//! SMTP mail transport over lettre
//!
//! STARTTLS relay with username/password credentials. Every call sends one
//! message once; errors come back as a `TransportFailure` with the server or
//! builder reason.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{Secret, SmtpSettings};
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{MailTransport, OutgoingMail, SenderIdentity, TransportFailure};

pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Build the relay; no connection is opened until the first send
    pub fn new(settings: &SmtpSettings, username: &str, password: &Secret) -> OutreachResult<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| OutreachError::config("SMTP_HOST", e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                username.to_string(),
                password.expose().to_string(),
            ))
            .build();
        Ok(Self { mailer })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportFailure> {
        let message = build_message(mail)?;
        self.mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| TransportFailure::new(e.to_string()))
    }
}

fn sender_mailbox(sender: &SenderIdentity) -> Result<Mailbox, TransportFailure> {
    let address = sender
        .address
        .parse()
        .map_err(|e| TransportFailure::new(format!("invalid sender address {}: {e}", sender.address)))?;
    Ok(Mailbox::new(sender.display_name.clone(), address))
}

/// Convert an outgoing mail into a lettre message
pub fn build_message(mail: &OutgoingMail) -> Result<Message, TransportFailure> {
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| TransportFailure::new(format!("invalid recipient address {}: {e}", mail.to)))?;

    let builder = Message::builder()
        .from(sender_mailbox(&mail.from)?)
        .to(to)
        .subject(mail.subject.clone());

    let built = match &mail.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                TransportFailure::new(format!("invalid content type {}: {e}", attachment.content_type))
            })?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.body.clone()))
                    .singlepart(
                        Attachment::new(attachment.filename.clone())
                            .body(attachment.bytes.clone(), content_type),
                    ),
            )
        }
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone()),
    };

    built.map_err(|e| TransportFailure::new(format!("failed to build message: {e}")))
}
