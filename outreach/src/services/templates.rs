//! Template-based message composer
//!
//! Placeholders: `{company}`, `{hr_name}`, `{greeting}`, `{resume_link}`.
//! A requested attachment falls back to the resume link when the PDF cannot
//! be read, and a requested link falls back to the attachment when no link is
//! configured. Only when neither is available does composition fail.

use async_trait::async_trait;
use shared::{run_warn, ContactIdentity, DeliveryMode};

use crate::config::TemplateSettings;
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{ComposedMessage, MailAttachment, MessageComposer};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const FALLBACK_RECIPIENT: &str = "Hiring Manager";

pub struct TemplateComposer {
    settings: TemplateSettings,
}

impl TemplateComposer {
    pub fn new(settings: TemplateSettings) -> Self {
        Self { settings }
    }

    fn render(&self, template: &str, contact: &ContactIdentity) -> String {
        let hr_name = contact.hr_name.as_deref().unwrap_or(FALLBACK_RECIPIENT);
        template
            .replace("{greeting}", &greeting(contact.hr_name.as_deref()))
            .replace("{company}", &contact.company)
            .replace("{hr_name}", hr_name)
            .replace("{resume_link}", &self.settings.resume_link)
    }

    fn link_message(&self, contact: &ContactIdentity) -> ComposedMessage {
        ComposedMessage {
            subject: self.render(&self.settings.subject, contact),
            body: self.render(&self.settings.body_link, contact),
            attachment: None,
            mode: DeliveryMode::Link,
        }
    }

    fn attachment_message(&self, contact: &ContactIdentity, bytes: Vec<u8>) -> ComposedMessage {
        ComposedMessage {
            subject: self.render(&self.settings.subject, contact),
            body: self.render(&self.settings.body_attachment, contact),
            attachment: Some(MailAttachment {
                filename: attachment_filename(&self.settings.attachment_prefix, &contact.company),
                content_type: PDF_CONTENT_TYPE.to_string(),
                bytes,
            }),
            mode: DeliveryMode::Attachment,
        }
    }

    async fn read_resume(&self) -> Option<Vec<u8>> {
        match tokio::fs::read(&self.settings.resume_pdf_path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                run_warn!(
                    "📎 Resume PDF {} unavailable: {}",
                    self.settings.resume_pdf_path.display(),
                    e
                );
                None
            }
        }
    }

    fn has_link(&self) -> bool {
        !self.settings.resume_link.trim().is_empty()
    }
}

#[async_trait]
impl MessageComposer for TemplateComposer {
    async fn compose(
        &self,
        contact: &ContactIdentity,
        mode: DeliveryMode,
    ) -> OutreachResult<ComposedMessage> {
        match mode {
            DeliveryMode::Link if self.has_link() => Ok(self.link_message(contact)),
            DeliveryMode::Link => match self.read_resume().await {
                Some(bytes) => Ok(self.attachment_message(contact, bytes)),
                None => Err(no_resume()),
            },
            DeliveryMode::Attachment => match self.read_resume().await {
                Some(bytes) => Ok(self.attachment_message(contact, bytes)),
                None if self.has_link() => Ok(self.link_message(contact)),
                None => Err(no_resume()),
            },
        }
    }
}

fn no_resume() -> OutreachError {
    OutreachError::CompositionError {
        message: "no resume link configured and resume PDF unreadable".to_string(),
    }
}

/// `Dear {name},` or `Dear Hiring Manager,`
pub fn greeting(hr_name: Option<&str>) -> String {
    match hr_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Dear {name},"),
        None => format!("Dear {FALLBACK_RECIPIENT},"),
    }
}

/// Per-company attachment name, e.g. `Resume_Acme_Corp.pdf`
pub fn attachment_filename(prefix: &str, company: &str) -> String {
    let joined = company.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let company_part = if cleaned.is_empty() { "Company" } else { cleaned.as_str() };
    format!("{prefix}_{company_part}.pdf")
}
