//! Service implementations
//!
//! Production implementations of the collaborator traits. These handle the
//! actual file, mail and clock I/O.

pub mod audit_log;
pub mod clock;
pub mod json_store;
pub mod smtp;
pub mod spreadsheet;
pub mod templates;

#[cfg(test)]
mod tests;

pub use audit_log::RealAuditLog;
pub use clock::SystemClock;
pub use json_store::RealContactRepository;
pub use smtp::SmtpMailTransport;
pub use templates::TemplateComposer;
