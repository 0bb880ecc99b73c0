//! Progress persistence
//!
//! The snapshot overwrite and the audit append are independent operations.
//! Both are best effort once a run has started: a failure is logged and the
//! in-memory store stays authoritative.

use shared::{logging, run_debug, AuditEntry};

use crate::state::ContactStore;
use crate::traits::{AuditSink, ContactRepository};

pub struct ProgressPersister<'a, R, A>
where
    R: ContactRepository,
    A: AuditSink,
{
    repository: &'a R,
    audit: &'a A,
}

impl<'a, R, A> ProgressPersister<'a, R, A>
where
    R: ContactRepository,
    A: AuditSink,
{
    pub fn new(repository: &'a R, audit: &'a A) -> Self {
        Self { repository, audit }
    }

    /// Overwrite the durable snapshot; returns whether it succeeded
    pub async fn flush(&self, store: &ContactStore) -> bool {
        match self.repository.save(store).await {
            Ok(()) => {
                run_debug!("💾 Snapshot flushed ({} rows)", store.len());
                true
            }
            Err(e) => {
                logging::log_error("Snapshot flush", &e);
                false
            }
        }
    }

    /// Append one audit entry; returns whether it succeeded
    pub async fn record(&self, entry: &AuditEntry) -> bool {
        match self.audit.append(entry).await {
            Ok(()) => true,
            Err(e) => {
                logging::log_error("Audit append", &e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutreachError;
    use crate::traits::{MockAuditSink, MockContactRepository};
    use chrono::Local;
    use shared::{ContactIdentity, DeliveryMode, RunId, SlotId};

    fn entry() -> AuditEntry {
        let contact = ContactIdentity {
            company: "Acme".into(),
            slot: SlotId::Hr1,
            hr_name: None,
            hr_email: "hr@acme.com".into(),
        };
        AuditEntry::sent(RunId::new(), 1, Local::now(), &contact, DeliveryMode::Link)
    }

    #[tokio::test]
    async fn test_flush_failure_is_not_fatal() {
        let mut repository = MockContactRepository::new();
        repository.expect_save().times(1).returning(|_| {
            Err(OutreachError::StoreCorrupt {
                path: "contacts.json".into(),
                message: "disk full".into(),
            })
        });
        let audit = MockAuditSink::new();

        let persister = ProgressPersister::new(&repository, &audit);
        assert!(!persister.flush(&ContactStore::default()).await);
    }

    #[tokio::test]
    async fn test_record_appends_once() {
        let repository = MockContactRepository::new();
        let mut audit = MockAuditSink::new();
        audit.expect_append().times(1).returning(|_| Ok(()));

        let persister = ProgressPersister::new(&repository, &audit);
        assert!(persister.record(&entry()).await);
    }
}
