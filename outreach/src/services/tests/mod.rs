//! Service-specific tests
//!
//! Each service has its own test file. Filesystem tests work inside a
//! `tempfile` directory so they never touch the working tree.

mod json_store;

// Common test utilities for services
pub mod common {
    use shared::{ContactIdentity, ContactRow, HrSlot, SlotId, SlotStatus};

    use crate::state::ContactStore;

    pub fn hr(name: Option<&str>, email: &str, status: SlotStatus) -> HrSlot {
        HrSlot::new(name.map(str::to_string), Some(email.to_string()), status)
    }

    /// One row covering every status
    pub fn every_status_store() -> ContactStore {
        ContactStore::new(vec![
            ContactRow::new(
                "Acme Corp",
                [
                    hr(Some("Dana"), "dana@acme.com", SlotStatus::Sent),
                    hr(None, "ops@acme.com", SlotStatus::Failed),
                    hr(None, "0", SlotStatus::NotApplicable),
                ],
            ),
            ContactRow::new(
                "Globex",
                [
                    hr(Some("Hank"), "hank@globex.com", SlotStatus::Pending),
                    hr(None, "jobs@globex.com", SlotStatus::Unset),
                    HrSlot::default(),
                ],
            ),
        ])
    }

    pub fn contact(company: &str, hr_name: Option<&str>) -> ContactIdentity {
        ContactIdentity {
            company: company.to_string(),
            slot: SlotId::Hr1,
            hr_name: hr_name.map(str::to_string),
            hr_email: "hr@example.com".to_string(),
        }
    }
}
