//! Test fixtures and data for campaign tests

use chrono::{DateTime, Local, TimeZone};
use outreach::ContactStore;
use shared::{ContactRow, HrSlot, SlotStatus};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const SENDER_EMAIL: &'static str = "student@college.edu";
    pub const SUMMARY_EMAIL: &'static str = "ops@college.edu";
    pub const RESUME_LINK: &'static str = "https://drive.example/resume";

    /// Environment every test campaign starts from
    pub fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SENDER_EMAIL", Self::SENDER_EMAIL),
            ("SENDER_PASSWORD", "app-password"),
            ("DRIVE_RESUME_LINK", Self::RESUME_LINK),
            ("RESUME_PDF_PATH", "/nonexistent/outreach/Resume.pdf"),
            ("SESSION_DURATIONS_MIN", "120"),
            ("PER_SESSION_MIN", "1"),
            ("PER_SESSION_MAX", "1"),
        ]
    }

    /// Fixed Tuesday morning the virtual clock starts at
    pub fn start_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 10, 9, 0, 0)
            .earliest()
            .expect("valid local time")
    }

    pub fn hr(email: &str, status: SlotStatus) -> HrSlot {
        HrSlot::new(None, Some(email.to_string()), status)
    }

    pub fn named_hr(name: &str, email: &str) -> HrSlot {
        HrSlot::new(Some(name.to_string()), Some(email.to_string()), SlotStatus::Unset)
    }

    /// Two companies: A with one usable address, `"0"` and a blank; B fully staffed
    pub fn two_by_three() -> ContactStore {
        ContactStore::new(vec![
            ContactRow::new(
                "A Corp",
                [
                    Self::hr("hr@a.com", SlotStatus::Unset),
                    Self::hr("0", SlotStatus::Unset),
                    HrSlot::default(),
                ],
            ),
            ContactRow::new(
                "B Corp",
                [
                    Self::hr("one@b.com", SlotStatus::Unset),
                    Self::hr("two@b.com", SlotStatus::Unset),
                    Self::hr("three@b.com", SlotStatus::Unset),
                ],
            ),
        ])
    }

    /// One company with three reachable contacts
    pub fn three_contacts() -> ContactStore {
        ContactStore::new(vec![ContactRow::new(
            "Initech",
            [
                Self::named_hr("Peter", "peter@initech.com"),
                Self::named_hr("Samir", "samir@initech.com"),
                Self::hr("jobs@initech.com", SlotStatus::Unset),
            ],
        )])
    }

    /// `rows` companies with three reachable contacts each
    pub fn many_contacts(rows: usize) -> ContactStore {
        ContactStore::new(
            (0..rows)
                .map(|i| {
                    ContactRow::new(
                        format!("Company {i}"),
                        [
                            Self::hr(&format!("a{i}@example.com"), SlotStatus::Unset),
                            Self::hr(&format!("b{i}@example.com"), SlotStatus::Unset),
                            Self::hr(&format!("c{i}@example.com"), SlotStatus::Unset),
                        ],
                    )
                })
                .collect(),
        )
    }

    pub fn all_not_applicable() -> ContactStore {
        let na = HrSlot::new(None, None, SlotStatus::NotApplicable);
        ContactStore::new(vec![
            ContactRow::new("Hooli", [na.clone(), na.clone(), na.clone()]),
            ContactRow::new("Pied Piper", [na.clone(), na.clone(), na]),
        ])
    }
}
