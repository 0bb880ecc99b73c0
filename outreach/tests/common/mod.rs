//! Common test utilities and infrastructure
//!
//! Shared fixtures, in-memory fakes and the campaign builder used across the
//! integration suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{CampaignBuilder, FakeClock, InMemoryAudit, InMemoryRepository, TestHelpers};
