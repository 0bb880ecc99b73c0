//! Shared types for the HR outreach campaign
//!
//! Contains the domain vocabulary used by the campaign library, its
//! binary and its tests: contact rows and slots, slot statuses, audit
//! entries, and the tracing setup every entry point shares.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
