//! Session scheduling
//!
//! Eligibility and planning are pure functions over the contact store. The
//! send loop and notifier reach I/O only through the collaborator traits and
//! run under test with mocks and a virtual clock.

pub mod completion;
pub mod eligibility;
pub mod notifier;
pub mod pacing;
pub mod planner;
pub mod progress;
pub mod send_loop;

pub use completion::is_complete;
pub use eligibility::{select_eligible, EligibilityScan};
pub use notifier::Notifier;
pub use planner::{plan_session, SessionPlan};
pub use progress::ProgressPersister;
pub use send_loop::{SendLoop, SessionOutcome, StopReason};
