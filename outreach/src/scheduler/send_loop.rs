//! Send loop
//!
//! Drains one session queue strictly in order. Each attempt is recorded in
//! the store, appended to the audit log and flushed to the snapshot before
//! the loop moves on; the randomized delay is its own step after that.

use rand::Rng;
use shared::{
    logging, run_debug, run_error, run_info, run_warn, AuditEntry, ContactIdentity, DeliveryMode, HrSlot, RunId,
    SlotRef, SlotStatus,
};
use std::fmt;

use crate::config::PacingConfig;
use crate::scheduler::eligibility::BLANK_EMAIL_DETAIL;
use crate::scheduler::pacing;
use crate::scheduler::planner::SessionPlan;
use crate::scheduler::progress::ProgressPersister;
use crate::state::ContactStore;
use crate::traits::{
    AuditSink, Clock, ContactRepository, MailTransport, MessageComposer, OutgoingMail,
    SenderIdentity,
};

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QueueDrained,
    WindowElapsed,
    FailureLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::QueueDrained => write!(f, "queue drained"),
            StopReason::WindowElapsed => write!(f, "session window elapsed"),
            StopReason::FailureLimit => write!(f, "consecutive failure limit reached"),
        }
    }
}

/// Tally of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_no: u32,
    pub pool_size: usize,
    pub planned: usize,
    /// Transport calls made, successful or not
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    pub not_applicable: usize,
    pub last_sent: Option<ContactIdentity>,
    pub stop_reason: StopReason,
}

impl SessionOutcome {
    fn empty(plan: &SessionPlan) -> Self {
        Self {
            session_no: plan.session_no,
            pool_size: plan.pool_size,
            planned: plan.queue.len(),
            attempted: 0,
            sent: 0,
            failed: 0,
            not_applicable: 0,
            last_sent: None,
            stop_reason: StopReason::QueueDrained,
        }
    }
}

/// State of a queued slot when its turn comes
enum QueuedSlot {
    Sendable,
    /// Already terminal, nothing to do
    Settled(SlotStatus),
    /// Address became blank or `"0"` after planning
    LostAddress,
}

impl QueuedSlot {
    fn of(slot: &HrSlot) -> Self {
        if slot.status.is_terminal() {
            QueuedSlot::Settled(slot.status)
        } else if slot.has_usable_email() {
            QueuedSlot::Sendable
        } else {
            QueuedSlot::LostAddress
        }
    }
}

/// Result of handing one contact to the transport
enum Attempt {
    Delivered(DeliveryMode),
    Rejected(DeliveryMode, String),
}

/// Borrowed collaborators for one session
pub struct SendLoop<'a, R, A, T, M, K>
where
    R: ContactRepository,
    A: AuditSink,
    T: MailTransport,
    M: MessageComposer,
    K: Clock,
{
    persister: ProgressPersister<'a, R, A>,
    transport: &'a T,
    composer: &'a M,
    clock: &'a K,
    sender: &'a SenderIdentity,
    pacing: PacingConfig,
    max_consecutive_failures: Option<u32>,
    run_id: RunId,
}

impl<'a, R, A, T, M, K> SendLoop<'a, R, A, T, M, K>
where
    R: ContactRepository,
    A: AuditSink,
    T: MailTransport,
    M: MessageComposer,
    K: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        persister: ProgressPersister<'a, R, A>,
        transport: &'a T,
        composer: &'a M,
        clock: &'a K,
        sender: &'a SenderIdentity,
        pacing: PacingConfig,
        max_consecutive_failures: Option<u32>,
        run_id: RunId,
    ) -> Self {
        Self {
            persister,
            transport,
            composer,
            clock,
            sender,
            pacing,
            max_consecutive_failures,
            run_id,
        }
    }

    /// Work through `plan.queue` until it drains, the window closes or the
    /// failure limit trips
    pub async fn run<G: Rng + ?Sized>(
        &self,
        store: &mut ContactStore,
        plan: &SessionPlan,
        rng: &mut G,
    ) -> SessionOutcome {
        let mut outcome = SessionOutcome::empty(plan);
        let mut consecutive_failures: u32 = 0;

        for (index, &slot_ref) in plan.queue.iter().enumerate() {
            if self.clock.now() >= plan.window_end {
                run_info!(
                    "⏰ Session {} window closed with {} queued contacts left",
                    plan.session_no,
                    plan.queue.len() - index
                );
                outcome.stop_reason = StopReason::WindowElapsed;
                break;
            }

            let (contact, queued) = match store
                .identity(slot_ref)
                .and_then(|contact| Ok((contact, QueuedSlot::of(store.slot(slot_ref)?))))
            {
                Ok(found) => found,
                Err(e) => {
                    logging::log_error("Queue lookup", &e);
                    continue;
                }
            };

            match queued {
                QueuedSlot::Sendable => {}
                QueuedSlot::Settled(status) => {
                    run_debug!("Skipping {} at {}: already {}", slot_ref, contact.company, status);
                    continue;
                }
                QueuedSlot::LostAddress => {
                    if self.mark_not_applicable(store, slot_ref, &contact, plan.session_no).await {
                        outcome.not_applicable += 1;
                    }
                    continue;
                }
            }

            let requested = if rng.gen_bool(0.5) {
                DeliveryMode::Link
            } else {
                DeliveryMode::Attachment
            };
            let attempt = self.attempt(&contact, requested).await;
            outcome.attempted += 1;

            let entry = match attempt {
                Attempt::Delivered(mode) => {
                    self.apply(store, slot_ref, SlotStatus::Sent);
                    outcome.sent += 1;
                    consecutive_failures = 0;
                    run_info!(
                        "📧 Sent to {} <{}> at {} via {}",
                        contact.hr_name.as_deref().unwrap_or("Hiring Manager"),
                        contact.hr_email,
                        contact.company,
                        mode
                    );
                    let entry = AuditEntry::sent(self.run_id, plan.session_no, self.clock.now(), &contact, mode);
                    outcome.last_sent = Some(contact);
                    entry
                }
                Attempt::Rejected(mode, reason) => {
                    self.apply(store, slot_ref, SlotStatus::Failed);
                    outcome.failed += 1;
                    consecutive_failures += 1;
                    run_warn!("⚠️ Send to {} at {} failed: {}", contact.hr_email, contact.company, reason);
                    AuditEntry::failed(self.run_id, plan.session_no, self.clock.now(), &contact, mode, reason)
                }
            };

            self.persister.record(&entry).await;
            self.persister.flush(store).await;

            if self
                .max_consecutive_failures
                .is_some_and(|limit| consecutive_failures >= limit)
            {
                run_warn!(
                    "🛑 Session {} stopped after {} consecutive failures",
                    plan.session_no,
                    consecutive_failures
                );
                outcome.stop_reason = StopReason::FailureLimit;
                break;
            }

            if index + 1 == plan.queue.len() {
                break;
            }

            self.pause(plan, rng).await;
        }

        outcome
    }

    /// Record a slot that lost its address since planning
    async fn mark_not_applicable(
        &self,
        store: &mut ContactStore,
        slot_ref: SlotRef,
        contact: &ContactIdentity,
        session_no: u32,
    ) -> bool {
        if !self.apply(store, slot_ref, SlotStatus::NotApplicable) {
            return false;
        }
        run_info!("⏭️ Skipping {} at {}: {}", slot_ref, contact.company, BLANK_EMAIL_DETAIL);
        let entry = AuditEntry::not_applicable(
            self.run_id,
            session_no,
            self.clock.now(),
            contact,
            BLANK_EMAIL_DETAIL,
        );
        self.persister.record(&entry).await;
        self.persister.flush(store).await;
        true
    }

    /// Compose and send once; composition errors count as failed attempts
    async fn attempt(&self, contact: &ContactIdentity, requested: DeliveryMode) -> Attempt {
        let message = match self.composer.compose(contact, requested).await {
            Ok(message) => message,
            Err(e) => return Attempt::Rejected(requested, e.to_string()),
        };
        let mode = message.mode;
        let mail = OutgoingMail::new(self.sender.clone(), contact.hr_email.clone(), message);

        match self.transport.send(&mail).await {
            Ok(()) => Attempt::Delivered(mode),
            Err(failure) => Attempt::Rejected(mode, failure.reason),
        }
    }

    fn apply(&self, store: &mut ContactStore, slot_ref: SlotRef, next: SlotStatus) -> bool {
        match store.transition(slot_ref, next) {
            Ok(_) => true,
            Err(e) => {
                run_error!("❌ Status update rejected: {}", e);
                false
            }
        }
    }

    /// Randomized inter-send delay, never sleeping past the window end
    async fn pause<G: Rng + ?Sized>(&self, plan: &SessionPlan, rng: &mut G) {
        let drawn = pacing::draw_delay(&self.pacing, rng);
        let delay = pacing::clamp_to_window(drawn, self.clock.now(), plan.window_end);
        logging::log_progress(
            "Pacing",
            &format!("next send in {}s (drawn {}s)", delay.as_secs(), drawn.as_secs()),
        );
        self.clock.sleep(delay).await;
    }
}
