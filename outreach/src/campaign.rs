//! Campaign run driver
//!
//! One run loads the store, performs the startup cleanup scan, walks the
//! configured sessions in order and finishes with a final flush and a
//! completion check. All collaborators are injected so the whole run can be
//! driven by mocks and a virtual clock.

use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{logging, run_info, run_warn, AuditEntry, RunId, SlotRef};

use crate::config::{CampaignConfig, SessionSpec};
use crate::error::OutreachResult;
use crate::scheduler::eligibility::BLANK_EMAIL_DETAIL;
use crate::scheduler::{
    is_complete, pacing, plan_session, select_eligible, EligibilityScan, Notifier,
    ProgressPersister, SendLoop, SessionOutcome,
};
use crate::state::{ContactStore, StatusCounts};
use crate::traits::{AuditSink, Clock, ContactRepository, MailTransport, MessageComposer};

/// Session number used for audit entries written by the startup scan
pub const STARTUP_SCAN_SESSION: u32 = 0;

/// What one run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sessions: Vec<SessionOutcome>,
    pub counts: StatusCounts,
    pub complete: bool,
}

impl RunReport {
    pub fn total_sent(&self) -> usize {
        self.sessions.iter().map(|s| s.sent).sum()
    }
}

pub struct Campaign<R, A, T, M, K>
where
    R: ContactRepository,
    A: AuditSink,
    T: MailTransport,
    M: MessageComposer,
    K: Clock,
{
    config: CampaignConfig,
    repository: R,
    audit: A,
    transport: T,
    composer: M,
    clock: K,
    rng: StdRng,
    run_id: RunId,
}

impl<R, A, T, M, K> Campaign<R, A, T, M, K>
where
    R: ContactRepository,
    A: AuditSink,
    T: MailTransport,
    M: MessageComposer,
    K: Clock,
{
    /// Create a campaign with all injected dependencies
    pub fn new(config: CampaignConfig, repository: R, audit: A, transport: T, composer: M, clock: K) -> Self {
        Self {
            config,
            repository,
            audit,
            transport,
            composer,
            clock,
            rng: StdRng::from_entropy(),
            run_id: *RunId::current(),
        }
    }

    /// Replace the entropy-seeded generator, for reproducible runs
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// Execute one run over the configured sessions
    ///
    /// Fails only when the store cannot be loaded; everything after that is
    /// logged and the run carries on.
    pub async fn run(&mut self) -> OutreachResult<RunReport> {
        let mut store = self.repository.load().await?;
        logging::log_startup(&format!(
            "campaign run over {} companies ({})",
            store.len(),
            store.status_counts()
        ));

        let startup = select_eligible(&mut store, &mut self.rng)?;
        self.persist_scan(&store, &startup, STARTUP_SCAN_SESSION).await;

        let mut sessions = Vec::new();
        if is_complete(&store) {
            logging::log_success("Every slot is already sent or not applicable, no sessions to run");
        } else {
            let specs = self.config.sessions.clone();
            let mut budget = self.config.daily_target;
            for (index, spec) in specs.iter().enumerate() {
                if budget == Some(0) {
                    run_info!("🎯 Daily target reached, skipping remaining sessions");
                    break;
                }

                let session_no = index as u32 + 1;
                self.wait_for_session(index, spec).await;
                let outcome = self.run_session(&mut store, session_no, spec, budget).await?;
                budget = budget.map(|b| b.saturating_sub(outcome.sent));
                sessions.push(outcome);

                if is_complete(&store) {
                    run_info!("🏁 All slots settled after session {}", session_no);
                    break;
                }
            }
        }

        self.persister().flush(&store).await;

        let counts = store.status_counts();
        let complete = is_complete(&store);
        if complete {
            self.notifier().campaign_finished(&counts).await;
        }
        logging::log_shutdown(&format!(
            "run finished, {} (campaign {})",
            counts,
            if complete { "complete" } else { "incomplete" }
        ));

        Ok(RunReport {
            sessions,
            counts,
            complete,
        })
    }

    async fn run_session(
        &mut self,
        store: &mut ContactStore,
        session_no: u32,
        spec: &SessionSpec,
        budget: Option<usize>,
    ) -> OutreachResult<SessionOutcome> {
        let scan = select_eligible(store, &mut self.rng)?;
        self.persist_scan(store, &scan, session_no).await;

        let plan = plan_session(
            session_no,
            scan.pool,
            self.config.per_session,
            budget,
            self.clock.now(),
            spec.duration,
            &mut self.rng,
        );
        logging::log_progress(
            &format!("Session {session_no}"),
            &format!(
                "{} of {} eligible contacts planned until {}",
                plan.target,
                plan.pool_size,
                plan.window_end.format("%H:%M:%S")
            ),
        );

        let send_loop = SendLoop::new(
            ProgressPersister::new(&self.repository, &self.audit),
            &self.transport,
            &self.composer,
            &self.clock,
            &self.config.sender,
            self.config.pacing,
            self.config.max_consecutive_failures,
            self.run_id,
        );
        let outcome = send_loop.run(store, &plan, &mut self.rng).await;

        run_info!(
            "📋 Session {} done: {} sent, {} failed, {} not applicable ({})",
            session_no,
            outcome.sent,
            outcome.failed,
            outcome.not_applicable,
            outcome.stop_reason
        );
        self.notifier().session_finished(&outcome).await;
        Ok(outcome)
    }

    /// Sleep until the session may begin
    ///
    /// Sessions with an hour window wait for a random start inside it. Without
    /// windows, every session after the first waits a random gap.
    async fn wait_for_session(&mut self, index: usize, spec: &SessionSpec) {
        let now = self.clock.now();
        let wait = match spec.start_window {
            Some(window) => {
                let start = pacing::next_window_start(now, window, &mut self.rng);
                run_info!(
                    "🕒 Session {} starts at {}",
                    index + 1,
                    start.format("%Y-%m-%d %H:%M:%S")
                );
                pacing::remaining(now, start)
            }
            None if index > 0 => {
                let gap = pacing::session_gap(&self.config.session_gap, &mut self.rng);
                run_info!("☕ Pausing {}s before session {}", gap.as_secs(), index + 1);
                gap
            }
            None => return,
        };
        self.clock.sleep(wait).await;
    }

    /// Audit and flush the markings an eligibility scan made
    async fn persist_scan(&self, store: &ContactStore, scan: &EligibilityScan, session_no: u32) {
        if !scan.changed_store() {
            return;
        }

        let persister = self.persister();
        for &slot_ref in &scan.newly_not_applicable {
            self.audit_not_applicable(&persister, store, slot_ref, session_no).await;
        }
        if !scan.rearmed.is_empty() {
            run_info!("🔁 Re-armed {} failed contacts", scan.rearmed.len());
        }
        persister.flush(store).await;
    }

    async fn audit_not_applicable(
        &self,
        persister: &ProgressPersister<'_, R, A>,
        store: &ContactStore,
        slot_ref: SlotRef,
        session_no: u32,
    ) {
        match store.identity(slot_ref) {
            Ok(contact) => {
                let entry = AuditEntry::not_applicable(
                    self.run_id,
                    session_no,
                    self.clock.now(),
                    &contact,
                    BLANK_EMAIL_DETAIL,
                );
                persister.record(&entry).await;
            }
            Err(e) => run_warn!("⚠️ Cannot audit {}: {}", slot_ref, e),
        }
    }

    fn persister(&self) -> ProgressPersister<'_, R, A> {
        ProgressPersister::new(&self.repository, &self.audit)
    }

    fn notifier(&self) -> Notifier<'_, T> {
        Notifier::new(
            &self.transport,
            &self.config.sender,
            self.config.summary_recipient.as_deref(),
        )
    }
}
