//! Test helpers, in-memory fakes and the campaign builder

use async_trait::async_trait;
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use outreach::services::TemplateComposer;
use outreach::traits::{MockMailTransport, OutgoingMail, TransportFailure};
use outreach::{
    AuditSink, Campaign, CampaignConfig, Clock, ContactRepository, ContactStore, OutreachError,
    OutreachResult,
};
use shared::{AuditEntry, AuditStatus, SlotId, SlotRef, SlotStatus};

use super::fixtures::TestFixtures;

/// Virtual clock: time only advances when the campaign sleeps
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Local>>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl FakeClock {
    pub fn starting_at(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now = *now + chrono::Duration::from_std(duration).unwrap();
    }
}

/// Snapshot held in memory, shared between clones so runs can be chained
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshot: Arc<Mutex<Option<ContactStore>>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    pub fn with_store(store: ContactStore) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Some(store))),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn snapshot(&self) -> ContactStore {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .expect("repository holds a snapshot")
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactRepository for InMemoryRepository {
    async fn load(&self) -> OutreachResult<ContactStore> {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| OutreachError::StoreNotFound {
                path: "memory".to_string(),
            })
    }

    async fn save(&self, store: &ContactStore) -> OutreachResult<()> {
        *self.snapshot.lock().unwrap() = Some(store.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAudit {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAudit {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, status: AuditStatus) -> usize {
        self.entries().iter().filter(|e| e.status == status).count()
    }
}

#[async_trait]
impl AuditSink for InMemoryAudit {
    async fn append(&self, entry: &AuditEntry) -> OutreachResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

pub type TestCampaign =
    Campaign<InMemoryRepository, InMemoryAudit, MockMailTransport, TemplateComposer, FakeClock>;

/// Handles onto the fakes a built campaign owns
pub struct Handles {
    pub repository: InMemoryRepository,
    pub audit: InMemoryAudit,
    pub clock: FakeClock,
}

/// Builder for test campaigns with sensible defaults
pub struct CampaignBuilder {
    env: HashMap<String, String>,
    repository: InMemoryRepository,
    audit: InMemoryAudit,
    transport: MockMailTransport,
    clock: FakeClock,
    seed: u64,
}

impl CampaignBuilder {
    pub fn new() -> Self {
        Self {
            env: TestFixtures::base_env()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            repository: InMemoryRepository::default(),
            audit: InMemoryAudit::default(),
            transport: TestHelpers::accepting_transport(),
            clock: FakeClock::starting_at(TestFixtures::start_time()),
            seed: 42,
        }
    }

    pub fn with_store(mut self, store: ContactStore) -> Self {
        self.repository = InMemoryRepository::with_store(store);
        self
    }

    /// Reuse the snapshot of an earlier run
    pub fn with_repository(mut self, repository: InMemoryRepository) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_audit(mut self, audit: InMemoryAudit) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_transport(mut self, transport: MockMailTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_clock(mut self, clock: FakeClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> CampaignConfig {
        let env = self.env.clone();
        CampaignConfig::from_lookup(move |key| env.get(key).cloned()).expect("valid test config")
    }

    pub fn build(self) -> (TestCampaign, Handles) {
        let config = self.config();
        let composer = TemplateComposer::new(config.templates.clone());
        let handles = Handles {
            repository: self.repository.clone(),
            audit: self.audit.clone(),
            clock: self.clock.clone(),
        };
        let campaign = Campaign::new(
            config,
            self.repository,
            self.audit,
            self.transport,
            composer,
            self.clock,
        )
        .with_rng(StdRng::seed_from_u64(self.seed));
        (campaign, handles)
    }
}

impl Default for CampaignBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Common transport setups and assertions
pub struct TestHelpers;

impl TestHelpers {
    /// Transport that accepts every mail
    pub fn accepting_transport() -> MockMailTransport {
        let mut transport = MockMailTransport::new();
        transport.expect_send().returning(|_| Ok(())).times(0..);
        transport
    }

    /// Transport that rejects every mail with `reason`
    pub fn failing_transport(reason: &'static str) -> MockMailTransport {
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .returning(move |_| Err(TransportFailure::new(reason)))
            .times(0..);
        transport
    }

    /// Transport that accepts every mail and records the recipients
    pub fn recording_transport() -> (MockMailTransport, Arc<Mutex<Vec<OutgoingMail>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = sent.clone();
        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .returning(move |mail| {
                log.lock().unwrap().push(mail.clone());
                Ok(())
            })
            .times(0..);
        (transport, sent)
    }

    pub fn status(store: &ContactStore, row: usize, slot: SlotId) -> SlotStatus {
        store.slot(SlotRef::new(row, slot)).unwrap().status
    }
}
