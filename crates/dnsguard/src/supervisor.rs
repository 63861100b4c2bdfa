use std::sync::Arc;

use chrono::{DateTime, Utc};
use dnsguard_config::{ManagedHostname, PreservedPatternList};
use dnsguard_events::{Event, EventBus, ReconcileStats};
use dnsguard_provider::ProviderAdapter;
use dnsguard_reconciler::{OrphanSweeper, Reconciler};
use dnsguard_scheduler::{trigger_cleanup, trigger_reconcile, PauseManager};
use dnsguard_source::HostnameSource;
use dnsguard_store::{RecordStore, TrackedRecord};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastReconcile {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub failed: u32,
}

impl From<ReconcileStats> for LastReconcile {
    fn from(stats: ReconcileStats) -> Self {
        Self {
            created: stats.created,
            updated: stats.updated,
            unchanged: stats.unchanged,
            failed: stats.failed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SupervisorStats {
    pub tracked: usize,
    pub orphaned: usize,
    pub managed: usize,
    pub last_reconcile: LastReconcile,
}

/// Point-in-time snapshot returned by `status()`.
#[derive(Debug, Clone)]
pub struct Status {
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub last_tick: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub provider: String,
    pub zone: String,
    pub stats: SupervisorStats,
}

#[derive(Debug, Clone, Default)]
struct ObservedState {
    last_tick: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_reconcile: LastReconcile,
}

/// The one seam a future outward-facing API (REST, CLI, whatever) would
/// call through — owns every long-lived collaborator and exposes the
/// control surface (pause/resume, trigger a pass, inspect tracked
/// records, swap preserved/managed lists, refresh the provider cache) as
/// inherent async methods. A plain struct assembled once in `main`,
/// cloned as `Arc` into whatever needs to drive it.
pub struct Supervisor {
    provider_name: String,
    zone: String,
    provider: Arc<dyn ProviderAdapter>,
    store: Arc<dyn RecordStore>,
    source: Arc<dyn HostnameSource>,
    reconciler: Arc<Reconciler>,
    sweeper: Arc<OrphanSweeper>,
    pause_mgr: Arc<PauseManager>,
    observed: Arc<RwLock<ObservedState>>,
}

impl Supervisor {
    /// Spawns a background task that mirrors the event bus into
    /// `last_tick`/`last_error`/`last_reconcile`, keeping a `RwLock`-guarded
    /// view up to date off to the side of the request path so `status()`
    /// never blocks on the reconciliation loop.
    pub fn new(
        provider_name: String,
        zone: String,
        provider: Arc<dyn ProviderAdapter>,
        store: Arc<dyn RecordStore>,
        source: Arc<dyn HostnameSource>,
        reconciler: Arc<Reconciler>,
        sweeper: Arc<OrphanSweeper>,
        pause_mgr: Arc<PauseManager>,
        events: EventBus,
    ) -> Arc<Self> {
        let observed = Arc::new(RwLock::new(ObservedState::default()));

        tokio::spawn(observe_events(events.subscribe(), observed.clone()));

        Arc::new(Self {
            provider_name,
            zone,
            provider,
            store,
            source,
            reconciler,
            sweeper,
            pause_mgr,
            observed,
        })
    }

    pub async fn pause(&self, reason: Option<String>, duration_minutes: Option<i64>, actor: Option<String>) {
        self.pause_mgr.pause(reason, duration_minutes, actor).await;
    }

    pub async fn resume(&self, actor: Option<String>) {
        self.pause_mgr.resume(actor).await;
    }

    pub async fn trigger_reconcile(&self) -> ReconcileStats {
        trigger_reconcile(&self.reconciler, self.source.as_ref()).await
    }

    pub async fn trigger_cleanup(&self, force_immediate: bool) -> dnsguard_reconciler::SweepStats {
        trigger_cleanup(&self.sweeper, force_immediate).await
    }

    pub async fn list_tracked_records(
        &self,
        provider: Option<&str>,
    ) -> dnsguard_store::Result<Vec<TrackedRecord>> {
        self.store.list_tracked(provider).await
    }

    pub async fn set_preserved(&self, preserved: PreservedPatternList) {
        self.reconciler.set_preserved(preserved).await;
    }

    pub async fn set_managed(&self, managed: Vec<ManagedHostname>) {
        self.reconciler.set_managed(managed).await;
    }

    pub async fn refresh_provider_cache(&self) -> dnsguard_provider::Result<()> {
        let records = self.provider.refresh_record_cache().await?;
        tracing::debug!(count = records.len(), "refreshed provider record cache");
        Ok(())
    }

    pub async fn status(&self) -> Status {
        let pause = self.pause_mgr.status().await;
        let observed = self.observed.read().await.clone();

        let tracked = self
            .store
            .list_tracked(Some(&self.provider_name))
            .await
            .unwrap_or_default();
        let orphaned = tracked.iter().filter(|r| r.orphaned_at.is_some()).count();
        let managed = tracked.iter().filter(|r| r.app_managed).count();

        Status {
            paused: pause.paused,
            pause_reason: pause.reason,
            last_tick: observed.last_tick,
            last_error: observed.last_error,
            provider: self.provider_name.clone(),
            zone: self.zone.clone(),
            stats: SupervisorStats {
                tracked: tracked.len(),
                orphaned,
                managed,
                last_reconcile: observed.last_reconcile,
            },
        }
    }
}

async fn observe_events(mut sub: dnsguard_events::EventSubscriber, observed: Arc<RwLock<ObservedState>>) {
    while let Some(event) = sub.recv().await {
        match event {
            Event::ReconcileStarted => {
                observed.write().await.last_tick = Some(Utc::now());
            }
            Event::ReconcileFinished(stats) => {
                observed.write().await.last_reconcile = stats.into();
            }
            Event::Error { message, .. } => {
                observed.write().await.last_error = Some(message);
            }
            _ => {}
        }
    }
}
