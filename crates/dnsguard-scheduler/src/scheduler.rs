use std::sync::Arc;
use std::time::Duration;

use dnsguard_events::ReconcileStats;
use dnsguard_reconciler::{OrphanSweeper, Reconciler, SweepStats};
use dnsguard_source::HostnameSource;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::pause::PauseManager;

/// Handles for the two background loops `run_scheduler` spawns, joined at
/// shutdown alongside `dnsguard`'s other worker tasks.
pub struct SchedulerHandles {
    pub poll: JoinHandle<()>,
    pub cleanup: JoinHandle<()>,
}

/// Spawns the reconciliation poll loop and the orphan cleanup loop as
/// independent tasks, each gated by the shared `PauseManager`.
pub fn run_scheduler(
    reconciler: Arc<Reconciler>,
    sweeper: Arc<OrphanSweeper>,
    source: Arc<dyn HostnameSource>,
    pause_mgr: Arc<PauseManager>,
    poll_interval: Duration,
    cleanup_interval: Duration,
) -> SchedulerHandles {
    let poll = tokio::spawn(run_poll_loop(reconciler, source, pause_mgr.clone(), poll_interval));
    let cleanup = tokio::spawn(run_cleanup_loop(sweeper, pause_mgr, cleanup_interval));
    SchedulerHandles { poll, cleanup }
}

async fn run_poll_loop(
    reconciler: Arc<Reconciler>,
    source: Arc<dyn HostnameSource>,
    pause_mgr: Arc<PauseManager>,
    interval: Duration,
) {
    info!("starting reconciliation poll loop");
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        if pause_mgr.is_paused().await {
            debug!("reconciliation tick dropped, paused");
            continue;
        }

        trigger_reconcile(&reconciler, source.as_ref()).await;
    }
}

async fn run_cleanup_loop(sweeper: Arc<OrphanSweeper>, pause_mgr: Arc<PauseManager>, interval: Duration) {
    info!("starting orphan sweep loop");
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        if pause_mgr.is_paused().await {
            debug!("cleanup tick dropped, paused");
            continue;
        }

        trigger_cleanup(&sweeper, false).await;
    }
}

/// One-shot reconciliation pass, bypassing the pause gate. Used by the
/// periodic loop above and by any explicit caller (the `Supervisor`'s
/// `trigger_reconcile`) — pause only drops the scheduled tick, never a
/// direct call.
pub async fn trigger_reconcile(reconciler: &Reconciler, source: &dyn HostnameSource) -> ReconcileStats {
    match source.tick().await {
        Ok(hostnames) => reconciler.reconcile(hostnames).await,
        Err(err) => {
            warn!(error = %err, "hostname source tick failed, skipping this reconciliation pass");
            ReconcileStats::default()
        }
    }
}

/// One-shot orphan sweep, bypassing the pause gate.
pub async fn trigger_cleanup(sweeper: &OrphanSweeper, force_immediate: bool) -> SweepStats {
    sweeper.sweep(force_immediate).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnsguard_config::{PreservedPatternList, PublicIp};
    use dnsguard_events::EventBus;
    use dnsguard_source::HostnameSet;
    use dnsguard_store::FakeStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl HostnameSource for CountingSource {
        async fn tick(&self) -> dnsguard_source::Result<HostnameSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HostnameSet::default())
        }
    }

    struct NoopProvider {
        zone: String,
    }

    #[async_trait::async_trait]
    impl dnsguard_provider::ProviderAdapter for NoopProvider {
        async fn init(&self) -> dnsguard_provider::Result<()> {
            Ok(())
        }
        async fn test_connection(&self) -> dnsguard_provider::Result<()> {
            Ok(())
        }
        fn zone_name(&self) -> &str {
            &self.zone
        }
        fn capabilities(&self) -> dnsguard_provider::Capabilities {
            dnsguard_provider::Capabilities {
                proxied: false,
                ttl_min: 60,
                ttl_max: 86_400,
                supported_types: vec![],
                batch_operations: false,
            }
        }
        async fn list_records(&self) -> dnsguard_provider::Result<Vec<dnsguard_provider::ProviderRecord>> {
            Ok(Vec::new())
        }
        async fn refresh_record_cache(&self) -> dnsguard_provider::Result<Vec<dnsguard_provider::ProviderRecord>> {
            Ok(Vec::new())
        }
        async fn create_record(
            &self,
            _intent: &dnsguard_provider::RecordIntent,
        ) -> dnsguard_provider::Result<dnsguard_provider::ProviderRecord> {
            unreachable!("test source never emits hostnames")
        }
        async fn update_record(
            &self,
            _id: &str,
            _intent: &dnsguard_provider::RecordIntent,
        ) -> dnsguard_provider::Result<dnsguard_provider::ProviderRecord> {
            unreachable!("test source never emits hostnames")
        }
        async fn delete_record(&self, _id: &str) -> dnsguard_provider::Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn paused_scheduler_drops_ticks_without_consulting_the_source() {
        let provider = Arc::new(NoopProvider {
            zone: "example.com".to_string(),
        });
        let store = Arc::new(FakeStore::new());
        let events = EventBus::new();
        let reconciler = Arc::new(Reconciler::new(
            "fake".to_string(),
            "example.com".to_string(),
            provider.clone(),
            store.clone(),
            events.clone(),
            Vec::new(),
            PreservedPatternList::parse(""),
            PublicIp::with_values(None, None),
        ));
        let sweeper = Arc::new(OrphanSweeper::new(
            "fake".to_string(),
            provider,
            store,
            events.clone(),
            reconciler.clone(),
            reconciler.preserved_handle(),
            chrono::Duration::minutes(15),
        ));
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let pause_mgr = PauseManager::new(events);
        pause_mgr.pause(Some("test".to_string()), None, None).await;

        let handles = run_scheduler(
            reconciler,
            sweeper,
            source.clone(),
            pause_mgr,
            Duration::from_secs(5),
            Duration::from_secs(5),
        );

        tokio::time::advance(Duration::from_secs(20)).await;
        tokio::task::yield_now().await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        handles.poll.abort();
        handles.cleanup.abort();
    }

    #[tokio::test]
    async fn trigger_reconcile_bypasses_pause() {
        let provider = Arc::new(NoopProvider {
            zone: "example.com".to_string(),
        });
        let store = Arc::new(FakeStore::new());
        let events = EventBus::new();
        let reconciler = Reconciler::new(
            "fake".to_string(),
            "example.com".to_string(),
            provider,
            store,
            events.clone(),
            Vec::new(),
            PreservedPatternList::parse(""),
            PublicIp::with_values(None, None),
        );
        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };

        let pause_mgr = PauseManager::new(events);
        pause_mgr.pause(Some("test".to_string()), None, None).await;

        trigger_reconcile(&reconciler, &source).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
