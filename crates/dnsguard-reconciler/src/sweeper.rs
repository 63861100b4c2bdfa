use std::sync::Arc;

use chrono::Duration;
use dnsguard_config::PreservedPatternList;
use dnsguard_events::{Event, EventBus};
use dnsguard_provider::ProviderAdapter;
use dnsguard_store::RecordStore;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::reconciler::Reconciler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub orphaned: u32,
    pub reclaimed: u32,
    pub deleted: u32,
    pub skipped_degraded: bool,
}

/// Scans tracked `appManaged=true` records for ones whose intent has
/// disappeared, ages them through a grace period, then deletes. Runs on
/// its own schedule, independent of the Reconciler's tick.
pub struct OrphanSweeper {
    provider_name: String,
    provider: Arc<dyn ProviderAdapter>,
    store: Arc<dyn RecordStore>,
    events: EventBus,
    reconciler: Arc<Reconciler>,
    preserved: Arc<RwLock<PreservedPatternList>>,
    grace_period: Duration,
}

impl OrphanSweeper {
    /// `preserved` is normally obtained via `Reconciler::preserved_handle()`
    /// so a single `set_preserved` call updates both components at once.
    pub fn new(
        provider_name: String,
        provider: Arc<dyn ProviderAdapter>,
        store: Arc<dyn RecordStore>,
        events: EventBus,
        reconciler: Arc<Reconciler>,
        preserved: Arc<RwLock<PreservedPatternList>>,
        grace_period: Duration,
    ) -> Self {
        Self {
            provider_name,
            provider,
            store,
            events,
            reconciler,
            preserved,
            grace_period,
        }
    }

    pub async fn sweep(&self, force_immediate: bool) -> SweepStats {
        if self.is_degraded().await {
            warn!(
                "provider zone and cache both unavailable, falling back to database-only sweep"
            );
            return self.sweep_database_only(force_immediate).await;
        }

        let active_intents = self.reconciler.active_intents().await;

        let tracked = match self.store.list_tracked(Some(&self.provider_name)).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "failed to list tracked records, skipping sweep");
                return SweepStats {
                    skipped_degraded: true,
                    ..Default::default()
                };
            }
        };

        let mut stats = SweepStats::default();
        let preserved = self.preserved.read().await;

        for record in tracked.iter().filter(|r| r.app_managed) {
            if preserved.matches(&record.name) {
                debug!(name = %record.name, "skipping preserved hostname in sweep");
                continue;
            }

            let key = (record.record_type, record.name.clone());
            let still_live = active_intents.contains(&key);

            if still_live {
                if record.orphaned_at.is_some() {
                    if let Err(err) = self
                        .store
                        .unmark_orphaned(&self.provider_name, &record.provider_record_id)
                        .await
                    {
                        warn!(name = %record.name, error = %err, "failed to unmark orphaned record");
                        continue;
                    }
                    self.events.publish(Event::RecordReclaimed(self.record_ref(record)));
                    stats.reclaimed += 1;
                }
                continue;
            }

            match record.orphaned_at {
                None => {
                    if let Err(err) = self
                        .store
                        .mark_orphaned(&self.provider_name, &record.provider_record_id)
                        .await
                    {
                        warn!(name = %record.name, error = %err, "failed to mark record orphaned");
                        continue;
                    }
                    self.events.publish(Event::RecordOrphaned(self.record_ref(record)));
                    stats.orphaned += 1;
                }
                Some(orphaned_at) => {
                    let due = force_immediate || chrono::Utc::now() - orphaned_at >= self.grace_period;
                    if !due {
                        continue;
                    }

                    match self.provider.delete_record(&record.provider_record_id).await {
                        Ok(_) => {
                            if let Err(err) = self
                                .store
                                .untrack(&self.provider_name, &record.provider_record_id)
                                .await
                            {
                                warn!(name = %record.name, error = %err, "deleted at provider but failed to untrack, will retry");
                                continue;
                            }
                            self.events.publish(Event::RecordDeleted(self.record_ref(record)));
                            stats.deleted += 1;
                        }
                        Err(err) => {
                            warn!(name = %record.name, error = %err, "delete_record failed, retrying next sweep");
                        }
                    }
                }
            }
        }

        for record in tracked.iter().filter(|r| !r.app_managed) {
            debug!(name = %record.name, provider = %record.provider, "appManaged=false record present, never swept");
        }

        stats
    }

    /// No provider call is reachable: neither the live zone nor the cached
    /// snapshot is available. Rather than mark or reclaim anything (there
    /// is no zone data to decide that against), this only prunes store
    /// entries whose `orphanedAt` already exceeded grace before the
    /// provider went unreachable — a pure store operation invariant 4
    /// allows even while degraded, since it never calls `delete_record`.
    async fn sweep_database_only(&self, force_immediate: bool) -> SweepStats {
        let mut stats = SweepStats {
            skipped_degraded: true,
            ..Default::default()
        };

        let age = if force_immediate {
            Duration::zero()
        } else {
            self.grace_period
        };

        let overdue = match self.store.list_orphans_older_than(&self.provider_name, age).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "failed to list overdue orphans in database-only sweep");
                return stats;
            }
        };

        let preserved = self.preserved.read().await;

        for record in overdue {
            if preserved.matches(&record.name) {
                debug!(name = %record.name, "skipping preserved hostname in database-only sweep");
                continue;
            }

            match self
                .store
                .untrack(&self.provider_name, &record.provider_record_id)
                .await
            {
                Ok(()) => {
                    self.events.publish(Event::RecordDeleted(self.record_ref(&record)));
                    stats.deleted += 1;
                }
                Err(err) => {
                    warn!(name = %record.name, error = %err, "failed to untrack overdue orphan in database-only sweep");
                }
            }
        }

        stats
    }

    /// Three-tier fallback: live zone, else cached snapshot, else
    /// database-only. Only the first two tiers are consulted here to
    /// decide reachability — the actual orphan/reclaim decision is driven
    /// entirely by the Reconciler's most recent `IntentSet`, not by zone
    /// contents, so a cache hit and a live hit are equivalent for this
    /// purpose. When neither is available, `sweep_database_only` takes
    /// over instead of touching the provider.
    async fn is_degraded(&self) -> bool {
        if self.provider.list_records().await.is_ok() {
            return false;
        }

        warn!("provider zone unavailable, falling back to cached snapshot for sweep");
        match self.store.list_cached(&self.provider_name).await {
            Ok(rows) if !rows.is_empty() => false,
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "cached snapshot also unavailable");
                true
            }
        }
    }

    fn record_ref(&self, record: &dnsguard_store::TrackedRecord) -> dnsguard_events::RecordRef {
        dnsguard_events::RecordRef {
            provider: self.provider_name.clone(),
            record_type: record.record_type,
            name: record.name.clone(),
            provider_record_id: record.provider_record_id.clone(),
        }
    }
}
