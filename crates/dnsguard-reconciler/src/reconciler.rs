use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dnsguard_config::{ManagedHostname, PreservedPatternList, PublicIp};
use dnsguard_events::{Event, EventBus, RecordRef, RecordType, ReconcileStats};
use dnsguard_provider::{ProviderAdapter, ProviderRecord};
use dnsguard_source::HostnameSet;
use dnsguard_store::{FakeStore, NewRecord, RecordStore, StoreError};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::equality::materially_equal;
use crate::intent::{self, PublicIps};

/// How long a single store-degraded warning suppresses repeats for.
fn shadow_warn_window() -> ChronoDuration {
    ChronoDuration::minutes(5)
}

/// Consumes a `HostnameSet`, materializes record intents, calls the
/// `ProviderAdapter` for creates/updates, persists outcomes via the
/// `RecordStore`, and publishes events.
///
/// At most one pass is in flight at a time; a tick arriving while one is
/// running sets a dirty flag and the in-flight pass loops once more
/// before releasing its lock, rather than running two passes
/// concurrently.
pub struct Reconciler {
    provider_name: String,
    zone: String,
    provider: Arc<dyn ProviderAdapter>,
    store: Arc<dyn RecordStore>,
    events: EventBus,
    managed: RwLock<Vec<ManagedHostname>>,
    preserved: Arc<RwLock<PreservedPatternList>>,
    public_ip: Arc<PublicIp>,
    default_ttl: i32,
    first_run: AtomicBool,
    in_flight: Mutex<()>,
    dirty: AtomicBool,
    active_intents: RwLock<HashSet<(RecordType, String)>>,
    /// Process-local fallback consulted when `store` write calls fail.
    /// Never read by the Orphan Sweeper, so a degraded store can't lead to
    /// a destructive provider call being made on stale in-memory state.
    shadow: FakeStore,
    shadow_warned_at: StdMutex<Option<DateTime<Utc>>>,
}

impl Reconciler {
    pub fn new(
        provider_name: String,
        zone: String,
        provider: Arc<dyn ProviderAdapter>,
        store: Arc<dyn RecordStore>,
        events: EventBus,
        managed: Vec<ManagedHostname>,
        preserved: PreservedPatternList,
        public_ip: Arc<PublicIp>,
    ) -> Self {
        Self {
            provider_name,
            zone,
            provider,
            store,
            events,
            managed: RwLock::new(managed),
            preserved: Arc::new(RwLock::new(preserved)),
            public_ip,
            default_ttl: dnsguard_config::constants::DEFAULT_RECORD_TTL_SECONDS,
            first_run: AtomicBool::new(true),
            in_flight: Mutex::new(()),
            dirty: AtomicBool::new(false),
            active_intents: RwLock::new(HashSet::new()),
            shadow: FakeStore::new(),
            shadow_warned_at: StdMutex::new(None),
        }
    }

    /// Shares this reconciler's preserved-pattern list with an
    /// `OrphanSweeper`, so `set_preserved` updates both at once — the list
    /// is loaded from configuration at startup and reloadable at runtime.
    pub fn preserved_handle(&self) -> Arc<RwLock<PreservedPatternList>> {
        self.preserved.clone()
    }

    pub async fn set_managed(&self, managed: Vec<ManagedHostname>) {
        *self.managed.write().await = managed;
    }

    pub async fn set_preserved(&self, preserved: PreservedPatternList) {
        *self.preserved.write().await = preserved;
    }

    /// `(type, name)` pairs the most recent completed pass considered
    /// live — consulted by the Orphan Sweeper to decide whether a tracked
    /// record should be reclaimed instead of orphaned.
    pub async fn active_intents(&self) -> HashSet<(RecordType, String)> {
        self.active_intents.read().await.clone()
    }

    pub async fn reconcile(&self, hostnames: HostnameSet) -> ReconcileStats {
        let Ok(guard) = self.in_flight.try_lock() else {
            self.dirty.store(true, Ordering::SeqCst);
            return ReconcileStats::default();
        };
        let _guard = guard;

        let mut stats = self.run_pass(&hostnames).await;
        while self.dirty.swap(false, Ordering::SeqCst) {
            stats = self.run_pass(&hostnames).await;
        }
        stats
    }

    async fn run_pass(&self, hostnames: &HostnameSet) -> ReconcileStats {
        self.events.publish(Event::ReconcileStarted);

        let public_ips = PublicIps {
            ipv4: self.public_ip.ipv4().await,
            ipv6: self.public_ip.ipv6().await,
        };

        let managed = self.managed.read().await;
        let intents = intent::build_intent_set(
            hostnames,
            &managed,
            &self.zone,
            public_ips,
            self.default_ttl,
        );
        drop(managed);
        let preserved = self.preserved.read().await;
        let intents = intent::apply_preserved(intents, &preserved);
        drop(preserved);

        let current_zone = match self.provider.list_records().await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "failed to list provider zone, deferring this pass");
                self.events.publish(Event::Error {
                    source: self.provider_name.clone(),
                    message: err.to_string(),
                });
                let stats = ReconcileStats {
                    failed: intents.len() as u32,
                    total: intents.len() as u32,
                    ..Default::default()
                };
                self.events.publish(Event::ReconcileFinished(stats));
                return stats;
            }
        };

        let mut by_key: HashMap<(RecordType, String), &ProviderRecord> = HashMap::new();
        for record in &current_zone {
            by_key.insert((record.record_type, record.name.clone()), record);
        }

        let intent_keys: HashSet<(RecordType, String)> = intents
            .iter()
            .map(|i| (i.record_type, i.name.clone()))
            .collect();

        if self.first_run.load(Ordering::SeqCst) {
            self.adopt_foreign_records(&current_zone, &intent_keys).await;
        }

        let mut stats = ReconcileStats {
            total: intents.len() as u32,
            ..Default::default()
        };

        for intent in &intents {
            if let Err(err) = self.provider.validate(intent) {
                warn!(name = %intent.name, %intent.record_type, error = %err, "intent failed validation");
                self.events.publish(Event::Error {
                    source: self.provider_name.clone(),
                    message: err.to_string(),
                });
                stats.failed += 1;
                continue;
            }

            match by_key.get(&(intent.record_type, intent.name.clone())) {
                None => match self.provider.create_record(intent).await {
                    Ok(created) => {
                        self.track_created(&created).await;
                        self.events.publish(Event::RecordCreated(self.record_ref(&created)));
                        stats.created += 1;
                    }
                    Err(err) => {
                        warn!(name = %intent.name, error = %err, "create_record failed");
                        self.events.publish(Event::Error {
                            source: self.provider_name.clone(),
                            message: err.to_string(),
                        });
                        stats.failed += 1;
                    }
                },
                Some(current) if materially_equal(current, intent) => {
                    self.ensure_tracked(current).await;
                    stats.unchanged += 1;
                }
                Some(current) => {
                    match self
                        .provider
                        .update_record(&current.provider_record_id, intent)
                        .await
                    {
                        Ok(updated) => {
                            self.track_created(&updated).await;
                            self.events.publish(Event::RecordUpdated(self.record_ref(&updated)));
                            stats.updated += 1;
                        }
                        Err(err) => {
                            warn!(name = %intent.name, error = %err, "update_record failed");
                            self.events.publish(Event::Error {
                                source: self.provider_name.clone(),
                                message: err.to_string(),
                            });
                            stats.failed += 1;
                        }
                    }
                }
            }
        }

        self.first_run.store(false, Ordering::SeqCst);
        *self.active_intents.write().await = intent_keys;

        self.events.publish(Event::ReconcileFinished(stats));
        stats
    }

    /// First-run adoption: every pre-existing provider record that
    /// doesn't match a current intent is tracked as `appManaged=false` so
    /// the Orphan Sweeper never considers deleting it. Records that DO
    /// match an intent are left for the main loop below, which tracks
    /// them as `appManaged=true` through the normal create/update/
    /// unchanged paths.
    async fn adopt_foreign_records(
        &self,
        current_zone: &[ProviderRecord],
        intent_keys: &HashSet<(RecordType, String)>,
    ) {
        for record in current_zone {
            if intent_keys.contains(&(record.record_type, record.name.clone())) {
                continue;
            }

            if let Err(err) = self.store.track(self.new_record(record), false).await {
                self.note_store_degraded("adopt_foreign_records", &err);
                let _ = self.shadow.track(self.new_record(record), false).await;
            }
        }
    }

    async fn track_created(&self, record: &ProviderRecord) {
        if let Err(err) = self.store.track(self.new_record(record), true).await {
            self.note_store_degraded("track", &err);
            let _ = self.shadow.track(self.new_record(record), true).await;
        }
    }

    async fn ensure_tracked(&self, record: &ProviderRecord) {
        match self
            .store
            .is_tracked(&self.provider_name, &record.provider_record_id)
            .await
        {
            Ok(true) => {}
            Ok(false) => self.track_created(record).await,
            Err(err) => {
                self.note_store_degraded("is_tracked", &err);
                match self
                    .shadow
                    .is_tracked(&self.provider_name, &record.provider_record_id)
                    .await
                {
                    Ok(true) => {}
                    _ => self.track_created(record).await,
                }
            }
        }
    }

    /// Logs a single warning per [`shadow_warn_window`] so a sustained
    /// outage doesn't flood the log with one line per record. Every call
    /// still falls through to the shadow regardless of whether it logs.
    fn note_store_degraded(&self, context: &'static str, err: &StoreError) {
        let mut last = self.shadow_warned_at.lock().unwrap();
        let now = Utc::now();
        let should_warn = match *last {
            Some(t) if now - t < shadow_warn_window() => false,
            _ => {
                *last = Some(now);
                true
            }
        };
        drop(last);

        if should_warn {
            warn!(
                error = %err,
                context,
                "store write degraded, falling back to in-memory shadow (further occurrences suppressed for the warn window)"
            );
        }
    }

    fn new_record(&self, record: &ProviderRecord) -> NewRecord {
        NewRecord {
            provider: self.provider_name.clone(),
            provider_record_id: record.provider_record_id.clone(),
            record_type: record.record_type,
            name: record.name.clone(),
            content: record.content.clone(),
            ttl: record.ttl,
            extras: serde_json::to_value(&ExtrasJson::from(&record.extras)).unwrap_or_default(),
        }
    }

    fn record_ref(&self, record: &ProviderRecord) -> RecordRef {
        RecordRef {
            provider: self.provider_name.clone(),
            record_type: record.record_type,
            name: record.name.clone(),
            provider_record_id: record.provider_record_id.clone(),
        }
    }
}

/// Plain serializable mirror of `RecordExtras` for the store's
/// `extras_json` column — kept local so `dnsguard-store` doesn't need to
/// depend on `dnsguard-provider`.
#[derive(serde::Serialize)]
struct ExtrasJson {
    priority: Option<u16>,
    weight: Option<u16>,
    port: Option<u16>,
    flags: Option<u8>,
    tag: Option<String>,
    proxied: Option<bool>,
}

impl From<&dnsguard_provider::RecordExtras> for ExtrasJson {
    fn from(e: &dnsguard_provider::RecordExtras) -> Self {
        Self {
            priority: e.priority,
            weight: e.weight,
            port: e.port,
            flags: e.flags,
            tag: e.tag.clone(),
            proxied: e.proxied,
        }
    }
}
