use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dnsguard_events::RecordType;
use dnsguard_provider::{
    Capabilities, ProviderAdapter, ProviderError, ProviderRecord, RecordIntent, Result,
};

/// In-memory stand-in for a DNS backend, used by reconciler/sweeper
/// scenario tests. Mirrors `CloudflareProvider`'s shape without any
/// network calls; `set_list_fails` simulates the provider-unreachable
/// cases the three-tier fallback exists for, `set_update_fails` simulates
/// a transient flap on `updateRecord` (timeout on one tick, success on
/// the next).
pub struct FakeProvider {
    zone: String,
    records: Mutex<Vec<ProviderRecord>>,
    next_id: AtomicU64,
    list_fails: AtomicBool,
    update_fails: AtomicBool,
    delete_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
            records: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            list_fails: AtomicBool::new(false),
            update_fails: AtomicBool::new(false),
            delete_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(zone: &str, records: Vec<ProviderRecord>) -> Self {
        Self {
            zone: zone.to_string(),
            records: Mutex::new(records),
            next_id: AtomicU64::new(1),
            list_fails: AtomicBool::new(false),
            update_fails: AtomicBool::new(false),
            delete_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_list_fails(&self, fails: bool) {
        self.list_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_update_fails(&self, fails: bool) {
        self.update_fails.store(fails, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<ProviderRecord> {
        self.records.lock().unwrap().clone()
    }

    /// `provider_record_id`s passed to `delete_record`, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for FakeProvider {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    fn zone_name(&self) -> &str {
        &self.zone
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            proxied: true,
            ttl_min: 60,
            ttl_max: 86_400,
            supported_types: vec![
                RecordType::A,
                RecordType::Aaaa,
                RecordType::Cname,
                RecordType::Mx,
                RecordType::Txt,
                RecordType::Srv,
                RecordType::Caa,
                RecordType::Ns,
            ],
            batch_operations: false,
        }
    }

    async fn list_records(&self) -> Result<Vec<ProviderRecord>> {
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::Transient("zone listing unavailable".to_string()));
        }
        Ok(self.snapshot())
    }

    async fn refresh_record_cache(&self) -> Result<Vec<ProviderRecord>> {
        self.list_records().await
    }

    async fn create_record(&self, intent: &RecordIntent) -> Result<ProviderRecord> {
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = ProviderRecord {
            provider_record_id: id,
            name: intent.name.clone(),
            record_type: intent.record_type,
            content: intent.content.clone(),
            ttl: intent.ttl.unwrap_or(300),
            extras: intent.extras.clone(),
            provider_meta: serde_json::json!({}),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        provider_record_id: &str,
        intent: &RecordIntent,
    ) -> Result<ProviderRecord> {
        if self.update_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::Timeout(std::time::Duration::from_secs(5)));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.provider_record_id == provider_record_id)
            .ok_or_else(|| ProviderError::NotFound(provider_record_id.to_string()))?;
        record.content = intent.content.clone();
        record.ttl = intent.ttl.unwrap_or(record.ttl);
        record.extras = intent.extras.clone();
        Ok(record.clone())
    }

    async fn delete_record(&self, provider_record_id: &str) -> Result<bool> {
        self.delete_calls
            .lock()
            .unwrap()
            .push(provider_record_id.to_string());

        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.provider_record_id != provider_record_id);
        Ok(records.len() < before)
    }
}

/// A `RecordStore` that fails every call, used to exercise the
/// Reconciler's in-memory shadow fallback without a database.
pub struct FailingStore;

#[async_trait]
impl dnsguard_store::RecordStore for FailingStore {
    async fn track(
        &self,
        _record: dnsguard_store::NewRecord,
        _app_managed: bool,
    ) -> dnsguard_store::Result<dnsguard_store::TrackOutcome> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn untrack(&self, _provider: &str, _provider_record_id: &str) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn is_tracked(&self, _provider: &str, _provider_record_id: &str) -> dnsguard_store::Result<bool> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn find_by_type_name(
        &self,
        _provider: &str,
        _record_type: RecordType,
        _name: &str,
    ) -> dnsguard_store::Result<Option<dnsguard_store::TrackedRecord>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn mark_orphaned(&self, _provider: &str, _provider_record_id: &str) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn unmark_orphaned(&self, _provider: &str, _provider_record_id: &str) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn get_orphaned_at(
        &self,
        _provider: &str,
        _provider_record_id: &str,
    ) -> dnsguard_store::Result<Option<chrono::DateTime<chrono::Utc>>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn list_orphans_older_than(
        &self,
        _provider: &str,
        _age: chrono::Duration,
    ) -> dnsguard_store::Result<Vec<dnsguard_store::TrackedRecord>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn update_id(&self, _provider: &str, _old_id: &str, _new_id: &str) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn update_id_by_type_name(
        &self,
        _provider: &str,
        _record_type: RecordType,
        _name: &str,
        _new_id: &str,
    ) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn refresh_provider_cache(
        &self,
        _provider: &str,
        _records: Vec<dnsguard_store::CachedRecord>,
    ) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn list_cached(&self, _provider: &str) -> dnsguard_store::Result<Vec<dnsguard_store::CachedRecord>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn cache_fetched_at(
        &self,
        _provider: &str,
    ) -> dnsguard_store::Result<Option<chrono::DateTime<chrono::Utc>>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn list_tracked(&self, _provider: Option<&str>) -> dnsguard_store::Result<Vec<dnsguard_store::TrackedRecord>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn get_setting(&self, _key: &str) -> dnsguard_store::Result<Option<serde_json::Value>> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }

    async fn set_setting(&self, _key: &str, _value: serde_json::Value) -> dnsguard_store::Result<()> {
        Err(dnsguard_store::StoreError::Degraded("connection refused".to_string()))
    }
}
