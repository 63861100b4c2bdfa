use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dnsguard_events::RecordType;
use serde_json::Value as Json;

use crate::domain::{CachedRecord, NewRecord, TrackOutcome, TrackedRecord};
use crate::error::Result;
use crate::record_store::RecordStore;

/// In-memory stand-in for [`crate::Store`], used by `dnsguard-reconciler`
/// and `dnsguard-scheduler` tests so they don't need a live database.
#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<TrackedRecord>>,
    cache: Mutex<Vec<CachedRecord>>,
    settings: Mutex<Vec<(String, Json)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn track(&self, record: NewRecord, app_managed: bool) -> Result<TrackOutcome> {
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.provider == record.provider && r.provider_record_id == record.provider_record_id)
        {
            existing.record_type = record.record_type;
            existing.name = record.name;
            existing.content = record.content;
            existing.ttl = record.ttl;
            existing.app_managed = app_managed;
            existing.extras = record.extras;
            existing.last_updated_at = now;
            return Ok(TrackOutcome::Updated);
        }

        if app_managed {
            if let Some(existing) = records.iter_mut().find(|r| {
                r.provider == record.provider
                    && r.record_type == record.record_type
                    && r.name == record.name
                    && r.app_managed
            }) {
                existing.provider_record_id = record.provider_record_id;
                existing.content = record.content;
                existing.ttl = record.ttl;
                existing.extras = record.extras;
                existing.last_updated_at = now;
                return Ok(TrackOutcome::Updated);
            }
        }

        records.push(TrackedRecord {
            provider: record.provider,
            provider_record_id: record.provider_record_id,
            record_type: record.record_type,
            name: record.name,
            content: record.content,
            ttl: record.ttl,
            app_managed,
            orphaned_at: None,
            first_seen_at: now,
            last_updated_at: now,
            extras: record.extras,
        });
        Ok(TrackOutcome::Created)
    }

    async fn untrack(&self, provider: &str, provider_record_id: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .retain(|r| !(r.provider == provider && r.provider_record_id == provider_record_id));
        Ok(())
    }

    async fn is_tracked(&self, provider: &str, provider_record_id: &str) -> Result<bool> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.provider == provider && r.provider_record_id == provider_record_id))
    }

    async fn find_by_type_name(
        &self,
        provider: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Option<TrackedRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.provider == provider && r.record_type == record_type && r.name == name)
            .cloned())
    }

    async fn mark_orphaned(&self, provider: &str, provider_record_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.provider == provider && r.provider_record_id == provider_record_id)
        {
            if existing.orphaned_at.is_none() {
                existing.orphaned_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn unmark_orphaned(&self, provider: &str, provider_record_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.provider == provider && r.provider_record_id == provider_record_id)
        {
            existing.orphaned_at = None;
        }
        Ok(())
    }

    async fn get_orphaned_at(
        &self,
        provider: &str,
        provider_record_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.provider == provider && r.provider_record_id == provider_record_id)
            .and_then(|r| r.orphaned_at))
    }

    async fn list_orphans_older_than(
        &self,
        provider: &str,
        age: Duration,
    ) -> Result<Vec<TrackedRecord>> {
        let threshold = Utc::now() - age;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.provider == provider
                    && r.app_managed
                    && r.orphaned_at.is_some_and(|t| t <= threshold)
            })
            .cloned()
            .collect())
    }

    async fn update_id(&self, provider: &str, old_id: &str, new_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.provider == provider && r.provider_record_id == old_id)
        {
            existing.provider_record_id = new_id.to_string();
            existing.last_updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_id_by_type_name(
        &self,
        provider: &str,
        record_type: RecordType,
        name: &str,
        new_id: &str,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.provider == provider && r.record_type == record_type && r.name == name)
        {
            existing.provider_record_id = new_id.to_string();
            existing.last_updated_at = Utc::now();
        }
        Ok(())
    }

    async fn refresh_provider_cache(&self, provider: &str, records: Vec<CachedRecord>) -> Result<()> {
        let mut cache = self.cache.lock().unwrap();
        cache.retain(|r| r.provider != provider);
        cache.extend(records);
        Ok(())
    }

    async fn list_cached(&self, provider: &str) -> Result<Vec<CachedRecord>> {
        Ok(self
            .cache
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.provider == provider)
            .cloned()
            .collect())
    }

    async fn cache_fetched_at(&self, provider: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .cache
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.provider == provider)
            .map(|r| r.fetched_at))
    }

    async fn list_tracked(&self, provider: Option<&str>) -> Result<Vec<TrackedRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| provider.is_none_or(|p| p == r.provider))
            .cloned()
            .collect())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Json>> {
        Ok(self
            .settings
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    async fn set_setting(&self, key: &str, value: Json) -> Result<()> {
        let mut settings = self.settings.lock().unwrap();
        if let Some(existing) = settings.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            settings.push((key.to_string(), value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_record(id: &str) -> NewRecord {
        NewRecord {
            provider: "cloudflare".to_string(),
            provider_record_id: id.to_string(),
            record_type: RecordType::A,
            name: "app.example".to_string(),
            content: "1.2.3.4".to_string(),
            ttl: 300,
            extras: json!({}),
        }
    }

    #[tokio::test]
    async fn track_inserts_then_updates_by_provider_id() {
        let store = FakeStore::new();
        let outcome = store.track(new_record("rec1"), true).await.unwrap();
        assert_eq!(outcome, TrackOutcome::Created);

        let outcome = store.track(new_record("rec1"), true).await.unwrap();
        assert_eq!(outcome, TrackOutcome::Updated);

        let tracked = store.list_tracked(None).await.unwrap();
        assert_eq!(tracked.len(), 1);
    }

    #[tokio::test]
    async fn track_reuses_row_on_type_name_collision_among_app_managed() {
        let store = FakeStore::new();
        store.track(new_record("rec1"), true).await.unwrap();

        let mut second = new_record("rec2");
        second.content = "5.6.7.8".to_string();
        let outcome = store.track(second, true).await.unwrap();
        assert_eq!(outcome, TrackOutcome::Updated);

        let tracked = store.list_tracked(None).await.unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].provider_record_id, "rec2");
        assert_eq!(tracked[0].content, "5.6.7.8");
    }

    #[tokio::test]
    async fn orphan_lifecycle() {
        let store = FakeStore::new();
        store.track(new_record("rec1"), true).await.unwrap();

        store.mark_orphaned("cloudflare", "rec1").await.unwrap();
        assert!(store.get_orphaned_at("cloudflare", "rec1").await.unwrap().is_some());

        store.unmark_orphaned("cloudflare", "rec1").await.unwrap();
        assert!(store.get_orphaned_at("cloudflare", "rec1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orphans_older_than_respects_grace_window() {
        let store = FakeStore::new();
        store.track(new_record("rec1"), true).await.unwrap();
        store.mark_orphaned("cloudflare", "rec1").await.unwrap();

        let none_yet = store
            .list_orphans_older_than("cloudflare", Duration::minutes(5))
            .await
            .unwrap();
        assert!(none_yet.is_empty());

        let all = store
            .list_orphans_older_than("cloudflare", Duration::seconds(-1))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }
}
