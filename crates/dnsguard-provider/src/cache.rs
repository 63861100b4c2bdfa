use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::types::ProviderRecord;

struct CacheState {
    records: Vec<ProviderRecord>,
    last_updated: Option<DateTime<Utc>>,
}

/// Holds the last snapshot fetched from a provider's `list_records` call.
/// Adapter reads go through this; `needs_refresh()` tells callers when the
/// snapshot has gone stale relative to `CACHE_TTL_MINUTES`.
pub struct ProviderCache {
    state: Arc<RwLock<CacheState>>,
    ttl: StdDuration,
}

impl ProviderCache {
    pub fn new(ttl: StdDuration) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState {
                records: Vec::new(),
                last_updated: None,
            })),
            ttl,
        }
    }

    pub async fn get(&self) -> Vec<ProviderRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_updated
    }

    pub async fn needs_refresh(&self) -> bool {
        let state = self.state.read().await;
        match state.last_updated {
            None => true,
            Some(last_updated) => {
                let age = Utc::now().signed_duration_since(last_updated);
                age.to_std().unwrap_or(StdDuration::MAX) > self.ttl
            }
        }
    }

    /// Atomically replaces the cached snapshot.
    pub async fn replace(&self, records: Vec<ProviderRecord>) {
        let mut state = self.state.write().await;
        state.records = records;
        state.last_updated = Some(Utc::now());
    }

    /// Patches a single row in place (used after a successful
    /// create/update/delete so the next read doesn't need a round trip).
    pub async fn upsert(&self, record: ProviderRecord) {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .records
            .iter_mut()
            .find(|r| r.provider_record_id == record.provider_record_id)
        {
            *existing = record;
        } else {
            state.records.push(record);
        }
    }

    pub async fn remove(&self, provider_record_id: &str) {
        let mut state = self.state.write().await;
        state.records.retain(|r| r.provider_record_id != provider_record_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordExtras;
    use dnsguard_events::RecordType;

    fn sample(id: &str) -> ProviderRecord {
        ProviderRecord {
            provider_record_id: id.to_string(),
            name: "app.example".to_string(),
            record_type: RecordType::A,
            content: "1.2.3.4".to_string(),
            ttl: 300,
            extras: RecordExtras::default(),
            provider_meta: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn starts_empty_and_needing_refresh() {
        let cache = ProviderCache::new(StdDuration::from_secs(60));
        assert!(cache.needs_refresh().await);
        assert!(cache.get().await.is_empty());
    }

    #[tokio::test]
    async fn replace_clears_stale_flag() {
        let cache = ProviderCache::new(StdDuration::from_secs(60));
        cache.replace(vec![sample("r1")]).await;
        assert!(!cache.needs_refresh().await);
        assert_eq!(cache.get().await.len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_matching_id() {
        let cache = ProviderCache::new(StdDuration::from_secs(60));
        cache.replace(vec![sample("r1")]).await;

        let mut updated = sample("r1");
        updated.content = "5.6.7.8".to_string();
        cache.upsert(updated).await;

        let records = cache.get().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "5.6.7.8");
    }
}
