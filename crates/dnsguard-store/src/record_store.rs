use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value as Json;

use crate::domain::{CachedRecord, NewRecord, TrackOutcome, TrackedRecord};
use crate::error::Result;
use dnsguard_events::RecordType;

/// The Record Store's contract, kept free of `sea-orm` so the Reconciler
/// and the Scheduler can be exercised against an in-memory double. See
/// [`crate::Store`] for the durable implementation and
/// [`crate::FakeStore`] for the test double.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert by `(provider, providerRecordId)`. On duplicate
    /// `(provider, type, name)` among `appManaged=true` rows, updates the
    /// existing row's id instead of inserting a second one.
    async fn track(&self, record: NewRecord, app_managed: bool) -> Result<TrackOutcome>;

    /// Idempotent: untracking an id that isn't tracked is not an error.
    async fn untrack(&self, provider: &str, provider_record_id: &str) -> Result<()>;

    async fn is_tracked(&self, provider: &str, provider_record_id: &str) -> Result<bool>;

    async fn find_by_type_name(
        &self,
        provider: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Option<TrackedRecord>>;

    /// No-op (not an error) when the record is already marked or untracked.
    async fn mark_orphaned(&self, provider: &str, provider_record_id: &str) -> Result<()>;

    async fn unmark_orphaned(&self, provider: &str, provider_record_id: &str) -> Result<()>;

    async fn get_orphaned_at(
        &self,
        provider: &str,
        provider_record_id: &str,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Only ever returns `appManaged=true` rows — invariant 4 forbids
    /// orphaning (and thus sweeping) anything else.
    async fn list_orphans_older_than(
        &self,
        provider: &str,
        age: Duration,
    ) -> Result<Vec<TrackedRecord>>;

    /// For providers that regenerate ids on update.
    async fn update_id(&self, provider: &str, old_id: &str, new_id: &str) -> Result<()>;

    async fn update_id_by_type_name(
        &self,
        provider: &str,
        record_type: RecordType,
        name: &str,
        new_id: &str,
    ) -> Result<()>;

    /// Atomically replaces the cached zone snapshot for `provider`.
    async fn refresh_provider_cache(&self, provider: &str, records: Vec<CachedRecord>) -> Result<()>;

    async fn list_cached(&self, provider: &str) -> Result<Vec<CachedRecord>>;

    async fn cache_fetched_at(&self, provider: &str) -> Result<Option<DateTime<Utc>>>;

    /// Backs `listTrackedRecords(filter)`; `provider = None` lists across
    /// all configured providers.
    async fn list_tracked(&self, provider: Option<&str>) -> Result<Vec<TrackedRecord>>;

    async fn get_setting(&self, key: &str) -> Result<Option<Json>>;

    async fn set_setting(&self, key: &str, value: Json) -> Result<()>;
}
