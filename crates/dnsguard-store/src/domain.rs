use chrono::{DateTime, Utc};
use dnsguard_events::RecordType;
use serde_json::Value as Json;

/// What the Record Store owns for a single provider record. Crosses crate
/// boundaries as a plain struct; callers never see the sea-orm entity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedRecord {
    pub provider: String,
    pub provider_record_id: String,
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: i32,
    pub app_managed: bool,
    pub orphaned_at: Option<DateTime<Utc>>,
    pub first_seen_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub extras: Json,
}

/// What `track()` did so callers can tell a fresh insert from a
/// provider-id change on an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Created,
    Updated,
}

/// What the caller supplies to `track()`; the store owns the rest
/// (timestamps, `appManaged`, `orphanedAt`) as part of its guarantees.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub provider: String,
    pub provider_record_id: String,
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: i32,
    pub extras: Json,
}

/// A cached snapshot row mirroring the provider's view of the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRecord {
    pub provider: String,
    pub provider_record_id: String,
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub ttl: i32,
    pub extras: Json,
    pub fetched_at: DateTime<Utc>,
}
