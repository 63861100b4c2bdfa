use dnsguard_events::{RecordSource, RecordType};
use serde_json::Value as Json;

/// What the system wants to exist, derived fresh on every reconciliation
/// pass. Names crossing this boundary are always dotless lowercase FQDNs;
/// adapters translate to/from the wire convention internally.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIntent {
    pub zone: String,
    pub name: String,
    pub record_type: RecordType,
    pub content: String,
    pub ttl: Option<i32>,
    pub extras: RecordExtras,
    pub source: RecordSource,
}

/// Per-type rdata beyond `content`. Only the fields relevant to the
/// intent's `record_type` are meaningful; others are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordExtras {
    pub priority: Option<u16>,
    pub weight: Option<u16>,
    pub port: Option<u16>,
    pub flags: Option<u8>,
    pub tag: Option<String>,
    pub proxied: Option<bool>,
}

/// What the provider reports back for a single record in the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRecord {
    pub provider_record_id: String,
    pub name: String,
    pub record_type: RecordType,
    pub content: String,
    pub ttl: i32,
    pub extras: RecordExtras,
    pub provider_meta: Json,
}

/// Static facts about what an adapter can do, used by the Reconciler and
/// by `validate()` to reject intents the backend cannot satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub proxied: bool,
    pub ttl_min: i32,
    pub ttl_max: i32,
    pub supported_types: Vec<RecordType>,
    pub batch_operations: bool,
}

/// Outcome of a `batch_ensure_records` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub failed: u32,
}
