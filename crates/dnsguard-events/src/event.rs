use serde::{Deserialize, Serialize};

use crate::record_type::RecordType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub failed: u32,
    pub total: u32,
}

/// Identity of a record carried by the record-lifecycle event variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub provider: String,
    pub record_type: RecordType,
    pub name: String,
    pub provider_record_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ReconcileStarted,
    ReconcileFinished(ReconcileStats),
    RecordCreated(RecordRef),
    RecordUpdated(RecordRef),
    RecordDeleted(RecordRef),
    RecordOrphaned(RecordRef),
    RecordReclaimed(RecordRef),
    /// `source` names the component that raised the error (e.g. the
    /// provider adapter's type or "hostname_source").
    Error { source: String, message: String },
    PauseChanged { paused: bool, reason: Option<String> },
}
