use std::collections::{HashMap, HashSet};

use dnsguard_events::RecordType;

/// Per-hostname hints a router or container label set can supply: a
/// record-type override, a TTL override, and (for Cloudflare-flavored
/// backends) a proxied-through-edge override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentHints {
    pub record_type: Option<RecordType>,
    pub ttl: Option<i32>,
    pub content: Option<String>,
    pub proxied: Option<bool>,
}

/// What a Hostname Source emits on each tick: the set of FQDNs currently
/// in use, plus any hints discovered alongside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostnameSet {
    pub hostnames: HashSet<String>,
    pub hints: HashMap<String, IntentHints>,
}

impl HostnameSet {
    pub fn insert(&mut self, hostname: String, hints: IntentHints) {
        self.hostnames.insert(hostname.clone());
        self.hints.insert(hostname, hints);
    }

    pub fn hints_for(&self, hostname: &str) -> IntentHints {
        self.hints.get(hostname).cloned().unwrap_or_default()
    }
}
