use std::collections::HashMap;

use dnsguard_events::RecordType;
use tracing::debug;

use crate::types::IntentHints;

/// Reads the `dns.*` namespace out of a labels map into an `IntentHints`.
/// Shared by both Hostname Source implementations since proxy-mode and
/// container-mode use the identical label vocabulary.
pub fn hints_from_labels(labels: &HashMap<String, String>) -> IntentHints {
    let mut hints = IntentHints::default();

    if let Some(raw) = labels.get("dns.type") {
        match raw.parse::<RecordType>() {
            Ok(rt) => hints.record_type = Some(rt),
            Err(_) => debug!(value = %raw, "ignoring unparseable dns.type label"),
        }
    }

    if let Some(raw) = labels.get("dns.ttl") {
        match raw.parse::<i32>() {
            Ok(ttl) => hints.ttl = Some(ttl),
            Err(_) => debug!(value = %raw, "ignoring unparseable dns.ttl label"),
        }
    }

    if let Some(content) = labels.get("dns.content") {
        hints.content = Some(content.clone());
    }

    if let Some(raw) = labels.get("dns.proxied") {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => hints.proxied = Some(true),
            "false" | "0" => hints.proxied = Some(false),
            _ => debug!(value = %raw, "ignoring unparseable dns.proxied label"),
        }
    }

    hints
}

/// Explicit hostname set via `dns.hostname` (container-mode, where there's
/// no router rule to parse hosts out of).
pub fn hostname_from_labels(labels: &HashMap<String, String>) -> Option<String> {
    labels.get("dns.hostname").map(|s| s.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels() {
        let mut labels = HashMap::new();
        labels.insert("dns.type".to_string(), "cname".to_string());
        labels.insert("dns.ttl".to_string(), "120".to_string());
        labels.insert("dns.proxied".to_string(), "true".to_string());

        let hints = hints_from_labels(&labels);
        assert_eq!(hints.record_type, Some(RecordType::Cname));
        assert_eq!(hints.ttl, Some(120));
        assert_eq!(hints.proxied, Some(true));
    }

    #[test]
    fn ignores_malformed_labels_without_erroring() {
        let mut labels = HashMap::new();
        labels.insert("dns.type".to_string(), "not-a-type".to_string());
        labels.insert("dns.ttl".to_string(), "not-a-number".to_string());

        let hints = hints_from_labels(&labels);
        assert_eq!(hints.record_type, None);
        assert_eq!(hints.ttl, None);
    }
}
