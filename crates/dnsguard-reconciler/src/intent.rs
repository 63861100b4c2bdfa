use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use dnsguard_config::ManagedHostname;
use dnsguard_events::{RecordSource, RecordType};
use dnsguard_provider::{RecordExtras, RecordIntent};
use dnsguard_source::HostnameSet;
use tracing::warn;

/// Current public IPs, passed in by whatever owns the Clock & Config
/// component rather than threaded through as a live handle — intent
/// building is a pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicIps {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

/// Builds the `IntentSet` for one reconciliation pass: discovered
/// hostnames combined with the operator's `MANAGED_HOSTNAMES` list,
/// deduplicated on `(type, name)` with managed entries winning, then
/// filtered against the preserved-pattern list (managed entries are
/// exempt — they are explicit user instructions, not discoveries that
/// might collide with something the operator wants left alone).
pub fn build_intent_set(
    hostnames: &HostnameSet,
    managed: &[ManagedHostname],
    zone: &str,
    public_ips: PublicIps,
    default_ttl: i32,
) -> Vec<RecordIntent> {
    let mut by_key: HashMap<(RecordType, String), RecordIntent> = HashMap::new();

    for hostname in &hostnames.hostnames {
        let hints = hostnames.hints_for(hostname);
        let record_type = hints.record_type.unwrap_or(RecordType::A);

        let content = match hints.content.clone() {
            Some(c) => c,
            None => match default_content(record_type, zone, public_ips) {
                Some(c) => c,
                None => {
                    warn!(
                        hostname,
                        %record_type,
                        "no content available for discovered hostname (public IP unknown), skipping"
                    );
                    continue;
                }
            },
        };

        let intent = RecordIntent {
            zone: zone.to_string(),
            name: hostname.clone(),
            record_type,
            content,
            ttl: Some(hints.ttl.unwrap_or(default_ttl)),
            extras: RecordExtras {
                proxied: hints.proxied,
                ..Default::default()
            },
            source: RecordSource::Discovered,
        };

        by_key.insert((record_type, hostname.clone()), intent);
    }

    for entry in managed {
        let Ok(record_type) = entry.record_type.parse::<RecordType>() else {
            warn!(hostname = %entry.hostname, record_type = %entry.record_type, "managed hostname has an unrecognized record type, skipping");
            continue;
        };

        let content = match entry.content.clone() {
            Some(c) => c,
            None => match default_content(record_type, zone, public_ips) {
                Some(c) => c,
                None => {
                    warn!(
                        hostname = %entry.hostname,
                        %record_type,
                        "no content available for managed hostname (public IP unknown), skipping"
                    );
                    continue;
                }
            },
        };

        let intent = RecordIntent {
            zone: zone.to_string(),
            name: entry.hostname.clone(),
            record_type,
            content,
            ttl: Some(entry.ttl.unwrap_or(default_ttl)),
            extras: RecordExtras {
                proxied: entry.proxied,
                ..Default::default()
            },
            source: RecordSource::Managed,
        };

        // Managed wins over discovered on a (type, name) collision.
        by_key.insert((record_type, entry.hostname.clone()), intent);
    }

    by_key.into_values().collect()
}

/// Drops intents that fall under a preserved pattern, except managed ones:
/// those are explicit user instructions and are not subject to
/// preserved-pattern filtering.
pub fn apply_preserved(
    intents: Vec<RecordIntent>,
    preserved: &dnsguard_config::PreservedPatternList,
) -> Vec<RecordIntent> {
    intents
        .into_iter()
        .filter(|intent| intent.source == RecordSource::Managed || !preserved.matches(&intent.name))
        .collect()
}

fn default_content(record_type: RecordType, zone: &str, public_ips: PublicIps) -> Option<String> {
    match record_type {
        RecordType::A => public_ips.ipv4.map(|ip| ip.to_string()),
        RecordType::Aaaa => public_ips.ipv6.map(|ip| ip.to_string()),
        RecordType::Cname => Some(zone.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnsguard_source::IntentHints;

    fn ips() -> PublicIps {
        PublicIps {
            ipv4: Some("5.6.7.8".parse().unwrap()),
            ipv6: None,
        }
    }

    #[test]
    fn discovered_hostname_defaults_to_a_record_with_public_ip() {
        let mut set = HostnameSet::default();
        set.insert("app.example".to_string(), IntentHints::default());

        let intents = build_intent_set(&set, &[], "example.com", ips(), 300);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].record_type, RecordType::A);
        assert_eq!(intents[0].content, "5.6.7.8");
        assert_eq!(intents[0].ttl, Some(300));
    }

    #[test]
    fn managed_wins_over_discovered_on_same_type_name() {
        let mut set = HostnameSet::default();
        set.insert("app.example".to_string(), IntentHints::default());

        let managed = vec![ManagedHostname {
            hostname: "app.example".to_string(),
            record_type: "A".to_string(),
            content: Some("9.9.9.9".to_string()),
            ttl: Some(120),
            proxied: None,
        }];

        let intents = build_intent_set(&set, &managed, "example.com", ips(), 300);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].content, "9.9.9.9");
        assert_eq!(intents[0].ttl, Some(120));
        assert_eq!(intents[0].source, RecordSource::Managed);
    }

    #[test]
    fn cname_defaults_to_zone_apex() {
        let mut set = HostnameSet::default();
        set.insert(
            "www.example".to_string(),
            IntentHints {
                record_type: Some(RecordType::Cname),
                ..Default::default()
            },
        );

        let intents = build_intent_set(&set, &[], "example.com", ips(), 300);
        assert_eq!(intents[0].content, "example.com");
    }

    #[test]
    fn skips_a_record_when_public_ipv4_unknown() {
        let mut set = HostnameSet::default();
        set.insert("app.example".to_string(), IntentHints::default());

        let intents = build_intent_set(&set, &[], "example.com", PublicIps::default(), 300);
        assert!(intents.is_empty());
    }

    #[test]
    fn preserved_pattern_drops_discovered_but_not_managed() {
        let mut set = HostnameSet::default();
        set.insert("mail.example".to_string(), IntentHints::default());

        let managed = vec![ManagedHostname {
            hostname: "mail.example".to_string(),
            record_type: "MX".to_string(),
            content: Some("mx.example".to_string()),
            ttl: None,
            proxied: None,
        }];

        let intents = build_intent_set(&set, &managed, "example.com", ips(), 300);
        let preserved = dnsguard_config::PreservedPatternList::parse("mail.example");
        let filtered = apply_preserved(intents, &preserved);

        // The discovered A gets dropped; the managed MX survives.
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record_type, RecordType::Mx);
    }
}
