use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BatchOutcome, Capabilities, ProviderRecord, RecordIntent};
use dnsguard_events::RecordType;

/// A DNS backend the Reconciler can target. One instance per configured
/// provider; `dnsguard` selects the implementation via `DNS_PROVIDER`.
///
/// Name normalization is the adapter's job: on the wire it speaks the
/// provider's convention (`@` for apex, trailing dot, label-vs-FQDN), but
/// everything crossing this trait's boundary is a dotless lowercase FQDN.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Verifies credentials, resolves the zone, primes the cache.
    async fn init(&self) -> Result<()>;

    async fn test_connection(&self) -> Result<()>;

    fn zone_name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Cached read; see `refresh_record_cache` to force a miss.
    async fn list_records(&self) -> Result<Vec<ProviderRecord>>;

    async fn refresh_record_cache(&self) -> Result<Vec<ProviderRecord>>;

    async fn create_record(&self, intent: &RecordIntent) -> Result<ProviderRecord>;

    async fn update_record(
        &self,
        provider_record_id: &str,
        intent: &RecordIntent,
    ) -> Result<ProviderRecord>;

    async fn delete_record(&self, provider_record_id: &str) -> Result<bool>;

    /// Enforces capability constraints before a mutating call is attempted
    /// (e.g. Cloudflare `proxied` only on A/AAAA/CNAME; IPv4 shape for A;
    /// IPv6 shape for AAAA; MX requires a priority).
    fn validate(&self, intent: &RecordIntent) -> Result<()> {
        default_validate(&self.capabilities(), intent)
    }

    /// Default implementation in terms of the single-record ops, for
    /// backends without a native batch endpoint. Backends that do support
    /// one (and advertise `capabilities().batch_operations`) should
    /// override this.
    async fn batch_ensure_records(&self, intents: &[RecordIntent]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for intent in intents {
            if self.validate(intent).is_err() {
                outcome.failed += 1;
                continue;
            }

            let existing = self
                .list_records()
                .await
                .unwrap_or_default()
                .into_iter()
                .find(|r| r.record_type == intent.record_type && r.name == intent.name);

            match existing {
                None => match self.create_record(intent).await {
                    Ok(_) => outcome.created += 1,
                    Err(_) => outcome.failed += 1,
                },
                Some(current) if record_needs_update(&current, intent) => {
                    match self.update_record(&current.provider_record_id, intent).await {
                        Ok(_) => outcome.updated += 1,
                        Err(_) => outcome.failed += 1,
                    }
                }
                Some(_) => outcome.unchanged += 1,
            }
        }

        outcome
    }
}

pub fn default_validate(
    capabilities: &Capabilities,
    intent: &RecordIntent,
) -> Result<()> {
    use crate::error::ProviderError;

    if !capabilities.supported_types.contains(&intent.record_type) {
        return Err(ProviderError::Invalid(format!(
            "{} records are not supported by this provider",
            intent.record_type
        )));
    }

    if let Some(ttl) = intent.ttl
        && !(capabilities.ttl_min..=capabilities.ttl_max).contains(&ttl)
    {
        return Err(ProviderError::Invalid(format!(
            "ttl {ttl} outside provider range {}..={}",
            capabilities.ttl_min, capabilities.ttl_max
        )));
    }

    match intent.record_type {
        RecordType::A => {
            if intent.content.parse::<std::net::Ipv4Addr>().is_err() {
                return Err(ProviderError::Invalid(format!(
                    "{} is not a valid IPv4 address",
                    intent.content
                )));
            }
        }
        RecordType::Aaaa => {
            if intent.content.parse::<std::net::Ipv6Addr>().is_err() {
                return Err(ProviderError::Invalid(format!(
                    "{} is not a valid IPv6 address",
                    intent.content
                )));
            }
        }
        RecordType::Mx if intent.extras.priority.is_none() => {
            return Err(ProviderError::Invalid(
                "MX records require a priority".to_string(),
            ));
        }
        _ => {}
    }

    if intent.extras.proxied == Some(true)
        && (!capabilities.proxied
            || !matches!(
                intent.record_type,
                RecordType::A | RecordType::Aaaa | RecordType::Cname
            ))
    {
        return Err(ProviderError::Invalid(
            "proxying is only supported on A/AAAA/CNAME".to_string(),
        ));
    }

    Ok(())
}

/// Mirrors the Reconciler's per-type equality rules (content, ttl, and the
/// type-specific extras) so the default batch implementation only updates
/// when something material changed.
fn record_needs_update(current: &ProviderRecord, intent: &RecordIntent) -> bool {
    let content_differs = if intent.record_type.content_is_case_insensitive() {
        !current.content.eq_ignore_ascii_case(&intent.content)
    } else {
        current.content != intent.content
    };

    if content_differs {
        return true;
    }

    if let Some(ttl) = intent.ttl
        && current.ttl != ttl
    {
        return true;
    }

    match intent.record_type {
        RecordType::Mx => current.extras.priority != intent.extras.priority,
        RecordType::Srv => {
            current.extras.priority != intent.extras.priority
                || current.extras.weight != intent.extras.weight
                || current.extras.port != intent.extras.port
        }
        RecordType::Caa => {
            current.extras.flags != intent.extras.flags || current.extras.tag != intent.extras.tag
        }
        RecordType::A | RecordType::Aaaa | RecordType::Cname => {
            current.extras.proxied != intent.extras.proxied
        }
        _ => false,
    }
}
