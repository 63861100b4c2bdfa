use dnsguard_events::RecordType;
use dnsguard_provider::{ProviderRecord, RecordIntent};

/// Whether `current` already satisfies `intent` under the per-type
/// equality rules — i.e. whether applying `intent` would be a no-op.
/// `false` means a material change exists and `update_record` must be
/// called.
pub fn materially_equal(current: &ProviderRecord, intent: &RecordIntent) -> bool {
    let content_equal = if intent.record_type.content_is_case_insensitive() {
        current.content.eq_ignore_ascii_case(&intent.content)
    } else {
        current.content == intent.content
    };

    if !content_equal {
        return false;
    }

    if let Some(ttl) = intent.ttl
        && current.ttl != ttl
    {
        return false;
    }

    match intent.record_type {
        RecordType::Mx => current.extras.priority == intent.extras.priority,
        RecordType::Srv => {
            current.extras.priority == intent.extras.priority
                && current.extras.weight == intent.extras.weight
                && current.extras.port == intent.extras.port
        }
        RecordType::Caa => {
            current.extras.flags == intent.extras.flags && current.extras.tag == intent.extras.tag
        }
        RecordType::A | RecordType::Aaaa | RecordType::Cname => {
            // Only Cloudflare-flavored backends carry `proxied`; other
            // adapters never populate it, so both sides stay `None` and
            // this comparison is a no-op there.
            current.extras.proxied == intent.extras.proxied
        }
        RecordType::Txt | RecordType::Ns => true,
    }
}
