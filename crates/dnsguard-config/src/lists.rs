use tracing::warn;

/// One entry of `MANAGED_HOSTNAMES`: `hostname:type[:content[:ttl[:flag]]]`.
///
/// `content`/`ttl` default per-type (A/AAAA auto-resolve against the public
/// IP at reconcile time when omitted; CNAME defaults to the zone apex).
/// `flag` is the Cloudflare "proxied" bit; ignored by adapters that don't
/// support it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedHostname {
    pub hostname: String,
    pub record_type: String,
    pub content: Option<String>,
    pub ttl: Option<i32>,
    pub proxied: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagedHostnameError {
    #[error("empty entry")]
    Empty,
    #[error("missing record type in entry {0:?}")]
    MissingType(String),
    #[error("invalid ttl {1:?} in entry {0:?}")]
    InvalidTtl(String, String),
    #[error("invalid flag {1:?} in entry {0:?}")]
    InvalidFlag(String, String),
    #[error("duplicate managed entry for ({0}, {1})")]
    Duplicate(String, String),
}

impl ManagedHostname {
    fn parse(raw: &str) -> Result<Self, ManagedHostnameError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ManagedHostnameError::Empty);
        }

        let parts: Vec<&str> = raw.split(':').collect();
        let hostname = parts[0].trim().to_ascii_lowercase();
        let record_type = parts
            .get(1)
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ManagedHostnameError::MissingType(raw.to_string()))?;

        let content = parts
            .get(2)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let ttl = match parts.get(3).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(s) => Some(
                s.parse::<i32>()
                    .map_err(|_| ManagedHostnameError::InvalidTtl(raw.to_string(), s.to_string()))?,
            ),
            None => None,
        };

        let proxied = match parts.get(4).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(s) => Some(match s.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ManagedHostnameError::InvalidFlag(raw.to_string(), s.to_string()))
                }
            }),
            None => None,
        };

        Ok(ManagedHostname {
            hostname,
            record_type,
            content,
            ttl,
            proxied,
        })
    }

    /// Parses a comma-separated `MANAGED_HOSTNAMES` value. Malformed entries
    /// are skipped and logged rather than aborting the whole list. Entries
    /// sharing `(type, hostname)` are resolved last-wins with a warning
    /// rather than treated as fatal.
    pub fn parse_list(raw: &str) -> Vec<ManagedHostname> {
        let mut by_key: Vec<ManagedHostname> = Vec::new();

        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            match ManagedHostname::parse(entry) {
                Ok(parsed) => {
                    if let Some(existing) = by_key
                        .iter_mut()
                        .find(|m| m.hostname == parsed.hostname && m.record_type == parsed.record_type)
                    {
                        warn!(
                            hostname = %parsed.hostname,
                            record_type = %parsed.record_type,
                            "duplicate managed-hostname entry, last one wins"
                        );
                        *existing = parsed;
                    } else {
                        by_key.push(parsed);
                    }
                }
                Err(err) => {
                    warn!(%err, entry, "skipping invalid managed-hostname entry");
                }
            }
        }

        by_key
    }
}

/// A compiled `PRESERVED_HOSTNAMES` list. Patterns are either an exact FQDN
/// or a leading `*.` wildcard matching any label sequence ending in the
/// suffix. Matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct PreservedPatternList {
    exact: Vec<String>,
    wildcard_suffixes: Vec<String>,
}

impl PreservedPatternList {
    pub fn parse(raw: &str) -> Self {
        let mut exact = Vec::new();
        let mut wildcard_suffixes = Vec::new();

        for pattern in raw.split(',') {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            let pattern = pattern.to_ascii_lowercase();

            if let Some(suffix) = pattern.strip_prefix("*.") {
                wildcard_suffixes.push(suffix.to_string());
            } else {
                exact.push(pattern);
            }
        }

        PreservedPatternList {
            exact,
            wildcard_suffixes,
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        let hostname = hostname.to_ascii_lowercase();

        if self.exact.iter().any(|p| p == &hostname) {
            return true;
        }

        self.wildcard_suffixes.iter().any(|suffix| {
            hostname == *suffix
                || hostname
                    .strip_suffix(suffix)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard_suffixes.is_empty()
    }
}
