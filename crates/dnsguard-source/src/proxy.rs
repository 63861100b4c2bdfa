use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::labels::hints_from_labels;
use crate::rule::hosts_from_rule;
use crate::source::HostnameSource;
use crate::types::HostnameSet;

/// One router as reported by the reverse proxy's API. The shape mirrors
/// Traefik's `/api/http/routers` endpoint closely enough to reuse directly;
/// `labels` carries the per-router hint namespace (record type override,
/// TTL override, proxied flag) the same way container labels do.
#[derive(Debug, Clone, Deserialize)]
struct RouterEntry {
    name: String,
    rule: String,
    #[serde(default)]
    labels: HashMap<String, String>,
}

/// `OPERATION_MODE=proxy`: polls a reverse proxy's router-list API and
/// parses each router's `Host(...)` rule into hostnames. A router whose
/// rule fails to parse (or yields no `Host` matcher) is logged and
/// skipped; the rest of the poll still completes.
pub struct ProxySource {
    client: reqwest::Client,
    api_url: String,
}

impl ProxySource {
    pub fn new(api_url: String) -> Self {
        Self::with_timeout(api_url, Duration::from_secs(10))
    }

    pub fn with_timeout(api_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds");
        Self { client, api_url }
    }
}

#[async_trait]
impl HostnameSource for ProxySource {
    async fn tick(&self) -> Result<HostnameSet> {
        let routers: Vec<RouterEntry> = self.client.get(&self.api_url).send().await?.json().await?;

        let mut set = HostnameSet::default();
        for router in routers {
            let hosts = hosts_from_rule(&router.rule);
            if hosts.is_empty() {
                warn!(router = %router.name, rule = %router.rule, "router rule has no Host matcher, skipping");
                continue;
            }

            let hints = hints_from_labels(&router.labels);
            for host in hosts {
                set.insert(host, hints.clone());
            }
        }

        Ok(set)
    }
}
