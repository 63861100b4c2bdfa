use std::collections::HashMap;

use async_trait::async_trait;
use bollard::Docker;
use tracing::warn;

use crate::error::Result;
use crate::labels::{hints_from_labels, hostname_from_labels};
use crate::rule::hosts_from_rule;
use crate::source::HostnameSource;
use crate::types::HostnameSet;

/// The proxy-namespace label Traefik reads off containers to derive a
/// router rule when running in front of Docker directly (as opposed to
/// polling its API, which is `ProxySource`'s job).
const TRAEFIK_RULE_LABEL_PREFIX: &str = "traefik.http.routers.";
const TRAEFIK_RULE_LABEL_SUFFIX: &str = ".rule";

/// `OPERATION_MODE=direct`: lists containers over the local Docker socket
/// and reads each container's labels. `dns.*`-namespaced labels supply an
/// explicit hostname plus intent hints directly; proxy-namespaced labels
/// (`traefik.http.routers.<name>.rule`) are parsed the same way
/// `ProxySource` parses a router's rule, for containers fronted by a proxy
/// rather than exposed directly.
pub struct ContainerSource {
    docker: Docker,
}

impl ContainerSource {
    pub fn connect() -> Result<Self> {
        Ok(Self {
            docker: Docker::connect_with_local_defaults()?,
        })
    }

    fn hostnames_from_container_labels(
        container_name: &str,
        labels: &HashMap<String, String>,
    ) -> HostnameSet {
        let mut set = HostnameSet::default();

        if let Some(hostname) = hostname_from_labels(labels) {
            set.insert(hostname, hints_from_labels(labels));
        }

        for (key, rule) in labels {
            if let Some(router_name) = key
                .strip_prefix(TRAEFIK_RULE_LABEL_PREFIX)
                .and_then(|rest| rest.strip_suffix(TRAEFIK_RULE_LABEL_SUFFIX))
            {
                let hosts = hosts_from_rule(rule);
                if hosts.is_empty() {
                    warn!(
                        container = %container_name,
                        router = %router_name,
                        rule = %rule,
                        "container router rule has no Host matcher, skipping"
                    );
                    continue;
                }

                let hints = hints_from_labels(labels);
                for host in hosts {
                    set.insert(host, hints.clone());
                }
            }
        }

        set
    }
}

#[async_trait]
impl HostnameSource for ContainerSource {
    async fn tick(&self) -> Result<HostnameSet> {
        let containers = self.docker.list_containers::<String>(None).await?;

        let mut set = HostnameSet::default();
        for container in containers {
            let name = container
                .names
                .as_ref()
                .and_then(|n| n.first())
                .cloned()
                .unwrap_or_else(|| container.id.clone().unwrap_or_default());

            let Some(labels) = container.labels.as_ref() else {
                continue;
            };

            let found = Self::hostnames_from_container_labels(&name, labels);
            for hostname in found.hostnames {
                let hints = found.hints_for(&hostname);
                set.insert(hostname, hints);
            }
        }

        Ok(set)
    }
}
