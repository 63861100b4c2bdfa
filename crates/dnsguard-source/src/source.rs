use async_trait::async_trait;

use crate::error::Result;
use crate::types::HostnameSet;

/// Discovers the hostnames that should exist right now. Implementations
/// isolate per-item parse failures: one bad router or container is logged
/// and skipped, the rest of the set is still emitted.
#[async_trait]
pub trait HostnameSource: Send + Sync {
    async fn tick(&self) -> Result<HostnameSet>;
}
