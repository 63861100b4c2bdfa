use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;
pub const MIN_POLL_INTERVAL_MS: u64 = 5_000;

pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 60;

pub const DEFAULT_IP_REFRESH_INTERVAL_MS: u64 = 300_000;

pub const DEFAULT_CLEANUP_GRACE_PERIOD_MINUTES: i64 = 15;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

pub const EVENT_BUS_CAPACITY: usize = 256;

pub const IP_ECHO_ENDPOINT_V4: &str = "https://api.ipify.org";
pub const IP_ECHO_ENDPOINT_V6: &str = "https://api6.ipify.org";

pub const SCHEMA_VERSION_KEY: &str = "schema_version";
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Used for a `RecordIntent` whose hints don't specify a TTL, before the
/// provider-specific `ttlMin..=ttlMax` clamp in `validate()` is applied.
pub const DEFAULT_RECORD_TTL_SECONDS: i32 = 300;
