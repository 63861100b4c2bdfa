use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::constants;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("POLL_INTERVAL_MS must be >= {min}ms, got {actual}ms")]
    PollIntervalTooShort { min: u64, actual: u64 },

    #[error("CLEANUP_GRACE_PERIOD_MINUTES must be >= 0, got {0}")]
    NegativeGracePeriod(i64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::InvalidValue {
                name: "LOG_LEVEL",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Proxy,
    Direct,
}

impl std::str::FromStr for OperationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "proxy" => Ok(OperationMode::Proxy),
            "direct" => Ok(OperationMode::Direct),
            _ => Err(ConfigError::InvalidValue {
                name: "OPERATION_MODE",
                value: s.to_string(),
            }),
        }
    }
}

/// Process-wide, read-mostly configuration. Constructed once at startup from
/// the environment and handed around as an `Arc<Config>`.
#[derive(Debug, Clone)]
pub struct Config {
    pub dns_provider: String,
    pub zone: String,
    pub poll_interval: Duration,
    pub cleanup_interval: Duration,
    pub grace_period: chrono::Duration,
    pub cache_ttl: chrono::Duration,
    pub ip_refresh_interval: Duration,
    pub operation_mode: OperationMode,
    pub log_level: LogLevel,
    pub preserved_hostnames_raw: String,
    pub managed_hostnames_raw: String,
    /// Remaining `*_` environment variables the running provider adapter
    /// needs (API tokens, zone ids, etc). Left as raw strings — the adapter
    /// decides which keys it needs and how to mark them sensitive.
    pub provider_credentials: HashMap<String, String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dns_provider = require_env("DNS_PROVIDER")?;
        let zone = require_env("ZONE")?;

        let poll_interval_ms: u64 = parse_env_or("POLL_INTERVAL_MS", constants::DEFAULT_POLL_INTERVAL_MS)?;
        if poll_interval_ms < constants::MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::PollIntervalTooShort {
                min: constants::MIN_POLL_INTERVAL_MS,
                actual: poll_interval_ms,
            });
        }

        let cache_ttl_minutes: i64 =
            parse_env_or("CACHE_TTL_MINUTES", constants::DEFAULT_CACHE_TTL_MINUTES)?;
        let ip_refresh_interval_ms: u64 = parse_env_or(
            "IP_REFRESH_INTERVAL_MS",
            constants::DEFAULT_IP_REFRESH_INTERVAL_MS,
        )?;
        let grace_period_minutes: i64 = parse_env_or(
            "CLEANUP_GRACE_PERIOD_MINUTES",
            constants::DEFAULT_CLEANUP_GRACE_PERIOD_MINUTES,
        )?;
        if grace_period_minutes < 0 {
            return Err(ConfigError::NegativeGracePeriod(grace_period_minutes));
        }

        let operation_mode = std::env::var("OPERATION_MODE")
            .unwrap_or_else(|_| "direct".to_string())
            .parse()?;

        let log_level = std::env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "INFO".to_string())
            .parse()?;

        let preserved_hostnames_raw = std::env::var("PRESERVED_HOSTNAMES").unwrap_or_default();
        let managed_hostnames_raw = std::env::var("MANAGED_HOSTNAMES").unwrap_or_default();

        let provider_credentials = std::env::vars()
            .filter(|(k, _)| {
                k.ends_with("_API_TOKEN")
                    || k.ends_with("_API_KEY")
                    || k.ends_with("_ZONE_ID")
                    || k.ends_with("_EMAIL")
            })
            .collect();

        Ok(Config {
            dns_provider,
            zone,
            poll_interval: Duration::from_millis(poll_interval_ms),
            // No separate env var is specified for the cleanup tick; it
            // rides the same cadence as reconciliation unless overridden.
            cleanup_interval: parse_env_or("CLEANUP_INTERVAL_MS", poll_interval_ms)
                .map(Duration::from_millis)?,
            grace_period: chrono::Duration::minutes(grace_period_minutes),
            cache_ttl: chrono::Duration::minutes(cache_ttl_minutes),
            ip_refresh_interval: Duration::from_millis(ip_refresh_interval_ms),
            operation_mode,
            log_level,
            preserved_hostnames_raw,
            managed_hostnames_raw,
            provider_credentials,
        })
    }
}

fn require_env(name: &'static str) -> Result<String> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

fn parse_env_or<T>(name: &'static str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone, Default)]
struct PublicIpState {
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
    stale_since: Option<DateTime<Utc>>,
}

/// Background-refreshed view of this process's public IPv4/IPv6 address.
/// Reads are synchronous snapshots of the last successful lookup; failures
/// are soft — the last known value is retained and `stale_since` records
/// when it stopped being fresh.
pub struct PublicIp {
    state: RwLock<PublicIpState>,
    client: reqwest::Client,
}

impl PublicIp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(PublicIpState::default()),
            client: reqwest::Client::new(),
        })
    }

    /// Seeds known addresses without touching the network, bypassing the
    /// echo-endpoint refresher entirely. Useful for tests and for a future
    /// static-override configuration knob.
    pub fn with_values(ipv4: Option<Ipv4Addr>, ipv6: Option<Ipv6Addr>) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(PublicIpState {
                ipv4,
                ipv6,
                stale_since: None,
            }),
            client: reqwest::Client::new(),
        })
    }

    pub async fn ipv4(&self) -> Option<Ipv4Addr> {
        self.state.read().await.ipv4
    }

    pub async fn ipv6(&self) -> Option<Ipv6Addr> {
        self.state.read().await.ipv6
    }

    pub async fn stale_since(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.stale_since
    }

    async fn refresh_once(&self) {
        let v4 = self.fetch(constants::IP_ECHO_ENDPOINT_V4).await;
        let v6 = self.fetch(constants::IP_ECHO_ENDPOINT_V6).await;

        let mut state = self.state.write().await;
        let mut any_success = false;

        if let Some(addr) = v4.and_then(|s| s.parse().ok()) {
            state.ipv4 = Some(addr);
            any_success = true;
        } else {
            warn!("failed to refresh public IPv4, retaining last known value");
        }

        if let Some(addr) = v6.and_then(|s| s.parse().ok()) {
            state.ipv6 = Some(addr);
            any_success = true;
        } else {
            debug!("failed to refresh public IPv6, retaining last known value");
        }

        if any_success {
            state.stale_since = None;
        } else if state.stale_since.is_none() {
            state.stale_since = Some(Utc::now());
        }
    }

    async fn fetch(&self, url: &str) -> Option<String> {
        self.client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .ok()?
            .text()
            .await
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// Runs forever, refreshing at `interval`. Spawn with `tokio::spawn`.
    pub async fn run_refresher(self: Arc<Self>, interval: Duration) {
        self.refresh_once().await;

        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; we already refreshed above
        loop {
            ticker.tick().await;
            self.refresh_once().await;
        }
    }
}
