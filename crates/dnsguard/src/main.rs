use std::sync::Arc;
use std::time::Duration as StdDuration;

use dnsguard::signal::shutdown_signal;
use dnsguard::Supervisor;
use dnsguard_config::{Config, ManagedHostname, OperationMode, PreservedPatternList, PublicIp};
use dnsguard_events::EventBus;
use dnsguard_provider::{CloudflareProvider, ProviderAdapter};
use dnsguard_reconciler::{OrphanSweeper, Reconciler};
use dnsguard_scheduler::{run_scheduler, PauseManager};
use dnsguard_source::{ContainerSource, HostnameSource, ProxySource};
use dnsguard_store::Store;
use migration::MigratorTrait;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env()?;
    tracing::info!(provider = %config.dns_provider, zone = %config.zone, "starting dnsguard");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("database migrations complete");

    let store: Arc<dyn dnsguard_store::RecordStore> = Arc::new(Store::new(db));
    let events = EventBus::new();

    let provider = build_provider(&config).await?;

    let public_ip = PublicIp::new();
    tokio::spawn(public_ip.clone().run_refresher(config.ip_refresh_interval));

    let managed = ManagedHostname::parse_list(&config.managed_hostnames_raw);
    let preserved = PreservedPatternList::parse(&config.preserved_hostnames_raw);

    let reconciler = Arc::new(Reconciler::new(
        config.dns_provider.clone(),
        config.zone.clone(),
        provider.clone(),
        store.clone(),
        events.clone(),
        managed,
        preserved,
        public_ip,
    ));

    let sweeper = Arc::new(OrphanSweeper::new(
        config.dns_provider.clone(),
        provider.clone(),
        store.clone(),
        events.clone(),
        reconciler.clone(),
        reconciler.preserved_handle(),
        config.grace_period.to_std().unwrap_or(StdDuration::from_secs(900)),
    ));

    let source = build_source(&config)?;

    let pause_mgr = PauseManager::new(events.clone());

    let supervisor = Supervisor::new(
        config.dns_provider.clone(),
        config.zone.clone(),
        provider,
        store,
        source.clone(),
        reconciler.clone(),
        sweeper.clone(),
        pause_mgr.clone(),
        events.clone(),
    );

    let handles = run_scheduler(
        reconciler,
        sweeper,
        source,
        pause_mgr,
        config.poll_interval,
        config.cleanup_interval,
    );

    tracing::info!(
        provider = %supervisor.status().await.provider,
        "reconciliation loop running"
    );

    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
        _ = async {
            let _ = tokio::join!(handles.poll, handles.cleanup);
        } => {
            tracing::warn!("scheduler loops exited unexpectedly");
        }
    }

    tracing::info!("dnsguard shutdown complete");
    Ok(())
}

async fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn ProviderAdapter>> {
    let provider: Arc<dyn ProviderAdapter> = match config.dns_provider.as_str() {
        "cloudflare" => {
            let api_token = config
                .provider_credentials
                .get("CLOUDFLARE_API_TOKEN")
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("CLOUDFLARE_API_TOKEN must be set"))?;
            let zone_id = config
                .provider_credentials
                .get("CLOUDFLARE_ZONE_ID")
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("CLOUDFLARE_ZONE_ID must be set"))?;
            Arc::new(CloudflareProvider::new(api_token, zone_id, config.zone.clone())?)
        }
        other => anyhow::bail!("unknown DNS_PROVIDER {other:?}"),
    };

    provider.init().await?;
    Ok(provider)
}

fn build_source(config: &Config) -> anyhow::Result<Arc<dyn HostnameSource>> {
    let source: Arc<dyn HostnameSource> = match config.operation_mode {
        OperationMode::Proxy => {
            let api_url = std::env::var("PROXY_API_URL")
                .map_err(|_| anyhow::anyhow!("PROXY_API_URL must be set in proxy mode"))?;
            Arc::new(ProxySource::new(api_url))
        }
        OperationMode::Direct => Arc::new(ContainerSource::connect()?),
    };

    Ok(source)
}
