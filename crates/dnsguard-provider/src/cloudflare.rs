use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cloudflare::endpoints::dns::dns::{
    CreateDnsRecord, CreateDnsRecordParams, DeleteDnsRecord, DnsContent, ListDnsRecords,
    ListDnsRecordsParams, UpdateDnsRecord, UpdateDnsRecordParams,
};
use cloudflare::framework::Environment;
use cloudflare::framework::auth::Credentials;
use cloudflare::framework::client::ClientConfig;
use cloudflare::framework::client::async_api::Client;
use dnsguard_events::RecordType;
use tokio::time::timeout;

use crate::adapter::ProviderAdapter;
use crate::cache::ProviderCache;
use crate::error::{ProviderError, Result};
use crate::types::{Capabilities, ProviderRecord, RecordExtras, RecordIntent};

const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// SRV and CAA aren't modeled by the `cloudflare` crate's `DnsContent`;
/// this adapter declines to advertise them rather than fake support
/// through the generic-TXT escape hatch Cloudflare's raw API allows.
const SUPPORTED_TYPES: &[RecordType] = &[
    RecordType::A,
    RecordType::Aaaa,
    RecordType::Cname,
    RecordType::Mx,
    RecordType::Txt,
    RecordType::Ns,
];

pub struct CloudflareProvider {
    client: Client,
    zone_identifier: String,
    zone_name: String,
    cache: ProviderCache,
    call_timeout: StdDuration,
}

impl CloudflareProvider {
    pub fn new(api_token: String, zone_id: String, zone_name: String) -> Result<Self> {
        Self::with_timeout(api_token, zone_id, zone_name, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_token: String,
        zone_id: String,
        zone_name: String,
        call_timeout: StdDuration,
    ) -> Result<Self> {
        let credentials = Credentials::UserAuthToken { token: api_token };
        let client = Client::new(
            credentials,
            ClientConfig::default(),
            Environment::Production,
        )?;

        Ok(Self {
            client,
            zone_identifier: zone_id,
            zone_name,
            cache: ProviderCache::new(StdDuration::from_secs(60 * 60)),
            call_timeout,
        })
    }

    fn to_dns_content(intent: &RecordIntent) -> Result<DnsContent> {
        Ok(match intent.record_type {
            RecordType::A => DnsContent::A {
                content: intent.content.parse()?,
            },
            RecordType::Aaaa => DnsContent::AAAA {
                content: intent.content.parse()?,
            },
            RecordType::Cname => DnsContent::CNAME {
                content: intent.content.clone(),
            },
            RecordType::Ns => DnsContent::NS {
                content: intent.content.clone(),
            },
            RecordType::Txt => DnsContent::TXT {
                content: intent.content.clone(),
            },
            RecordType::Mx => DnsContent::MX {
                content: intent.content.clone(),
                priority: intent.extras.priority.ok_or_else(|| {
                    ProviderError::Invalid("MX records require a priority".to_string())
                })?,
            },
            other => {
                return Err(ProviderError::Invalid(format!(
                    "{other} is not supported by the Cloudflare adapter"
                )));
            }
        })
    }

    fn from_dns_content(content: DnsContent) -> Option<(RecordType, String, RecordExtras)> {
        match content {
            DnsContent::A { content } => Some((RecordType::A, content.to_string(), RecordExtras::default())),
            DnsContent::AAAA { content } => {
                Some((RecordType::Aaaa, content.to_string(), RecordExtras::default()))
            }
            DnsContent::CNAME { content } => Some((RecordType::Cname, content, RecordExtras::default())),
            DnsContent::NS { content } => Some((RecordType::Ns, content, RecordExtras::default())),
            DnsContent::TXT { content } => Some((RecordType::Txt, content, RecordExtras::default())),
            DnsContent::MX { content, priority } => Some((
                RecordType::Mx,
                content,
                RecordExtras {
                    priority: Some(priority),
                    ..Default::default()
                },
            )),
            _ => None,
        }
    }

    async fn call_timeout<F, T>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        timeout(self.call_timeout, fut)
            .await
            .map_err(|_| ProviderError::Timeout(self.call_timeout))?
    }
}

#[async_trait]
impl ProviderAdapter for CloudflareProvider {
    async fn init(&self) -> Result<()> {
        self.test_connection().await?;
        self.refresh_record_cache().await?;
        Ok(())
    }

    async fn test_connection(&self) -> Result<()> {
        self.call_timeout(async {
            self.client
                .request(&ListDnsRecords {
                    zone_identifier: &self.zone_identifier,
                    params: ListDnsRecordsParams {
                        per_page: Some(1),
                        ..Default::default()
                    },
                })
                .await?;
            Ok(())
        })
        .await
    }

    fn zone_name(&self) -> &str {
        &self.zone_name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            proxied: true,
            ttl_min: 60,
            ttl_max: 86400,
            supported_types: SUPPORTED_TYPES.to_vec(),
            batch_operations: false,
        }
    }

    async fn list_records(&self) -> Result<Vec<ProviderRecord>> {
        if self.cache.needs_refresh().await {
            return self.refresh_record_cache().await;
        }
        Ok(self.cache.get().await)
    }

    async fn refresh_record_cache(&self) -> Result<Vec<ProviderRecord>> {
        let response = self
            .call_timeout(async {
                self.client
                    .request(&ListDnsRecords {
                        zone_identifier: &self.zone_identifier,
                        params: ListDnsRecordsParams::default(),
                    })
                    .await
                    .map_err(ProviderError::from)
            })
            .await?;

        let records: Vec<ProviderRecord> = response
            .result
            .into_iter()
            .filter_map(|r| {
                let (record_type, content, extras) = Self::from_dns_content(r.content)?;
                Some(ProviderRecord {
                    provider_record_id: r.id,
                    name: r.name,
                    record_type,
                    content,
                    ttl: r.ttl as i32,
                    extras: RecordExtras {
                        proxied: r.proxied,
                        ..extras
                    },
                    provider_meta: serde_json::json!({ "proxied": r.proxied }),
                })
            })
            .collect();

        self.cache.replace(records.clone()).await;
        Ok(records)
    }

    async fn create_record(&self, intent: &RecordIntent) -> Result<ProviderRecord> {
        self.validate(intent)?;
        let dns_content = Self::to_dns_content(intent)?;

        let proxied = intent.extras.proxied.filter(|_| {
            matches!(
                intent.record_type,
                RecordType::A | RecordType::Aaaa | RecordType::Cname
            )
        });

        let params = CreateDnsRecordParams {
            name: &intent.name,
            content: dns_content,
            ttl: intent.ttl.map(|t| t as u32),
            proxied,
            priority: intent.extras.priority,
        };

        let response = self
            .call_timeout(async {
                self.client
                    .request(&CreateDnsRecord {
                        zone_identifier: &self.zone_identifier,
                        params,
                    })
                    .await
                    .map_err(ProviderError::from)
            })
            .await?;

        let record = ProviderRecord {
            provider_record_id: response.result.id,
            name: response.result.name,
            record_type: intent.record_type,
            content: intent.content.clone(),
            ttl: response.result.ttl as i32,
            extras: intent.extras.clone(),
            provider_meta: serde_json::json!({ "proxied": response.result.proxied }),
        };
        self.cache.upsert(record.clone()).await;
        Ok(record)
    }

    async fn update_record(
        &self,
        provider_record_id: &str,
        intent: &RecordIntent,
    ) -> Result<ProviderRecord> {
        self.validate(intent)?;
        let dns_content = Self::to_dns_content(intent)?;

        let proxied = intent.extras.proxied.filter(|_| {
            matches!(
                intent.record_type,
                RecordType::A | RecordType::Aaaa | RecordType::Cname
            )
        });

        let params = UpdateDnsRecordParams {
            name: &intent.name,
            content: dns_content,
            ttl: intent.ttl.map(|t| t as u32),
            proxied,
        };

        let response = self
            .call_timeout(async {
                self.client
                    .request(&UpdateDnsRecord {
                        zone_identifier: &self.zone_identifier,
                        identifier: provider_record_id,
                        params,
                    })
                    .await
                    .map_err(ProviderError::from)
            })
            .await?;

        let record = ProviderRecord {
            provider_record_id: response.result.id,
            name: response.result.name,
            record_type: intent.record_type,
            content: intent.content.clone(),
            ttl: response.result.ttl as i32,
            extras: intent.extras.clone(),
            provider_meta: serde_json::json!({ "proxied": response.result.proxied }),
        };
        self.cache.upsert(record.clone()).await;
        Ok(record)
    }

    async fn delete_record(&self, provider_record_id: &str) -> Result<bool> {
        self.call_timeout(async {
            self.client
                .request(&DeleteDnsRecord {
                    zone_identifier: &self.zone_identifier,
                    identifier: provider_record_id,
                })
                .await
                .map_err(ProviderError::from)
        })
        .await?;

        self.cache.remove(provider_record_id).await;
        Ok(true)
    }
}
