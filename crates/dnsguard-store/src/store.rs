use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dnsguard_events::RecordType;
use entity::prelude::*;
use entity::{provider_cache, settings, tracked_records};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, TransactionTrait,
};
use serde_json::Value as Json;

use crate::conversions::{from_entity_type, to_entity_type};
use crate::domain::{CachedRecord, NewRecord, TrackOutcome, TrackedRecord};
use crate::error::{Result, StoreError};
use crate::record_store::RecordStore;

pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn to_domain(model: tracked_records::Model) -> TrackedRecord {
    TrackedRecord {
        provider: model.provider,
        provider_record_id: model.provider_record_id,
        record_type: from_entity_type(model.record_type),
        name: model.name,
        content: model.content,
        ttl: model.ttl,
        app_managed: model.app_managed,
        orphaned_at: model.orphaned_at,
        first_seen_at: model.first_seen_at,
        last_updated_at: model.last_updated_at,
        extras: model.extras_json,
    }
}

fn cached_to_domain(model: provider_cache::Model) -> CachedRecord {
    CachedRecord {
        provider: model.provider,
        provider_record_id: model.provider_record_id,
        record_type: from_entity_type(model.record_type),
        name: model.name,
        content: model.content,
        ttl: model.ttl,
        extras: model.extras_json,
        fetched_at: model.fetched_at,
    }
}

#[async_trait]
impl RecordStore for Store {
    async fn track(&self, record: NewRecord, app_managed: bool) -> Result<TrackOutcome> {
        let entity_type = to_entity_type(record.record_type);
        let now = Utc::now();

        let outcome = self
            .db
            .transaction::<_, TrackOutcome, StoreError>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    if let Some(existing) = TrackedRecords::find()
                        .filter(tracked_records::Column::Provider.eq(record.provider.clone()))
                        .filter(
                            tracked_records::Column::ProviderRecordId
                                .eq(record.provider_record_id.clone()),
                        )
                        .one(txn)
                        .await?
                    {
                        let mut active: tracked_records::ActiveModel = existing.into();
                        active.record_type = ActiveValue::Set(entity_type);
                        active.name = ActiveValue::Set(record.name.clone());
                        active.content = ActiveValue::Set(record.content.clone());
                        active.ttl = ActiveValue::Set(record.ttl);
                        active.app_managed = ActiveValue::Set(app_managed);
                        active.extras_json = ActiveValue::Set(record.extras.clone());
                        active.last_updated_at = ActiveValue::Set(now);
                        active.update(txn).await?;
                        return Ok(TrackOutcome::Updated);
                    }

                    if app_managed {
                        if let Some(existing) = TrackedRecords::find()
                            .filter(tracked_records::Column::Provider.eq(record.provider.clone()))
                            .filter(tracked_records::Column::RecordType.eq(entity_type))
                            .filter(tracked_records::Column::Name.eq(record.name.clone()))
                            .filter(tracked_records::Column::AppManaged.eq(true))
                            .one(txn)
                            .await?
                        {
                            let mut active: tracked_records::ActiveModel = existing.into();
                            active.provider_record_id =
                                ActiveValue::Set(record.provider_record_id.clone());
                            active.content = ActiveValue::Set(record.content.clone());
                            active.ttl = ActiveValue::Set(record.ttl);
                            active.extras_json = ActiveValue::Set(record.extras.clone());
                            active.last_updated_at = ActiveValue::Set(now);
                            active.update(txn).await?;
                            return Ok(TrackOutcome::Updated);
                        }
                    }

                    let active = tracked_records::ActiveModel {
                        provider: ActiveValue::Set(record.provider.clone()),
                        provider_record_id: ActiveValue::Set(record.provider_record_id.clone()),
                        record_type: ActiveValue::Set(entity_type),
                        name: ActiveValue::Set(record.name.clone()),
                        content: ActiveValue::Set(record.content.clone()),
                        ttl: ActiveValue::Set(record.ttl),
                        app_managed: ActiveValue::Set(app_managed),
                        orphaned_at: ActiveValue::Set(None),
                        first_seen_at: ActiveValue::Set(now),
                        last_updated_at: ActiveValue::Set(now),
                        extras_json: ActiveValue::Set(record.extras.clone()),
                        ..Default::default()
                    };
                    active.insert(txn).await?;
                    Ok(TrackOutcome::Created)
                })
            })
            .await
            .map_err(|err| match err {
                sea_orm::TransactionError::Connection(db_err) => StoreError::Database(db_err),
                sea_orm::TransactionError::Transaction(store_err) => store_err,
            })?;

        Ok(outcome)
    }

    async fn untrack(&self, provider: &str, provider_record_id: &str) -> Result<()> {
        TrackedRecords::delete_many()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::ProviderRecordId.eq(provider_record_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn is_tracked(&self, provider: &str, provider_record_id: &str) -> Result<bool> {
        let count = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::ProviderRecordId.eq(provider_record_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn find_by_type_name(
        &self,
        provider: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Option<TrackedRecord>> {
        let model = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::RecordType.eq(to_entity_type(record_type)))
            .filter(tracked_records::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(model.map(to_domain))
    }

    async fn mark_orphaned(&self, provider: &str, provider_record_id: &str) -> Result<()> {
        if let Some(existing) = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::ProviderRecordId.eq(provider_record_id))
            .one(&self.db)
            .await?
        {
            if existing.orphaned_at.is_none() {
                let mut active: tracked_records::ActiveModel = existing.into();
                active.orphaned_at = ActiveValue::Set(Some(Utc::now()));
                active.update(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn unmark_orphaned(&self, provider: &str, provider_record_id: &str) -> Result<()> {
        if let Some(existing) = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::ProviderRecordId.eq(provider_record_id))
            .one(&self.db)
            .await?
        {
            if existing.orphaned_at.is_some() {
                let mut active: tracked_records::ActiveModel = existing.into();
                active.orphaned_at = ActiveValue::Set(None);
                active.update(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn get_orphaned_at(
        &self,
        provider: &str,
        provider_record_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let model = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::ProviderRecordId.eq(provider_record_id))
            .one(&self.db)
            .await?;
        Ok(model.and_then(|m| m.orphaned_at))
    }

    async fn list_orphans_older_than(
        &self,
        provider: &str,
        age: Duration,
    ) -> Result<Vec<TrackedRecord>> {
        let threshold = Utc::now() - age;
        let models = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::AppManaged.eq(true))
            .filter(tracked_records::Column::OrphanedAt.lte(threshold))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn update_id(&self, provider: &str, old_id: &str, new_id: &str) -> Result<()> {
        if let Some(existing) = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::ProviderRecordId.eq(old_id))
            .one(&self.db)
            .await?
        {
            let mut active: tracked_records::ActiveModel = existing.into();
            active.provider_record_id = ActiveValue::Set(new_id.to_string());
            active.last_updated_at = ActiveValue::Set(Utc::now());
            active.update(&self.db).await?;
        }
        Ok(())
    }

    async fn update_id_by_type_name(
        &self,
        provider: &str,
        record_type: RecordType,
        name: &str,
        new_id: &str,
    ) -> Result<()> {
        if let Some(existing) = TrackedRecords::find()
            .filter(tracked_records::Column::Provider.eq(provider))
            .filter(tracked_records::Column::RecordType.eq(to_entity_type(record_type)))
            .filter(tracked_records::Column::Name.eq(name))
            .one(&self.db)
            .await?
        {
            let mut active: tracked_records::ActiveModel = existing.into();
            active.provider_record_id = ActiveValue::Set(new_id.to_string());
            active.last_updated_at = ActiveValue::Set(Utc::now());
            active.update(&self.db).await?;
        }
        Ok(())
    }

    async fn refresh_provider_cache(&self, provider: &str, records: Vec<CachedRecord>) -> Result<()> {
        self.db
            .transaction::<_, (), StoreError>(|txn| {
                let provider = provider.to_string();
                Box::pin(async move {
                    ProviderCache::delete_many()
                        .filter(provider_cache::Column::Provider.eq(provider.clone()))
                        .exec(txn)
                        .await?;

                    for record in records {
                        let active = provider_cache::ActiveModel {
                            provider: ActiveValue::Set(provider.clone()),
                            provider_record_id: ActiveValue::Set(record.provider_record_id),
                            record_type: ActiveValue::Set(to_entity_type(record.record_type)),
                            name: ActiveValue::Set(record.name),
                            content: ActiveValue::Set(record.content),
                            ttl: ActiveValue::Set(record.ttl),
                            extras_json: ActiveValue::Set(record.extras),
                            fetched_at: ActiveValue::Set(record.fetched_at),
                            ..Default::default()
                        };
                        active.insert(txn).await?;
                    }

                    Ok(())
                })
            })
            .await
            .map_err(|err| match err {
                sea_orm::TransactionError::Connection(db_err) => StoreError::Database(db_err),
                sea_orm::TransactionError::Transaction(store_err) => store_err,
            })
    }

    async fn list_cached(&self, provider: &str) -> Result<Vec<CachedRecord>> {
        let models = ProviderCache::find()
            .filter(provider_cache::Column::Provider.eq(provider))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(cached_to_domain).collect())
    }

    async fn cache_fetched_at(&self, provider: &str) -> Result<Option<DateTime<Utc>>> {
        let latest = ProviderCache::find()
            .filter(provider_cache::Column::Provider.eq(provider))
            .one(&self.db)
            .await?;
        Ok(latest.map(|m| m.fetched_at))
    }

    async fn list_tracked(&self, provider: Option<&str>) -> Result<Vec<TrackedRecord>> {
        let mut query = TrackedRecords::find();
        if let Some(provider) = provider {
            query = query.filter(tracked_records::Column::Provider.eq(provider));
        }
        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Json>> {
        let model = Settings::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(model.map(|m| m.value_json))
    }

    async fn set_setting(&self, key: &str, value: Json) -> Result<()> {
        if let Some(existing) = Settings::find_by_id(key.to_string()).one(&self.db).await? {
            let mut active: settings::ActiveModel = existing.into();
            active.value_json = ActiveValue::Set(value);
            active.update(&self.db).await?;
        } else {
            let active = settings::ActiveModel {
                key: ActiveValue::Set(key.to_string()),
                value_json: ActiveValue::Set(value),
            };
            active.insert(&self.db).await?;
        }
        Ok(())
    }
}
