use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderCache::Provider).text().not_null())
                    .col(
                        ColumnDef::new(ProviderCache::ProviderRecordId)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCache::RecordType)
                            .custom(Alias::new("dns_record_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProviderCache::Name).text().not_null())
                    .col(ColumnDef::new(ProviderCache::Content).text().not_null())
                    .col(ColumnDef::new(ProviderCache::Ttl).integer().not_null())
                    .col(
                        ColumnDef::new(ProviderCache::ExtrasJson)
                            .json_binary()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(ProviderCache::FetchedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_cache_provider")
                    .table(ProviderCache::Table)
                    .col(ProviderCache::Provider)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderCache::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProviderCache {
    Table,
    Id,
    Provider,
    ProviderRecordId,
    RecordType,
    Name,
    Content,
    Ttl,
    ExtrasJson,
    FetchedAt,
}
