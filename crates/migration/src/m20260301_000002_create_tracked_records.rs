use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackedRecords::Provider).text().not_null())
                    .col(
                        ColumnDef::new(TrackedRecords::ProviderRecordId)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedRecords::RecordType)
                            .custom(Alias::new("dns_record_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackedRecords::Name).text().not_null())
                    .col(ColumnDef::new(TrackedRecords::Content).text().not_null())
                    .col(ColumnDef::new(TrackedRecords::Ttl).integer().not_null())
                    .col(
                        ColumnDef::new(TrackedRecords::AppManaged)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TrackedRecords::OrphanedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TrackedRecords::FirstSeenAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TrackedRecords::LastUpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TrackedRecords::ExtrasJson)
                            .json_binary()
                            .not_null()
                            .default("{}"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_records_provider_record")
                    .table(TrackedRecords::Table)
                    .col(TrackedRecords::Provider)
                    .col(TrackedRecords::ProviderRecordId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Invariant 2: two app-managed records cannot collide on (provider, type, name).
        // Only app-managed rows participate, so adopted/foreign records with
        // duplicate (type, name) — e.g. round-robin A records a user set up by
        // hand — are left alone. sea-query has no portable partial-index
        // builder, so this one index is raw SQL.
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        let predicate = match backend {
            sea_orm::DatabaseBackend::Sqlite => "app_managed = 1",
            _ => "app_managed = true",
        };
        db.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX idx_tracked_records_app_managed_type_name \
             ON tracked_records (provider, record_type, name) WHERE {predicate}"
        ))
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_records_orphaned_at")
                    .table(TrackedRecords::Table)
                    .col(TrackedRecords::OrphanedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackedRecords::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TrackedRecords {
    Table,
    Id,
    Provider,
    ProviderRecordId,
    RecordType,
    Name,
    Content,
    Ttl,
    AppManaged,
    OrphanedAt,
    FirstSeenAt,
    LastUpdatedAt,
    ExtrasJson,
}
