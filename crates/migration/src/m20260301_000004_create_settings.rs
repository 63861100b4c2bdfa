use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Key)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Settings::ValueJson)
                            .json_binary()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Schema version row gates startup; bumped by future additive
        // migrations.
        let db = manager.get_connection();
        db.execute_unprepared(
            "INSERT INTO settings (key, value_json) VALUES ('schema_version', '1')",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Key,
    ValueJson,
}
