use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("dns_record_type"))
                    .values([
                        Alias::new("A"),
                        Alias::new("AAAA"),
                        Alias::new("CNAME"),
                        Alias::new("MX"),
                        Alias::new("TXT"),
                        Alias::new("SRV"),
                        Alias::new("CAA"),
                        Alias::new("NS"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("record_source"))
                    .values([Alias::new("discovered"), Alias::new("managed")])
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_type(Type::drop().name(Alias::new("record_source")).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(Alias::new("dns_record_type")).to_owned())
            .await?;

        Ok(())
    }
}
