pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_enums;
mod m20260301_000002_create_tracked_records;
mod m20260301_000003_create_provider_cache;
mod m20260301_000004_create_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_enums::Migration),
            Box::new(m20260301_000002_create_tracked_records::Migration),
            Box::new(m20260301_000003_create_provider_cache::Migration),
            Box::new(m20260301_000004_create_settings::Migration),
        ]
    }
}
