pub mod prelude;

pub mod provider_cache;
pub mod sea_orm_active_enums;
pub mod settings;
pub mod tracked_records;
