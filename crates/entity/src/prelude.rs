pub use super::provider_cache::Entity as ProviderCache;
pub use super::settings::Entity as Settings;
pub use super::tracked_records::Entity as TrackedRecords;
