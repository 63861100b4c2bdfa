pub mod adapter;
pub mod cache;
mod cloudflare;
pub mod error;
pub mod types;

pub use adapter::ProviderAdapter;
pub use cache::ProviderCache;
pub use cloudflare::CloudflareProvider;
pub use error::{ErrorReason, ProviderError, Result};
pub use types::{BatchOutcome, Capabilities, ProviderRecord, RecordExtras, RecordIntent};
