mod conversions;
pub mod domain;
pub mod error;
pub mod fake;
pub mod record_store;
pub mod store;

pub use domain::{CachedRecord, NewRecord, TrackOutcome, TrackedRecord};
pub use error::{Result, StoreError};
pub use fake::FakeStore;
pub use record_store::RecordStore;
pub use store::Store;
