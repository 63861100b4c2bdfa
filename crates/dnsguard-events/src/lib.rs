pub mod bus;
pub mod event;
pub mod record_type;

pub use bus::{EventBus, EventSubscriber};
pub use event::{Event, ReconcileStats, RecordRef};
pub use record_type::{ParseRecordTypeError, RecordSource, RecordType};
