pub mod container;
mod error;
mod labels;
pub mod proxy;
mod rule;
pub mod source;
pub mod types;

pub use container::ContainerSource;
pub use error::{Result, SourceError};
pub use proxy::ProxySource;
pub use rule::hosts_from_rule;
pub use source::HostnameSource;
pub use types::{HostnameSet, IntentHints};
