pub mod signal;
mod supervisor;

pub use supervisor::{LastReconcile, Status, Supervisor, SupervisorStats};
