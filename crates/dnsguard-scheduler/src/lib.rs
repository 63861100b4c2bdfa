mod pause;
mod scheduler;

pub use pause::{PauseManager, PauseStatus};
pub use scheduler::{run_scheduler, trigger_cleanup, trigger_reconcile, SchedulerHandles};
