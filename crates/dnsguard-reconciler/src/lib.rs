mod equality;
mod intent;
mod reconciler;
mod sweeper;

pub use intent::{build_intent_set, PublicIps};
pub use reconciler::Reconciler;
pub use sweeper::{OrphanSweeper, SweepStats};
