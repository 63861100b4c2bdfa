use std::sync::Arc;

use chrono::{DateTime, Utc};
use dnsguard_events::{Event, EventBus};
use tokio::sync::RwLock;
use tokio::time::Duration as StdDuration;
use tracing::info;

#[derive(Debug, Clone, Default)]
struct PauseState {
    paused: bool,
    paused_at: Option<DateTime<Utc>>,
    reason: Option<String>,
    actor: Option<String>,
    /// Bumped on every `pause`/`resume` call so a stale auto-resume task
    /// (spawned by an earlier `pause(durationMinutes)`) can tell it has
    /// been superseded and should no-op instead of clobbering a later
    /// manual resume or re-pause.
    generation: u64,
}

/// A point-in-time view of pause state, returned to callers that just
/// want to read it (the external status call, tests) without holding the
/// lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PauseStatus {
    pub paused: bool,
    pub reason: Option<String>,
    pub actor: Option<String>,
}

/// Gates the Scheduler's periodic ticks. One-shot operations
/// (`trigger_reconcile`/`trigger_cleanup`, and any user-invoked create/
/// update/delete through a future external API) bypass this entirely —
/// pause only concerns the periodic loop.
pub struct PauseManager {
    state: RwLock<PauseState>,
    events: EventBus,
}

impl PauseManager {
    pub fn new(events: EventBus) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(PauseState::default()),
            events,
        })
    }

    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }

    pub async fn status(&self) -> PauseStatus {
        let state = self.state.read().await;
        PauseStatus {
            paused: state.paused,
            reason: state.reason.clone(),
            actor: state.actor.clone(),
        }
    }

    /// `duration_minutes`, if given, schedules an auto-resume. A later
    /// `pause()` or `resume()` invalidates it via the generation counter
    /// rather than trying to cancel the sleeping task.
    pub async fn pause(
        self: &Arc<Self>,
        reason: Option<String>,
        duration_minutes: Option<i64>,
        actor: Option<String>,
    ) {
        let generation = {
            let mut state = self.state.write().await;
            state.paused = true;
            state.paused_at = Some(Utc::now());
            state.reason = reason.clone();
            state.actor = actor;
            state.generation += 1;
            state.generation
        };

        info!(?reason, duration_minutes, "reconciliation paused");
        self.events.publish(Event::PauseChanged { paused: true, reason });

        if let Some(minutes) = duration_minutes {
            let this = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(StdDuration::from_secs((minutes.max(0) as u64) * 60)).await;
                this.auto_resume(generation).await;
            });
        }
    }

    pub async fn resume(&self, actor: Option<String>) {
        {
            let mut state = self.state.write().await;
            state.paused = false;
            state.paused_at = None;
            state.reason = None;
            state.actor = actor;
            state.generation += 1;
        }

        info!("reconciliation resumed");
        self.events.publish(Event::PauseChanged {
            paused: false,
            reason: None,
        });
    }

    async fn auto_resume(&self, generation: u64) {
        let should_resume = {
            let state = self.state.read().await;
            state.paused && state.generation == generation
        };

        if !should_resume {
            return;
        }

        self.resume(Some("auto-resume".to_string())).await;
    }
}
