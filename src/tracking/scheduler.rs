use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::{error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::aggregation::AggregationConfig;
use crate::db::Database;
use crate::settings::SettingsStore;
use crate::tracking::provider::{LocationProvider, PermissionManager};
use crate::tracking::sampler::sampling_loop;

/// Lifecycle model for the sampling task. Transitions are planned by
/// [`plan`] so the ordering rules (restart = full stop, then start) are
/// checkable without spawning anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerState {
    Stopped,
    Running { interval_minutes: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerCommand {
    Start { interval_minutes: u32 },
    Stop,
    SetInterval { minutes: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerEffect {
    Noop,
    Spawn { interval_minutes: u32 },
    Cancel,
    Restart { interval_minutes: u32 },
}

pub(crate) fn plan(
    state: &SchedulerState,
    command: SchedulerCommand,
) -> (SchedulerState, SchedulerEffect) {
    match (state, command) {
        (SchedulerState::Stopped, SchedulerCommand::Start { interval_minutes }) => (
            SchedulerState::Running { interval_minutes },
            SchedulerEffect::Spawn { interval_minutes },
        ),
        // Redundant start: the running task is kept, never duplicated.
        (SchedulerState::Running { .. }, SchedulerCommand::Start { .. }) => {
            (*state, SchedulerEffect::Noop)
        }
        (SchedulerState::Running { .. }, SchedulerCommand::Stop) => {
            (SchedulerState::Stopped, SchedulerEffect::Cancel)
        }
        (SchedulerState::Stopped, SchedulerCommand::Stop) => {
            (SchedulerState::Stopped, SchedulerEffect::Noop)
        }
        (SchedulerState::Running { .. }, SchedulerCommand::SetInterval { minutes }) => (
            SchedulerState::Running {
                interval_minutes: minutes,
            },
            SchedulerEffect::Restart {
                interval_minutes: minutes,
            },
        ),
        // A new interval takes effect on the next start.
        (SchedulerState::Stopped, SchedulerCommand::SetInterval { .. }) => {
            (SchedulerState::Stopped, SchedulerEffect::Noop)
        }
    }
}

/// Owns the single background sampling task. At most one task exists at
/// a time; callers serialize access through the engine's mutex.
pub struct TrackingScheduler {
    state: SchedulerState,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    db: Database,
    settings: Arc<SettingsStore>,
    provider: Arc<dyn LocationProvider>,
    permissions: Arc<dyn PermissionManager>,
    config: AggregationConfig,
}

impl TrackingScheduler {
    pub fn new(
        db: Database,
        settings: Arc<SettingsStore>,
        provider: Arc<dyn LocationProvider>,
        permissions: Arc<dyn PermissionManager>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            state: SchedulerState::Stopped,
            handle: None,
            cancel_token: None,
            db,
            settings,
            provider,
            permissions,
            config,
        }
    }

    /// Start the sampling task. `Ok(false)` when the location grant is
    /// missing; `Ok(true)` when the task is running afterwards,
    /// including the redundant-start case. A spawn or recovery failure
    /// is a real error, never silently treated as "already running".
    pub async fn start(&mut self) -> Result<bool> {
        if !self.permissions.has_location_grant() {
            info!("Location permission not granted; tracking not started");
            return Ok(false);
        }

        self.refresh_state();
        let interval_minutes = self.settings.get().update_interval_minutes;
        let (next, effect) = plan(
            &self.state,
            SchedulerCommand::Start { interval_minutes },
        );

        if let SchedulerEffect::Spawn { interval_minutes } = effect {
            self.spawn_loop(interval_minutes).await?;
            self.state = next;
            info!("Tracking started with a {interval_minutes} minute interval");
        }

        Ok(true)
    }

    /// Stop the sampling task. Returns whether a registered task was
    /// actually unregistered; stopping an idle scheduler is a no-op.
    pub async fn stop(&mut self) -> bool {
        self.refresh_state();
        let (next, effect) = plan(&self.state, SchedulerCommand::Stop);

        let cancelled = matches!(effect, SchedulerEffect::Cancel);
        if cancelled {
            self.cancel_loop().await;
            info!("Tracking stopped");
        }
        self.state = next;
        cancelled
    }

    /// Live registration state. Diverges from `Settings.enabled` when
    /// the loop self-terminated or was never started.
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Apply a new sampling interval: a running task is fully stopped
    /// and restarted with the new cadence before its next sample; an
    /// idle scheduler picks the value up on the next `start`.
    pub async fn set_interval(&mut self, minutes: u32) -> Result<()> {
        self.refresh_state();
        let (next, effect) = plan(&self.state, SchedulerCommand::SetInterval { minutes });

        if let SchedulerEffect::Restart { interval_minutes } = effect {
            self.cancel_loop().await;
            self.spawn_loop(interval_minutes).await?;
            info!("Tracking restarted with a {interval_minutes} minute interval");
        }
        self.state = next;
        Ok(())
    }

    /// The loop exits on its own when tracking gets disabled; fold that
    /// back into the lifecycle state before planning a transition.
    fn refresh_state(&mut self) {
        if !self.is_active() {
            self.state = SchedulerState::Stopped;
            self.handle = None;
            self.cancel_token = None;
        }
    }

    async fn spawn_loop(&mut self, interval_minutes: u32) -> Result<()> {
        let recovered = self.db.finalize_stale_open_visits(Utc::now()).await?;
        if recovered > 0 {
            warn!("Recovered {recovered} open visit(s) left behind by a previous run");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(
            interval_minutes,
            self.db.clone(),
            self.settings.clone(),
            self.provider.clone(),
            self.config.clone(),
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    async fn cancel_loop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                error!("Sampling loop task failed to join: {err}");
            }
        }
    }
}
