use std::sync::Arc;

use snafu::prelude::*;
use tokio::task::JoinHandle;

use crate::domain::app::inbound::{HistoryPort, TaskPort};
use crate::domain::app::service::{HistoryService, TaskService};
use crate::domain::entity::TimerKind;
use crate::domain::relay::{EventRelay, Subscription};
use crate::domain::repository::duration::GetDurationError;
use crate::domain::repository::{DurationRepository, RecordRepository, TaskRepository};
use crate::domain::timer::{StateMachine, TimerConfig};
use crate::domain::tracker::{DurationTracker, TrackerHandle};

/// Entrance to the domain logic, providing ports for external adapters.
pub struct ApplicationCore {
    pub machine: StateMachine,
    pub tracker: TrackerHandle,
    pub tasks: Arc<dyn TaskPort>,
    pub history: Arc<dyn HistoryPort>,
    relay: JoinHandle<()>,
}

impl ApplicationCore {
    /// Initialize the application by injecting external repositories. The
    /// returned [`Subscription`] receives each transition only after the
    /// duration tracker has taken it, though the tracker may still be
    /// handling it.
    ///
    /// # Errors
    ///
    /// This function will return an error if the timer settings could not be
    /// loaded.
    pub async fn setup(
        duration_repository: Arc<dyn DurationRepository>,
        record_repository: Arc<dyn RecordRepository>,
        task_repository: Arc<dyn TaskRepository>,
    ) -> Result<(ApplicationCore, Subscription), SetupApplicationCoreError> {
        let config = load_config(duration_repository).await?;

        let (publisher, mut relay) = EventRelay::new();
        let tracker_events = relay.subscribe();
        let view_events = relay.subscribe();
        let relay = relay.spawn();

        let tracker = DurationTracker::new(
            Arc::clone(&record_repository),
            Arc::clone(&task_repository),
        );
        let (tracker, _) = TrackerHandle::spawn(tracker, tracker_events);
        let machine = StateMachine::new(config, publisher);

        tracing::info!(
            focus_duration = ?config.focus_duration.inner(),
            break_duration = ?config.break_duration.inner(),
            hidden_focus_time = config.hidden_focus_time,
            "Application core is ready"
        );

        let core = ApplicationCore {
            machine,
            tracker,
            tasks: Arc::new(TaskService::new(task_repository)),
            history: Arc::new(HistoryService::new(record_repository)),
            relay,
        };
        Ok((core, view_events))
    }

    /// Finalize the open work record before the process exits.
    pub async fn shutdown(self) {
        self.tracker.finish_running().await;
        self.relay.abort();
        tracing::info!("Application core shut down");
    }
}

async fn load_config(
    repository: Arc<dyn DurationRepository>,
) -> Result<TimerConfig, SetupApplicationCoreError> {
    let focus_duration = repository.focus_duration().await.context(DurationSnafu {
        kind: TimerKind::Focus,
    })?;
    let break_duration = repository.break_duration().await.context(DurationSnafu {
        kind: TimerKind::Break,
    })?;
    let hidden_focus_time = repository.focus_time_hidden().await;

    Ok(TimerConfig {
        focus_duration,
        break_duration,
        hidden_focus_time,
    })
}

/// An error for initializing the application.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SetupApplicationCoreError {
    #[snafu(display("Could not load duration of the {kind} timer"))]
    Duration {
        kind: TimerKind,
        source: GetDurationError,
    },
}
