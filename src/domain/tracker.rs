use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::domain::entity::{
    NewWorkRecord, RecordId, StateTransitionEvent, TimerKind, TimerState, WorkRecord,
};
use crate::domain::relay::Subscription;
use crate::domain::repository::{RecordRepository, TaskRepository};

/// The work record being accrued, together with the bookkeeping that never
/// reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenRecord {
    id: Option<RecordId>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    elapsed: Duration,
    resumed_at: Option<Instant>,
    finished: bool,
}

impl OpenRecord {
    fn start(now: DateTime<Utc>, instant: Instant) -> Self {
        Self {
            id: None,
            started_at: now,
            finished_at: now,
            elapsed: Duration::ZERO,
            resumed_at: Some(instant),
            finished: false,
        }
    }

    /// Add the time since the last resume. Elapsed time is kept at full
    /// precision and only truncated to seconds when stored.
    fn accrue(&mut self, now: DateTime<Utc>, instant: Instant) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.elapsed += instant.saturating_duration_since(resumed_at);
            self.finished_at = now.max(self.started_at);
        }
    }

    fn draft(&self) -> NewWorkRecord {
        NewWorkRecord {
            started_at: self.started_at,
            finished_at: self.finished_at,
            elapsed_seconds: self.elapsed.as_secs(),
        }
    }

    fn stored(&self, id: RecordId) -> WorkRecord {
        self.draft().with_id(id)
    }
}

/// Turns focus transitions into a persisted history of focus time.
///
/// A record is opened when focusing starts, keeps accruing across pauses, and
/// is closed when the focus timer finishes. Storage failures are logged and
/// never interrupt tracking.
pub struct DurationTracker {
    current: Option<OpenRecord>,
    records: Arc<dyn RecordRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl DurationTracker {
    /// Creates a new [`DurationTracker`] without any open record.
    pub fn new(records: Arc<dyn RecordRepository>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self {
            current: None,
            records,
            tasks,
        }
    }

    /// Returns `true` if a focus session has started and not finished yet.
    pub fn is_record_open(&self) -> bool {
        self.current.as_ref().is_some_and(|record| !record.finished)
    }

    /// Apply one transition. Only [`TimerKind::Focus`] transitions matter.
    pub async fn handle(&mut self, event: StateTransitionEvent) {
        if event.kind != TimerKind::Focus {
            return;
        }

        match event.new_state {
            TimerState::Active => self.handle_start().await,
            TimerState::Paused => self.handle_pause().await,
            TimerState::Finished => self.handle_finish().await,
        }
    }

    /// Close the open record, accruing the running interval if there is one.
    /// No task is credited, since the focus period did not run out.
    pub async fn finish_running(&mut self) {
        let Some(record) = self.open_record() else {
            return;
        };
        record.finished = true;
        record.accrue(Utc::now(), Instant::now());
        self.flush().await;
    }

    async fn handle_start(&mut self) {
        let instant = Instant::now();
        match self.open_record() {
            Some(record) => {
                tracing::debug!(record_id = ?record.id, "Resumed work record");
                record.resumed_at = Some(instant);
            }
            None => {
                self.current = Some(OpenRecord::start(Utc::now(), instant));
                self.flush().await;
            }
        }
    }

    async fn handle_pause(&mut self) {
        let Some(record) = self.open_record().filter(|record| record.resumed_at.is_some()) else {
            tracing::debug!("No running work record to pause");
            return;
        };
        record.accrue(Utc::now(), Instant::now());
        self.flush().await;
    }

    async fn handle_finish(&mut self) {
        let Some(record) = self.open_record() else {
            tracing::debug!("No open work record to finish");
            return;
        };
        record.finished = true;
        record.accrue(Utc::now(), Instant::now());
        self.flush().await;
        self.credit_active_task().await;
    }

    fn open_record(&mut self) -> Option<&mut OpenRecord> {
        self.current.as_mut().filter(|record| !record.finished)
    }

    /// Write the current record to storage. A record whose creation failed is
    /// created again on the next flush.
    async fn flush(&mut self) {
        let Some(record) = self.current.as_mut() else {
            return;
        };

        match record.id {
            Some(id) => {
                if let Err(err) = self.records.update_record(&record.stored(id)).await {
                    crate::tracing_report!(err, record_id = %id, "Could not update work record");
                }
            }
            None => match self.records.create_record(&record.draft()).await {
                Ok(id) => {
                    tracing::info!(record_id = %id, "Opened work record");
                    record.id = Some(id);
                }
                Err(err) => {
                    crate::tracing_report!(err, "Could not create work record");
                }
            },
        }
    }

    async fn credit_active_task(&self) {
        let mut task = match self.tasks.active_task().await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::warn!("No active task to credit the finished focus period to");
                return;
            }
            Err(err) => {
                crate::tracing_report!(err, "Could not look up the active task");
                return;
            }
        };

        match self.tasks.increment_task_progress(task.id).await {
            Ok(()) => {
                task.record_pomodoro();
                tracing::info!(
                    task_id = %task.id,
                    completed = task.pomodoros_completed,
                    required = task.pomodoros_required,
                    complete = task.is_complete,
                    "Credited focus period to task"
                );
            }
            Err(err) => {
                crate::tracing_report!(err, task_id = %task.id, "Could not update task progress");
            }
        }
    }
}

/// Handle to a [`DurationTracker`] consuming events on background.
#[derive(Clone)]
pub struct TrackerHandle {
    tracker: Arc<Mutex<DurationTracker>>,
}

impl TrackerHandle {
    /// Spawn a loop feeding every event of `events` to `tracker`. The loop
    /// ends when the relay stops.
    pub fn spawn(tracker: DurationTracker, mut events: Subscription) -> (Self, JoinHandle<()>) {
        let tracker = Arc::new(Mutex::new(tracker));
        let consumer = Arc::clone(&tracker);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                consumer.lock().await.handle(event).await;
            }
        });
        (Self { tracker }, handle)
    }

    pub async fn is_record_open(&self) -> bool {
        self.tracker.lock().await.is_record_open()
    }

    /// See [`DurationTracker::finish_running`].
    pub async fn finish_running(&self) {
        self.tracker.lock().await.finish_running().await
    }
}
