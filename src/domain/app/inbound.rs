use snafu::prelude::*;

use crate::domain::entity::record::TryNewWorkRecordError;
use crate::domain::entity::task::TryNewTaskError;
use crate::domain::entity::{RecordId, Task, TaskId, WorkRecord};
use crate::domain::repository::record::RecordStorageError;
use crate::domain::repository::task::TaskStorageError;
use crate::domain::statistics::Summary;

/// A public port for managing tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TaskPort: Send + Sync + 'static {
    /// Create a task. The first task ever created becomes the active one.
    async fn add_task(&self, name: String, pomodoros_required: u32)
        -> Result<Task, TaskServiceError>;

    /// Delete a task.
    async fn remove_task(&self, id: TaskId) -> Result<(), TaskServiceError>;

    /// List all tasks in creation order.
    async fn tasks(&self) -> Result<Vec<Task>, TaskServiceError>;

    /// Make a task the active one, deactivating the previous one. Choosing the
    /// task that is already active deactivates it. Returns the task active
    /// afterwards.
    async fn toggle_active(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError>;
}

/// A public port for reading and editing the focus history.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryPort: Send + Sync + 'static {
    /// All records, newest first.
    async fn records(&self) -> Result<Vec<WorkRecord>, HistoryServiceError>;

    /// Records started today, newest first.
    async fn today(&self) -> Result<Vec<WorkRecord>, HistoryServiceError>;

    /// Store a session of `minutes` entered by hand, ending now.
    async fn add_record(&self, minutes: u32) -> Result<WorkRecord, HistoryServiceError>;

    /// Delete a record.
    async fn remove_record(&self, id: RecordId) -> Result<(), HistoryServiceError>;

    /// Summarize the whole history.
    async fn summary(&self) -> Result<Summary, HistoryServiceError>;
}

/// An error type of [`TaskPort`] operations.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum TaskServiceError {
    #[snafu(display("Invalid task"))]
    InvalidTask { source: TryNewTaskError },
    #[snafu(display("Could not find task {id}"))]
    UnknownTask { id: TaskId },
    #[snafu(display("Could not access tasks"))]
    TaskStorage { source: TaskStorageError },
}

/// An error type of [`HistoryPort`] operations.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum HistoryServiceError {
    #[snafu(display("Invalid work record"))]
    InvalidRecord { source: TryNewWorkRecordError },
    #[snafu(display("Could not access focus history"))]
    RecordStorage { source: RecordStorageError },
}
