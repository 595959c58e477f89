use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::{NewTask, Task, TaskId};

/// An abstract interface for storing tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    /// Store a new task and return the id assigned to it.
    ///
    /// # Errors
    ///
    /// This function will return an error if the task could not be stored.
    async fn create_task(&self, task: &NewTask) -> Result<TaskId, TaskStorageError>;

    /// Overwrite every mutable field of a stored task.
    ///
    /// # Errors
    ///
    /// This function will return an error if the task could not be updated.
    async fn update_task(&self, task: &Task) -> Result<(), TaskStorageError>;

    /// Delete a stored task.
    ///
    /// # Errors
    ///
    /// This function will return an error if the task could not be deleted.
    async fn delete_task(&self, id: TaskId) -> Result<(), TaskStorageError>;

    /// Get all tasks in creation order.
    ///
    /// # Errors
    ///
    /// This function will return an error if the tasks could not be loaded.
    async fn tasks(&self) -> Result<Vec<Task>, TaskStorageError>;

    /// Get the task currently worked on, if any.
    ///
    /// # Errors
    ///
    /// This function will return an error if the lookup fails.
    async fn active_task(&self) -> Result<Option<Task>, TaskStorageError>;

    /// Count one finished focus period towards a task, marking it complete once
    /// enough have been done.
    ///
    /// # Errors
    ///
    /// This function will return an error if the task could not be updated.
    async fn increment_task_progress(&self, id: TaskId) -> Result<(), TaskStorageError>;
}

/// An error type of accessing the repository of [`Task`]s.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum TaskStorageError {
    #[snafu(display("Could not find task {id}"))]
    #[non_exhaustive]
    TaskNotFound { id: TaskId },
    #[snafu(whatever, display("Task storage failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
