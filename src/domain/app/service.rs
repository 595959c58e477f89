use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Utc};
use snafu::prelude::*;

use crate::domain::app::inbound::*;
use crate::domain::entity::{NewTask, NewWorkRecord, RecordId, Task, TaskId, WorkRecord};
use crate::domain::repository::{RecordRepository, TaskRepository};
use crate::domain::statistics::Summary;

pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl TaskPort for TaskService {
    async fn add_task(
        &self,
        name: String,
        pomodoros_required: u32,
    ) -> Result<Task, TaskServiceError> {
        let is_first = self
            .repository
            .tasks()
            .await
            .context(TaskStorageSnafu)?
            .is_empty();
        let task = NewTask::try_new(name, pomodoros_required, is_first).context(InvalidTaskSnafu)?;
        let id = self
            .repository
            .create_task(&task)
            .await
            .context(TaskStorageSnafu)?;
        tracing::info!(task_id = %id, name = task.name(), "Created task");

        self.find(id).await
    }

    async fn remove_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repository
            .delete_task(id)
            .await
            .context(TaskStorageSnafu)?;
        tracing::info!(task_id = %id, "Removed task");
        Ok(())
    }

    async fn tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        self.repository.tasks().await.context(TaskStorageSnafu)
    }

    async fn toggle_active(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        let mut task = self.find(id).await?;

        let previous = self
            .repository
            .active_task()
            .await
            .context(TaskStorageSnafu)?;
        if let Some(mut previous) = previous {
            previous.is_active = false;
            self.repository
                .update_task(&previous)
                .await
                .context(TaskStorageSnafu)?;
            if previous.id == id {
                tracing::info!(task_id = %id, "Deactivated task");
                return Ok(None);
            }
        }

        task.is_active = true;
        self.repository
            .update_task(&task)
            .await
            .context(TaskStorageSnafu)?;
        tracing::info!(task_id = %id, "Activated task");
        Ok(Some(task))
    }
}

impl TaskService {
    async fn find(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repository
            .tasks()
            .await
            .context(TaskStorageSnafu)?
            .into_iter()
            .find(|task| task.id == id)
            .context(UnknownTaskSnafu { id })
    }
}

pub struct HistoryService {
    repository: Arc<dyn RecordRepository>,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl HistoryPort for HistoryService {
    async fn records(&self) -> Result<Vec<WorkRecord>, HistoryServiceError> {
        self.repository.records().await.context(RecordStorageSnafu)
    }

    async fn today(&self) -> Result<Vec<WorkRecord>, HistoryServiceError> {
        self.repository
            .records_since(start_of_day(Local::now()))
            .await
            .context(RecordStorageSnafu)
    }

    async fn add_record(&self, minutes: u32) -> Result<WorkRecord, HistoryServiceError> {
        let record = NewWorkRecord::manual(Utc::now(), minutes).context(InvalidRecordSnafu)?;
        let id = self
            .repository
            .create_record(&record)
            .await
            .context(RecordStorageSnafu)?;
        tracing::info!(record_id = %id, minutes, "Added work record by hand");
        Ok(record.with_id(id))
    }

    async fn remove_record(&self, id: RecordId) -> Result<(), HistoryServiceError> {
        self.repository
            .remove_record(id)
            .await
            .context(RecordStorageSnafu)?;
        tracing::info!(record_id = %id, "Removed work record");
        Ok(())
    }

    async fn summary(&self) -> Result<Summary, HistoryServiceError> {
        let records = self.records().await?;
        Ok(Summary::collect(&records, &Local::now()))
    }
}

/// Get the first instant of the local day containing `now`.
fn start_of_day(now: DateTime<Local>) -> DateTime<Utc> {
    now.date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or(now)
        .with_timezone(&Utc)
}
