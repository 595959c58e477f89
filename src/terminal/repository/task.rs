use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use snafu::prelude::*;

use crate::domain::entity::{NewTask, Task, TaskId};
use crate::domain::repository::task::{TaskNotFoundSnafu, TaskStorageError};
use crate::domain::repository::TaskRepository;
use crate::terminal::repository::SqliteStorage;

const TASK_SELECT_SQL: &str = "SELECT id, name, pomodoros_required, pomodoros_completed, \
     is_complete, is_active, created_at FROM tasks";

#[async_trait::async_trait]
impl TaskRepository for SqliteStorage {
    async fn create_task(&self, task: &NewTask) -> Result<TaskId, TaskStorageError> {
        self.with_connection(|conn| {
            let transaction = conn.transaction()?;
            if task.is_active() {
                transaction.execute("UPDATE tasks SET is_active = 0 WHERE is_active = 1", [])?;
            }
            let id = transaction.query_row(
                "INSERT INTO tasks (name, pomodoros_required, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4) RETURNING id",
                params![
                    task.name(),
                    task.pomodoros_required(),
                    task.is_active(),
                    Utc::now()
                ],
                |row| row.get(0).map(TaskId::new),
            )?;
            transaction.commit()?;
            Ok(id)
        })
        .whatever_context("Could not insert task")
    }

    async fn update_task(&self, task: &Task) -> Result<(), TaskStorageError> {
        let changed = self
            .with_connection(|conn| {
                let transaction = conn.transaction()?;
                if task.is_active {
                    transaction.execute(
                        "UPDATE tasks SET is_active = 0 WHERE is_active = 1 AND id != ?1",
                        params![task.id.get()],
                    )?;
                }
                let changed = transaction.execute(
                    "UPDATE tasks SET name = ?1, pomodoros_required = ?2,
                     pomodoros_completed = ?3, is_complete = ?4, is_active = ?5
                     WHERE id = ?6",
                    params![
                        task.name,
                        task.pomodoros_required,
                        task.pomodoros_completed,
                        task.is_complete,
                        task.is_active,
                        task.id.get()
                    ],
                )?;
                transaction.commit()?;
                Ok(changed)
            })
            .whatever_context::<_, TaskStorageError>("Could not update task")?;
        ensure!(changed > 0, TaskNotFoundSnafu { id: task.id });
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), TaskStorageError> {
        let changed = self
            .with_connection(|conn| conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.get()]))
            .whatever_context::<_, TaskStorageError>("Could not delete task")?;
        ensure!(changed > 0, TaskNotFoundSnafu { id });
        Ok(())
    }

    async fn tasks(&self) -> Result<Vec<Task>, TaskStorageError> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare(&format!("{TASK_SELECT_SQL} ORDER BY created_at, id"))?;
            let rows = statement.query_map([], parse_task)?;
            rows.collect()
        })
        .whatever_context("Could not load tasks")
    }

    async fn active_task(&self) -> Result<Option<Task>, TaskStorageError> {
        self.with_connection(|conn| {
            conn.query_row(
                &format!("{TASK_SELECT_SQL} WHERE is_active = 1 LIMIT 1"),
                [],
                parse_task,
            )
            .optional()
        })
        .whatever_context("Could not load the active task")
    }

    async fn increment_task_progress(&self, id: TaskId) -> Result<(), TaskStorageError> {
        let changed = self
            .with_connection(|conn| {
                conn.execute(
                    "UPDATE tasks SET pomodoros_completed = pomodoros_completed + 1,
                     is_complete = (pomodoros_completed + 1) >= pomodoros_required
                     WHERE id = ?1",
                    params![id.get()],
                )
            })
            .whatever_context::<_, TaskStorageError>("Could not update task progress")?;
        ensure!(changed > 0, TaskNotFoundSnafu { id });
        Ok(())
    }
}

fn parse_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::new(row.get(0)?),
        name: row.get(1)?,
        pomodoros_required: row.get(2)?,
        pomodoros_completed: row.get(3)?,
        is_complete: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}
