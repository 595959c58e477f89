use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use snafu::prelude::*;

/// Identifier of a persisted [`Task`], assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(i64);

impl TaskId {
    /// Creates a new [`TaskId`].
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this [`TaskId`].
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}

/// A piece of work measured in focus periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub pomodoros_required: u32,
    pub pomodoros_completed: u32,
    pub is_complete: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Count one more finished focus period towards this task.
    pub fn record_pomodoro(&mut self) {
        self.pomodoros_completed += 1;
        self.is_complete = self.pomodoros_completed >= self.pomodoros_required;
    }
}

/// A [`Task`] that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    name: String,
    pomodoros_required: u32,
    is_active: bool,
}

impl NewTask {
    /// Try to create a [`NewTask`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the name is blank or no focus
    /// period is required.
    pub fn try_new(
        name: String,
        pomodoros_required: u32,
        is_active: bool,
    ) -> Result<Self, TryNewTaskError> {
        let name = name.trim().to_owned();
        ensure!(!name.is_empty(), EmptyNameSnafu);
        ensure!(pomodoros_required > 0, NoPomodoroSnafu);
        Ok(Self {
            name,
            pomodoros_required,
            is_active,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pomodoros_required(&self) -> u32 {
        self.pomodoros_required
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// An error type of creating a [`NewTask`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryNewTaskError {
    #[snafu(display("Name of a task must be non-empty"))]
    #[non_exhaustive]
    EmptyName,
    #[snafu(display("A task must require at least one focus period"))]
    #[non_exhaustive]
    NoPomodoro,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_try_new() {
        let task = NewTask::try_new("  write report ".into(), 3, true).unwrap();
        assert_eq!(task.name(), "write report");
        assert_eq!(task.pomodoros_required(), 3);
        assert!(task.is_active());

        assert_eq!(
            NewTask::try_new("   ".into(), 3, false),
            Err(TryNewTaskError::EmptyName)
        );
        assert_eq!(
            NewTask::try_new("read".into(), 0, false),
            Err(TryNewTaskError::NoPomodoro)
        );
    }

    #[test]
    fn task_record_pomodoro() {
        let mut task = Task {
            id: TaskId::new(1),
            name: "read".into(),
            pomodoros_required: 2,
            pomodoros_completed: 0,
            is_complete: false,
            is_active: true,
            created_at: Utc::now(),
        };

        task.record_pomodoro();
        assert_eq!(task.pomodoros_completed, 1);
        assert!(!task.is_complete);

        task.record_pomodoro();
        assert_eq!(task.pomodoros_completed, 2);
        assert!(task.is_complete);
    }
}
