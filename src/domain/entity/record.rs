use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use snafu::prelude::*;

/// Identifier of a persisted [`WorkRecord`], assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(i64);

impl RecordId {
    /// Creates a new [`RecordId`].
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this [`RecordId`].
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}

/// One continuous, possibly pause-interrupted, focus session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    pub id: RecordId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_seconds: u64,
}

impl WorkRecord {
    /// Returns the accrued focus time of this record.
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(self.elapsed_seconds)
    }
}

/// A [`WorkRecord`] that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkRecord {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_seconds: u64,
}

impl NewWorkRecord {
    /// Try to create a [`NewWorkRecord`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the record finishes before it
    /// starts.
    pub fn try_new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        elapsed_seconds: u64,
    ) -> Result<Self, TryNewWorkRecordError> {
        ensure!(finished_at >= started_at, BackwardsSnafu);
        Ok(Self {
            started_at,
            finished_at,
            elapsed_seconds,
        })
    }

    /// Try to create a record of `minutes` focus time which ends at
    /// `finished_at`. Used for sessions entered by hand.
    ///
    /// # Errors
    ///
    /// This function will return an error if `minutes` is zero.
    pub fn manual(finished_at: DateTime<Utc>, minutes: u32) -> Result<Self, TryNewWorkRecordError> {
        ensure!(minutes > 0, EmptySnafu);
        let started_at = finished_at - TimeDelta::minutes(i64::from(minutes));
        Self::try_new(started_at, finished_at, u64::from(minutes) * 60)
    }

    /// Attach the id assigned by storage.
    pub fn with_id(self, id: RecordId) -> WorkRecord {
        WorkRecord {
            id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            elapsed_seconds: self.elapsed_seconds,
        }
    }
}

/// An error type of creating a [`NewWorkRecord`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryNewWorkRecordError {
    #[snafu(display("A work record could not finish before it starts"))]
    #[non_exhaustive]
    Backwards,
    #[snafu(display("A manual work record must last at least one minute"))]
    #[non_exhaustive]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_work_record_try_new() {
        let now = Utc::now();
        assert!(NewWorkRecord::try_new(now, now, 0).is_ok());
        assert_eq!(
            NewWorkRecord::try_new(now, now - TimeDelta::seconds(1), 0),
            Err(TryNewWorkRecordError::Backwards),
        );
    }

    #[test]
    fn new_work_record_manual() {
        let now = Utc::now();
        let record = NewWorkRecord::manual(now, 25).unwrap();
        assert_eq!(record.elapsed_seconds, 1500);
        assert_eq!(record.finished_at - record.started_at, TimeDelta::minutes(25));
        assert_eq!(
            NewWorkRecord::manual(now, 0),
            Err(TryNewWorkRecordError::Empty)
        );

        let record = record.with_id(RecordId::new(7));
        assert_eq!(record.id.get(), 7);
        assert_eq!(record.elapsed(), Duration::from_secs(1500));
    }
}
