use std::error::Error as StdError;

use chrono::{DateTime, Utc};
use snafu::prelude::*;

use crate::domain::entity::{NewWorkRecord, RecordId, WorkRecord};

/// An abstract interface for storing focus history.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync + 'static {
    /// Store a new record and return the id assigned to it.
    ///
    /// # Errors
    ///
    /// This function will return an error if the record could not be stored.
    async fn create_record(&self, record: &NewWorkRecord) -> Result<RecordId, RecordStorageError>;

    /// Overwrite `finished_at` and `elapsed_seconds` of a stored record.
    ///
    /// # Errors
    ///
    /// This function will return an error if the record could not be updated.
    async fn update_record(&self, record: &WorkRecord) -> Result<(), RecordStorageError>;

    /// Delete a stored record.
    ///
    /// # Errors
    ///
    /// This function will return an error if the record could not be deleted.
    async fn remove_record(&self, id: RecordId) -> Result<(), RecordStorageError>;

    /// Get all records, newest first.
    ///
    /// # Errors
    ///
    /// This function will return an error if the records could not be loaded.
    async fn records(&self) -> Result<Vec<WorkRecord>, RecordStorageError>;

    /// Get records started at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// This function will return an error if the records could not be loaded.
    async fn records_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<WorkRecord>, RecordStorageError>;
}

/// An error type of accessing the repository of [`WorkRecord`]s.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum RecordStorageError {
    #[snafu(display("Could not find work record {id}"))]
    #[non_exhaustive]
    RecordNotFound { id: RecordId },
    #[snafu(whatever, display("Work record storage failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
