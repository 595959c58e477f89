use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use snafu::prelude::*;

use crate::domain::entity::{NewWorkRecord, RecordId, WorkRecord};
use crate::domain::repository::record::{RecordNotFoundSnafu, RecordStorageError};
use crate::domain::repository::RecordRepository;
use crate::terminal::repository::SqliteStorage;

const RECORD_SELECT_SQL: &str = "SELECT id, started_at, finished_at, elapsed_seconds FROM records";

#[async_trait::async_trait]
impl RecordRepository for SqliteStorage {
    async fn create_record(&self, record: &NewWorkRecord) -> Result<RecordId, RecordStorageError> {
        self.with_connection(|conn| {
            conn.query_row(
                "INSERT INTO records (started_at, finished_at, elapsed_seconds)
                 VALUES (?1, ?2, ?3) RETURNING id",
                params![
                    record.started_at,
                    record.finished_at,
                    seconds_to_sql(record.elapsed_seconds)
                ],
                |row| row.get(0).map(RecordId::new),
            )
        })
        .whatever_context("Could not insert work record")
    }

    async fn update_record(&self, record: &WorkRecord) -> Result<(), RecordStorageError> {
        let changed = self
            .with_connection(|conn| {
                conn.execute(
                    "UPDATE records SET finished_at = ?1, elapsed_seconds = ?2 WHERE id = ?3",
                    params![
                        record.finished_at,
                        seconds_to_sql(record.elapsed_seconds),
                        record.id.get()
                    ],
                )
            })
            .whatever_context::<_, RecordStorageError>("Could not update work record")?;
        ensure!(changed > 0, RecordNotFoundSnafu { id: record.id });
        Ok(())
    }

    async fn remove_record(&self, id: RecordId) -> Result<(), RecordStorageError> {
        let changed = self
            .with_connection(|conn| {
                conn.execute("DELETE FROM records WHERE id = ?1", params![id.get()])
            })
            .whatever_context::<_, RecordStorageError>("Could not delete work record")?;
        ensure!(changed > 0, RecordNotFoundSnafu { id });
        Ok(())
    }

    async fn records(&self) -> Result<Vec<WorkRecord>, RecordStorageError> {
        self.with_connection(|conn| {
            let mut statement =
                conn.prepare(&format!("{RECORD_SELECT_SQL} ORDER BY started_at DESC, id DESC"))?;
            let rows = statement.query_map([], parse_record)?;
            rows.collect()
        })
        .whatever_context("Could not load work records")
    }

    async fn records_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<WorkRecord>, RecordStorageError> {
        self.with_connection(|conn| {
            let mut statement = conn.prepare(&format!(
                "{RECORD_SELECT_SQL} WHERE started_at >= ?1 ORDER BY started_at DESC, id DESC"
            ))?;
            let rows = statement.query_map(params![since], parse_record)?;
            rows.collect()
        })
        .whatever_context("Could not load work records")
    }
}

fn parse_record(row: &Row<'_>) -> rusqlite::Result<WorkRecord> {
    Ok(WorkRecord {
        id: RecordId::new(row.get(0)?),
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        elapsed_seconds: seconds_from_sql(row.get(3)?),
    })
}

fn seconds_to_sql(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX)
}

fn seconds_from_sql(seconds: i64) -> u64 {
    u64::try_from(seconds).unwrap_or(0)
}
