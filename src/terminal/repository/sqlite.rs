use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rusqlite::Connection;
use snafu::prelude::*;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A SQLite database holding focus history and tasks. Implements both
/// [`RecordRepository`] and [`TaskRepository`].
///
/// [`RecordRepository`]: crate::domain::repository::RecordRepository
/// [`TaskRepository`]: crate::domain::repository::TaskRepository
#[derive(Debug)]
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open the database at `path`, creating and migrating it as needed.
    ///
    /// # Errors
    ///
    /// This function will return an error if the database could not be opened
    /// or its schema is newer than this build understands.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenStorageError> {
        let path = path.as_ref();
        let connection = Connection::open(path).context(OpenSnafu { path })?;
        let storage = Self::bootstrap(connection)?;
        tracing::info!(path = %path.display(), "Opened database");
        Ok(storage)
    }

    /// Open a private database living in memory.
    ///
    /// # Errors
    ///
    /// This function will return an error if SQLite could not be initialized.
    pub fn open_in_memory() -> Result<Self, OpenStorageError> {
        let connection = Connection::open_in_memory().context(OpenSnafu {
            path: PathBuf::from(":memory:"),
        })?;
        Self::bootstrap(connection)
    }

    fn bootstrap(mut connection: Connection) -> Result<Self, OpenStorageError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .context(MigrateSnafu)?;
        migrate(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Run `f` with exclusive access to the connection.
    pub(super) fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        let mut connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut connection)
    }
}

fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

fn migrate(connection: &mut Connection) -> Result<(), OpenStorageError> {
    let current: u32 = connection
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .context(MigrateSnafu)?;
    let latest = latest_version();
    ensure!(current <= latest, UnsupportedVersionSnafu { current, latest });
    if current == latest {
        return Ok(());
    }

    let transaction = connection.transaction().context(MigrateSnafu)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        transaction
            .execute_batch(migration.sql)
            .context(MigrateSnafu)?;
        transaction
            .execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            .context(MigrateSnafu)?;
        tracing::debug!(version = migration.version, "Applied database migration");
    }
    transaction.commit().context(MigrateSnafu)
}

/// An error type of opening a [`SqliteStorage`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum OpenStorageError {
    #[snafu(display("Could not open database {}", path.display()))]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[snafu(display("Could not migrate database schema"))]
    Migrate { source: rusqlite::Error },
    #[snafu(display("Database schema version {current} is newer than supported {latest}"))]
    UnsupportedVersion { current: u32, latest: u32 },
}
