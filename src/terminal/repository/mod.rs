mod duration;
mod record;
mod sqlite;
mod task;

pub use duration::DurationConfiguration;
pub use sqlite::{OpenStorageError, SqliteStorage};
