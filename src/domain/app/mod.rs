pub mod inbound;

mod core;
mod service;

pub use self::core::{ApplicationCore, SetupApplicationCoreError};
pub use self::service::{HistoryService, TaskService};
