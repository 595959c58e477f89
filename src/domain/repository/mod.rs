pub mod duration;
pub mod record;
pub mod task;

pub use duration::DurationRepository;
pub use record::RecordRepository;
pub use task::TaskRepository;
