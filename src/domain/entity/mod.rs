pub mod duration;
pub mod event;
pub mod kind;
pub mod record;
pub mod state;
pub mod task;

pub use duration::TimerDuration;
pub use event::StateTransitionEvent;
pub use kind::TimerKind;
pub use record::{NewWorkRecord, RecordId, WorkRecord};
pub use state::TimerState;
pub use task::{NewTask, Task, TaskId};
