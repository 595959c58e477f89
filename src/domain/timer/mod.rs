pub mod countdown;
pub mod machine;

pub use countdown::{Completion, CountdownTimer, TICK_INTERVAL};
pub use machine::{StateMachine, TimerConfig};
