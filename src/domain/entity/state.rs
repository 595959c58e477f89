use std::fmt::{Display, Formatter, Result as FmtResult};

/// What the user is doing right now. One value is shared by both timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Paused,
    Active,
    Finished,
}

impl TimerState {
    /// Returns `true` if a timer is counting down in this state.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl Display for TimerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Paused => f.write_str("Paused"),
            Self::Active => f.write_str("Active"),
            Self::Finished => f.write_str("Finished"),
        }
    }
}
