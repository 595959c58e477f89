use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which of the two timers an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Focus,
    Break,
}

impl TimerKind {
    /// Get the kind that follows this one once its timer finishes.
    pub fn other(self) -> Self {
        match self {
            Self::Focus => Self::Break,
            Self::Break => Self::Focus,
        }
    }
}

impl Display for TimerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Focus => f.write_str("Focus"),
            Self::Break => f.write_str("Break"),
        }
    }
}
