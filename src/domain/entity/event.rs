use crate::domain::entity::{TimerKind, TimerState};

/// Published once for every accepted state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransitionEvent {
    pub kind: TimerKind,
    pub new_state: TimerState,
}

impl StateTransitionEvent {
    /// Creates a new [`StateTransitionEvent`].
    pub fn new(kind: TimerKind, new_state: TimerState) -> Self {
        Self { kind, new_state }
    }
}
