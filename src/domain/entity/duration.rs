use std::time::Duration;

use snafu::prelude::*;

/// How long a full focus or break period lasts. Always at least one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerDuration(Duration);

impl TimerDuration {
    /// Build a period length from whole seconds, as found in configuration.
    ///
    /// # Errors
    ///
    /// This function will return an error if `seconds` is zero, since a
    /// timer of zero length would finish the moment it starts.
    pub fn try_new(seconds: u64) -> Result<Self, TryNewTimerDurationError> {
        ensure!(seconds > 0, ZeroSnafu);
        Ok(Self(Duration::from_secs(seconds)))
    }

    pub fn inner(&self) -> Duration {
        self.0
    }
}

impl TryFrom<u64> for TimerDuration {
    type Error = TryNewTimerDurationError;

    fn try_from(seconds: u64) -> Result<Self, Self::Error> {
        Self::try_new(seconds)
    }
}

/// An error type of creating a [`TimerDuration`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryNewTimerDurationError {
    #[snafu(display("A timer must last at least one second"))]
    #[non_exhaustive]
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_duration_from_seconds() {
        let duration = TimerDuration::try_new(1500).unwrap();
        assert_eq!(duration.inner(), Duration::from_secs(25 * 60));
        assert_eq!(TimerDuration::try_new(1), 1.try_into());
    }

    #[test]
    fn timer_duration_rejects_zero() {
        assert_eq!(
            TimerDuration::try_new(0),
            Err(TryNewTimerDurationError::Zero)
        );
        assert_eq!(
            TimerDuration::try_from(0),
            Err(TryNewTimerDurationError::Zero)
        );
    }
}
