use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::duration::{TimerDuration, TryNewTimerDurationError};

/// An abstract interface for accessing timer settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DurationRepository: Send + Sync + 'static {
    /// Get duration of the [`Focus`] timer.
    ///
    /// [`Focus`]: crate::domain::entity::TimerKind::Focus
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to get the duration.
    async fn focus_duration(&self) -> Result<TimerDuration, GetDurationError>;

    /// Get duration of the [`Break`] timer.
    ///
    /// [`Break`]: crate::domain::entity::TimerKind::Break
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to get the duration.
    async fn break_duration(&self) -> Result<TimerDuration, GetDurationError>;

    /// Whether the clock should be hidden while focusing.
    async fn focus_time_hidden(&self) -> bool;
}

/// An error type of accessing the repository of [`TimerDuration`]s.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum GetDurationError {
    #[snafu(display("Could not create an invalid duration"))]
    #[non_exhaustive]
    Invalid { source: TryNewTimerDurationError },
    #[snafu(whatever, display("Load duration failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duration_repository_get() {
        let mock = init_mock();

        assert_eq!(
            mock.focus_duration().await.unwrap(),
            TimerDuration::try_new(10).unwrap()
        );
        assert!(mock.break_duration().await.is_err());
        assert!(!mock.focus_time_hidden().await);
    }

    fn init_mock() -> MockDurationRepository {
        let mut mock = MockDurationRepository::new();
        mock.expect_focus_duration()
            .returning(|| Ok(TimerDuration::try_new(10).unwrap()));
        mock.expect_break_duration()
            .returning(|| whatever!("error"));
        mock.expect_focus_time_hidden().return_const(false);
        mock
    }
}
