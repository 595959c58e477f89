use std::sync::Arc;

use snafu::prelude::*;

use crate::domain::entity::TimerDuration;
use crate::domain::repository::duration::{GetDurationError, InvalidSnafu};
use crate::domain::repository::DurationRepository;
use crate::terminal::config::Configuration;

/// A [`DurationRepository`] implementation which reads configuration files.
pub struct DurationConfiguration {
    config: Arc<Configuration>,
}

impl DurationConfiguration {
    /// Creates a new [`DurationConfiguration`].
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl DurationRepository for DurationConfiguration {
    async fn focus_duration(&self) -> Result<TimerDuration, GetDurationError> {
        TimerDuration::try_new(self.config.timer.focus_duration).context(InvalidSnafu)
    }

    async fn break_duration(&self) -> Result<TimerDuration, GetDurationError> {
        TimerDuration::try_new(self.config.timer.break_duration).context(InvalidSnafu)
    }

    async fn focus_time_hidden(&self) -> bool {
        self.config.timer.hidden_focus_time
    }
}
