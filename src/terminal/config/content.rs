use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_FOCUS_DURATION: u64 = 25 * 60;
const DEFAULT_BREAK_DURATION: u64 = 5 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub timer: TimerContent,
    #[serde(default)]
    pub storage: StorageContent,
}

/// Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerContent {
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u64,
    #[serde(default = "default_break_duration")]
    pub break_duration: u64,
    #[serde(default)]
    pub hidden_focus_time: bool,
}

impl Default for TimerContent {
    fn default() -> Self {
        Self {
            focus_duration: DEFAULT_FOCUS_DURATION,
            break_duration: DEFAULT_BREAK_DURATION,
            hidden_focus_time: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

/// Timer settings given on the command line, taking precedence over the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub focus_duration: Option<u64>,
    pub break_duration: Option<u64>,
    pub hidden_focus_time: Option<bool>,
}

impl Configuration {
    /// Apply `overrides` and report whether anything changed.
    pub fn apply(&mut self, overrides: Overrides) -> bool {
        let before = self.timer.clone();
        if let Some(focus_duration) = overrides.focus_duration {
            self.timer.focus_duration = focus_duration;
        }
        if let Some(break_duration) = overrides.break_duration {
            self.timer.break_duration = break_duration;
        }
        if let Some(hidden_focus_time) = overrides.hidden_focus_time {
            self.timer.hidden_focus_time = hidden_focus_time;
        }
        self.timer != before
    }
}

fn default_focus_duration() -> u64 {
    DEFAULT_FOCUS_DURATION
}

fn default_break_duration() -> u64 {
    DEFAULT_BREAK_DURATION
}
