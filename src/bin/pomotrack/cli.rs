use std::path::PathBuf;

use clap::Parser;
use pomotrack::terminal::config::Overrides;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Length of a focus period in seconds, saved to the configuration
    #[arg(short, long)]
    pub focus_duration: Option<u64>,
    /// Length of a break period in seconds, saved to the configuration
    #[arg(short, long)]
    pub break_duration: Option<u64>,
    /// Hide the countdown while focusing, saved to the configuration
    #[arg(long)]
    pub hidden_focus_time: Option<bool>,
    /// Path to the database holding tasks and focus sessions
    #[arg(short, long)]
    pub database: Option<PathBuf>,
    /// Path to the log file
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
    /// Maximum logging level the subscriber should use
    #[arg(short, long, default_value_t = Level::INFO)]
    pub verbosity: Level,
}

impl Arguments {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            focus_duration: self.focus_duration,
            break_duration: self.break_duration,
            hidden_focus_time: self.hidden_focus_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn arguments() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn arguments_overrides() {
        let args = Arguments::parse_from(["pomotrack", "-f", "3000", "--hidden-focus-time", "true"]);
        assert_eq!(
            args.overrides(),
            Overrides {
                focus_duration: Some(3000),
                break_duration: None,
                hidden_focus_time: Some(true),
            }
        );
    }
}
