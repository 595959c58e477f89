use clap::{Parser, Subcommand};

/// One line typed into the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "pomotrack",
    no_binary_name = true,
    disable_version_flag = true,
    disable_help_flag = true
)]
struct Line {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Start or resume the selected timer
    Start,
    /// Pause the running timer
    Pause,
    /// Finish the current timer early
    Finish,
    /// Select the focus timer
    Focus,
    /// Select the break timer
    Break,
    /// Show focus statistics
    Stats,
    /// List focus sessions
    History {
        /// Only show sessions started today
        #[arg(short, long)]
        today: bool,
    },
    /// List tasks
    Tasks,
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskAction),
    /// Edit the focus history
    #[command(subcommand)]
    Record(RecordAction),
    /// Leave the application
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add {
        /// Number of focus periods the task needs
        #[arg(short, long, default_value_t = 1)]
        pomodoros: u32,
        /// Name of the task
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete a task
    Rm { id: i64 },
    /// Work on a task, or stop working on the active one
    Use { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum RecordAction {
    /// Add a focus session that ends now
    Add { minutes: u32 },
    /// Delete a focus session
    Rm { id: i64 },
}

/// Parse a line of input. Blank lines yield no action. Asking for help is
/// reported as an error whose rendering is the help text.
///
/// # Errors
///
/// This function will return an error if the line is not a valid command.
pub fn parse(line: &str) -> Result<Option<Action>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(words).map(|line| Some(line.action))
}
