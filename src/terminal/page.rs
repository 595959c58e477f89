use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use chrono::Local;

use crate::domain::entity::{Task, TimerKind, WorkRecord};
use crate::domain::statistics::Summary;
use crate::domain::timer::StateMachine;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MIN_CHART_HEIGHT: u64 = 6;

/// Everything the terminal can show. Each page carries exactly the data it
/// renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// A running timer. The clock is absent when focus time is hidden.
    Active {
        kind: TimerKind,
        remaining: Option<Duration>,
    },
    /// A stopped timer, possibly right after the other one finished.
    Paused {
        kind: TimerKind,
        remaining: Duration,
        after: Option<TimerKind>,
    },
    Statistics(Summary),
    History(Vec<WorkRecord>),
    Tasks(Vec<Task>),
    Message(String),
}

impl Page {
    /// Build the page of a running timer of `kind`.
    pub fn active(machine: &StateMachine, kind: TimerKind) -> Self {
        let hidden = kind == TimerKind::Focus && machine.is_focus_time_hidden();
        Self::Active {
            kind,
            remaining: (!hidden).then(|| machine.time_remaining(kind)),
        }
    }

    /// Build the page of a stopped timer of `kind`.
    pub fn paused(machine: &StateMachine, kind: TimerKind, after: Option<TimerKind>) -> Self {
        Self::Paused {
            kind,
            remaining: machine.time_remaining(kind),
            after,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Live pages are redrawn in place.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

impl Display for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Active {
                kind,
                remaining: Some(remaining),
            } => write!(f, "[{kind}] {} running", Clock(*remaining)),
            Self::Active {
                kind,
                remaining: None,
            } => write!(f, "[{kind}] running"),
            Self::Paused {
                kind,
                remaining,
                after,
            } => {
                if let Some(after) = after {
                    write!(f, "{after} finished. ")?;
                }
                write!(f, "[{kind}] {} paused, `start` to go", Clock(*remaining))
            }
            Self::Statistics(summary) => write_statistics(f, summary),
            Self::History(records) => write_history(f, records),
            Self::Tasks(tasks) => write_tasks(f, tasks),
            Self::Message(message) => f.write_str(message),
        }
    }
}

/// `mm:ss` rendering of a countdown.
struct Clock(Duration);

impl Display for Clock {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let seconds = self.0.as_secs();
        write!(f, "{:02}:{:02}", seconds / 60, seconds % 60)
    }
}

/// `1h 05m` rendering of an amount of focus time.
struct Span(Duration);

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let minutes = self.0.as_secs() / 60;
        match minutes / 60 {
            0 => write!(f, "{}m {:02}s", minutes, self.0.as_secs() % 60),
            hours => write!(f, "{}h {:02}m", hours, minutes % 60),
        }
    }
}

fn write_statistics(f: &mut Formatter<'_>, summary: &Summary) -> FmtResult {
    writeln!(f, "Hours focused: {:.2}", summary.total_hours())?;
    writeln!(f, "Days accessed: {}", summary.days)?;
    writeln!(f, "Today:         {}", Span(summary.today))?;
    writeln!(f)?;

    let hours = summary.week_hours().map(|day| day as u64);
    let height = hours.iter().copied().fold(MIN_CHART_HEIGHT, u64::max);
    for level in (1..=height).rev() {
        write!(f, "{level:02}|")?;
        for day in hours {
            f.write_str(if day >= level { " ## " } else { "    " })?;
        }
        writeln!(f)?;
    }
    write!(f, "   ")?;
    for day in WEEKDAYS {
        write!(f, " {day}")?;
    }
    Ok(())
}

fn write_history(f: &mut Formatter<'_>, records: &[WorkRecord]) -> FmtResult {
    if records.is_empty() {
        return f.write_str("No focus sessions yet");
    }
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            writeln!(f)?;
        }
        write!(
            f,
            "{:>5}  {}  {}",
            record.id.to_string(),
            record.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            Span(record.elapsed()),
        )?;
    }
    Ok(())
}

fn write_tasks(f: &mut Formatter<'_>, tasks: &[Task]) -> FmtResult {
    if tasks.is_empty() {
        return f.write_str("No tasks yet, add one with `task add <name>`");
    }
    for (index, task) in tasks.iter().enumerate() {
        if index > 0 {
            writeln!(f)?;
        }
        let marker = match (task.is_active, task.is_complete) {
            (true, _) => '*',
            (false, true) => 'x',
            (false, false) => ' ',
        };
        write!(
            f,
            "{marker} {:>4}  {}  {}/{}",
            task.id.to_string(),
            task.name,
            task.pomodoros_completed,
            task.pomodoros_required,
        )?;
    }
    Ok(())
}
