use std::io::Error as IoError;
use std::ops::ControlFlow;
use std::sync::Arc;

use snafu::prelude::*;
use snafu::Report;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::signal;
use tokio::task::JoinHandle;

use crate::domain::app::ApplicationCore;
use crate::domain::entity::{RecordId, TaskId, TimerKind, TimerState};
use crate::domain::relay::Subscription;
use crate::terminal::input::{self, Action, RecordAction, TaskAction};
use crate::terminal::page::Page;
use crate::terminal::view::{Screen, Selection, View};

/// The interactive front end: reads commands line by line and drives the
/// application core.
pub struct Terminal {
    core: ApplicationCore,
    screen: Arc<dyn Screen>,
    selection: Selection,
    view: JoinHandle<()>,
}

impl Terminal {
    /// Creates a new [`Terminal`] and starts rendering transitions from
    /// `events`.
    pub fn new(core: ApplicationCore, events: Subscription, screen: Arc<dyn Screen>) -> Self {
        let selection = Selection::new(TimerKind::Focus);
        let view = View::new(core.machine.clone(), Arc::clone(&screen), selection.clone())
            .spawn(events);
        Self {
            core,
            screen,
            selection,
            view,
        }
    }

    /// Serve commands from `input` until `quit`, end of input or Ctrl-C, then
    /// shut the core down.
    ///
    /// # Errors
    ///
    /// This function will return an error if reading input fails.
    pub async fn run<R>(self, input: R) -> Result<(), TerminalError>
    where
        R: AsyncBufRead + Unpin,
    {
        self.screen.show(&Page::message("Type `help` to list commands"));
        self.screen
            .show(&Page::paused(&self.core.machine, self.selection.get(), None));

        let res = self.serve(input).await;
        self.view.abort();
        self.core.shutdown().await;
        res
    }

    async fn serve<R>(&self, input: R) -> Result<(), TerminalError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context(ReadSnafu)? else {
                        tracing::info!("Input closed");
                        return Ok(());
                    };
                    if self.dispatch(&line).await.is_break() {
                        return Ok(());
                    }
                }
                res = signal::ctrl_c() => {
                    res.context(SignalSnafu)?;
                    tracing::info!("Interrupted");
                    return Ok(());
                }
            }
        }
    }

    async fn dispatch(&self, line: &str) -> ControlFlow<()> {
        match input::parse(line) {
            Ok(Some(action)) => {
                tracing::debug!(?action, "Received command");
                self.perform(action).await
            }
            Ok(None) => ControlFlow::Continue(()),
            Err(err) => {
                self.screen
                    .show(&Page::message(err.render().to_string().trim_end()));
                ControlFlow::Continue(())
            }
        }
    }

    async fn perform(&self, action: Action) -> ControlFlow<()> {
        let machine = &self.core.machine;
        match action {
            Action::Start => {
                machine
                    .set_state(TimerState::Active, self.selection.get())
                    .await
            }
            Action::Pause => {
                if machine.current_state().is_running() {
                    machine
                        .set_state(TimerState::Paused, self.selection.get())
                        .await
                } else {
                    self.screen.show(&Page::message("The timer is not running"));
                }
            }
            Action::Finish => {
                machine
                    .set_state(TimerState::Finished, self.selection.get())
                    .await
            }
            Action::Focus => self.select(TimerKind::Focus),
            Action::Break => self.select(TimerKind::Break),
            Action::Stats => match self.core.history.summary().await {
                Ok(summary) => self.screen.show(&Page::Statistics(summary)),
                Err(err) => self.report(err),
            },
            Action::History { today } => {
                let res = if today {
                    self.core.history.today().await
                } else {
                    self.core.history.records().await
                };
                match res {
                    Ok(records) => self.screen.show(&Page::History(records)),
                    Err(err) => self.report(err),
                }
            }
            Action::Tasks => self.show_tasks().await,
            Action::Task(action) => self.perform_task(action).await,
            Action::Record(action) => self.perform_record(action).await,
            Action::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    async fn perform_task(&self, action: TaskAction) {
        let tasks = &self.core.tasks;
        match action {
            TaskAction::Add { pomodoros, name } => {
                match tasks.add_task(name.join(" "), pomodoros).await {
                    Ok(_) => self.show_tasks().await,
                    Err(err) => self.report(err),
                }
            }
            TaskAction::Rm { id } => match tasks.remove_task(TaskId::new(id)).await {
                Ok(()) => self.show_tasks().await,
                Err(err) => self.report(err),
            },
            TaskAction::Use { id } => match tasks.toggle_active(TaskId::new(id)).await {
                Ok(Some(task)) => self
                    .screen
                    .show(&Page::message(format!("Working on {}", task.name))),
                Ok(None) => self.screen.show(&Page::message("No active task")),
                Err(err) => self.report(err),
            },
        }
    }

    async fn perform_record(&self, action: RecordAction) {
        let history = &self.core.history;
        match action {
            RecordAction::Add { minutes } => match history.add_record(minutes).await {
                Ok(record) => self.screen.show(&Page::message(format!(
                    "Added focus session {} of {minutes} minutes",
                    record.id
                ))),
                Err(err) => self.report(err),
            },
            RecordAction::Rm { id } => match history.remove_record(RecordId::new(id)).await {
                Ok(()) => self
                    .screen
                    .show(&Page::message(format!("Removed focus session #{id}"))),
                Err(err) => self.report(err),
            },
        }
    }

    /// Switch the timer commands apply to. Only allowed while nothing runs.
    fn select(&self, kind: TimerKind) {
        if self.core.machine.current_state().is_running() {
            self.screen
                .show(&Page::message("Pause the timer before switching"));
            return;
        }
        self.selection.set(kind);
        self.screen
            .show(&Page::paused(&self.core.machine, kind, None));
    }

    async fn show_tasks(&self) {
        match self.core.tasks.tasks().await {
            Ok(tasks) => self.screen.show(&Page::Tasks(tasks)),
            Err(err) => self.report(err),
        }
    }

    fn report<E>(&self, err: E)
    where
        E: std::error::Error + 'static,
    {
        crate::tracing_report!(err, "Command failed");
        self.screen
            .show(&Page::message(Report::from_error(err).to_string()));
    }
}

/// An error type of running the [`Terminal`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum TerminalError {
    #[snafu(display("Could not read from input"))]
    Read { source: IoError },
    #[snafu(display("Could not listen for Ctrl-C"))]
    Signal { source: IoError },
}
