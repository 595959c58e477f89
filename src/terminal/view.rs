use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio::time;

use crate::domain::entity::{StateTransitionEvent, TimerKind, TimerState};
use crate::domain::relay::Subscription;
use crate::domain::timer::{StateMachine, TICK_INTERVAL};
use crate::terminal::page::Page;

/// Where pages end up.
pub trait Screen: Send + Sync + 'static {
    fn show(&self, page: &Page);
}

/// A [`Screen`] writing to the standard output. Live pages overwrite the
/// current line.
#[derive(Debug, Default)]
pub struct StdoutScreen;

impl Screen for StdoutScreen {
    fn show(&self, page: &Page) {
        let mut out = io::stdout().lock();
        let res = if page.is_live() {
            write!(out, "\r\x1b[2K{page}")
        } else {
            writeln!(out, "\r\x1b[2K{page}")
        };
        if let Err(err) = res.and_then(|_| out.flush()) {
            tracing::warn!(%err, "Could not write to the terminal");
        }
    }
}

/// The timer kind commands apply to, shared by the view and the input loop.
#[derive(Debug, Clone)]
pub struct Selection {
    kind: Arc<Mutex<TimerKind>>,
}

impl Selection {
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind: Arc::new(Mutex::new(kind)),
        }
    }

    pub fn get(&self) -> TimerKind {
        *self.kind.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, kind: TimerKind) {
        *self.kind.lock().unwrap_or_else(PoisonError::into_inner) = kind;
    }
}

/// Consumer of transition events which keeps the screen in sync with the
/// timers.
pub struct View {
    machine: StateMachine,
    screen: Arc<dyn Screen>,
    selection: Selection,
    refresher: Option<JoinHandle<()>>,
}

impl View {
    pub fn new(machine: StateMachine, screen: Arc<dyn Screen>, selection: Selection) -> Self {
        Self {
            machine,
            screen,
            selection,
            refresher: None,
        }
    }

    /// Spawn the consumer loop. It ends when the relay stops.
    pub fn spawn(self, events: Subscription) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }

    async fn run(mut self, mut events: Subscription) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        self.stop_refresher();
    }

    fn handle(&mut self, StateTransitionEvent { kind, new_state }: StateTransitionEvent) {
        self.stop_refresher();
        match new_state {
            TimerState::Active => {
                self.selection.set(kind);
                let machine = self.machine.clone();
                let screen = Arc::clone(&self.screen);
                self.refresher = Some(tokio::spawn(refresh(machine, screen, kind)));
            }
            TimerState::Paused => {
                self.screen.show(&Page::paused(&self.machine, kind, None));
            }
            TimerState::Finished => {
                let next = kind.other();
                self.selection.set(next);
                self.screen
                    .show(&Page::paused(&self.machine, next, Some(kind)));
            }
        }
    }

    fn stop_refresher(&mut self) {
        if let Some(refresher) = self.refresher.take() {
            refresher.abort();
        }
    }
}

impl Drop for View {
    fn drop(&mut self) {
        self.stop_refresher();
    }
}

/// Redraw the active page once per tick until aborted.
async fn refresh(machine: StateMachine, screen: Arc<dyn Screen>, kind: TimerKind) {
    let mut ticker = time::interval(TICK_INTERVAL);
    loop {
        ticker.tick().await;
        screen.show(&Page::active(&machine, kind));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use tokio::time::Duration;

    use crate::domain::entity::TimerDuration;
    use crate::domain::relay::EventRelay;
    use crate::domain::timer::TimerConfig;

    /// A [`Screen`] remembering every page it was asked to show.
    #[derive(Debug, Default)]
    pub struct RecordingScreen {
        pages: Mutex<Vec<Page>>,
    }

    impl RecordingScreen {
        pub fn pages(&self) -> Vec<Page> {
            self.pages.lock().unwrap().clone()
        }
    }

    impl Screen for RecordingScreen {
        fn show(&self, page: &Page) {
            self.pages.lock().unwrap().push(page.clone());
        }
    }

    #[test]
    fn selection_shared() {
        let selection = Selection::new(TimerKind::Focus);
        let other = selection.clone();
        other.set(TimerKind::Break);
        assert_eq!(selection.get(), TimerKind::Break);
    }

    #[tokio::test(start_paused = true)]
    async fn view_follows_transitions() {
        let (machine, screen, selection) = setup(3, 2, false);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(1500)).await;
        machine.set_state(TimerState::Paused, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(100)).await;

        let pages = screen.pages();
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages[0],
            Page::Active {
                kind: TimerKind::Focus,
                remaining: Some(Duration::from_secs(3)),
            }
        );
        assert!(pages[1].is_live());
        assert_eq!(
            pages[2],
            Page::Paused {
                kind: TimerKind::Focus,
                remaining: Duration::from_secs(2),
                after: None,
            }
        );
        assert_eq!(selection.get(), TimerKind::Focus);
    }

    #[tokio::test(start_paused = true)]
    async fn view_selects_other_kind_after_finish() {
        let (machine, screen, selection) = setup(2, 5, false);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(selection.get(), TimerKind::Break);
        assert_eq!(
            screen.pages().last(),
            Some(&Page::Paused {
                kind: TimerKind::Break,
                remaining: Duration::from_secs(5),
                after: Some(TimerKind::Focus),
            })
        );

        let count = screen.pages().len();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(screen.pages().len(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn view_stops_refreshing_when_aborted() {
        let config = TimerConfig {
            focus_duration: TimerDuration::try_new(10).unwrap(),
            break_duration: TimerDuration::try_new(2).unwrap(),
            hidden_focus_time: false,
        };
        let (publisher, mut relay) = EventRelay::new();
        let events = relay.subscribe();
        relay.spawn();
        let machine = StateMachine::new(config, publisher);
        let screen = Arc::new(RecordingScreen::default());
        let view = View::new(machine.clone(), screen.clone(), Selection::new(TimerKind::Focus))
            .spawn(events);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(1500)).await;
        view.abort();
        time::sleep(Duration::from_millis(100)).await;

        let count = screen.pages().len();
        assert!(count > 0);
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(screen.pages().len(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn view_hides_focus_time() {
        let (machine, screen, _) = setup(3, 2, true);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            screen.pages(),
            vec![Page::Active {
                kind: TimerKind::Focus,
                remaining: None,
            }]
        );
    }

    fn setup(
        focus: u64,
        brk: u64,
        hidden_focus_time: bool,
    ) -> (StateMachine, Arc<RecordingScreen>, Selection) {
        let config = TimerConfig {
            focus_duration: TimerDuration::try_new(focus).unwrap(),
            break_duration: TimerDuration::try_new(brk).unwrap(),
            hidden_focus_time,
        };
        let (publisher, mut relay) = EventRelay::new();
        let events = relay.subscribe();
        relay.spawn();

        let machine = StateMachine::new(config, publisher);
        let screen = Arc::new(RecordingScreen::default());
        let selection = Selection::new(TimerKind::Focus);
        View::new(machine.clone(), screen.clone(), selection.clone()).spawn(events);
        (machine, screen, selection)
    }
}
