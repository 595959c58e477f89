use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tokio::time::Duration;

use crate::domain::entity::{StateTransitionEvent, TimerDuration, TimerKind, TimerState};
use crate::domain::relay::Publisher;
use crate::domain::timer::countdown::{Completion, CountdownTimer};

/// Settings the [`StateMachine`] is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub focus_duration: TimerDuration,
    pub break_duration: TimerDuration,
    pub hidden_focus_time: bool,
}

impl TimerConfig {
    /// Get the duration corresponding to the timer kind.
    pub fn duration(&self, kind: TimerKind) -> TimerDuration {
        match kind {
            TimerKind::Focus => self.focus_duration,
            TimerKind::Break => self.break_duration,
        }
    }
}

/// The single authority for what is happening now. Owns the focus and break
/// timers and publishes one [`StateTransitionEvent`] per accepted change.
///
/// Cloning gives another handle to the same machine.
#[derive(Debug, Clone)]
pub struct StateMachine {
    inner: Arc<StateMachineInner>,
}

#[derive(Debug)]
struct StateMachineInner {
    current: RwLock<TimerState>,
    transition: Mutex<()>,
    focus_timer: CountdownTimer,
    break_timer: CountdownTimer,
    publisher: Publisher,
    config: TimerConfig,
}

impl StateMachineInner {
    fn timer(&self, kind: TimerKind) -> &CountdownTimer {
        match kind {
            TimerKind::Focus => &self.focus_timer,
            TimerKind::Break => &self.break_timer,
        }
    }
}

impl StateMachine {
    /// Creates a new [`StateMachine`] in the [`TimerState::Paused`] state.
    pub fn new(config: TimerConfig, publisher: Publisher) -> Self {
        let inner = StateMachineInner {
            current: RwLock::new(TimerState::default()),
            transition: Mutex::new(()),
            focus_timer: CountdownTimer::new(TimerKind::Focus, config.focus_duration.inner()),
            break_timer: CountdownTimer::new(TimerKind::Break, config.break_duration.inner()),
            publisher,
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn current_state(&self) -> TimerState {
        *self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn time_remaining(&self, kind: TimerKind) -> Duration {
        self.inner.timer(kind).remaining()
    }

    pub fn is_focus_time_hidden(&self) -> bool {
        self.inner.config.hidden_focus_time
    }

    /// Move to `state` and apply it to the timer of `kind`.
    ///
    /// Requesting the current state does nothing. Otherwise the transition
    /// event is handed to the relay before the timer is touched, so consumers
    /// always see a transition before its effects. Transitions never
    /// overlap: a second caller waits until the first one returns.
    ///
    /// Event consumers must not await this method from inside their event
    /// handling, as the relay would wait for them while they wait for the
    /// relay.
    pub async fn set_state(&self, state: TimerState, kind: TimerKind) {
        let _transition = self.inner.transition.lock().await;

        {
            let mut current = self
                .inner
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if *current == state {
                tracing::trace!(%kind, %state, "Ignored transition to the current state");
                return;
            }
            *current = state;
        }

        let event = StateTransitionEvent::new(kind, state);
        if let Err(err) = self.inner.publisher.publish(event).await {
            crate::tracing_report!(err);
        }

        let timer = self.inner.timer(kind);
        match state {
            TimerState::Active => {
                let completion = timer.start();
                self.supervise(kind, completion);
            }
            TimerState::Paused => timer.stop(),
            TimerState::Finished => {
                timer.stop();
                timer.reset(self.inner.config.duration(kind).inner());
            }
        }
    }

    /// Turn the natural expiry of a countdown into a transition to
    /// [`TimerState::Finished`]. The watcher is its own task, so its call to
    /// [`StateMachine::set_state`] simply queues behind the transition that
    /// started the timer.
    fn supervise(&self, kind: TimerKind, completion: Completion) {
        let machine = self.clone();
        tokio::spawn(async move {
            if completion.finished().await {
                tracing::info!(%kind, "Timer ran out");
                machine.set_state(TimerState::Finished, kind).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex as StdMutex;

    use tokio::time;

    use crate::domain::relay::{EventRelay, Subscription};

    #[tokio::test(start_paused = true)]
    async fn machine_initial_state() {
        let (machine, _) = new_machine(10, 3);
        assert_eq!(machine.current_state(), TimerState::Paused);
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(10));
        assert_eq!(machine.time_remaining(TimerKind::Break), Duration::from_secs(3));
        assert!(!machine.is_focus_time_hidden());
    }

    #[tokio::test(start_paused = true)]
    async fn machine_set_state_publishes_event() {
        let (machine, events) = new_machine(10, 3);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        assert_eq!(machine.current_state(), TimerState::Active);

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(9));
        assert_eq!(machine.time_remaining(TimerKind::Break), Duration::from_secs(3));
        assert_eq!(
            *events.lock().unwrap(),
            vec![StateTransitionEvent::new(TimerKind::Focus, TimerState::Active)],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn machine_ignores_current_state() {
        let (machine, events) = new_machine(10, 3);

        machine.set_state(TimerState::Paused, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(1500)).await;
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(10));

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        machine.set_state(TimerState::Active, TimerKind::Break).await;
        time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(9));
        assert_eq!(machine.time_remaining(TimerKind::Break), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn machine_pause_stops_timer() {
        let (machine, _) = new_machine(10, 3);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(1500)).await;
        machine.set_state(TimerState::Paused, TimerKind::Focus).await;
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(machine.current_state(), TimerState::Paused);
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn machine_finish_resets_timer() {
        let (machine, _) = new_machine(10, 3);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(7));

        machine.set_state(TimerState::Finished, TimerKind::Focus).await;
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(machine.current_state(), TimerState::Finished);
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn machine_completion_triggers_finished() {
        let (machine, events) = new_machine(2, 3);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(machine.current_state(), TimerState::Finished);
        assert_eq!(machine.time_remaining(TimerKind::Focus), Duration::from_secs(2));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                StateTransitionEvent::new(TimerKind::Focus, TimerState::Active),
                StateTransitionEvent::new(TimerKind::Focus, TimerState::Finished),
            ],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn machine_paused_timer_never_finishes() {
        let (machine, events) = new_machine(2, 3);

        machine.set_state(TimerState::Active, TimerKind::Break).await;
        time::sleep(Duration::from_millis(500)).await;
        machine.set_state(TimerState::Paused, TimerKind::Break).await;
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(machine.current_state(), TimerState::Paused);
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn machine_events_reach_every_consumer_in_order() {
        let config = new_config(2, 1);
        let (publisher, mut relay) = EventRelay::new();
        let first = relay.subscribe();
        let second = relay.subscribe();
        relay.spawn();
        let machine = StateMachine::new(config, publisher);
        let first = collect(first);
        let second = collect(second);

        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(500)).await;
        machine.set_state(TimerState::Paused, TimerKind::Focus).await;
        machine.set_state(TimerState::Active, TimerKind::Focus).await;
        time::sleep(Duration::from_millis(2500)).await;
        machine.set_state(TimerState::Active, TimerKind::Break).await;
        time::sleep(Duration::from_millis(1500)).await;

        let expected = vec![
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Active),
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Paused),
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Active),
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Finished),
            StateTransitionEvent::new(TimerKind::Break, TimerState::Active),
            StateTransitionEvent::new(TimerKind::Break, TimerState::Finished),
        ];
        assert_eq!(*first.lock().unwrap(), expected);
        assert_eq!(*second.lock().unwrap(), expected);
    }

    fn new_config(focus: u64, brk: u64) -> TimerConfig {
        TimerConfig {
            focus_duration: TimerDuration::try_new(focus).unwrap(),
            break_duration: TimerDuration::try_new(brk).unwrap(),
            hidden_focus_time: false,
        }
    }

    fn new_machine(
        focus: u64,
        brk: u64,
    ) -> (StateMachine, Arc<StdMutex<Vec<StateTransitionEvent>>>) {
        let (publisher, mut relay) = EventRelay::new();
        let events = collect(relay.subscribe());
        relay.spawn();
        (StateMachine::new(new_config(focus, brk), publisher), events)
    }

    fn collect(mut subscription: Subscription) -> Arc<StdMutex<Vec<StateTransitionEvent>>> {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                sink.lock().unwrap().push(event);
            }
        });
        events
    }
}
