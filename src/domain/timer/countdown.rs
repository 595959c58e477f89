use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::oneshot::{self, Receiver, Sender};
use tokio::time::{self, Duration, Instant};

use crate::domain::entity::TimerKind;

/// Interval between two ticks of a running [`CountdownTimer`].
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A single countdown which ticks on background once per [`TICK_INTERVAL`].
#[derive(Debug)]
pub struct CountdownTimer {
    kind: TimerKind,
    remaining: Arc<RwLock<Duration>>,
    stop_signal: Mutex<Option<Sender<()>>>,
}

impl CountdownTimer {
    /// Creates a new stopped [`CountdownTimer`].
    pub fn new(kind: TimerKind, duration: Duration) -> Self {
        Self {
            kind,
            remaining: Arc::new(RwLock::new(duration)),
            stop_signal: Mutex::new(None),
        }
    }

    /// Spawn the ticking loop. The returned [`Completion`] fires once the
    /// remaining duration reaches zero, and is abandoned if the timer is
    /// stopped first.
    ///
    /// Starting a running timer cancels its previous loop.
    pub fn start(&self) -> Completion {
        let (stop_sender, stop_receiver) = oneshot::channel();
        let (done_sender, done_receiver) = oneshot::channel();

        let previous = self
            .stop_signal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(stop_sender);
        drop(previous);

        let remaining = Arc::clone(&self.remaining);
        tokio::spawn(run(self.kind, remaining, stop_receiver, done_sender));

        Completion {
            receiver: done_receiver,
        }
    }

    /// Ask the ticking loop to exit before its next tick. Does nothing if the
    /// timer is not running.
    pub fn stop(&self) {
        let signal = self
            .stop_signal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(signal) = signal {
            let _ = signal.send(());
        }
    }

    /// Set the remaining duration.
    pub fn reset(&self, duration: Duration) {
        *self.remaining.write().unwrap_or_else(PoisonError::into_inner) = duration;
    }

    /// Get a snapshot of the remaining duration.
    pub fn remaining(&self) -> Duration {
        *self.remaining.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Signal returned by [`CountdownTimer::start`].
#[derive(Debug)]
pub struct Completion {
    receiver: Receiver<()>,
}

impl Completion {
    /// Wait until the countdown finishes. Returns `false` if it was stopped
    /// before reaching zero.
    pub async fn finished(self) -> bool {
        self.receiver.await.is_ok()
    }
}

async fn run(
    kind: TimerKind,
    remaining: Arc<RwLock<Duration>>,
    mut stop: Receiver<()>,
    done: Sender<()>,
) {
    let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

    loop {
        tokio::select! {
            biased;
            // A dropped sender means another loop took over this timer.
            _ = &mut stop => {
                tracing::trace!(%kind, "Countdown stopped");
                return;
            }
            _ = ticker.tick() => {
                if tick(&remaining, TICK_INTERVAL).is_zero() {
                    tracing::debug!(%kind, "Countdown reached zero");
                    let _ = done.send(());
                    return;
                }
            }
        }
    }
}

/// Subtract `delta` from the remaining duration, floored at zero, and return
/// the new value.
fn tick(remaining: &RwLock<Duration>, delta: Duration) -> Duration {
    let mut remaining = remaining.write().unwrap_or_else(PoisonError::into_inner);
    *remaining = remaining.saturating_sub(delta);
    *remaining
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_tick() {
        let remaining = RwLock::new(Duration::from_secs(5));
        assert_eq!(tick(&remaining, Duration::from_secs(1)), Duration::from_secs(4));
        assert_eq!(tick(&remaining, Duration::from_secs(5)), Duration::ZERO);
        assert_eq!(tick(&remaining, Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn timer_reset() {
        let timer = CountdownTimer::new(TimerKind::Focus, Duration::from_secs(10));
        assert_eq!(timer.remaining(), Duration::from_secs(10));
        timer.reset(Duration::from_secs(5));
        assert_eq!(timer.remaining(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_run_to_completion() {
        let timer = CountdownTimer::new(TimerKind::Focus, Duration::from_secs(3));
        let start = Instant::now();
        let completion = timer.start();

        assert!(completion.finished().await);
        assert_eq!(Instant::now() - start, Duration::from_secs(3));
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_remaining_is_monotonic() {
        let timer = CountdownTimer::new(TimerKind::Break, Duration::from_secs(4));
        let _completion = timer.start();

        let mut last = timer.remaining();
        for _ in 0..8 {
            time::sleep(Duration::from_millis(700)).await;
            let now = timer.remaining();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_stop() {
        let timer = CountdownTimer::new(TimerKind::Focus, Duration::from_secs(3));
        let completion = timer.start();

        time::sleep(Duration::from_millis(1500)).await;
        timer.stop();
        let remaining = timer.remaining();
        assert_eq!(remaining, Duration::from_secs(2));

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(timer.remaining(), remaining);
        assert!(!completion.finished().await);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_stop_when_not_running() {
        let timer = CountdownTimer::new(TimerKind::Focus, Duration::from_secs(3));
        timer.stop();
        timer.stop();

        let completion = timer.start();
        assert!(completion.finished().await);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_restart_cancels_previous_loop() {
        let timer = CountdownTimer::new(TimerKind::Focus, Duration::from_secs(10));
        let first = timer.start();
        let second = timer.start();

        assert!(!first.finished().await);
        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(timer.remaining(), Duration::from_secs(8));

        timer.stop();
        assert!(!second.finished().await);
    }
}
