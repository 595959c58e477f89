use snafu::prelude::*;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::entity::StateTransitionEvent;

/// An event together with the acknowledgement sent back as soon as the
/// receiving side takes it. Used on both hops of the relay, so neither the
/// publisher nor the relay ever runs ahead of the side it hands events to.
#[derive(Debug)]
struct Envelope {
    event: StateTransitionEvent,
    accepted: oneshot::Sender<()>,
}

impl Envelope {
    fn new(event: StateTransitionEvent) -> (Self, oneshot::Receiver<()>) {
        let (accepted, acceptance) = oneshot::channel();
        (Self { event, accepted }, acceptance)
    }

    /// Acknowledge and unwrap the event.
    fn open(self) -> StateTransitionEvent {
        let _ = self.accepted.send(());
        self.event
    }
}

/// Producer side of an [`EventRelay`].
#[derive(Debug, Clone)]
pub struct Publisher {
    sender: Sender<Envelope>,
}

impl Publisher {
    /// Hand an event over to the relay. Returns once the relay has taken it,
    /// which is only after every consumer got the previous event.
    ///
    /// # Errors
    ///
    /// This function will return an error if the relay is no longer running.
    pub async fn publish(&self, event: StateTransitionEvent) -> Result<(), PublishError> {
        let (envelope, acceptance) = Envelope::new(event);
        self.sender
            .send(envelope)
            .await
            .map_err(|_| ClosedSnafu { event }.build())?;
        acceptance.await.map_err(|_| ClosedSnafu { event }.build())
    }
}

/// Consumer side of an [`EventRelay`]. Events arrive in publishing order.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<Envelope>,
}

impl Subscription {
    /// Receive the next event, or `None` once the relay stopped. Receiving
    /// releases the relay to hand the event to the next consumer.
    pub async fn recv(&mut self) -> Option<StateTransitionEvent> {
        self.receiver.recv().await.map(Envelope::open)
    }
}

/// Forwards every published event to all subscribers, one subscriber after
/// another in subscription order. Each hand-off completes only once the
/// receiving side has taken the event.
#[derive(Debug)]
pub struct EventRelay {
    source: Receiver<Envelope>,
    consumers: Vec<Sender<Envelope>>,
}

impl EventRelay {
    /// Creates a new [`EventRelay`] and the [`Publisher`] feeding it.
    pub fn new() -> (Publisher, Self) {
        let (sender, source) = mpsc::channel(1);
        let relay = Self {
            source,
            consumers: Vec::new(),
        };
        (Publisher { sender }, relay)
    }

    /// Register a consumer. Consumers registered earlier receive each event
    /// earlier.
    pub fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = mpsc::channel(1);
        self.consumers.push(sender);
        Subscription { receiver }
    }

    /// Spawn the relay loop on background. The loop ends when every
    /// [`Publisher`] has been dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        while let Some(envelope) = self.source.recv().await {
            let event = envelope.open();
            tracing::debug!(kind = %event.kind, state = %event.new_state, "Relaying transition");
            self.forward(event).await;
        }
        tracing::debug!("All publishers closed, relay stopped");
    }

    async fn forward(&mut self, event: StateTransitionEvent) {
        let mut index = 0;
        while index < self.consumers.len() {
            let (envelope, acceptance) = Envelope::new(event);
            let delivered = self.consumers[index].send(envelope).await.is_ok()
                && acceptance.await.is_ok();
            if delivered {
                index += 1;
            } else {
                tracing::warn!(index, "Consumer went away, removing it from the relay");
                self.consumers.remove(index);
            }
        }
    }
}

/// An error type of publishing an event.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PublishError {
    #[snafu(display("Could not publish {event:?} to a stopped relay"))]
    Closed { event: StateTransitionEvent },
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::time::{self, Duration};

    use crate::domain::entity::{TimerKind, TimerState};

    #[tokio::test]
    async fn relay_preserves_order_for_every_consumer() {
        let (publisher, mut relay) = EventRelay::new();
        let first = relay.subscribe();
        let second = relay.subscribe();
        relay.spawn();

        let first = tokio::spawn(collect(first));
        let second = tokio::spawn(collect(second));

        let events = sample_events();
        for event in events.iter().copied() {
            publisher.publish(event).await.unwrap();
        }
        drop(publisher);

        assert_eq!(first.await.unwrap(), events);
        assert_eq!(second.await.unwrap(), events);
    }

    #[tokio::test(start_paused = true)]
    async fn relay_backpressure_from_slow_consumer() {
        let (publisher, mut relay) = EventRelay::new();
        let mut consumer = relay.subscribe();
        relay.spawn();

        let events = sample_events();
        publisher.publish(events[0]).await.unwrap();

        let blocked = time::timeout(Duration::from_secs(1), publisher.publish(events[1])).await;
        assert!(blocked.is_err());

        assert_eq!(consumer.recv().await, Some(events[0]));
        assert_eq!(consumer.recv().await, Some(events[1]));
        publisher.publish(events[2]).await.unwrap();
        assert_eq!(consumer.recv().await, Some(events[2]));
    }

    #[tokio::test(start_paused = true)]
    async fn relay_waits_for_earlier_consumer() {
        let (publisher, mut relay) = EventRelay::new();
        let mut first = relay.subscribe();
        let mut second = relay.subscribe();
        relay.spawn();

        let event = sample_events()[0];
        publisher.publish(event).await.unwrap();

        let early = time::timeout(Duration::from_secs(1), second.recv()).await;
        assert!(early.is_err());

        assert_eq!(first.recv().await, Some(event));
        assert_eq!(second.recv().await, Some(event));
    }

    #[tokio::test]
    async fn relay_drops_closed_consumer() {
        let (publisher, mut relay) = EventRelay::new();
        let closed = relay.subscribe();
        let mut open = relay.subscribe();
        relay.spawn();
        drop(closed);

        let event = sample_events()[0];
        publisher.publish(event).await.unwrap();
        assert_eq!(open.recv().await, Some(event));
    }

    #[tokio::test]
    async fn relay_stops_with_publisher() {
        let (publisher, mut relay) = EventRelay::new();
        let mut consumer = relay.subscribe();
        let handle = relay.spawn();

        drop(publisher);
        handle.await.unwrap();
        assert_eq!(consumer.recv().await, None);
    }

    #[tokio::test]
    async fn publish_to_stopped_relay() {
        let (publisher, relay) = EventRelay::new();
        drop(relay);

        let event = sample_events()[0];
        assert!(matches!(
            publisher.publish(event).await,
            Err(PublishError::Closed { .. })
        ));
    }

    async fn collect(mut subscription: Subscription) -> Vec<StateTransitionEvent> {
        let mut events = Vec::new();
        while let Some(event) = subscription.recv().await {
            events.push(event);
        }
        events
    }

    fn sample_events() -> Vec<StateTransitionEvent> {
        vec![
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Active),
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Paused),
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Active),
            StateTransitionEvent::new(TimerKind::Focus, TimerState::Finished),
            StateTransitionEvent::new(TimerKind::Break, TimerState::Active),
        ]
    }
}
