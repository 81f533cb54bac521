use super::{OverlayEvent, Topic};
use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    Stream, StreamExt,
};
use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    task::{Context, Poll},
};
use uuid::Uuid;

type Registry = HashMap<Topic, Vec<Subscriber>>;

#[derive(Debug)]
struct Subscriber {
    id: Uuid,
    sender: UnboundedSender<OverlayEvent>,
}

// Every registry update is a single push or retain, so a poisoned lock still guards a valid map.
fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process fanout of overlay events to everyone subscribed to a topic.
///
/// Delivery is at most once and in publish order. Nothing is kept for
/// subscribers that register later.
#[derive(Debug, Clone, Default)]
pub struct EventPublisher {
    registry: Arc<Mutex<Registry>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (sender, receiver) = mpsc::unbounded();
        let id = Uuid::new_v4();
        lock(&self.registry)
            .entry(topic)
            .or_default()
            .push(Subscriber { id, sender });
        log::debug!("Subscriber {} registered for {:?}", id, topic);
        Subscription {
            id,
            topic,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    pub fn publish(&self, event: OverlayEvent) {
        let topic = event.topic();
        let mut registry = lock(&self.registry);
        match registry.get_mut(&topic) {
            Some(subscribers) if !subscribers.is_empty() => {
                log::debug!("Publishing to {} subscribers: {:?}", subscribers.len(), event);
                subscribers.retain(|subscriber| {
                    let delivered = subscriber.sender.unbounded_send(event.clone()).is_ok();
                    if !delivered {
                        log::debug!("Pruning gone subscriber {}", subscriber.id);
                    }
                    delivered
                });
            }
            _ => log::trace!("No subscribers for {:?}, dropping {:?}", topic, event),
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        lock(&self.registry).get(&topic).map_or(0, Vec::len)
    }
}

/// A live registration, yielding every event published to its topic.
/// Dropping it unregisters.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    topic: Topic,
    receiver: UnboundedReceiver<OverlayEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl Stream for Subscription {
    type Item = OverlayEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Some(subscribers) = lock(&registry).get_mut(&self.topic) {
                subscribers.retain(|subscriber| subscriber.id != self.id);
            }
            log::debug!("Subscriber {} released {:?}", self.id, self.topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::{ChatMessage, RaidEvent};
    use futures::FutureExt;

    fn chat(message: &str) -> OverlayEvent {
        OverlayEvent::Chat(ChatMessage::new("Carkhy", message, None))
    }

    fn raid(viewers: u64) -> OverlayEvent {
        OverlayEvent::Raid(RaidEvent {
            username: "Carkhy".to_owned(),
            viewers,
        })
    }

    #[test]
    fn publishing_without_subscribers_is_a_noop() {
        let publisher = EventPublisher::new();
        publisher.publish(chat("nobody listens"));
        assert_eq!(publisher.subscriber_count(Topic::ChatMessage), 0);
    }

    #[tokio::test]
    async fn delivers_in_publish_order_to_every_subscriber() {
        let publisher = EventPublisher::new();
        let mut first = publisher.subscribe(Topic::ChatMessage);
        let mut second = publisher.subscribe(Topic::ChatMessage);
        publisher.publish(chat("one"));
        publisher.publish(chat("two"));
        for subscription in [&mut first, &mut second] {
            assert_eq!(subscription.next().await, Some(chat("one")));
            assert_eq!(subscription.next().await, Some(chat("two")));
        }
    }

    #[tokio::test]
    async fn topics_are_separate() {
        let publisher = EventPublisher::new();
        let mut chats = publisher.subscribe(Topic::ChatMessage);
        let mut raids = publisher.subscribe(Topic::Raid);
        publisher.publish(raid(12));
        assert_eq!(raids.next().await, Some(raid(12)));
        assert_eq!(chats.next().now_or_never(), None);
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let publisher = EventPublisher::new();
        publisher.publish(chat("early"));
        let mut subscription = publisher.subscribe(Topic::ChatMessage);
        publisher.publish(chat("late"));
        assert_eq!(subscription.next().await, Some(chat("late")));
        assert_eq!(subscription.next().now_or_never(), None);
    }

    #[tokio::test]
    async fn unsubscribing_stops_delivery() {
        let publisher = EventPublisher::new();
        let staying = publisher.subscribe(Topic::ChatMessage);
        let leaving = publisher.subscribe(Topic::ChatMessage);
        assert_eq!(publisher.subscriber_count(Topic::ChatMessage), 2);
        publisher.unsubscribe(leaving);
        assert_eq!(publisher.subscriber_count(Topic::ChatMessage), 1);
        drop(staying);
        assert_eq!(publisher.subscriber_count(Topic::ChatMessage), 0);
        publisher.publish(chat("gone"));
    }

    #[test]
    fn subscriptions_outliving_the_publisher_drop_cleanly() {
        let publisher = EventPublisher::new();
        let subscription = publisher.subscribe(Topic::Raid);
        drop(publisher);
        drop(subscription);
    }
}
