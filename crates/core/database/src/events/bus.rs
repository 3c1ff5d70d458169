use tokio::sync::broadcast;

use super::client::EventV1;

/// Buffer used when no capacity has been configured
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Topics carried by the realtime bus
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Topic {
    Reports,
    Notifications,
    Logs,
}

database_derived!(
    /// In-process realtime bus
    ///
    /// Delivery is at-most-once with no backlog: a subscriber that
    /// falls more than the channel capacity behind loses events and
    /// must resync with a full listing.
    pub struct Bus {
        reports: broadcast::Sender<EventV1>,
        notifications: broadcast::Sender<EventV1>,
        logs: broadcast::Sender<EventV1>,
    }
);

impl Bus {
    pub fn new(capacity: usize) -> Bus {
        let (reports, _) = broadcast::channel(capacity);
        let (notifications, _) = broadcast::channel(capacity);
        let (logs, _) = broadcast::channel(capacity);

        Bus {
            reports,
            notifications,
            logs,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<EventV1> {
        match topic {
            Topic::Reports => &self.reports,
            Topic::Notifications => &self.notifications,
            Topic::Logs => &self.logs,
        }
    }

    /// Publish an event to its topic, fire-and-forget
    ///
    /// Nothing blocks waiting on subscriber acknowledgement; an event
    /// with no listeners is dropped.
    pub fn publish(&self, event: EventV1) {
        let topic = event.topic();

        debug!("Publishing event to {topic:?}: {event:?}");
        if self.sender(topic).send(event).is_err() {
            debug!("No subscribers on {topic:?}, event dropped");
        }
    }

    /// Subscribe to a topic from this point onward; there is no replay
    /// of earlier events
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EventV1> {
        self.sender(topic).subscribe()
    }
}

impl Default for Bus {
    fn default() -> Bus {
        Bus::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
