use serde::{Deserialize, Serialize};

use crate::{LogEntry, Notification, Report};

use super::bus::{Bus, Topic};

/// Protocol Events
///
/// Row-carrying events include the row's server-assigned version;
/// subscribers reconcile last-writer-wins by that version, never by
/// arrival order.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum EventV1 {
    /// Multiple events
    Bulk { v: Vec<EventV1> },

    /// New report entered the queue
    ReportCreate(Report),

    /// Existing report changed
    ReportUpdate(Report),

    /// New notification for a recipient
    NotificationCreate(Notification),

    /// Notification retracted from a recipient
    NotificationDelete { id: String, recipient_id: String },

    /// New moderation log entry
    LogAppend(LogEntry),
}

impl EventV1 {
    /// Topic this event is delivered on
    pub fn topic(&self) -> Topic {
        match self {
            EventV1::Bulk { .. } => Topic::Reports,
            EventV1::ReportCreate(_) | EventV1::ReportUpdate(_) => Topic::Reports,
            EventV1::NotificationCreate(_) | EventV1::NotificationDelete { .. } => {
                Topic::Notifications
            }
            EventV1::LogAppend(_) => Topic::Logs,
        }
    }

    /// Publish helper wrapper
    pub fn p(self, bus: &Bus) {
        bus.publish(self);
    }
}
