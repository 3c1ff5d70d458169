//! Moderation report lifecycle engine
//!
//! Composes the report store, notification fan-out, realtime bus and
//! moderation log behind a single API surface for the UI and bot
//! layers. Any number of staff sessions may drive this concurrently;
//! the only point of required atomicity is the store's guarded update.

#[macro_use]
extern crate async_trait;

#[macro_use]
extern crate log;

#[macro_use]
extern crate warden_result;

use std::sync::Arc;

use tokio::sync::broadcast;

use warden_config::config;
use warden_database::events::bus::{Bus, Topic};
use warden_database::events::client::EventV1;
use warden_database::{Database, LogEntry, Notification};
use warden_models::v0::{Actor, LogQuery, ReportQuery};
use warden_result::Result;

pub mod analytics;
pub mod evidence;
pub mod roster;
pub mod sweep;

mod coordinator;
mod fanout;

pub use coordinator::BulkEntry;

use evidence::AbstractEvidenceStore;
use roster::AbstractRoster;
use warden_database::Report;

/// The report lifecycle engine
#[derive(Clone)]
pub struct Moderation {
    pub db: Database,
    pub bus: Bus,
    pub roster: Arc<dyn AbstractRoster>,
    pub evidence: Arc<dyn AbstractEvidenceStore>,
}

impl Moderation {
    /// Construct the engine with injected collaborators
    pub async fn new(
        db: Database,
        roster: Arc<dyn AbstractRoster>,
        evidence: Arc<dyn AbstractEvidenceStore>,
    ) -> Moderation {
        let config = config().await;

        Moderation {
            db,
            bus: Bus::new(config.events.channel_capacity),
            roster,
            evidence,
        }
    }

    /// Construct the engine around an existing bus
    pub fn with_bus(
        db: Database,
        bus: Bus,
        roster: Arc<dyn AbstractRoster>,
        evidence: Arc<dyn AbstractEvidenceStore>,
    ) -> Moderation {
        Moderation {
            db,
            bus,
            roster,
            evidence,
        }
    }

    /// Subscribe to live updates on a topic
    ///
    /// No backlog is replayed; a client reconnecting after a gap must
    /// resync with a full listing instead of trusting buffered events.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EventV1> {
        self.bus.subscribe(topic)
    }

    /// List reports matching the filter (staff only)
    pub async fn list_reports(&self, actor: &Actor, query: &ReportQuery) -> Result<Vec<Report>> {
        if !actor.is_staff() {
            return Err(create_error!(NotPrivileged));
        }

        self.db.fetch_reports(query).await
    }

    /// Fetch the caller's notifications, newest first
    pub async fn list_notifications(&self, actor: &Actor) -> Result<Vec<Notification>> {
        self.db.fetch_notifications(&actor.id).await
    }

    /// Mark one of the caller's notifications as read
    pub async fn ack_notification(&self, actor: &Actor, notification_id: &str) -> Result<()> {
        self.db
            .mark_notification_read(notification_id, &actor.id)
            .await
    }

    /// Read back the audit trail (staff only)
    pub async fn list_log_entries(
        &self,
        actor: &Actor,
        query: &LogQuery,
    ) -> Result<Vec<LogEntry>> {
        if !actor.is_staff() {
            return Err(create_error!(NotPrivileged));
        }

        self.db.fetch_log_entries(query).await
    }
}
