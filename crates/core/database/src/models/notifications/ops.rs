use warden_models::v0::NotificationKind;
use warden_result::Result;

use crate::Notification;

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractNotifications: Sync + Send {
    /// Insert the given notifications, skipping any whose dedup key
    /// (report, recipient, kind) already has a row. Returns the rows
    /// actually created, so the call is safe to repeat.
    async fn create_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<Vec<Notification>>;

    /// Fetch all notifications addressed to the given recipient,
    /// newest first
    async fn fetch_notifications(&self, recipient_id: &str) -> Result<Vec<Notification>>;

    /// Fetch all notifications related to the given report
    async fn fetch_notifications_for_report(&self, report_id: &str)
        -> Result<Vec<Notification>>;

    /// Mark one of the recipient's notifications as read
    async fn mark_notification_read(
        &self,
        notification_id: &str,
        recipient_id: &str,
    ) -> Result<()>;

    /// Remove notifications of the given kinds about a report,
    /// leaving `except_recipient`'s rows untouched. With `only_unread`,
    /// rows already read survive retraction. Returns the removed rows;
    /// safe to repeat.
    async fn retract_notifications(
        &self,
        report_id: &str,
        kinds: &[NotificationKind],
        except_recipient: Option<&str>,
        only_unread: bool,
    ) -> Result<Vec<Notification>>;
}
