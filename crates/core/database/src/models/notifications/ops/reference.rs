use std::collections::HashSet;

use warden_models::v0::NotificationKind;
use warden_result::Result;

use crate::Notification;
use crate::ReferenceDb;

use super::AbstractNotifications;

#[async_trait]
impl AbstractNotifications for ReferenceDb {
    /// Insert notifications whose dedup key is not yet taken
    async fn create_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<Vec<Notification>> {
        let mut rows = self.notifications.lock().await;
        let mut taken: HashSet<_> = rows.values().map(Notification::dedup_key).collect();

        let mut created = vec![];
        for notification in notifications {
            if taken.insert(notification.dedup_key()) {
                rows.insert(notification.id.to_string(), notification.clone());
                created.push(notification.clone());
            }
        }

        Ok(created)
    }

    /// Fetch all notifications addressed to the given recipient
    async fn fetch_notifications(&self, recipient_id: &str) -> Result<Vec<Notification>> {
        let rows = self.notifications.lock().await;
        let mut notifications: Vec<Notification> = rows
            .values()
            .filter(|notification| notification.recipient_id == recipient_id)
            .cloned()
            .collect();

        notifications.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(notifications)
    }

    /// Fetch all notifications related to the given report
    async fn fetch_notifications_for_report(
        &self,
        report_id: &str,
    ) -> Result<Vec<Notification>> {
        let rows = self.notifications.lock().await;
        let mut notifications: Vec<Notification> = rows
            .values()
            .filter(|notification| notification.report_id.as_deref() == Some(report_id))
            .cloned()
            .collect();

        notifications.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(notifications)
    }

    /// Mark one of the recipient's notifications as read
    async fn mark_notification_read(
        &self,
        notification_id: &str,
        recipient_id: &str,
    ) -> Result<()> {
        let mut rows = self.notifications.lock().await;
        match rows.get_mut(notification_id) {
            Some(notification) if notification.recipient_id == recipient_id => {
                notification.read = true;
                Ok(())
            }
            _ => Err(create_error!(NotFound)),
        }
    }

    /// Remove matching notification rows
    async fn retract_notifications(
        &self,
        report_id: &str,
        kinds: &[NotificationKind],
        except_recipient: Option<&str>,
        only_unread: bool,
    ) -> Result<Vec<Notification>> {
        let mut rows = self.notifications.lock().await;
        let ids: Vec<String> = rows
            .values()
            .filter(|notification| {
                notification.report_id.as_deref() == Some(report_id)
                    && kinds.contains(&notification.kind)
                    && Some(notification.recipient_id.as_str()) != except_recipient
                    && (!only_unread || !notification.read)
            })
            .map(|notification| notification.id.to_string())
            .collect();

        let mut removed = vec![];
        for id in ids {
            if let Some(notification) = rows.remove(&id) {
                removed.push(notification);
            }
        }

        Ok(removed)
    }
}
