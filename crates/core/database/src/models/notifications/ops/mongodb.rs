use bson::{Bson, Document};
use warden_models::v0::NotificationKind;
use warden_result::Result;

use crate::MongoDb;
use crate::Notification;

use super::AbstractNotifications;

static COL: &str = "notifications";

fn kind_tag(kind: &NotificationKind) -> String {
    format!("{kind:?}")
}

#[async_trait]
impl AbstractNotifications for MongoDb {
    /// Insert notifications whose dedup key is not yet taken
    ///
    /// Upserting on the dedup key makes retried fan-out a no-op for
    /// rows that already landed.
    async fn create_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<Vec<Notification>> {
        let mut created = vec![];

        for notification in notifications {
            let mut filter = doc! {
                "recipient_id": &notification.recipient_id,
                "kind": kind_tag(&notification.kind),
            };

            match &notification.report_id {
                Some(report_id) => filter.insert("report_id", report_id),
                None => filter.insert("report_id", Bson::Null),
            };

            let document = bson::to_document(notification)
                .map_err(|_| create_error!(InternalError))?;

            let result = self
                .col::<Document>(COL)
                .update_one(
                    filter,
                    doc! {
                        "$setOnInsert": document
                    },
                )
                .upsert(true)
                .await
                .map_err(|_| create_database_error!("update_one", COL))?;

            if result.upserted_id.is_some() {
                created.push(notification.clone());
            }
        }

        Ok(created)
    }

    /// Fetch all notifications addressed to the given recipient
    async fn fetch_notifications(&self, recipient_id: &str) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = query!(
            self,
            find,
            COL,
            doc! {
                "recipient_id": recipient_id
            }
        )?;

        notifications.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(notifications)
    }

    /// Fetch all notifications related to the given report
    async fn fetch_notifications_for_report(
        &self,
        report_id: &str,
    ) -> Result<Vec<Notification>> {
        query!(
            self,
            find,
            COL,
            doc! {
                "report_id": report_id
            }
        )
    }

    /// Mark one of the recipient's notifications as read
    async fn mark_notification_read(
        &self,
        notification_id: &str,
        recipient_id: &str,
    ) -> Result<()> {
        let result = self
            .col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": notification_id,
                    "recipient_id": recipient_id
                },
                doc! {
                    "$set": {
                        "read": true
                    }
                },
            )
            .await
            .map_err(|_| create_database_error!("update_one", COL))?;

        if result.matched_count == 0 {
            Err(create_error!(NotFound))
        } else {
            Ok(())
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
        let mut filter = doc! {
            "report_id": report_id,
            "kind": {
                "$in": kinds.iter().map(kind_tag).collect::<Vec<String>>()
            }
        };

        if let Some(recipient_id) = except_recipient {
            filter.insert("recipient_id", doc! { "$ne": recipient_id });
        }

        if only_unread {
            // Unread rows omit the field entirely
            filter.insert("read", doc! { "$ne": true });
        }

        let removed: Vec<Notification> = query!(self, find, COL, filter)?;

        self.delete_many(
            COL,
            doc! {
                "_id": {
                    "$in": removed
                        .iter()
                        .map(|notification| notification.id.as_str())
                        .collect::<Vec<&str>>()
                }
            },
        )
        .await
        .map_err(|_| create_database_error!("delete_many", COL))?;

        Ok(removed)
    }
}
