use iso8601_timestamp::Timestamp;
use warden_models::v0::{NotificationKind, NotificationPriority};

auto_derived!(
    /// A delivery unit addressed to a single recipient
    pub struct Notification {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Id of the recipient
        pub recipient_id: String,
        /// What this notification is about
        pub kind: NotificationKind,
        /// Report this notification relates to
        #[serde(skip_serializing_if = "Option::is_none")]
        pub report_id: Option<String>,
        /// Whether the recipient has read this notification
        #[serde(skip_serializing_if = "crate::if_false", default)]
        pub read: bool,
        /// Delivery priority, derived from the report severity
        pub priority: NotificationPriority,
        /// When this notification was created
        pub created_at: Timestamp,
    }
);

impl Notification {
    pub fn new(
        recipient_id: String,
        kind: NotificationKind,
        report_id: Option<String>,
        priority: NotificationPriority,
    ) -> Notification {
        Notification {
            id: ulid::Ulid::new().to_string(),
            recipient_id,
            kind,
            report_id,
            read: false,
            priority,
            created_at: Timestamp::now_utc(),
        }
    }

    /// Key preventing duplicate fan-out of the same event to the
    /// same recipient
    pub fn dedup_key(&self) -> (Option<String>, String, NotificationKind) {
        (
            self.report_id.clone(),
            self.recipient_id.clone(),
            self.kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use warden_models::v0::{NotificationKind, NotificationPriority};
    use warden_result::ErrorType;

    use crate::Notification;

    fn queue_entry(recipient: &str, report: &str) -> Notification {
        Notification::new(
            recipient.to_string(),
            NotificationKind::ReportCreated,
            Some(report.to_string()),
            NotificationPriority::High,
        )
    }

    #[async_std::test]
    async fn create_is_idempotent_per_dedup_key() {
        database_test!(|db| async move {
            let batch = vec![
                queue_entry("01STAFF_A", "01REPORT"),
                queue_entry("01STAFF_B", "01REPORT"),
            ];

            let created = db.create_notifications(&batch).await.unwrap();
            assert_eq!(created.len(), 2);

            // Same recipients and kind again, fresh row ids: the dedup
            // key must swallow the whole batch.
            let retry = vec![
                queue_entry("01STAFF_A", "01REPORT"),
                queue_entry("01STAFF_B", "01REPORT"),
            ];
            let created = db.create_notifications(&retry).await.unwrap();
            assert!(created.is_empty());

            assert_eq!(
                db.fetch_notifications_for_report("01REPORT")
                    .await
                    .unwrap()
                    .len(),
                2
            );
        });
    }

    #[async_std::test]
    async fn retraction_spares_excepted_recipient() {
        database_test!(|db| async move {
            let batch = vec![
                queue_entry("01STAFF_A", "01REPORT"),
                queue_entry("01STAFF_B", "01REPORT"),
                queue_entry("01STAFF_C", "01REPORT"),
            ];
            db.create_notifications(&batch).await.unwrap();

            let removed = db
                .retract_notifications(
                    "01REPORT",
                    &[NotificationKind::ReportCreated],
                    Some("01STAFF_A"),
                    true,
                )
                .await
                .unwrap();
            assert_eq!(removed.len(), 2);

            // Repeating the retraction is a no-op
            let removed = db
                .retract_notifications(
                    "01REPORT",
                    &[NotificationKind::ReportCreated],
                    Some("01STAFF_A"),
                    true,
                )
                .await
                .unwrap();
            assert!(removed.is_empty());

            let remaining = db.fetch_notifications_for_report("01REPORT").await.unwrap();
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].recipient_id, "01STAFF_A");
        });
    }

    #[async_std::test]
    async fn read_rows_survive_unread_only_retraction() {
        database_test!(|db| async move {
            let batch = vec![
                queue_entry("01STAFF_A", "01REPORT"),
                queue_entry("01STAFF_B", "01REPORT"),
            ];
            let created = db.create_notifications(&batch).await.unwrap();

            let read_row = &created[0];
            db.mark_notification_read(&read_row.id, &read_row.recipient_id)
                .await
                .unwrap();

            let removed = db
                .retract_notifications(
                    "01REPORT",
                    &[NotificationKind::ReportCreated],
                    None,
                    true,
                )
                .await
                .unwrap();
            assert_eq!(removed.len(), 1);
            assert_ne!(removed[0].id, read_row.id);
        });
    }

    #[async_std::test]
    async fn mark_read_checks_recipient() {
        database_test!(|db| async move {
            let created = db
                .create_notifications(&[queue_entry("01STAFF_A", "01REPORT")])
                .await
                .unwrap();

            let error = db
                .mark_notification_read(&created[0].id, "01STAFF_B")
                .await
                .unwrap_err();
            assert!(matches!(error.error_type, ErrorType::NotFound));

            db.mark_notification_read(&created[0].id, "01STAFF_A")
                .await
                .unwrap();

            let rows = db.fetch_notifications("01STAFF_A").await.unwrap();
            assert!(rows[0].read);
        });
    }
}
