use warden_database::events::client::EventV1;
use warden_database::{actions, LogEntry, Notification, Report};
use warden_models::v0::{NotificationKind, NotificationPriority, ReportStatus};
use warden_result::Result;

use crate::Moderation;

impl Moderation {
    /// Notify all active staff of a fresh report and acknowledge the
    /// reporter
    ///
    /// Creation is keyed by (report, recipient, kind), so re-running
    /// this after a partial failure never duplicates rows.
    pub(crate) async fn on_created(&self, report: &Report) -> Result<()> {
        // Recomputed on every fan-out; membership may have changed
        // since the previous report.
        let roster = self.roster.staff_roster().await?;
        let priority = NotificationPriority::from(report.severity);

        let mut batch: Vec<Notification> = roster
            .into_iter()
            .filter(|member| member != &report.author_id)
            .map(|member| {
                Notification::new(
                    member,
                    NotificationKind::ReportCreated,
                    Some(report.id.to_string()),
                    priority,
                )
            })
            .collect();

        batch.push(Notification::new(
            report.author_id.to_string(),
            NotificationKind::SubmissionAck,
            Some(report.id.to_string()),
            priority,
        ));

        for notification in self.db.create_notifications(&batch).await? {
            EventV1::NotificationCreate(notification).p(&self.bus);
        }

        Ok(())
    }

    /// Retract queue entries other staff no longer need to act on and
    /// tell the reporter their report is being handled
    ///
    /// The claimant's own notification is never touched.
    pub(crate) async fn on_claimed(&self, report: &Report) -> Result<()> {
        let claimant = report
            .handled_by
            .as_deref()
            .ok_or_else(|| create_error!(InternalError))?;

        let removed = self
            .db
            .retract_notifications(
                &report.id,
                &[NotificationKind::ReportCreated],
                Some(claimant),
                true,
            )
            .await?;

        for notification in removed {
            EventV1::NotificationDelete {
                id: notification.id,
                recipient_id: notification.recipient_id,
            }
            .p(&self.bus);
        }

        let created = self
            .db
            .create_notifications(&[Notification::new(
                report.author_id.to_string(),
                NotificationKind::ReportClaimed,
                Some(report.id.to_string()),
                NotificationPriority::from(report.severity),
            )])
            .await?;

        for notification in created {
            EventV1::NotificationCreate(notification).p(&self.bus);
        }

        Ok(())
    }

    /// Tell the reporter how their report was closed and pull the
    /// remaining queue entries for all staff
    pub(crate) async fn on_resolved(&self, report: &Report) -> Result<()> {
        let kind = match report.status {
            ReportStatus::Dismissed => NotificationKind::ReportDismissed,
            _ => NotificationKind::ReportResolved,
        };

        let created = self
            .db
            .create_notifications(&[Notification::new(
                report.author_id.to_string(),
                kind,
                Some(report.id.to_string()),
                NotificationPriority::from(report.severity),
            )])
            .await?;

        for notification in created {
            EventV1::NotificationCreate(notification).p(&self.bus);
        }

        let removed = self
            .db
            .retract_notifications(
                &report.id,
                &[
                    NotificationKind::ReportCreated,
                    NotificationKind::ReportClaimed,
                ],
                Some(report.author_id.as_str()),
                false,
            )
            .await?;

        for notification in removed {
            EventV1::NotificationDelete {
                id: notification.id,
                recipient_id: notification.recipient_id,
            }
            .p(&self.bus);
        }

        Ok(())
    }

    /// Re-run fan-out for a report whose delivery partially failed
    ///
    /// Used by the reconciliation sweep; safe to repeat for any report
    /// since creation and retraction are both idempotent.
    pub async fn retry_fanout(&self, report_id: &str) -> Result<()> {
        let report = self.db.fetch_report(report_id).await?;

        match report.status {
            ReportStatus::Pending => self.on_created(&report).await?,
            ReportStatus::InProgress => self.on_claimed(&report).await?,
            ReportStatus::Resolved | ReportStatus::Dismissed => {
                self.on_resolved(&report).await?
            }
        }

        let entry = LogEntry::new(
            "system",
            actions::FANOUT_RETRY,
            Some(&report.id),
            None,
            "",
        );
        self.db.insert_log_entry(&entry).await?;
        EventV1::LogAppend(entry).p(&self.bus);

        Ok(())
    }
}
