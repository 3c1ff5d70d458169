use super::ReportSeverity;

auto_derived!(
    /// What a notification is informing its recipient about
    #[derive(Copy, Hash)]
    pub enum NotificationKind {
        /// A new report is waiting for triage
        ReportCreated,
        /// A report was claimed by a moderator
        ReportClaimed,
        /// A report was actioned and closed
        ReportResolved,
        /// A report was closed without action
        ReportDismissed,
        /// Receipt for a submitted report
        SubmissionAck,
    }

    /// Delivery priority of a notification
    #[derive(Copy, Hash)]
    pub enum NotificationPriority {
        Low,
        Normal,
        High,
        Urgent,
    }
);

impl From<ReportSeverity> for NotificationPriority {
    fn from(severity: ReportSeverity) -> NotificationPriority {
        match severity {
            ReportSeverity::Low => NotificationPriority::Low,
            ReportSeverity::Medium => NotificationPriority::Normal,
            ReportSeverity::High => NotificationPriority::High,
            ReportSeverity::Critical => NotificationPriority::Urgent,
        }
    }
}
