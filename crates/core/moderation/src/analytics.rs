use warden_database::Database;
use warden_models::v0::{Actor, LogQuery, ModerationStats, ReportQuery, StatsWindow};
use warden_result::Result;

use crate::Moderation;

impl Moderation {
    /// Compute on-demand projections over a time window (staff only)
    ///
    /// Nothing is materialized; each call recomputes from the store
    /// and the moderation log. Callers wanting a live dashboard should
    /// subscribe to the `reports`/`logs` topics and recompute.
    pub async fn stats(&self, actor: &Actor, window: &StatsWindow) -> Result<ModerationStats> {
        if !actor.is_staff() {
            return Err(create_error!(NotPrivileged));
        }

        compute(&self.db, window).await
    }
}

async fn compute(db: &Database, window: &StatsWindow) -> Result<ModerationStats> {
    let reports = db
        .fetch_reports(&ReportQuery {
            created_after: window.after,
            created_before: window.before,
            ..Default::default()
        })
        .await?;

    let mut stats = ModerationStats {
        total_reports: reports.len() as u64,
        ..Default::default()
    };

    let mut handle_times = vec![];
    for report in &reports {
        *stats.counts_by_status.entry(report.status).or_default() += 1;
        *stats.counts_by_reason.entry(report.reason).or_default() += 1;
        *stats.counts_by_severity.entry(report.severity).or_default() += 1;

        if report.status.is_terminal() {
            if let Some(handled_at) = &report.handled_at {
                let elapsed = **handled_at - *report.created_at;
                handle_times.push(elapsed.whole_milliseconds().max(0) as u64);
            }
        }
    }

    if !handle_times.is_empty() {
        let total: u64 = handle_times.iter().sum();
        stats.mean_handle_time_ms = Some(total / handle_times.len() as u64);
    }

    let entries = db
        .fetch_log_entries(&LogQuery {
            after: window.after,
            before: window.before,
            ..Default::default()
        })
        .await?;

    for entry in entries {
        *stats.action_counts.entry(entry.action).or_default() += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use iso8601_timestamp::Timestamp;
    use warden_database::actions;
    use warden_models::v0::{
        DataSubmitReport, ReportOutcome, ReportReason, ReportSeverity, ReportStatus,
        ReportedTarget, StatsWindow,
    };
    use warden_result::ErrorType;

    use crate::testing::{engine, reporter, staff};

    fn submission(reason: ReportReason, severity: ReportSeverity) -> DataSubmitReport {
        DataSubmitReport {
            target: ReportedTarget::General {},
            reason,
            severity,
            description: String::new(),
            attachments: vec![],
        }
    }

    #[async_std::test]
    async fn projections_over_the_queue() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let s1 = staff("01S1");

        let spam = moderation
            .submit_report(
                &reporter(),
                submission(ReportReason::SpamAbuse, ReportSeverity::Low),
            )
            .await
            .unwrap();
        moderation
            .submit_report(
                &reporter(),
                submission(ReportReason::SpamAbuse, ReportSeverity::High),
            )
            .await
            .unwrap();
        moderation
            .submit_report(
                &reporter(),
                submission(ReportReason::Harassment, ReportSeverity::High),
            )
            .await
            .unwrap();

        moderation
            .resolve(&s1, &spam.id, ReportOutcome::Resolved, None)
            .await
            .unwrap();

        let stats = moderation
            .stats(&s1, &StatsWindow::default())
            .await
            .unwrap();

        assert_eq!(stats.total_reports, 3);
        assert_eq!(stats.counts_by_status[&ReportStatus::Pending], 2);
        assert_eq!(stats.counts_by_status[&ReportStatus::Resolved], 1);
        assert_eq!(stats.counts_by_reason[&ReportReason::SpamAbuse], 2);
        assert_eq!(stats.counts_by_severity[&ReportSeverity::High], 2);

        // One terminal report, closed within this test run
        assert!(stats.mean_handle_time_ms.is_some());

        assert_eq!(stats.action_counts[actions::SUBMIT_REPORT], 3);
        assert_eq!(stats.action_counts[actions::RESOLVE_REPORT], 1);
    }

    #[async_std::test]
    async fn window_excludes_rows_outside_it() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let s1 = staff("01S1");

        moderation
            .submit_report(
                &reporter(),
                submission(ReportReason::SpamAbuse, ReportSeverity::Low),
            )
            .await
            .unwrap();

        let stats = moderation
            .stats(
                &s1,
                &StatsWindow {
                    before: Some(Timestamp::UNIX_EPOCH),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(stats.total_reports, 0);
        assert!(stats.counts_by_status.is_empty());
        assert!(stats.mean_handle_time_ms.is_none());
        assert!(stats.action_counts.is_empty());
    }

    #[async_std::test]
    async fn stats_are_staff_only() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;

        let error = moderation
            .stats(&reporter(), &StatsWindow::default())
            .await
            .unwrap_err();
        assert!(matches!(error.error_type, ErrorType::NotPrivileged));
    }
}
