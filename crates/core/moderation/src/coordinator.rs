use iso8601_timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;

use warden_config::config;
use warden_database::events::client::EventV1;
use warden_database::{actions, LogEntry, PartialReport, Report};
use warden_models::v0::{
    Actor, BulkAction, DataSubmitReport, ReportOutcome, ReportStatus, ReportedTarget,
};
use warden_result::{Error, ErrorType, Result};

use crate::{sweep, Moderation};

/// Per-report result of a bulk operation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BulkEntry {
    pub id: String,
    pub result: Result<Report, Error>,
}

impl Moderation {
    /// Submit a new report into the queue
    ///
    /// Open to any authenticated caller, not just staff.
    pub async fn submit_report(&self, actor: &Actor, data: DataSubmitReport) -> Result<Report> {
        data.validate().map_err(|error| {
            create_error!(FailedValidation {
                error: error.to_string()
            })
        })?;

        if let ReportedTarget::User { id } = &data.target {
            if id == &actor.id {
                return Err(create_error!(CannotReportYourself));
            }
        }

        // Evidence storage is a best-effort side-channel; losing an
        // upload must not block the submission itself.
        let mut evidence = vec![];
        for payload in &data.attachments {
            match self.evidence.upload(payload).await {
                Ok(reference) => evidence.push(reference),
                Err(err) => warn!("Failed to store evidence for new report: {err}"),
            }
        }

        let report = Report::new(
            actor.id.to_string(),
            data.target,
            data.reason,
            data.severity,
            data.description,
            evidence,
        );

        self.db.insert_report(&report).await?;
        self.append_log(
            actor,
            actions::SUBMIT_REPORT,
            &report,
            format!("severity {:?}", report.severity),
        )
        .await?;

        if let Err(err) = self.on_created(&report).await {
            warn!("Fan-out failed for report {}: {err}", report.id);
            sweep::queue_retry(report.id.to_string()).await;
        }

        EventV1::ReportCreate(report.clone()).p(&self.bus);

        info!("Report {} submitted by {}", report.id, actor.id);
        Ok(report)
    }

    /// Take ownership of a pending report (staff only)
    ///
    /// Exactly one of any number of racing claimants wins; the losers
    /// are told who beat them. Retrying an already-won claim succeeds
    /// idempotently.
    pub async fn claim(&self, actor: &Actor, report_id: &str) -> Result<Report> {
        if !actor.is_staff() {
            return Err(create_error!(NotPrivileged));
        }

        let partial = PartialReport {
            status: Some(ReportStatus::InProgress),
            handled_by: Some(actor.id.to_string()),
            handled_at: Some(Timestamp::now_utc()),
            ..Default::default()
        };

        let report = match self
            .db
            .update_report_if_status(report_id, ReportStatus::Pending, &partial)
            .await
        {
            Ok(report) => report,
            Err(error) if matches!(error.error_type, ErrorType::Conflict) => {
                let current = self.db.fetch_report(report_id).await?;
                let own = current.handled_by.as_deref() == Some(actor.id.as_str());

                return match (own, current.status) {
                    (true, ReportStatus::InProgress) => Ok(current),
                    (true, _) => Err(create_error!(InvalidTransition {
                        from: format!("{:?}", current.status),
                        to: format!("{:?}", ReportStatus::InProgress),
                    })),
                    (false, _) => match current.handled_by {
                        Some(by) => Err(create_error!(AlreadyClaimed { by })),
                        None => Err(error),
                    },
                };
            }
            Err(error) => return Err(error),
        };

        self.append_log(actor, actions::CLAIM_REPORT, &report, String::new())
            .await?;

        if let Err(err) = self.on_claimed(&report).await {
            warn!("Retraction fan-out failed for report {}: {err}", report.id);
            sweep::queue_retry(report.id.to_string()).await;
        }

        EventV1::ReportUpdate(report.clone()).p(&self.bus);

        info!("Report {} claimed by {}", report.id, actor.id);
        Ok(report)
    }

    /// Close a report with a terminal outcome (staff only)
    ///
    /// Works from either `Pending` or `InProgress`; the guarded update
    /// runs against the status observed here, so whoever closes the
    /// report first wins and later callers get `AlreadyHandled`.
    pub async fn resolve(
        &self,
        actor: &Actor,
        report_id: &str,
        outcome: ReportOutcome,
        note: Option<String>,
    ) -> Result<Report> {
        if !actor.is_staff() {
            return Err(create_error!(NotPrivileged));
        }

        let current = self.db.fetch_report(report_id).await?;
        if current.status.is_terminal() {
            return Err(create_error!(AlreadyHandled));
        }

        let partial = PartialReport {
            status: Some(ReportStatus::from(outcome)),
            handled_by: Some(
                current
                    .handled_by
                    .clone()
                    .unwrap_or_else(|| actor.id.to_string()),
            ),
            handled_at: Some(current.handled_at.unwrap_or_else(Timestamp::now_utc)),
            notes: note,
        };

        let report = self
            .db
            .update_report_if_status(report_id, current.status, &partial)
            .await
            .map_err(|error| match error.error_type {
                ErrorType::Conflict => create_error!(AlreadyHandled),
                _ => error,
            })?;

        let action = match outcome {
            ReportOutcome::Resolved => actions::RESOLVE_REPORT,
            ReportOutcome::Dismissed => actions::DISMISS_REPORT,
        };
        self.append_log(actor, action, &report, report.notes.to_string())
            .await?;

        if let Err(err) = self.on_resolved(&report).await {
            warn!("Closure fan-out failed for report {}: {err}", report.id);
            sweep::queue_retry(report.id.to_string()).await;
        }

        EventV1::ReportUpdate(report.clone()).p(&self.bus);

        info!(
            "Report {} closed as {:?} by {}",
            report.id, outcome, actor.id
        );
        Ok(report)
    }

    /// Apply a claim or resolution to each report independently
    ///
    /// Never atomic across the set: each id carries its own result so
    /// callers can tell partial success from total failure.
    pub async fn bulk_apply(
        &self,
        actor: &Actor,
        report_ids: &[String],
        action: &BulkAction,
    ) -> Result<Vec<BulkEntry>> {
        if !actor.is_staff() {
            return Err(create_error!(NotPrivileged));
        }

        let limit = config().await.moderation.bulk_limit;
        if report_ids.len() > limit {
            return Err(create_error!(FailedValidation {
                error: format!("bulk operation exceeds {limit} reports")
            }));
        }

        let mut entries = vec![];
        for report_id in report_ids {
            let result = match action {
                BulkAction::Claim => self.claim(actor, report_id).await,
                BulkAction::Resolve { outcome, note } => {
                    self.resolve(actor, report_id, *outcome, note.clone()).await
                }
            };

            entries.push(BulkEntry {
                id: report_id.to_string(),
                result,
            });
        }

        Ok(entries)
    }

    async fn append_log(
        &self,
        actor: &Actor,
        action: &str,
        report: &Report,
        description: String,
    ) -> Result<()> {
        let target_user_id = match &report.target {
            ReportedTarget::User { id } => Some(id.as_str()),
            _ => None,
        };

        let entry = LogEntry::new(
            &actor.id,
            action,
            Some(&report.id),
            target_user_id,
            description,
        );
        self.db.insert_log_entry(&entry).await?;
        EventV1::LogAppend(entry).p(&self.bus);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use warden_database::actions;
    use warden_database::events::bus::Topic;
    use warden_database::events::client::EventV1;
    use warden_models::v0::{
        BulkAction, DataSubmitReport, LogQuery, NotificationKind, ReportOutcome, ReportReason,
        ReportSeverity, ReportStatus, ReportedTarget,
    };
    use warden_result::ErrorType;

    use crate::testing::{engine, reporter, staff};

    fn submission() -> DataSubmitReport {
        DataSubmitReport {
            target: ReportedTarget::Content {
                reference: "attachment_tag".to_string(),
            },
            reason: ReportReason::SpamAbuse,
            severity: ReportSeverity::High,
            description: "keeps posting the same link".to_string(),
            attachments: vec![],
        }
    }

    #[async_std::test]
    async fn report_lifecycle_end_to_end() {
        let (moderation, _) =
            engine(vec![staff("01S1"), staff("01S2"), staff("01S3")]).await;
        let author = reporter();
        let s1 = staff("01S1");
        let s2 = staff("01S2");

        // Submission lands pending, fans out to all staff and
        // acknowledges the reporter
        let report = moderation
            .submit_report(&author, submission())
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Pending);

        let rows = moderation
            .db
            .fetch_notifications_for_report(&report.id)
            .await
            .unwrap();
        let created = rows
            .iter()
            .filter(|row| matches!(row.kind, NotificationKind::ReportCreated))
            .count();
        let acks = rows
            .iter()
            .filter(|row| matches!(row.kind, NotificationKind::SubmissionAck))
            .count();
        assert_eq!((created, acks), (3, 1));

        // S1 claims; S2 and S3 lose their queue entries, S1 keeps its own
        let claimed = moderation.claim(&s1, &report.id).await.unwrap();
        assert_eq!(claimed.status, ReportStatus::InProgress);
        assert_eq!(claimed.handled_by.as_deref(), Some("01S1"));
        assert!(claimed.handled_at.is_some());

        let s1_inbox = moderation.list_notifications(&s1).await.unwrap();
        let s1_entry = s1_inbox
            .iter()
            .find(|row| matches!(row.kind, NotificationKind::ReportCreated))
            .expect("claimant keeps their own notification");
        moderation.ack_notification(&s1, &s1_entry.id).await.unwrap();
        let s2_inbox = moderation.list_notifications(&s2).await.unwrap();
        assert!(!s2_inbox
            .iter()
            .any(|row| matches!(row.kind, NotificationKind::ReportCreated)));

        // S2 is told who beat them to it
        let error = moderation.claim(&s2, &report.id).await.unwrap_err();
        assert_eq!(
            error.error_type,
            ErrorType::AlreadyClaimed {
                by: "01S1".to_string()
            }
        );

        // S1 closes it; the reporter hears about it
        let resolved = moderation
            .resolve(&s1, &report.id, ReportOutcome::Resolved, None)
            .await
            .unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert_eq!(resolved.handled_by.as_deref(), Some("01S1"));

        let entries = moderation
            .list_log_entries(
                &s1,
                &LogQuery {
                    action: Some(actions::RESOLVE_REPORT.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_id, "01S1");

        let inbox = moderation.list_notifications(&author).await.unwrap();
        assert!(inbox
            .iter()
            .any(|row| matches!(row.kind, NotificationKind::ReportResolved)));
    }

    #[async_std::test]
    async fn racing_claims_have_exactly_one_winner() {
        let (moderation, _) = engine(vec![staff("01A"), staff("01B")]).await;

        let report = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();

        let staff_a = staff("01A");
        let staff_b = staff("01B");
        let (a, b) = futures::join!(
            moderation.claim(&staff_a, &report.id),
            moderation.claim(&staff_b, &report.id)
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

        let winner = if a.is_ok() { "01A" } else { "01B" };
        let loser = if a.is_ok() { b } else { a };
        assert_eq!(
            loser.unwrap_err().error_type,
            ErrorType::AlreadyClaimed {
                by: winner.to_string()
            }
        );

        let row = moderation.db.fetch_report(&report.id).await.unwrap();
        assert_eq!(row.handled_by.as_deref(), Some(winner));
    }

    #[async_std::test]
    async fn retried_claim_is_idempotent() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let s1 = staff("01S1");

        let report = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();

        let first = moderation.claim(&s1, &report.id).await.unwrap();
        let second = moderation.claim(&s1, &report.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[async_std::test]
    async fn closing_twice_fails_already_handled() {
        let (moderation, _) = engine(vec![staff("01S1"), staff("01S2")]).await;

        let report = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();

        moderation
            .resolve(&staff("01S1"), &report.id, ReportOutcome::Resolved, None)
            .await
            .unwrap();

        // A different actor, a different outcome: still refused
        let error = moderation
            .resolve(&staff("01S2"), &report.id, ReportOutcome::Dismissed, None)
            .await
            .unwrap_err();
        assert!(matches!(error.error_type, ErrorType::AlreadyHandled));

        let closures = moderation
            .list_log_entries(
                &staff("01S1"),
                &LogQuery {
                    report_id: Some(report.id.to_string()),
                    action: Some(actions::RESOLVE_REPORT.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(closures.len(), 1);
    }

    #[async_std::test]
    async fn pending_report_can_be_dismissed_directly() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let s1 = staff("01S1");

        let report = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();

        let dismissed = moderation
            .resolve(&s1, &report.id, ReportOutcome::Dismissed, Some("duplicate".to_string()))
            .await
            .unwrap();

        assert_eq!(dismissed.status, ReportStatus::Dismissed);
        assert_eq!(dismissed.handled_by.as_deref(), Some("01S1"));
        assert!(dismissed.handled_at.is_some());
        assert_eq!(dismissed.notes, "duplicate");
    }

    #[async_std::test]
    async fn terminal_reports_cannot_be_reopened() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let s1 = staff("01S1");

        let report = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();

        moderation.claim(&s1, &report.id).await.unwrap();
        moderation
            .resolve(&s1, &report.id, ReportOutcome::Resolved, None)
            .await
            .unwrap();

        // The handler retrying their own claim on a closed report is a
        // backwards transition, not an idempotent retry
        let error = moderation.claim(&s1, &report.id).await.unwrap_err();
        assert!(matches!(error.error_type, ErrorType::InvalidTransition { .. }));
    }

    #[async_std::test]
    async fn only_staff_may_act_on_the_queue() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let author = reporter();

        let report = moderation
            .submit_report(&author, submission())
            .await
            .unwrap();

        let claim = moderation.claim(&author, &report.id).await.unwrap_err();
        assert!(matches!(claim.error_type, ErrorType::NotPrivileged));

        let resolve = moderation
            .resolve(&author, &report.id, ReportOutcome::Resolved, None)
            .await
            .unwrap_err();
        assert!(matches!(resolve.error_type, ErrorType::NotPrivileged));

        let list = moderation
            .list_reports(&author, &Default::default())
            .await
            .unwrap_err();
        assert!(matches!(list.error_type, ErrorType::NotPrivileged));
    }

    #[async_std::test]
    async fn submission_is_validated() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let author = reporter();

        let mut data = submission();
        data.target = ReportedTarget::User {
            id: author.id.to_string(),
        };
        let error = moderation.submit_report(&author, data).await.unwrap_err();
        assert!(matches!(error.error_type, ErrorType::CannotReportYourself));

        let mut data = submission();
        data.description = "x".repeat(1001);
        let error = moderation.submit_report(&author, data).await.unwrap_err();
        assert!(matches!(error.error_type, ErrorType::FailedValidation { .. }));
    }

    #[async_std::test]
    async fn evidence_failure_does_not_block_submission() {
        let (moderation, evidence) = engine(vec![staff("01S1")]).await;

        let mut data = submission();
        data.attachments = vec![b"screenshot bytes".to_vec()];

        let stored = moderation
            .submit_report(&reporter(), data.clone())
            .await
            .unwrap();
        assert_eq!(stored.evidence.len(), 1);

        evidence.set_unavailable(true);
        let degraded = moderation
            .submit_report(&reporter(), data)
            .await
            .unwrap();
        assert!(degraded.evidence.is_empty());
    }

    #[async_std::test]
    async fn bulk_apply_reports_per_id_results() {
        let (moderation, _) = engine(vec![staff("01S1"), staff("01S2")]).await;
        let s1 = staff("01S1");
        let s2 = staff("01S2");

        let first = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();
        let second = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();

        // S1 got to the first report before the bulk claim
        moderation.claim(&s1, &first.id).await.unwrap();

        let entries = moderation
            .bulk_apply(
                &s2,
                &[first.id.to_string(), second.id.to_string()],
                &BulkAction::Claim,
            )
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].result.as_ref().unwrap_err().error_type,
            ErrorType::AlreadyClaimed {
                by: "01S1".to_string()
            }
        );
        assert_eq!(
            entries[1].result.as_ref().unwrap().handled_by.as_deref(),
            Some("01S2")
        );
    }

    #[async_std::test]
    async fn bulk_apply_is_bounded() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;

        let ids: Vec<String> = (0..101).map(|i| format!("01FAKE{i}")).collect();
        let error = moderation
            .bulk_apply(&staff("01S1"), &ids, &BulkAction::Claim)
            .await
            .unwrap_err();
        assert!(matches!(error.error_type, ErrorType::FailedValidation { .. }));
    }

    #[async_std::test]
    async fn transitions_are_published_with_increasing_versions() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;
        let s1 = staff("01S1");

        let mut events = moderation.subscribe(Topic::Reports);

        let report = moderation
            .submit_report(&reporter(), submission())
            .await
            .unwrap();
        moderation.claim(&s1, &report.id).await.unwrap();
        moderation
            .resolve(&s1, &report.id, ReportOutcome::Resolved, None)
            .await
            .unwrap();

        let mut versions = vec![];
        while let Ok(event) = events.try_recv() {
            match event {
                EventV1::ReportCreate(row) | EventV1::ReportUpdate(row) => {
                    assert_eq!(row.id, report.id);
                    versions.push(row.version);
                }
                _ => {}
            }
        }

        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[async_std::test]
    async fn unknown_reports_are_rejected() {
        let (moderation, _) = engine(vec![staff("01S1")]).await;

        let error = moderation
            .claim(&staff("01S1"), "01MISSING")
            .await
            .unwrap_err();
        assert!(matches!(error.error_type, ErrorType::UnknownReport));

        let error = moderation
            .resolve(&staff("01S1"), "01MISSING", ReportOutcome::Resolved, None)
            .await
            .unwrap_err();
        assert!(matches!(error.error_type, ErrorType::UnknownReport));
    }
}
