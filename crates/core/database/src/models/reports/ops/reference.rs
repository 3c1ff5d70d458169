use warden_models::v0::{ReportQuery, ReportStatus};
use warden_result::Result;

use crate::ReferenceDb;
use crate::{PartialReport, Report};

use super::AbstractReports;

#[async_trait]
impl AbstractReports for ReferenceDb {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()> {
        let mut reports = self.reports.lock().await;
        if reports.contains_key(&report.id) {
            Err(create_database_error!("insert", "reports"))
        } else {
            reports.insert(report.id.to_string(), report.clone());
            Ok(())
        }
    }

    /// Fetch a report by its id
    async fn fetch_report(&self, report_id: &str) -> Result<Report> {
        let reports = self.reports.lock().await;
        reports
            .get(report_id)
            .cloned()
            .ok_or_else(|| create_error!(UnknownReport))
    }

    /// Fetch all reports matching the given query, oldest first
    async fn fetch_reports(&self, query: &ReportQuery) -> Result<Vec<Report>> {
        let reports = self.reports.lock().await;
        let mut reports: Vec<Report> = reports
            .values()
            .filter(|report| report.matches(query))
            .cloned()
            .collect();

        reports.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reports)
    }

    /// Apply `partial` while the status guard holds
    async fn update_report_if_status(
        &self,
        report_id: &str,
        expected: ReportStatus,
        partial: &PartialReport,
    ) -> Result<Report> {
        // Guard check and mutation happen under a single collection
        // lock, which makes the update atomic relative to other writers.
        let mut reports = self.reports.lock().await;
        let report = reports
            .get_mut(report_id)
            .ok_or_else(|| create_error!(UnknownReport))?;

        if report.status != expected {
            return Err(create_error!(Conflict));
        }

        report.apply_options(partial.clone());
        report.version += 1;
        Ok(report.clone())
    }
}
