use warden_models::v0::{ReportQuery, ReportStatus};
use warden_result::Result;

use crate::{PartialReport, Report};

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractReports: Sync + Send {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()>;

    /// Fetch a report by its id
    async fn fetch_report(&self, report_id: &str) -> Result<Report>;

    /// Fetch all reports matching the given query, oldest first
    async fn fetch_reports(&self, query: &ReportQuery) -> Result<Vec<Report>>;

    /// Apply `partial` to a report only while its status still equals
    /// `expected`, atomically with respect to concurrent callers, and
    /// bump the row version.
    ///
    /// Fails with `Conflict` if another writer moved the status first,
    /// never silently no-ops.
    async fn update_report_if_status(
        &self,
        report_id: &str,
        expected: ReportStatus,
        partial: &PartialReport,
    ) -> Result<Report>;
}
