use mongodb::options::ReturnDocument;
use warden_models::v0::{ReportQuery, ReportStatus};
use warden_result::Result;

use crate::MongoDb;
use crate::{PartialReport, Report};

use super::AbstractReports;

static COL: &str = "reports";

/// Lifecycle statuses serialize as plain strings, so guards can
/// compare them directly in a filter document.
fn status_tag(status: &ReportStatus) -> String {
    format!("{status:?}")
}

#[async_trait]
impl AbstractReports for MongoDb {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()> {
        query!(self, insert_one, COL, &report).map(|_| ())
    }

    /// Fetch a report by its id
    async fn fetch_report(&self, report_id: &str) -> Result<Report> {
        query!(self, find_one, COL, doc! { "_id": report_id })?
            .ok_or_else(|| create_error!(UnknownReport))
    }

    /// Fetch all reports matching the given query, oldest first
    async fn fetch_reports(&self, query: &ReportQuery) -> Result<Vec<Report>> {
        let mut filter = doc! {};

        if let Some(status) = &query.status {
            filter.insert("status", status_tag(status));
        }

        if let Some(severity) = &query.severity {
            filter.insert("severity", format!("{severity:?}"));
        }

        if let Some(author_id) = &query.author_id {
            filter.insert("author_id", author_id);
        }

        if let Some(handled_by) = &query.handled_by {
            filter.insert("handled_by", handled_by);
        }

        let mut created_at = doc! {};

        if let Some(after) = &query.created_after {
            created_at.insert(
                "$gte",
                bson::to_bson(after).map_err(|_| create_error!(InternalError))?,
            );
        }

        if let Some(before) = &query.created_before {
            created_at.insert(
                "$lt",
                bson::to_bson(before).map_err(|_| create_error!(InternalError))?,
            );
        }

        if !created_at.is_empty() {
            filter.insert("created_at", created_at);
        }

        query!(self, find, COL, filter)
    }

    /// Apply `partial` while the status guard holds
    ///
    /// `find_one_and_update` with a status filter is the single-document
    /// transaction the rest of the system relies on: the guard and the
    /// write cannot interleave with another writer.
    async fn update_report_if_status(
        &self,
        report_id: &str,
        expected: ReportStatus,
        partial: &PartialReport,
    ) -> Result<Report> {
        let mut set = doc! {};

        if let Some(status) = &partial.status {
            set.insert("status", status_tag(status));
        }

        if let Some(handled_by) = &partial.handled_by {
            set.insert("handled_by", handled_by);
        }

        if let Some(handled_at) = &partial.handled_at {
            set.insert(
                "handled_at",
                bson::to_bson(handled_at).map_err(|_| create_error!(InternalError))?,
            );
        }

        if let Some(notes) = &partial.notes {
            set.insert("notes", notes);
        }

        let updated = self
            .col::<Report>(COL)
            .find_one_and_update(
                doc! {
                    "_id": report_id,
                    "status": status_tag(&expected)
                },
                doc! {
                    "$set": set,
                    "$inc": {
                        "version": 1_i64
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|_| create_database_error!("find_one_and_update", COL))?;

        match updated {
            Some(report) => Ok(report),
            None => {
                // Distinguish a failed guard from a missing row
                if query!(self, find_one, COL, doc! { "_id": report_id })
                    .map(|report: Option<Report>| report.is_some())?
                {
                    Err(create_error!(Conflict))
                } else {
                    Err(create_error!(UnknownReport))
                }
            }
        }
    }
}
