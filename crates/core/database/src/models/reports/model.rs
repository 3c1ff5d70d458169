use iso8601_timestamp::Timestamp;
use warden_models::v0::{
    ReportQuery, ReportReason, ReportSeverity, ReportStatus, ReportedTarget,
};

auto_derived!(
    /// User-generated platform moderation report
    pub struct Report {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Id of the user creating this report
        pub author_id: String,
        /// Subject the report was filed against
        pub target: ReportedTarget,
        /// Reason for the report
        pub reason: ReportReason,
        /// Additional report context
        #[serde(default)]
        pub description: String,
        /// How urgent the report is
        pub severity: ReportSeverity,
        /// References to uploaded evidence
        #[serde(default)]
        pub evidence: Vec<String>,
        /// Where the report is in its lifecycle
        pub status: ReportStatus,
        /// Moderator who took ownership of the report
        #[serde(skip_serializing_if = "Option::is_none")]
        pub handled_by: Option<String>,
        /// When ownership was taken
        #[serde(skip_serializing_if = "Option::is_none")]
        pub handled_at: Option<Timestamp>,
        /// Notes attached when the report was closed
        #[serde(default)]
        pub notes: String,
        /// When the report was submitted
        pub created_at: Timestamp,
        /// Write counter assigned by the store, bumped on every
        /// accepted write; events carry it for last-writer-wins
        pub version: i64,
    }

    /// Fields applied to a report row by a guarded update
    #[derive(Default)]
    pub struct PartialReport {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<ReportStatus>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub handled_by: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub handled_at: Option<Timestamp>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub notes: Option<String>,
    }
);

impl Report {
    /// Construct a new pending report
    pub fn new(
        author_id: String,
        target: ReportedTarget,
        reason: ReportReason,
        severity: ReportSeverity,
        description: String,
        evidence: Vec<String>,
    ) -> Report {
        Report {
            id: ulid::Ulid::new().to_string(),
            author_id,
            target,
            reason,
            description,
            severity,
            evidence,
            status: ReportStatus::Pending,
            handled_by: None,
            handled_at: None,
            notes: String::new(),
            created_at: Timestamp::now_utc(),
            version: 1,
        }
    }

    /// Apply partial fields to this row
    pub fn apply_options(&mut self, partial: PartialReport) {
        if let Some(status) = partial.status {
            self.status = status;
        }

        if let Some(handled_by) = partial.handled_by {
            self.handled_by.replace(handled_by);
        }

        if let Some(handled_at) = partial.handled_at {
            self.handled_at.replace(handled_at);
        }

        if let Some(notes) = partial.notes {
            self.notes = notes;
        }
    }

    /// Whether this row passes the given listing filter
    pub fn matches(&self, query: &ReportQuery) -> bool {
        if let Some(status) = &query.status {
            if &self.status != status {
                return false;
            }
        }

        if let Some(severity) = &query.severity {
            if &self.severity != severity {
                return false;
            }
        }

        if let Some(author_id) = &query.author_id {
            if &self.author_id != author_id {
                return false;
            }
        }

        if let Some(handled_by) = &query.handled_by {
            if self.handled_by.as_ref() != Some(handled_by) {
                return false;
            }
        }

        if let Some(after) = &query.created_after {
            if &self.created_at < after {
                return false;
            }
        }

        if let Some(before) = &query.created_before {
            if &self.created_at >= before {
                return false;
            }
        }

        true
    }
}
