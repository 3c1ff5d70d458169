use iso8601_timestamp::Timestamp;

#[cfg(feature = "validator")]
use validator::Validate;

auto_derived!(
    /// The subject a report was filed against
    #[serde(tag = "type")]
    pub enum ReportedTarget {
        /// Report a user
        User {
            /// Id of the user
            id: String,
        },
        /// Report a piece of content
        Content {
            /// Opaque reference to the content
            reference: String,
        },
        /// General report not tied to a user or content
        General {},
    }

    /// Reason for creating a report
    #[derive(Copy, Hash)]
    pub enum ReportReason {
        /// No reason has been specified
        NoneSpecified,

        /// Illegal content catch-all reason
        Illegal,

        /// Content that promotes harm to others / self
        PromotesHarm,

        /// Extreme violence, gore, or animal cruelty
        ExtremeViolence,

        /// Spam or platform abuse
        SpamAbuse,

        /// Scams or fraud
        ScamsFraud,

        /// Distribution of malware or malicious links
        Malware,

        /// Harassment or abuse targeted at another user
        Harassment,

        /// Profile contains inappropriate content for a general audience
        InappropriateProfile,

        /// User is impersonating another user
        Impersonation,

        /// User is evading a ban
        BanEvasion,

        /// User is not of minimum age to use the platform
        Underage,
    }

    /// How urgently a report needs attention
    #[derive(Copy, Hash)]
    pub enum ReportSeverity {
        Low,
        Medium,
        High,
        Critical,
    }

    /// Where a report is in its lifecycle
    #[derive(Copy, Hash)]
    pub enum ReportStatus {
        /// Report is waiting for triage
        Pending,
        /// Report has been claimed by a moderator
        InProgress,
        /// Report was actioned and closed
        Resolved,
        /// Report was closed without action
        Dismissed,
    }

    /// Terminal outcome applied when closing a report
    #[derive(Copy, Hash)]
    pub enum ReportOutcome {
        Resolved,
        Dismissed,
    }

    /// New report data
    #[cfg_attr(feature = "validator", derive(Validate))]
    pub struct DataSubmitReport {
        /// Target being reported
        pub target: ReportedTarget,
        /// Reason for the report
        pub reason: ReportReason,
        /// How urgent the report is
        pub severity: ReportSeverity,
        /// Additional report description
        #[cfg_attr(feature = "validator", validate(length(min = 0, max = 1000)))]
        #[serde(default)]
        pub description: String,
        /// Raw evidence payloads to upload alongside the report
        #[serde(default)]
        pub attachments: Vec<Vec<u8>>,
    }

    /// Action applied to each report of a bulk operation
    #[serde(tag = "action")]
    pub enum BulkAction {
        /// Claim each report
        Claim,
        /// Close each report with the given outcome
        Resolve {
            outcome: ReportOutcome,
            note: Option<String>,
        },
    }

    /// Filter for listing reports
    #[derive(Default)]
    pub struct ReportQuery {
        /// Only include reports with this status
        pub status: Option<ReportStatus>,
        /// Only include reports with this severity
        pub severity: Option<ReportSeverity>,
        /// Only include reports created by this user
        pub author_id: Option<String>,
        /// Only include reports handled by this moderator
        pub handled_by: Option<String>,
        /// Only include reports created at or after this time
        pub created_after: Option<Timestamp>,
        /// Only include reports created before this time
        pub created_before: Option<Timestamp>,
    }
);

impl ReportStatus {
    /// Whether no further transitions are permitted from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }

    /// Whether the lifecycle permits moving from this status to `next`
    pub fn can_transition_to(&self, next: &ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Pending, ReportStatus::InProgress)
                | (ReportStatus::Pending, ReportStatus::Resolved)
                | (ReportStatus::Pending, ReportStatus::Dismissed)
                | (ReportStatus::InProgress, ReportStatus::Resolved)
                | (ReportStatus::InProgress, ReportStatus::Dismissed)
        )
    }
}

impl From<ReportOutcome> for ReportStatus {
    fn from(outcome: ReportOutcome) -> ReportStatus {
        match outcome {
            ReportOutcome::Resolved => ReportStatus::Resolved,
            ReportOutcome::Dismissed => ReportStatus::Dismissed,
        }
    }
}
