use std::collections::HashMap;

use iso8601_timestamp::Timestamp;

use super::{ReportReason, ReportSeverity, ReportStatus};

auto_derived!(
    /// Half-open time window for on-demand projections
    #[derive(Default)]
    pub struct StatsWindow {
        /// Include rows created at or after this time
        pub after: Option<Timestamp>,
        /// Include rows created before this time
        pub before: Option<Timestamp>,
    }

    /// On-demand projections over the report queue and moderation log
    #[derive(Default)]
    pub struct ModerationStats {
        /// Total reports inside the window
        pub total_reports: u64,
        /// Report counts keyed by lifecycle status
        pub counts_by_status: HashMap<ReportStatus, u64>,
        /// Report counts keyed by report reason
        pub counts_by_reason: HashMap<ReportReason, u64>,
        /// Report counts keyed by severity
        pub counts_by_severity: HashMap<ReportSeverity, u64>,
        /// Mean time between submission and closure across terminal
        /// reports, in milliseconds
        pub mean_handle_time_ms: Option<u64>,
        /// Moderation log action counts inside the window
        pub action_counts: HashMap<String, u64>,
    }
);
