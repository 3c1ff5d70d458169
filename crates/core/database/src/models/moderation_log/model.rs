use iso8601_timestamp::Timestamp;
use warden_models::v0::LogQuery;

auto_derived!(
    /// Append-only record of a moderation action
    pub struct LogEntry {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// The actor who performed the action
        pub actor_id: String,
        /// The action performed
        pub action: String,
        /// The report the action was taken on, if applicable
        #[serde(skip_serializing_if = "Option::is_none")]
        pub report_id: Option<String>,
        /// The user the action was taken against, if applicable
        #[serde(skip_serializing_if = "Option::is_none")]
        pub target_user_id: Option<String>,
        /// Context for the action
        #[serde(default)]
        pub description: String,
        /// When the action was recorded
        pub created_at: Timestamp,
    }
);

/// Action tags recorded on the moderation log
pub mod actions {
    pub const SUBMIT_REPORT: &str = "submit_report";
    pub const CLAIM_REPORT: &str = "claim_report";
    pub const RESOLVE_REPORT: &str = "resolve_report";
    pub const DISMISS_REPORT: &str = "dismiss_report";
    pub const FANOUT_RETRY: &str = "fanout_retry";
}

impl LogEntry {
    pub fn new(
        actor_id: &str,
        action: &str,
        report_id: Option<&str>,
        target_user_id: Option<&str>,
        description: impl Into<String>,
    ) -> LogEntry {
        LogEntry {
            id: ulid::Ulid::new().to_string(),
            actor_id: actor_id.to_string(),
            action: action.to_string(),
            report_id: report_id.map(str::to_string),
            target_user_id: target_user_id.map(str::to_string),
            description: description.into(),
            created_at: Timestamp::now_utc(),
        }
    }

    /// Whether this entry passes the given read-back filter
    pub fn matches(&self, query: &LogQuery) -> bool {
        if let Some(actor_id) = &query.actor_id {
            if &self.actor_id != actor_id {
                return false;
            }
        }

        if let Some(report_id) = &query.report_id {
            if self.report_id.as_ref() != Some(report_id) {
                return false;
            }
        }

        if let Some(action) = &query.action {
            if &self.action != action {
                return false;
            }
        }

        if let Some(after) = &query.after {
            if &self.created_at < after {
                return false;
            }
        }

        if let Some(before) = &query.before {
            if &self.created_at >= before {
                return false;
            }
        }

        true
    }
}
