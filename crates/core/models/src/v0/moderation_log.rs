use iso8601_timestamp::Timestamp;

auto_derived!(
    /// Filter for reading back the moderation log
    #[derive(Default)]
    pub struct LogQuery {
        /// Only include entries recorded by this actor
        pub actor_id: Option<String>,
        /// Only include entries about this report
        pub report_id: Option<String>,
        /// Only include entries with this action tag
        pub action: Option<String>,
        /// Only include entries recorded at or after this time
        pub after: Option<Timestamp>,
        /// Only include entries recorded before this time
        pub before: Option<Timestamp>,
        /// Maximum number of entries to return, newest first
        pub limit: Option<usize>,
    }
);
