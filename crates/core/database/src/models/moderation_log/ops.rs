use warden_models::v0::LogQuery;
use warden_result::Result;

use crate::LogEntry;

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

/// The log is append-only: no update or delete operation exists.
#[async_trait]
pub trait AbstractModerationLog: Sync + Send {
    /// Append a new entry to the moderation log
    async fn insert_log_entry(&self, entry: &LogEntry) -> Result<()>;

    /// Read back entries matching the query, newest first
    async fn fetch_log_entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>>;
}
