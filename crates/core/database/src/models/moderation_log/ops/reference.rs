use warden_models::v0::LogQuery;
use warden_result::Result;

use crate::LogEntry;
use crate::ReferenceDb;

use super::AbstractModerationLog;

#[async_trait]
impl AbstractModerationLog for ReferenceDb {
    /// Append a new entry to the moderation log
    async fn insert_log_entry(&self, entry: &LogEntry) -> Result<()> {
        let mut entries = self.moderation_log.lock().await;
        entries.push(entry.clone());
        Ok(())
    }

    /// Read back entries matching the query, newest first
    async fn fetch_log_entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let entries = self.moderation_log.lock().await;
        let mut entries: Vec<LogEntry> = entries
            .iter()
            .filter(|entry| entry.matches(query))
            .cloned()
            .collect();

        entries.sort_by(|a, b| b.id.cmp(&a.id));

        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }
}
