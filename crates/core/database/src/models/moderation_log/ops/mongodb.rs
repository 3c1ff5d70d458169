use futures::StreamExt;
use warden_models::v0::LogQuery;
use warden_result::Result;

use crate::LogEntry;
use crate::MongoDb;

use super::AbstractModerationLog;

static COL: &str = "moderation_log";

#[async_trait]
impl AbstractModerationLog for MongoDb {
    /// Append a new entry to the moderation log
    async fn insert_log_entry(&self, entry: &LogEntry) -> Result<()> {
        query!(self, insert_one, COL, &entry).map(|_| ())
    }

    /// Read back entries matching the query, newest first
    async fn fetch_log_entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let mut filter = doc! {};

        if let Some(actor_id) = &query.actor_id {
            filter.insert("actor_id", actor_id);
        }

        if let Some(report_id) = &query.report_id {
            filter.insert("report_id", report_id);
        }

        if let Some(action) = &query.action {
            filter.insert("action", action);
        }

        let mut created_at = doc! {};

        if let Some(after) = &query.after {
            created_at.insert(
                "$gte",
                bson::to_bson(after).map_err(|_| create_error!(InternalError))?,
            );
        }

        if let Some(before) = &query.before {
            created_at.insert(
                "$lt",
                bson::to_bson(before).map_err(|_| create_error!(InternalError))?,
            );
        }

        if !created_at.is_empty() {
            filter.insert("created_at", created_at);
        }

        let mut cursor = self
            .col::<LogEntry>(COL)
            .find(filter)
            .sort(doc! { "_id": -1 });

        if let Some(limit) = query.limit {
            cursor = cursor.limit(limit as i64);
        }

        Ok(cursor
            .await
            .map_err(|_| create_database_error!("find", COL))?
            .filter_map(|entry| async { entry.ok() })
            .collect()
            .await)
    }
}
