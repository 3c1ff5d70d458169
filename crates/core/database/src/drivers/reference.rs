use std::{collections::HashMap, sync::Arc};

use futures::lock::Mutex;

use crate::{LogEntry, Notification, Report};

database_derived!(
    /// Reference implementation
    #[derive(Default)]
    pub struct ReferenceDb {
        pub reports: Arc<Mutex<HashMap<String, Report>>>,
        pub notifications: Arc<Mutex<HashMap<String, Notification>>>,
        pub moderation_log: Arc<Mutex<Vec<LogEntry>>>,
    }
);

impl ReferenceDb {
    /// Wipe all collections
    pub async fn clear(&self) {
        self.reports.lock().await.clear();
        self.notifications.lock().await.clear();
        self.moderation_log.lock().await.clear();
    }
}
