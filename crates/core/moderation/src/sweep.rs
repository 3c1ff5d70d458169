//! Background reconciliation of notification fan-out
//!
//! Fan-out failures never roll back the state transition that
//! triggered them; the report id is parked here instead and delivery
//! is re-run out of band.

use async_std::task;
use deadqueue::limited::Queue;
use once_cell::sync::Lazy;

use crate::Moderation;

static Q: Lazy<Queue<String>> = Lazy::new(|| Queue::new(1024));

/// Queue a report for fan-out reconciliation
pub async fn queue_retry(report_id: String) {
    Q.try_push(report_id).ok();

    info!(
        "Queue is using {} slots from {}. Queued type: FANOUT",
        Q.len(),
        Q.capacity()
    );
}

/// Worker loop draining the reconciliation queue
pub async fn worker(moderation: Moderation) {
    loop {
        let report_id = Q.pop().await;
        if let Err(err) = moderation.retry_fanout(&report_id).await {
            error!("Failed to re-run fan-out for report {report_id}: {err:?}");
        }
    }
}

/// Spawn background workers
pub fn start_workers(moderation: Moderation) {
    task::spawn(worker(moderation));
}
