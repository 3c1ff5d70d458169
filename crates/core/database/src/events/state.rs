use std::collections::HashMap;

use warden_models::v0::ReportStatus;

use crate::Report;

use super::client::EventV1;

/// Client-side cache of the report queue
///
/// The bus delivers at most once and promises nothing about order, so
/// rows are applied last-writer-wins by their server-assigned version,
/// never by arrival order. After a delivery gap (reconnect, lagged
/// subscription) the cache must be rebuilt from a full listing with
/// [`resync`](Self::resync).
#[derive(Debug, Clone, Default)]
pub struct ReportQueueState {
    reports: HashMap<String, Report>,
}

impl ReportQueueState {
    /// Fold one event into the cache
    pub fn apply(&mut self, event: &EventV1) {
        match event {
            EventV1::Bulk { v } => {
                for event in v {
                    self.apply(event);
                }
            }
            EventV1::ReportCreate(report) | EventV1::ReportUpdate(report) => {
                self.insert_if_newer(report)
            }
            _ => {}
        }
    }

    fn insert_if_newer(&mut self, report: &Report) {
        match self.reports.get(&report.id) {
            // Stale or duplicate delivery
            Some(existing) if existing.version >= report.version => {}
            _ => {
                self.reports.insert(report.id.to_string(), report.clone());
            }
        }
    }

    /// Replace the cache with a full listing after a delivery gap
    pub fn resync(&mut self, reports: Vec<Report>) {
        self.reports = reports
            .into_iter()
            .map(|report| (report.id.to_string(), report))
            .collect();
    }

    pub fn get(&self, report_id: &str) -> Option<&Report> {
        self.reports.get(report_id)
    }

    /// Reports still waiting for triage, oldest first
    pub fn pending(&self) -> Vec<&Report> {
        let mut pending: Vec<&Report> = self
            .reports
            .values()
            .filter(|report| matches!(report.status, ReportStatus::Pending))
            .collect();

        pending.sort_by(|a, b| a.id.cmp(&b.id));
        pending
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
