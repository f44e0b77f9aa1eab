use super::{DeliveryStatus, LogEntry};
use serde::Serialize;

/// 单次运行统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub discovered: usize,
    pub skipped_missing_summary: usize,
    pub sent: usize,
    pub dry_run: usize,
    pub no_contact: usize,
    pub failed: usize,
    pub entries: Vec<LogEntry>,
}

impl RunReport {
    pub fn record_missing_summary(&mut self) {
        self.discovered += 1;
        self.skipped_missing_summary += 1;
    }

    pub fn record(&mut self, entry: LogEntry) {
        self.discovered += 1;
        match entry.status {
            DeliveryStatus::Sent => self.sent += 1,
            DeliveryStatus::DryRun => self.dry_run += 1,
            DeliveryStatus::NoContact => self.no_contact += 1,
            DeliveryStatus::Failed(_) => self.failed += 1,
        }
        self.entries.push(entry);
    }

    pub fn logged(&self) -> usize {
        self.entries.len()
    }
}
