// src/health/report.rs
use super::HealthStatus;
use std::time::Duration;

/// Outcome of a single named check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReportEntry {
    pub status: HealthStatus,
    pub description: Option<String>,
    pub duration: Duration,
}

impl HealthReportEntry {
    pub fn new(status: HealthStatus, description: Option<String>) -> Self {
        Self {
            status,
            description,
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Aggregated result of one health evaluation. Entries keep registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub entries: Vec<(String, HealthReportEntry)>,
    pub total_duration: Duration,
}

impl HealthReport {
    /// Overall status is the worst entry status, Healthy when there are none.
    pub fn from_entries(entries: Vec<(String, HealthReportEntry)>, total_duration: Duration) -> Self {
        let status = entries
            .iter()
            .fold(HealthStatus::Healthy, |acc, (_, entry)| acc.worst(entry.status));

        Self {
            status,
            entries,
            total_duration,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&HealthReportEntry> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, entry)| entry)
    }
}
