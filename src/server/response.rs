// src/server/response.rs
// JSON payload written back to probe callers.
use crate::health::{HealthReport, HealthStatus};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "HealthChecks")]
    pub health_checks: Vec<HealthCheckEntry>,
    #[serde(rename = "HealthCheckDuration")]
    pub health_check_duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckEntry {
    #[serde(rename = "Components")]
    pub components: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "ApiName")]
    pub api_name: String,
    #[serde(rename = "ApiVersion")]
    pub api_version: String,
}

impl HealthResponse {
    pub fn from_report(report: &HealthReport, api_name: &str, api_version: &str) -> Self {
        let health_checks = report
            .entries
            .iter()
            .map(|(name, entry)| HealthCheckEntry {
                components: name.clone(),
                status: entry.status.to_string(),
                description: entry.description.clone(),
                api_name: api_name.to_string(),
                api_version: api_version.to_string(),
            })
            .collect();

        Self {
            status: report.status.to_string(),
            health_checks,
            health_check_duration: format_duration(report.total_duration),
        }
    }

    /// Payload for an evaluation that failed before producing a report.
    pub fn failed(elapsed: Duration) -> Self {
        Self {
            status: HealthStatus::Unhealthy.to_string(),
            health_checks: Vec::new(),
            health_check_duration: format_duration(elapsed),
        }
    }
}

/// Formats as `[d.]hh:mm:ss.fffffff` with 100ns ticks.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let ticks = duration.subsec_nanos() / 100;

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}.{:02}:{:02}:{:02}.{:07}", days, hours, minutes, seconds, ticks)
    } else {
        format!("{:02}:{:02}:{:02}.{:07}", hours, minutes, seconds, ticks)
    }
}
