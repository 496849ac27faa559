// src/health/checker.rs
use super::{HealthReport, HealthReportEntry, HealthStatus};
use crate::error::HealthError;
use crate::shutdown::ShutdownSignal;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// The aggregation collaborator the probe consults on every request.
#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_health(&self, shutdown: &ShutdownSignal) -> Result<HealthReport, HealthError>;
}

#[async_trait]
impl<T: HealthCheckService + ?Sized> HealthCheckService for Arc<T> {
    async fn check_health(&self, shutdown: &ShutdownSignal) -> Result<HealthReport, HealthError> {
        (**self).check_health(shutdown).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub description: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            description: None,
        }
    }

    pub fn degraded(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            description: Some(description.into()),
        }
    }

    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: Some(description.into()),
        }
    }
}

/// One named readiness check.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> anyhow::Result<HealthCheckResult>;
}

/// Reports the process itself as alive.
pub struct LivenessCheck;

#[async_trait]
impl HealthCheck for LivenessCheck {
    fn name(&self) -> &str {
        "self"
    }

    async fn check(&self) -> anyhow::Result<HealthCheckResult> {
        Ok(HealthCheckResult::healthy())
    }
}

/// Runs registered checks one after another in registration order.
#[derive(Default)]
pub struct HealthCheckRegistry {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthCheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: HealthCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }
}

#[async_trait]
impl HealthCheckService for HealthCheckRegistry {
    async fn check_health(&self, shutdown: &ShutdownSignal) -> Result<HealthReport, HealthError> {
        let start = Instant::now();
        let mut entries = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            if shutdown.is_triggered() {
                return Err(HealthError::Cancelled);
            }

            let check_start = Instant::now();
            let result = match check.check().await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Health check {} failed: {:#}", check.name(), e);
                    HealthCheckResult::unhealthy(format!("{:#}", e))
                }
            };
            let elapsed = check_start.elapsed();

            debug!(
                "Health check {} finished as {} in {:?}",
                check.name(),
                result.status,
                elapsed
            );
            entries.push((
                check.name().to_string(),
                HealthReportEntry::new(result.status, result.description).with_duration(elapsed),
            ));
        }

        Ok(HealthReport::from_entries(entries, start.elapsed()))
    }
}
