// src/health/mod.rs
mod checker;
mod report;
mod status;

pub use checker::{
    HealthCheck, HealthCheckRegistry, HealthCheckResult, HealthCheckService, LivenessCheck,
};
pub use report::{HealthReport, HealthReportEntry};
pub use status::HealthStatus;
