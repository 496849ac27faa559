// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use std::sync::Arc;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::health::HealthCheckService;
use crate::server::listener::HealthProbe;

/// Builder pattern so `main.rs` can inject its health collaborator.
pub struct ProbeBuilder<S> {
    config: ProbeConfig,
    service: Option<Arc<S>>,
}

impl<S> ProbeBuilder<S>
where
    S: HealthCheckService + 'static,
{
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            service: None,
        }
    }

    pub fn with_health_service(self, service: S) -> Self {
        self.with_shared_health_service(Arc::new(service))
    }

    pub fn with_shared_health_service(mut self, service: Arc<S>) -> Self {
        self.service = Some(service);
        self
    }

    /// Validates the configuration and produces an unstarted probe.
    pub fn build(self) -> Result<HealthProbe<S>, ProbeError> {
        let service = self.service.ok_or(ProbeError::MissingHealthService)?;
        self.config.validate()?;
        let prefix = self.config.listen_prefix()?;

        Ok(HealthProbe::new(
            prefix,
            service,
            self.config.api_name.clone(),
            self.config.api_version.clone(),
            self.config.request_timeout(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthCheckRegistry, LivenessCheck};
    use crate::server::ProbeState;

    #[test]
    fn test_build_requires_service() {
        let result = ProbeBuilder::<HealthCheckRegistry>::new(ProbeConfig::default()).build();
        assert!(matches!(result, Err(ProbeError::MissingHealthService)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = ProbeConfig {
            prefix: "https://localhost:5000/health/".to_string(),
            ..ProbeConfig::default()
        };
        let result = ProbeBuilder::new(config)
            .with_health_service(HealthCheckRegistry::new())
            .build();
        assert!(matches!(result, Err(ProbeError::Config(_))));
    }

    #[test]
    fn test_built_probe_starts_in_created_state() {
        let probe = ProbeBuilder::new(ProbeConfig::default())
            .with_health_service(HealthCheckRegistry::new().register(LivenessCheck))
            .build()
            .unwrap();
        assert_eq!(probe.state(), ProbeState::Created);
        assert!(probe.local_addr().is_none());
    }
}
