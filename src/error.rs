// src/error.rs
use std::io;
use std::net::SocketAddr;

use crate::config::ConfigError;
use crate::server::ProbeState;

/// Errors surfaced by the probe's listener loop.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to bind health probe listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("fatal error accepting connection: {0}")]
    Accept(#[source] io::Error),

    #[error("cannot {operation} a probe in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ProbeState,
    },

    #[error("no health check service configured")]
    MissingHealthService,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by a health aggregation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    #[error("health evaluation cancelled by shutdown")]
    Cancelled,

    #[error("health evaluation failed: {0}")]
    Failed(String),
}
