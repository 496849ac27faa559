// src/lib.rs
pub mod config;
pub mod error;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ProbeConfig;
pub use error::{HealthError, ProbeError};
pub use server::{HealthProbe, ProbeBuilder};
