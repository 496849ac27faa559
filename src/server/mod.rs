pub mod builder;
pub mod handler;
pub mod listener;
pub mod response;

pub use builder::ProbeBuilder;
pub use handler::HealthResponder;
pub use listener::{HealthProbe, ProbeState};
pub use response::{HealthCheckEntry, HealthResponse};
