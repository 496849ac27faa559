// src/main.rs
use anyhow::Result;
use tokio::signal;
use tracing::info;

use health_probe::{
    config::{self, ProbeConfig},
    health::{HealthCheckRegistry, LivenessCheck},
    shutdown, ProbeBuilder,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("health_probe=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => {
            info!("No configuration file given, using defaults");
            ProbeConfig::default()
        }
    };

    let registry = HealthCheckRegistry::new().register(LivenessCheck);

    let mut probe = ProbeBuilder::new(config)
        .with_health_service(registry)
        .build()?;
    probe.start().await?;

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    probe.run(shutdown).await?;
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
