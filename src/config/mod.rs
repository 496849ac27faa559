// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<ProbeConfig> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: ProbeConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_yaml_config() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "prefix: \"http://127.0.0.1:6001/probe/\"\napi_name: \"Billing\"\napi_version: \"2.1.0\""
        )
        .unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.prefix, "http://127.0.0.1:6001/probe/");
        assert_eq!(config.api_name, "Billing");
        assert_eq!(config.api_version, "2.1.0");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_load_json_config_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"api_name\": \"Ledger\"}}").unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.prefix, DEFAULT_PREFIX);
        assert_eq!(config.api_name, "Ledger");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_config() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "prefix: \"https://localhost:5000/health/\"").unwrap();

        let err = load_config(file.path()).await.unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        assert!(load_config("/nonexistent/probe.yaml").await.is_err());
    }
}
