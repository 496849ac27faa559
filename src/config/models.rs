// src/config/models.rs
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use url::{Host, Url};

pub const DEFAULT_PREFIX: &str = "http://localhost:5000/health/";
pub const DEFAULT_API_NAME: &str = "Sample API";
pub const DEFAULT_API_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// URL prefix the probe answers under, e.g. `http://localhost:5000/health/`.
    pub prefix: String,
    pub api_name: String,
    pub api_version: String,
    pub request_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            api_name: DEFAULT_API_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid prefix {prefix:?}: {source}")]
    InvalidPrefix {
        prefix: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {0:?}; only plain http is served")]
    UnsupportedScheme(String),

    #[error("unsupported host {0:?}; use localhost or an IP address")]
    UnsupportedHost(String),

    #[error("prefix path {0:?} must end with '/'")]
    PathWithoutTrailingSlash(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Where the probe binds and which request paths it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenPrefix {
    pub addr: SocketAddr,
    pub path: String,
}

impl ListenPrefix {
    /// Matches any path under the prefix, plus the prefix without its
    /// trailing slash.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path) || path == self.path.trim_end_matches('/')
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_prefix()?;

        if self.api_name.trim().is_empty() {
            return Err(ConfigError::Empty("api_name"));
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Empty("api_version"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn listen_prefix(&self) -> Result<ListenPrefix, ConfigError> {
        let url = Url::parse(&self.prefix).map_err(|source| ConfigError::InvalidPrefix {
            prefix: self.prefix.clone(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        let ip = match url.host() {
            Some(Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            }
            Some(Host::Ipv4(ip)) => IpAddr::V4(ip),
            Some(Host::Ipv6(ip)) => IpAddr::V6(ip),
            Some(Host::Domain(domain)) => {
                return Err(ConfigError::UnsupportedHost(domain.to_string()))
            }
            None => return Err(ConfigError::UnsupportedHost(String::new())),
        };

        // http always has a known default port
        let port = url.port_or_known_default().unwrap_or(80);

        let path = url.path().to_string();
        if !path.ends_with('/') {
            return Err(ConfigError::PathWithoutTrailingSlash(path));
        }

        Ok(ListenPrefix {
            addr: SocketAddr::new(ip, port),
            path,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
