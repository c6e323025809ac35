//! Server Configuration
//!
//! Layered from built-in defaults, an optional `roster.toml` next to the
//! working directory, and `ROSTER_*` environment variables (highest
//! precedence).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Record store connection string (`memory://` or `sqlite:...`)
    pub database_url: String,
    /// Max tracing level (`trace`..`error`)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics: bool,
}

impl ServerConfig {
    /// Load from `roster.toml` (optional) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(Some("roster"), Environment::with_prefix("ROSTER"))
    }

    /// Load from an optional config file stem and an environment source
    pub fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .set_default("database_url", "sqlite://roster.db")?
            .set_default("log_level", "info")?
            .set_default("log_format", "text")?
            .set_default("metrics", true)?;

        if let Some(stem) = file {
            builder = builder.add_source(File::with_name(stem).required(false));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database_url must be set to a record store connection string".to_string(),
            ));
        }
        IpAddr::from_str(&self.host)
            .map_err(|e| ConfigError::Invalid(format!("host {:?}: {}", self.host, e)))?;
        Level::from_str(&self.log_level)
            .map_err(|e| ConfigError::Invalid(format!("log_level {:?}: {}", self.log_level, e)))?;
        Ok(())
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = IpAddr::from_str(&self.host).unwrap_or(IpAddr::from([0, 0, 0, 0]));
        SocketAddr::new(ip, self.port)
    }

    /// Parsed max log level
    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }
}
