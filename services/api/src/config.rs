use holiday_chill_core::session::ConsumptionPolicy;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Optional catalog document replacing the one compiled into the core crate.
    pub catalog_path: Option<PathBuf>,
    pub content_policy: ConsumptionPolicy,
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let catalog_path = std::env::var("CATALOG_PATH").ok().map(PathBuf::from);

        let content_policy = std::env::var("CONTENT_POLICY")
            .unwrap_or_else(|_| "repeat".to_string())
            .parse::<ConsumptionPolicy>()
            .map_err(|e| ConfigError::InvalidValue("CONTENT_POLICY".to_string(), e))?;

        let ttl_str = std::env::var("SESSION_TTL_SECS").unwrap_or_else(|_| "1800".to_string());
        let session_ttl = match ttl_str.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "SESSION_TTL_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", ttl_str),
                ));
            }
        };

        Ok(Self {
            bind_address,
            log_level,
            catalog_path,
            content_policy,
            session_ttl,
        })
    }
}
