pub mod admin_auth_conf;
pub mod app_conf;
pub mod mongo_conf;

pub use admin_auth_conf::AdminAuthConfig;
pub use app_conf::{AppConfig, StoreBackend};
pub use mongo_conf::MongoConfig;

use std::env;
use std::str::FromStr;

use tracing::{error, warn};

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Reads `name`, falling back to `default` when unset.
pub(crate) fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            error!("Invalid {} value: {}", name, raw);
            ConfigError::ParseError(format!("{} must be a valid number, got '{}'", name, raw))
        }),
        Err(_) => {
            warn!("{} not set, using default: {}", name, default);
            Ok(default)
        }
    }
}
