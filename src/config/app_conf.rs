use std::env;
use std::str::FromStr;

use tracing::{debug, error, info};

use crate::config::{parse_var, ConfigError};

/// Which Entity Store implementation backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Mongo,
    /// Process-local and non-durable; for local development and tests.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!(
                "STORE_BACKEND must be 'mongo' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Page size used when a list request names no `limit`.
    pub list_default_limit: u32,
    /// Hard cap on any list page.
    pub list_max_limit: u32,
    pub store_backend: StoreBackend,
}

impl AppConfig {
    /// Expected environment variables (all optional):
    /// - APP_HOST (127.0.0.1), APP_PORT (8080)
    /// - LIST_DEFAULT_LIMIT (50), LIST_MAX_LIMIT (100)
    /// - STORE_BACKEND: `mongo` (default) or `memory`
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");
        let defaults = AppConfig::default();

        let host = env::var("APP_HOST").unwrap_or(defaults.host);
        let port = parse_var("APP_PORT", defaults.port)?;
        let list_default_limit = parse_var("LIST_DEFAULT_LIMIT", defaults.list_default_limit)?;
        let list_max_limit = parse_var("LIST_MAX_LIMIT", defaults.list_max_limit)?;
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.store_backend,
        };
        debug!("Listening on {}:{} with {:?} store", host, port, store_backend);

        let config = AppConfig {
            host,
            port,
            list_default_limit,
            list_max_limit,
            store_backend,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            error!("APP_HOST is empty");
            return Err(ConfigError::ValidationError("APP_HOST cannot be empty".to_string()));
        }
        if self.list_default_limit == 0 || self.list_max_limit == 0 {
            error!("List limits must be greater than 0");
            return Err(ConfigError::ValidationError(
                "LIST_DEFAULT_LIMIT and LIST_MAX_LIMIT must be greater than 0".to_string(),
            ));
        }
        if self.list_default_limit > self.list_max_limit {
            error!("LIST_DEFAULT_LIMIT exceeds LIST_MAX_LIMIT");
            return Err(ConfigError::ValidationError(
                "LIST_DEFAULT_LIMIT cannot exceed LIST_MAX_LIMIT".to_string(),
            ));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            list_default_limit: 50,
            list_max_limit: 100,
            store_backend: StoreBackend::Mongo,
        }
    }
}
