use std::env;

use tracing::{error, info};

use crate::config::ConfigError;

const MIN_TOKEN_LEN: usize = 16;

/// Shared secret the moderation routes expect as a bearer token.
#[derive(Clone)]
pub struct AdminAuthConfig {
    pub api_token: String,
}

impl std::fmt::Debug for AdminAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuthConfig")
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl AdminAuthConfig {
    /// Expected environment variables:
    /// - ADMIN_API_TOKEN: bearer token for admin routes (required, at least 16 characters)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading admin auth configuration from environment variables");
        let api_token = env::var("ADMIN_API_TOKEN").map_err(|_| {
            error!("ADMIN_API_TOKEN environment variable not found");
            ConfigError::EnvVarNotFound("ADMIN_API_TOKEN".to_string())
        })?;

        let config = AdminAuthConfig { api_token };
        config.validate()?;
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        AdminAuthConfig {
            api_token: "test-admin-token-0123456789".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().len() < MIN_TOKEN_LEN {
            error!("ADMIN_API_TOKEN is too short (minimum {} characters)", MIN_TOKEN_LEN);
            return Err(ConfigError::ValidationError(format!(
                "ADMIN_API_TOKEN must be at least {} characters long",
                MIN_TOKEN_LEN
            )));
        }
        Ok(())
    }
}
