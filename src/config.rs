//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default port, matching the original Node deployment.
pub const DEFAULT_PORT: u16 = 3000;

/// Default deadline for one provider call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Provider settings (backend, key, model).
    pub llm: LlmConfig,
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// Deadline applied to every model call.
    pub generation_timeout: Duration,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("MOCHI_LLM_BACKEND") {
            Some(value) => value.parse::<LlmBackend>()?,
            None => LlmBackend::default(),
        };

        let api_key_var = backend.api_key_var();
        let api_key = get(api_key_var)
            .ok_or_else(|| ConfigError::MissingEnvVar(api_key_var.to_string()))?;

        let model = get("MOCHI_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let port = match get("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("'{value}' is not a valid port"),
            })?,
            None => DEFAULT_PORT,
        };

        let generation_timeout = match get("MOCHI_GENERATION_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "MOCHI_GENERATION_TIMEOUT_SECS".to_string(),
                        message: format!("'{value}' is not a positive number of seconds"),
                    });
                }
            },
            None => DEFAULT_GENERATION_TIMEOUT,
        };

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key: secrecy::SecretString::from(api_key),
                model,
            },
            port,
            generation_timeout,
        })
    }
}
