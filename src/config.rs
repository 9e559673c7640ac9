use crate::semantic_core::client::{DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT_MS};
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const BASE_URL_VAR: &str = "SEMANTIC_CORE_BASE_URL";
const TIMEOUT_MS_VAR: &str = "SEMANTIC_CORE_TIMEOUT_MS";
const ROUTE_PREFIX_VAR: &str = "SEMANTIC_CORE_ROUTE_PREFIX";
const MAX_BODY_BYTES_VAR: &str = "SEMANTIC_CORE_MAX_BODY_BYTES";
const SERVER_PORT_VAR: &str = "SERVER_PORT";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was already installed for this process.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the proxy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the semantic core service.
    pub semantic_core_base_url: String,
    /// Per-call deadline for upstream requests, in milliseconds.
    pub semantic_core_timeout_ms: u64,
    /// Optional mount point for the document routes.
    pub semantic_core_route_prefix: Option<String>,
    /// Maximum upstream response size buffered per call.
    pub semantic_core_max_body_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Values that take precedence over the environment (typically command-line flags).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replacement for `SEMANTIC_CORE_BASE_URL`.
    pub base_url: Option<String>,
    /// Replacement for `SEMANTIC_CORE_TIMEOUT_MS`.
    pub timeout_ms: Option<u64>,
    /// Replacement for `SEMANTIC_CORE_ROUTE_PREFIX`.
    pub route_prefix: Option<String>,
    /// Replacement for `SERVER_PORT`.
    pub server_port: Option<u16>,
}

impl ConfigOverrides {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            BASE_URL_VAR => self.base_url.clone(),
            TIMEOUT_MS_VAR => self.timeout_ms.map(|value| value.to_string()),
            ROUTE_PREFIX_VAR => self.route_prefix.clone(),
            SERVER_PORT_VAR => self.server_port.map(|value| value.to_string()),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(&ConfigOverrides::default())
    }

    /// Load configuration from the environment, letting `overrides` win where set.
    pub fn from_env_with(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| overrides.get(key).or_else(|| env::var(key).ok()))
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            semantic_core_base_url: optional(BASE_URL_VAR)
                .ok_or_else(|| ConfigError::MissingVariable(BASE_URL_VAR.to_string()))?,
            semantic_core_timeout_ms: parse_optional(optional(TIMEOUT_MS_VAR), TIMEOUT_MS_VAR)?
                .unwrap_or(DEFAULT_TIMEOUT_MS),
            semantic_core_route_prefix: optional(ROUTE_PREFIX_VAR),
            semantic_core_max_body_bytes: parse_optional(
                optional(MAX_BODY_BYTES_VAR),
                MAX_BODY_BYTES_VAR,
            )?
            .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            server_port: parse_optional(optional(SERVER_PORT_VAR), SERVER_PORT_VAR)?,
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from `.env` and the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    init_config_with(&ConfigOverrides::default())
}

/// Like [`init_config`], with `overrides` taking precedence over the environment.
pub fn init_config_with(overrides: &ConfigOverrides) -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env_with(overrides)?;
    tracing::debug!(
        base_url = %config.semantic_core_base_url,
        timeout_ms = config.semantic_core_timeout_ms,
        route_prefix = ?config.semantic_core_route_prefix,
        max_body_bytes = config.semantic_core_max_body_bytes,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}
