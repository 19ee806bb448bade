//! Configuration for the hedge engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before the engine starts.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hedge_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Access configuration values
//! println!("cycle every {}s", config.sweeps.cycle_interval_secs);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sweep scheduling configuration.
    #[serde(default)]
    pub sweeps: SweepsConfig,
    /// Broker session configuration.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scheduling for the periodic batch sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepsConfig {
    /// Interval between ticket-driver sweeps in seconds.
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_secs: u64,
    /// Interval between reconciliation passes in seconds.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
}

impl Default for SweepsConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: default_cycle_interval(),
            reconcile_interval_secs: default_reconcile_interval(),
        }
    }
}

const fn default_cycle_interval() -> u64 {
    5
}
const fn default_reconcile_interval() -> u64 {
    300
}

/// Broker session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Lowest connection identifier the broker allows.
    #[serde(default = "default_client_id_min")]
    pub client_id_min: u32,
    /// Highest connection identifier the broker allows.
    #[serde(default = "default_client_id_max")]
    pub client_id_max: u32,
    /// Attempts to lease an id before giving up.
    #[serde(default = "default_acquire_attempts")]
    pub acquire_max_attempts: u32,
    /// Base backoff between lease attempts in milliseconds.
    #[serde(default = "default_acquire_delay")]
    pub acquire_base_delay_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            client_id_min: default_client_id_min(),
            client_id_max: default_client_id_max(),
            acquire_max_attempts: default_acquire_attempts(),
            acquire_base_delay_ms: default_acquire_delay(),
        }
    }
}

const fn default_client_id_min() -> u32 {
    1
}
const fn default_client_id_max() -> u32 {
    32
}
const fn default_acquire_attempts() -> u32 {
    5
}
const fn default_acquire_delay() -> u64 {
    500
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format ("json" or "pretty").
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.sweeps.cycle_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sweeps.cycle_interval_secs must be positive".to_string(),
        ));
    }

    if config.sweeps.reconcile_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sweeps.reconcile_interval_secs must be positive".to_string(),
        ));
    }

    if config.broker.client_id_max < config.broker.client_id_min {
        return Err(ConfigError::ValidationError(
            "broker.client_id_max must be >= broker.client_id_min".to_string(),
        ));
    }

    if config.broker.acquire_max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "broker.acquire_max_attempts must be positive".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}
