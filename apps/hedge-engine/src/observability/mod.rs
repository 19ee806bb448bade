//! Structured logging for the hedge engine.
//!
//! Sets up `tracing-subscriber` with an env-filter layer. The filter is
//! taken from `RUST_LOG` when set, falling back to the configured level.
//!
//! # Example
//!
//! ```ignore
//! use hedge_engine::config::LoggingConfig;
//! use hedge_engine::observability::init_logging;
//!
//! init_logging(&LoggingConfig::default())?;
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// Failed to initialize the tracing subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ObservabilityError::SubscriberError(e.to_string()))?;

    tracing::info!(
        level = %config.level,
        format = %config.format,
        "logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ObservabilityError::SubscriberError("already initialized".to_string());
        assert!(err.to_string().contains("already initialized"));
    }
}
