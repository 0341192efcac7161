//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Accepted values for `logging.format`.
pub const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_access(config)?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    if logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: "log level must not be empty".to_owned(),
        });
    }

    if !LOG_FORMATS.contains(&logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported format '{}'; expected one of: {}",
                logging.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }

    Ok(())
}

fn validate_access(config: &Config) -> ConfigResult<()> {
    if config.access.key_worker_role_code.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "access.key_worker_role_code".to_owned(),
            message: "key worker role code must not be empty".to_owned(),
        });
    }
    Ok(())
}
