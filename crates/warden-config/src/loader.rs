//! Layered configuration loading.
//!
//! `load()`:
//! 1. Parse the embedded `defaults.toml`
//! 2. Apply `WARDEN_*` environment variables
//! 3. Merge the config file, if any (explicit path, else the per-user file)
//! 4. Deserialize and validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum accepted config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load configuration from defaults, the environment and a config file.
///
/// With `path` set the file must exist. Without it the per-user file from
/// [`user_config_path`] is used when present.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, an
/// environment variable is invalid, or the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    load_with_env(path, &collect_env_vars())
}

/// [`load`] with an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(path: Option<&Path>, env: &HashMap<String, String>) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let applied = apply_env(&mut merged, env)?;
    if applied > 0 {
        debug!(count = applied, "applied environment variables");
    }

    let overlay = match path {
        Some(p) => Some((read_file(p)?, p.to_path_buf())),
        None => match user_config_path() {
            Some(p) => try_read_file(&p)?.map(|v| (v, p)),
            None => None,
        },
    };
    if let Some((overlay, p)) = overlay {
        deep_merge(&mut merged, &overlay);
        info!(path = %p.display(), "loaded config file");
    }

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Per-user config file, e.g. `~/.config/warden/config.toml` on Linux.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "warden").map(|d| d.config_dir().join("config.toml"))
}

/// Recursively merge `overlay` into `base`. Tables merge per key; anything
/// else in the overlay replaces the base value.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    // Size is checked before reading so an oversized file is never loaded.
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    check_size(path, metadata.len())?;

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_file(path, &content)
}

/// Like [`read_file`], but a missing file is `None`.
fn try_read_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match std::fs::metadata(path) {
        Ok(_) => read_file(path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

fn check_size(path: &Path, len: u64) -> ConfigResult<()> {
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {len} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }
    Ok(())
}

fn parse_file(path: &Path, content: &str) -> ConfigResult<toml::Value> {
    // The file may have grown between the metadata check and the read.
    check_size(path, u64::try_from(content.len()).unwrap_or(u64::MAX))?;
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}
