//! `WARDEN_*` environment variables.
//!
//! Environment values sit above the embedded defaults and below any config
//! file.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Prefix shared by every recognised variable.
pub const ENV_PREFIX: &str = "WARDEN_";

#[derive(Clone, Copy)]
enum Kind {
    Str,
    Bool,
    List,
}

/// Mapping from variable name to config field.
struct EnvMapping {
    var_name: &'static str,
    section: &'static str,
    key: &'static str,
    kind: Kind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "WARDEN_LOG_LEVEL",
        section: "logging",
        key: "level",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "WARDEN_LOG_FORMAT",
        section: "logging",
        key: "format",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "WARDEN_LOG_DIRECTIVES",
        section: "logging",
        key: "directives",
        kind: Kind::List,
    },
    EnvMapping {
        var_name: "WARDEN_KEY_WORKER_ROLE_CODE",
        section: "access",
        key: "key_worker_role_code",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "WARDEN_VERIFY_SUPPORTING_PRISON",
        section: "access",
        key: "verify_supporting_prison_active",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "WARDEN_LOG_DENIALS",
        section: "access",
        key: "log_denials",
        kind: Kind::Bool,
    },
];

/// Snapshot the process's `WARDEN_*` variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Write recognised variables into `tree`. Returns how many applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] for a boolean that is not
/// `true`/`false`/`1`/`0`.
pub fn apply_env(tree: &mut toml::Value, env: &HashMap<String, String>) -> ConfigResult<usize> {
    let mut applied = 0usize;
    for mapping in ENV_MAPPINGS {
        let Some(raw) = env.get(mapping.var_name) else {
            continue;
        };
        let value = parse(mapping, raw)?;
        let Some(root) = tree.as_table_mut() else {
            continue;
        };
        let section = root
            .entry(mapping.section)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        if let Some(table) = section.as_table_mut() {
            table.insert(mapping.key.to_owned(), value);
            debug!(var = mapping.var_name, "applied environment override");
            applied = applied.saturating_add(1);
        }
    }
    Ok(applied)
}

fn parse(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    match mapping.kind {
        Kind::Str => Ok(toml::Value::String(raw.to_owned())),
        Kind::List => Ok(toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_owned()))
                .collect(),
        )),
        Kind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(toml::Value::Boolean(true)),
            "false" | "0" => Ok(toml::Value::Boolean(false)),
            _ => Err(ConfigError::EnvError {
                name: mapping.var_name.to_owned(),
                message: format!("expected true or false, got '{raw}'"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_apply_string_and_bool() {
        let mut tree: toml::Value = toml::from_str("[access]\nlog_denials = true").unwrap();
        let applied = apply_env(
            &mut tree,
            &env(&[("WARDEN_LOG_DENIALS", "false"), ("WARDEN_LOG_LEVEL", "debug")]),
        )
        .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(tree["access"]["log_denials"].as_bool(), Some(false));
        assert_eq!(tree["logging"]["level"].as_str(), Some("debug"));
    }

    #[test]
    fn test_apply_directive_list() {
        let mut tree = toml::Value::Table(toml::map::Map::new());
        apply_env(
            &mut tree,
            &env(&[("WARDEN_LOG_DIRECTIVES", "warden_guard=debug, warden_access=trace")]),
        )
        .unwrap();
        let directives = tree["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[1].as_str(), Some("warden_access=trace"));
    }

    #[test]
    fn test_invalid_bool() {
        let mut tree = toml::Value::Table(toml::map::Map::new());
        let err = apply_env(&mut tree, &env(&[("WARDEN_VERIFY_SUPPORTING_PRISON", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("WARDEN_VERIFY_SUPPORTING_PRISON"));
    }

    #[test]
    fn test_unknown_vars_ignored() {
        let mut tree = toml::Value::Table(toml::map::Map::new());
        let applied = apply_env(&mut tree, &env(&[("WARDEN_UNKNOWN", "x")])).unwrap();
        assert_eq!(applied, 0);
    }
}
