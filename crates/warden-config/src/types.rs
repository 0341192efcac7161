//! Configuration types.
//!
//! These mirror the settings of other Warden crates without depending on
//! them; conversion happens where the crates are wired together. Every
//! section implements [`Default`] so a bare `[section]` header is valid.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging output.
    pub logging: LoggingSection,
    /// Access-control behaviour.
    pub access: AccessSection,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`"trace"` .. `"error"`).
    pub level: String,
    /// `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate directives (e.g. `["warden_guard=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

/// Access-control configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSection {
    /// Staff job role code that marks a key worker.
    pub key_worker_role_code: String,
    /// Confirm a restricted patient's supporting prison upstream.
    pub verify_supporting_prison_active: bool,
    /// Log every denial.
    pub log_denials: bool,
}

impl Default for AccessSection {
    fn default() -> Self {
        Self {
            key_worker_role_code: "KW".to_owned(),
            verify_supporting_prison_active: true,
            log_denials: true,
        }
    }
}
