//! Tunables for the permissions service.

use serde::{Deserialize, Serialize};

/// Job role code the staff role lookup reports for key workers.
pub const DEFAULT_KEY_WORKER_ROLE_CODE: &str = "KW";

/// Settings consumed by [`crate::PermissionsService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    /// Staff job role code identifying a key worker.
    pub key_worker_role_code: String,
    /// Confirm a restricted patient's supporting prison is active before the
    /// POM path grants access.
    pub verify_supporting_prison_active: bool,
    /// Log every denial at `info`.
    pub log_denials: bool,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            key_worker_role_code: DEFAULT_KEY_WORKER_ROLE_CODE.to_string(),
            verify_supporting_prison_active: true,
            log_denials: true,
        }
    }
}

impl AccessSettings {
    /// Use a different key worker role code.
    #[must_use]
    pub fn with_key_worker_role_code(mut self, code: impl Into<String>) -> Self {
        self.key_worker_role_code = code.into();
        self
    }

    /// Trust the prisoner record's supporting prison without a lookup.
    #[must_use]
    pub fn without_supporting_prison_check(mut self) -> Self {
        self.verify_supporting_prison_active = false;
        self
    }

    /// Silence denial logging.
    #[must_use]
    pub fn without_denial_logging(mut self) -> Self {
        self.log_denials = false;
        self
    }
}
