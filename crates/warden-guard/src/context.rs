//! Per-request state shared by pipeline stages and guard handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::error;

use warden_core::{AccessError, AccessResult, Permissions, Prisoner, User};
use warden_telemetry::CorrelationContext;

/// Everything known about one inbound request.
///
/// Built once per request and dropped with the response. Slots filled by
/// earlier stages (prisoner, permissions) and the errors-by-level map use
/// interior mutability so concurrently running handlers can share `&self`.
#[derive(Debug)]
pub struct RequestContext {
    user: User,
    client_token: String,
    params: HashMap<String, String>,
    correlation: CorrelationContext,
    prisoner: RwLock<Option<Arc<Prisoner>>>,
    permissions: RwLock<Option<Permissions>>,
    errors_by_level: RwLock<BTreeMap<usize, Vec<AccessError>>>,
}

fn poisoned(what: &str) -> AccessError {
    AccessError::server(format!("request context {what} lock poisoned"))
}

impl RequestContext {
    /// Create a context for an authenticated user.
    #[must_use]
    pub fn new(user: User) -> Self {
        let correlation = CorrelationContext::new("request").with_username(&user.username);
        Self {
            user,
            client_token: String::new(),
            params: HashMap::new(),
            correlation,
            prisoner: RwLock::new(None),
            permissions: RwLock::new(None),
            errors_by_level: RwLock::new(BTreeMap::new()),
        }
    }

    /// Set the token used for upstream calls.
    #[must_use]
    pub fn with_client_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = token.into();
        self
    }

    /// Add a route parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replace the correlation context.
    #[must_use]
    pub fn with_correlation(mut self, correlation: CorrelationContext) -> Self {
        self.correlation = correlation;
        self
    }

    /// Pre-fill the prisoner slot.
    #[must_use]
    pub fn with_prisoner(self, prisoner: Prisoner) -> Self {
        if let Ok(mut slot) = self.prisoner.write() {
            *slot = Some(Arc::new(prisoner));
        }
        self
    }

    /// The authenticated user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Token for upstream calls.
    #[must_use]
    pub fn client_token(&self) -> &str {
        &self.client_token
    }

    /// A route parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Correlation identifiers for logging.
    #[must_use]
    pub fn correlation(&self) -> &CorrelationContext {
        &self.correlation
    }

    /// Store the prisoner loaded by an earlier stage.
    ///
    /// # Errors
    ///
    /// Returns a server error if the slot's lock is poisoned.
    pub fn set_prisoner(&self, prisoner: Prisoner) -> AccessResult<()> {
        let mut slot = self.prisoner.write().map_err(|_| poisoned("prisoner"))?;
        *slot = Some(Arc::new(prisoner));
        Ok(())
    }

    /// The prisoner, if loaded.
    ///
    /// # Errors
    ///
    /// Returns a server error if the slot's lock is poisoned.
    pub fn prisoner(&self) -> AccessResult<Option<Arc<Prisoner>>> {
        let slot = self.prisoner.read().map_err(|_| poisoned("prisoner"))?;
        Ok(slot.clone())
    }

    /// The prisoner, which an earlier stage must have loaded.
    ///
    /// # Errors
    ///
    /// Returns a server error if no prisoner was loaded. That is a wiring
    /// bug, never an access decision.
    pub fn require_prisoner(&self, caller: &str) -> AccessResult<Arc<Prisoner>> {
        self.prisoner()?.ok_or_else(|| {
            error!(caller, "Prisoner data not loaded before access check");
            AccessError::server(format!("{caller} ran before prisoner data was loaded"))
        })
    }

    /// Store assembled permissions.
    ///
    /// # Errors
    ///
    /// Returns a server error if the slot's lock is poisoned.
    pub fn set_permissions(&self, permissions: Permissions) -> AccessResult<()> {
        let mut slot = self
            .permissions
            .write()
            .map_err(|_| poisoned("permissions"))?;
        *slot = Some(permissions);
        Ok(())
    }

    /// Permissions, if loaded.
    ///
    /// # Errors
    ///
    /// Returns a server error if the slot's lock is poisoned.
    pub fn permissions(&self) -> AccessResult<Option<Permissions>> {
        let slot = self
            .permissions
            .read()
            .map_err(|_| poisoned("permissions"))?;
        Ok(slot.clone())
    }

    /// Errors recorded at a guard nesting level.
    #[must_use]
    pub fn errors_at(&self, level: usize) -> Vec<AccessError> {
        self.errors_by_level
            .read()
            .ok()
            .and_then(|map| map.get(&level).cloned())
            .unwrap_or_default()
    }

    /// Levels that have recorded errors, ascending.
    #[must_use]
    pub fn error_levels(&self) -> Vec<usize> {
        self.errors_by_level
            .read()
            .map(|map| map.keys().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn record_error(&self, level: usize, error: AccessError) {
        self.errors_by_level
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(level)
            .or_default()
            .push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_test::{test_prisoner, test_user};

    #[test]
    fn test_prisoner_slot() {
        let ctx = RequestContext::new(test_user());
        assert!(ctx.prisoner().unwrap().is_none());
        ctx.set_prisoner(test_prisoner()).unwrap();
        assert_eq!(ctx.prisoner().unwrap().unwrap().prison_id, "LEI");
    }

    #[test]
    fn test_require_prisoner_is_server_error() {
        let ctx = RequestContext::new(test_user());
        let err = ctx.require_prisoner("RequireAccess").unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.reason().contains("RequireAccess"));
    }

    #[test]
    fn test_params_and_token() {
        let ctx = RequestContext::new(test_user())
            .with_client_token("abc")
            .with_param("prisonerNumber", "G6123VU");
        assert_eq!(ctx.client_token(), "abc");
        assert_eq!(ctx.param("prisonerNumber"), Some("G6123VU"));
        assert_eq!(ctx.param("other"), None);
        assert_eq!(ctx.correlation().username.as_deref(), Some("TEST_USER"));
    }

    #[test]
    fn test_errors_by_level() {
        let ctx = RequestContext::new(test_user());
        ctx.record_error(2, AccessError::not_found("a"));
        ctx.record_error(1, AccessError::forbidden("b"));
        ctx.record_error(2, AccessError::not_found("c"));
        assert_eq!(ctx.error_levels(), vec![1, 2]);
        assert_eq!(ctx.errors_at(2).len(), 2);
        assert!(ctx.errors_at(3).is_empty());
    }
}
