//! The staff user making a request.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::role::{Role, RoleSet};

/// Identity provider that authenticated the user.
///
/// Only accounts backed by the custody system (`nomis`) are provisioned
/// against case loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    /// Custody system account.
    #[default]
    Nomis,
    /// Probation system account.
    Delius,
    /// Central auth account without a case-load provision.
    Auth,
    /// Any other identity provider.
    #[serde(other)]
    Other,
}

impl AuthSource {
    /// Whether accounts from this source carry case loads.
    #[must_use]
    pub fn has_case_loads(self) -> bool {
        matches!(self, Self::Nomis)
    }
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nomis => "nomis",
            Self::Delius => "delius",
            Self::Auth => "auth",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A case load held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLoad {
    /// Establishment code, e.g. `MDI`.
    pub case_load_id: String,
    /// Display name.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether this is the session's active case load.
    #[serde(default)]
    pub currently_active: bool,
}

impl CaseLoad {
    /// Create an inactive case load.
    #[must_use]
    pub fn new(case_load_id: impl Into<String>) -> Self {
        Self {
            case_load_id: case_load_id.into(),
            description: None,
            currently_active: false,
        }
    }

    /// Mark this case load as currently active.
    #[must_use]
    pub fn active(mut self) -> Self {
        self.currently_active = true;
        self
    }
}

/// Staff user descriptor, immutable for the life of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Custody-system staff id, used for job-role lookups.
    #[serde(default)]
    pub staff_id: Option<i64>,
    /// Identity provider.
    #[serde(default)]
    pub auth_source: AuthSource,
    /// The session's active case load.
    #[serde(default)]
    pub active_case_load_id: Option<String>,
    /// Case loads the account is provisioned against.
    #[serde(default, deserialize_with = "null_as_default")]
    pub case_loads: Vec<CaseLoad>,
    /// Role grants, normalised on deserialisation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_roles: RoleSet,
    /// Cached "is a key worker at prison" answers.
    #[serde(default)]
    pub key_worker_at_prisons: Option<HashMap<String, bool>>,
}

impl User {
    /// Create a custody-system user with no roles or case loads.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Set the identity provider.
    #[must_use]
    pub fn with_auth_source(mut self, auth_source: AuthSource) -> Self {
        self.auth_source = auth_source;
        self
    }

    /// Set the staff id.
    #[must_use]
    pub fn with_staff_id(mut self, staff_id: i64) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    /// Add case loads by id.
    #[must_use]
    pub fn with_case_loads<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.case_loads.extend(ids.into_iter().map(CaseLoad::new));
        self
    }

    /// Set the active case load, adding it to the case loads if missing.
    #[must_use]
    pub fn with_active_case_load(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        for case_load in &mut self.case_loads {
            case_load.currently_active = case_load.case_load_id == id;
        }
        if !self.case_loads.iter().any(|c| c.case_load_id == id) {
            self.case_loads.push(CaseLoad::new(id.clone()).active());
        }
        self.active_case_load_id = Some(id);
        self
    }

    /// Grant a role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.user_roles = self.user_roles.with(role);
        self
    }

    /// Grant roles from raw strings.
    #[must_use]
    pub fn with_roles<I, S>(mut self, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for role in RoleSet::parse(raw).iter() {
            self.user_roles = self.user_roles.with(role.clone());
        }
        self
    }

    /// Record whether the user is a key worker at a prison.
    #[must_use]
    pub fn with_key_worker_at(mut self, prison_id: impl Into<String>, is_key_worker: bool) -> Self {
        self.key_worker_at_prisons
            .get_or_insert_with(HashMap::new)
            .insert(prison_id.into(), is_key_worker);
        self
    }

    /// The active case load: the explicit id, else the case load marked active.
    #[must_use]
    pub fn active_case_load(&self) -> Option<&str> {
        self.active_case_load_id.as_deref().or_else(|| {
            self.case_loads
                .iter()
                .find(|c| c.currently_active)
                .map(|c| c.case_load_id.as_str())
        })
    }

    /// Cached key-worker answer for a prison, if known.
    #[must_use]
    pub fn key_worker_at(&self, prison_id: &str) -> Option<bool> {
        self.key_worker_at_prisons
            .as_ref()
            .and_then(|m| m.get(prison_id).copied())
    }
}

/// Read an explicit `null` the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_missing_lists() {
        let user: User = serde_json::from_str(r#"{"username": "JSMITH"}"#).unwrap();
        assert!(user.case_loads.is_empty());
        assert!(user.user_roles.is_empty());
        assert_eq!(user.auth_source, AuthSource::Nomis);
    }

    #[test]
    fn test_deserialize_with_null_lists() {
        let user: User =
            serde_json::from_str(r#"{"username": "a", "caseLoads": null, "userRoles": null}"#)
                .unwrap();
        assert!(user.case_loads.is_empty());
        assert!(user.user_roles.is_empty());
        assert!(!crate::predicates::is_in_case_load(&user, "LEI"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "username": "JSMITH",
            "authSource": "delius",
            "activeCaseLoadId": "LEI",
            "caseLoads": [{"caseLoadId": "LEI", "currentlyActive": true}],
            "userRoles": ["ROLE_POM"],
            "keyWorkerAtPrisons": {"LEI": true}
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.auth_source, AuthSource::Delius);
        assert_eq!(user.active_case_load(), Some("LEI"));
        assert!(user.user_roles.contains(&Role::PomUser));
        assert_eq!(user.key_worker_at("LEI"), Some(true));
        assert_eq!(user.key_worker_at("MDI"), None);
    }

    #[test]
    fn test_unknown_auth_source() {
        let user: User = serde_json::from_str(r#"{"authSource": "azuread"}"#).unwrap();
        assert_eq!(user.auth_source, AuthSource::Other);
        assert!(!user.auth_source.has_case_loads());
    }

    #[test]
    fn test_active_case_load_falls_back_to_flag() {
        let mut user = User::new("a");
        user.case_loads = vec![CaseLoad::new("MDI"), CaseLoad::new("LEI").active()];
        assert_eq!(user.active_case_load(), Some("LEI"));
    }

    #[test]
    fn test_with_active_case_load_switches_flag() {
        let user = User::new("a")
            .with_case_loads(["MDI", "LEI"])
            .with_active_case_load("LEI");
        let active: Vec<_> = user
            .case_loads
            .iter()
            .filter(|c| c.currently_active)
            .map(|c| c.case_load_id.as_str())
            .collect();
        assert_eq!(active, vec!["LEI"]);
    }
}
