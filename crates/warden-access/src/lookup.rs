//! Upstream collaborators consulted by resolvers and evaluators.
//!
//! Both lookups are single-shot and asynchronous. Neither is retried: a
//! failure means "cannot verify" and the caller denies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors returned by upstream lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The upstream service could not be reached or returned an error.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The upstream service refused our credentials.
    #[error("upstream rejected credentials: {0}")]
    Unauthorised(String),

    /// The response could not be interpreted.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Result type for upstream lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// The supporting prison recorded for a restricted patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingPrison {
    /// Establishment code.
    pub agency_id: String,
    /// Whether the establishment is active.
    pub active: bool,
}

impl SupportingPrison {
    /// Create a supporting prison record.
    #[must_use]
    pub fn new(agency_id: impl Into<String>, active: bool) -> Self {
        Self {
            agency_id: agency_id.into(),
            active,
        }
    }
}

/// Looks up the supporting prison of a restricted patient.
#[async_trait]
pub trait RestrictedPatientLookup: Send + Sync {
    /// Fetch the supporting prison for `prisoner_number`.
    ///
    /// Returns `Ok(None)` when the upstream has no restricted-patient record.
    async fn supporting_prison(
        &self,
        client_token: &str,
        prisoner_number: &str,
    ) -> LookupResult<Option<SupportingPrison>>;
}

/// Looks up a staff member's job roles at an establishment.
#[async_trait]
pub trait StaffRoleLookup: Send + Sync {
    /// Fetch job role codes (e.g. `KW`) for `staff_id` at `agency_id`.
    ///
    /// Returns `Ok(None)` when the upstream has nothing for this staff member.
    async fn staff_roles(
        &self,
        client_token: &str,
        staff_id: i64,
        agency_id: &str,
    ) -> LookupResult<Option<Vec<String>>>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Restricted patient lookup with a canned answer.
    pub(crate) struct FakeRestrictedPatients {
        answer: LookupResult<Option<SupportingPrison>>,
        calls: AtomicUsize,
    }

    impl FakeRestrictedPatients {
        pub(crate) fn new(answer: LookupResult<Option<SupportingPrison>>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RestrictedPatientLookup for FakeRestrictedPatients {
        async fn supporting_prison(
            &self,
            _client_token: &str,
            _prisoner_number: &str,
        ) -> LookupResult<Option<SupportingPrison>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    /// Staff role lookup with a canned answer.
    pub(crate) struct FakeStaffRoles {
        answer: LookupResult<Option<Vec<String>>>,
        calls: AtomicUsize,
    }

    impl FakeStaffRoles {
        pub(crate) fn new(answer: LookupResult<Option<Vec<String>>>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn roles(codes: &[&str]) -> Self {
            Self::new(Ok(Some(codes.iter().map(ToString::to_string).collect())))
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StaffRoleLookup for FakeStaffRoles {
        async fn staff_roles(
            &self,
            _client_token: &str,
            _staff_id: i64,
            _agency_id: &str,
        ) -> LookupResult<Option<Vec<String>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }
}
