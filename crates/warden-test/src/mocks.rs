//! Mock collaborators for testing.
//!
//! Both mocks record every call so tests can assert that a denial made no
//! upstream request. Clones share their state.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use warden_access::{
    LookupError, LookupResult, RestrictedPatientLookup, StaffRoleLookup, SupportingPrison,
};

/// A recorded restricted patient lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedPatientCall {
    /// Client token passed.
    pub client_token: String,
    /// Prisoner looked up.
    pub prisoner_number: String,
}

/// Mock [`RestrictedPatientLookup`].
///
/// Answers `Ok(None)` until configured.
#[derive(Debug, Clone)]
pub struct MockRestrictedPatientLookup {
    response: Arc<Mutex<LookupResult<Option<SupportingPrison>>>>,
    calls: Arc<Mutex<Vec<RestrictedPatientCall>>>,
}

impl Default for MockRestrictedPatientLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRestrictedPatientLookup {
    /// Create a mock with no restricted-patient record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(None))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer with a supporting prison.
    #[must_use]
    pub fn with_supporting_prison(self, agency_id: &str, active: bool) -> Self {
        self.set_response(Ok(Some(SupportingPrison::new(agency_id, active))));
        self
    }

    /// Fail every lookup.
    #[must_use]
    pub fn with_error(self, error: LookupError) -> Self {
        self.set_response(Err(error));
        self
    }

    /// Replace the canned response.
    pub fn set_response(&self, response: LookupResult<Option<SupportingPrison>>) {
        if let Ok(mut guard) = self.response.lock() {
            *guard = response;
        }
    }

    /// Number of lookups made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Every lookup made, in order.
    #[must_use]
    pub fn recorded_calls(&self) -> Vec<RestrictedPatientCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RestrictedPatientLookup for MockRestrictedPatientLookup {
    async fn supporting_prison(
        &self,
        client_token: &str,
        prisoner_number: &str,
    ) -> LookupResult<Option<SupportingPrison>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RestrictedPatientCall {
                client_token: client_token.to_string(),
                prisoner_number: prisoner_number.to_string(),
            });
        }
        self.response
            .lock()
            .map_err(|_| LookupError::Unavailable("mock poisoned".to_string()))?
            .clone()
    }
}

/// A recorded staff role lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRoleCall {
    /// Staff member looked up.
    pub staff_id: i64,
    /// Establishment asked about.
    pub agency_id: String,
}

/// Mock [`StaffRoleLookup`].
///
/// Answers `Ok(None)` until configured.
#[derive(Debug, Clone)]
pub struct MockStaffRoleLookup {
    response: Arc<Mutex<LookupResult<Option<Vec<String>>>>>,
    calls: Arc<Mutex<Vec<StaffRoleCall>>>,
}

impl Default for MockStaffRoleLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStaffRoleLookup {
    /// Create a mock with no staff roles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(None))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer with these job role codes.
    #[must_use]
    pub fn with_roles(self, codes: &[&str]) -> Self {
        self.set_response(Ok(Some(codes.iter().map(ToString::to_string).collect())));
        self
    }

    /// Answer as if the user is a key worker (`KW`).
    #[must_use]
    pub fn key_worker(self) -> Self {
        self.with_roles(&[warden_access::DEFAULT_KEY_WORKER_ROLE_CODE])
    }

    /// Fail every lookup.
    #[must_use]
    pub fn with_error(self, error: LookupError) -> Self {
        self.set_response(Err(error));
        self
    }

    /// Replace the canned response.
    pub fn set_response(&self, response: LookupResult<Option<Vec<String>>>) {
        if let Ok(mut guard) = self.response.lock() {
            *guard = response;
        }
    }

    /// Number of lookups made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Every lookup made, in order.
    #[must_use]
    pub fn recorded_calls(&self) -> Vec<StaffRoleCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl StaffRoleLookup for MockStaffRoleLookup {
    async fn staff_roles(
        &self,
        _client_token: &str,
        staff_id: i64,
        agency_id: &str,
    ) -> LookupResult<Option<Vec<String>>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(StaffRoleCall {
                staff_id,
                agency_id: agency_id.to_string(),
            });
        }
        self.response
            .lock()
            .map_err(|_| LookupError::Unavailable("mock poisoned".to_string()))?
            .clone()
    }
}
