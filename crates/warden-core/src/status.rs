//! Access status codes and the decision sum type behind them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of an access status resolver.
///
/// Distinct denial reasons are kept apart on purpose: callers log and
/// branch on *why* access was refused even though every denial renders the
/// same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatusCode {
    /// Access granted.
    Ok,
    /// Prisoner is outside the user's case loads.
    NotInCaseload,
    /// Prisoner is a restricted patient the user cannot see.
    RestrictedPatient,
    /// Prisoner has been released.
    PrisonerIsReleased,
    /// Prisoner is between establishments.
    PrisonerIsTransferring,
    /// A global-search user reached an area that excludes global search.
    GlobalUserNotPermitted,
    /// The area does not exist for this user.
    NotFound,
}

impl AccessStatusCode {
    /// Whether access was granted.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Convert to the decision sum type.
    ///
    /// # Errors
    ///
    /// Returns the [`DeniedReason`] for every code other than `Ok`.
    pub fn into_decision(self) -> AccessDecision {
        match self {
            Self::Ok => Ok(Granted),
            Self::NotInCaseload => Err(DeniedReason::NotInCaseload),
            Self::RestrictedPatient => Err(DeniedReason::RestrictedPatient),
            Self::PrisonerIsReleased => Err(DeniedReason::PrisonerIsReleased),
            Self::PrisonerIsTransferring => Err(DeniedReason::PrisonerIsTransferring),
            Self::GlobalUserNotPermitted => Err(DeniedReason::GlobalUserNotPermitted),
            Self::NotFound => Err(DeniedReason::NotFound),
        }
    }

    /// Wire name, e.g. `NOT_IN_CASELOAD`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotInCaseload => "NOT_IN_CASELOAD",
            Self::RestrictedPatient => "RESTRICTED_PATIENT",
            Self::PrisonerIsReleased => "PRISONER_IS_RELEASED",
            Self::PrisonerIsTransferring => "PRISONER_IS_TRANSFERRING",
            Self::GlobalUserNotPermitted => "GLOBAL_USER_NOT_PERMITTED",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for AccessStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker for a granted decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granted;

/// Why a resolver refused access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeniedReason {
    /// See [`AccessStatusCode::NotInCaseload`].
    NotInCaseload,
    /// See [`AccessStatusCode::RestrictedPatient`].
    RestrictedPatient,
    /// See [`AccessStatusCode::PrisonerIsReleased`].
    PrisonerIsReleased,
    /// See [`AccessStatusCode::PrisonerIsTransferring`].
    PrisonerIsTransferring,
    /// See [`AccessStatusCode::GlobalUserNotPermitted`].
    GlobalUserNotPermitted,
    /// See [`AccessStatusCode::NotFound`].
    NotFound,
}

impl DeniedReason {
    /// The status code reported for this reason.
    #[must_use]
    pub fn status_code(self) -> AccessStatusCode {
        match self {
            Self::NotInCaseload => AccessStatusCode::NotInCaseload,
            Self::RestrictedPatient => AccessStatusCode::RestrictedPatient,
            Self::PrisonerIsReleased => AccessStatusCode::PrisonerIsReleased,
            Self::PrisonerIsTransferring => AccessStatusCode::PrisonerIsTransferring,
            Self::GlobalUserNotPermitted => AccessStatusCode::GlobalUserNotPermitted,
            Self::NotFound => AccessStatusCode::NotFound,
        }
    }
}

impl fmt::Display for DeniedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.status_code().fmt(f)
    }
}

/// Result of resolving access: granted, or denied with a reason.
pub type AccessDecision = Result<Granted, DeniedReason>;

impl From<AccessDecision> for AccessStatusCode {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            Ok(Granted) => Self::Ok,
            Err(reason) => reason.status_code(),
        }
    }
}
