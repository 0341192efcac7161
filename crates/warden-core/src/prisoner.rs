//! The prisoner whose profile is being requested.

use serde::{Deserialize, Serialize};

/// `prisonId` value for a released prisoner.
pub const RELEASED_PRISON_ID: &str = "OUT";

/// `prisonId` value for a prisoner in transit between establishments.
pub const TRANSFERRING_PRISON_ID: &str = "TRN";

/// Custody status of a prisoner temporarily outside the establishment.
pub const ACTIVE_OUT_STATUS: &str = "ACTIVE OUT";

/// Where the prisoner currently is, as far as access rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrisonLocation<'a> {
    /// Released from custody.
    Released,
    /// Between establishments.
    Transferring,
    /// Held at an establishment.
    Establishment(&'a str),
}

/// Prisoner descriptor, immutable for the life of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prisoner {
    /// Prisoner number, e.g. `G6123VU`.
    #[serde(default)]
    pub prisoner_number: String,
    /// Establishment code or one of the location sentinels.
    pub prison_id: String,
    /// Held in external (e.g. secure hospital) custody.
    #[serde(default)]
    pub restricted_patient: bool,
    /// Establishment supporting a restricted patient.
    #[serde(default)]
    pub supporting_prison_id: Option<String>,
    /// Custody status string.
    #[serde(default)]
    pub status: Option<String>,
}

impl Prisoner {
    /// Create a prisoner held at `prison_id`.
    #[must_use]
    pub fn new(prisoner_number: impl Into<String>, prison_id: impl Into<String>) -> Self {
        Self {
            prisoner_number: prisoner_number.into(),
            prison_id: prison_id.into(),
            ..Self::default()
        }
    }

    /// Mark as a restricted patient supported by `supporting_prison_id`.
    #[must_use]
    pub fn restricted(mut self, supporting_prison_id: impl Into<String>) -> Self {
        self.restricted_patient = true;
        self.supporting_prison_id = Some(supporting_prison_id.into());
        self
    }

    /// Set the custody status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Classify `prison_id`.
    #[must_use]
    pub fn location(&self) -> PrisonLocation<'_> {
        match self.prison_id.as_str() {
            RELEASED_PRISON_ID => PrisonLocation::Released,
            TRANSFERRING_PRISON_ID => PrisonLocation::Transferring,
            code => PrisonLocation::Establishment(code),
        }
    }

    /// Released from custody.
    #[must_use]
    pub fn is_released(&self) -> bool {
        matches!(self.location(), PrisonLocation::Released)
    }

    /// In transit between establishments.
    #[must_use]
    pub fn is_transferring(&self) -> bool {
        matches!(self.location(), PrisonLocation::Transferring)
    }

    /// Temporarily outside the establishment (court, hospital escort, ...).
    #[must_use]
    pub fn is_active_out(&self) -> bool {
        self.status.as_deref() == Some(ACTIVE_OUT_STATUS)
    }
}
