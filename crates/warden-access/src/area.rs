//! Protected areas and the rules each one resolves access with.

use serde::{Deserialize, Serialize};
use std::fmt;

use warden_core::Role;

/// Roles that may open probation documents at all.
pub const PROBATION_DOCUMENT_ROLES: &[Role] = &[Role::PomUser, Role::ViewProbationDocuments];

/// A protected area of the prisoner profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessArea {
    /// Profile overview and most tabs.
    Overview,
    /// Money and balances.
    Money,
    /// Case notes.
    CaseNotes,
    /// Alerts.
    Alerts,
    /// Location details and cell moves.
    Location,
    /// Probation documents.
    ProbationDocuments,
    /// Pages limited to the user's active case load.
    ActiveCaseLoadOnly,
}

impl AccessArea {
    /// Every area.
    pub const ALL: [Self; 7] = [
        Self::Overview,
        Self::Money,
        Self::CaseNotes,
        Self::Alerts,
        Self::Location,
        Self::ProbationDocuments,
        Self::ActiveCaseLoadOnly,
    ];

    /// Rules for this area.
    #[must_use]
    pub(crate) fn rules(self) -> AreaRules {
        match self {
            Self::Overview | Self::Alerts => AreaRules::BASELINE,
            Self::CaseNotes => AreaRules {
                pom_in_case_load: false,
                ..AreaRules::BASELINE
            },
            Self::Money => AreaRules {
                location_overrides: false,
                global_in_case_load: false,
                pom_in_case_load: false,
                ..AreaRules::BASELINE
            },
            Self::ProbationDocuments => AreaRules {
                role_gate: PROBATION_DOCUMENT_ROLES,
                ..AreaRules::BASELINE
            },
            Self::Location | Self::ActiveCaseLoadOnly => AreaRules::ACTIVE_ONLY,
        }
    }

    /// Name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Money => "money",
            Self::CaseNotes => "case_notes",
            Self::Alerts => "alerts",
            Self::Location => "location",
            Self::ProbationDocuments => "probation_documents",
            Self::ActiveCaseLoadOnly => "active_case_load_only",
        }
    }
}

impl fmt::Display for AccessArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named switches accepted by [`crate::resolve_with_options`].
///
/// Absent switches are permissive: global search and inactive bookings
/// overrides apply, and any case load counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessOptions {
    /// Let `GLOBAL_SEARCH` lift the transferring and case-load checks.
    pub allow_global: bool,
    /// Let `INACTIVE_BOOKINGS` lift the restricted, released and transferring checks.
    pub allow_inactive: bool,
    /// Require the prisoner to be in the user's active case load.
    pub active_case_load_only: bool,
}

impl Default for AccessOptions {
    fn default() -> Self {
        Self {
            allow_global: true,
            allow_inactive: true,
            active_case_load_only: false,
        }
    }
}

impl AccessOptions {
    /// Disallow the global search override.
    #[must_use]
    pub fn without_global(mut self) -> Self {
        self.allow_global = false;
        self
    }

    /// Disallow the inactive bookings override.
    #[must_use]
    pub fn without_inactive(mut self) -> Self {
        self.allow_inactive = false;
        self
    }

    /// Require the active case load.
    #[must_use]
    pub fn require_active_case_load(mut self) -> Self {
        self.active_case_load_only = true;
        self
    }

    pub(crate) fn rules(self) -> AreaRules {
        let base = if self.active_case_load_only {
            AreaRules::ACTIVE_ONLY
        } else {
            AreaRules::BASELINE
        };
        AreaRules {
            inactive_override: self.allow_inactive,
            global_in_transit: self.allow_global,
            global_in_case_load: self.allow_global && !self.active_case_load_only,
            ..base
        }
    }
}

/// How step 4 of the precedence decides case-load membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaseLoadRule {
    /// Any of the user's case loads.
    Any,
    /// Only the active case load.
    Active,
}

/// The knobs that distinguish one area's precedence from another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AreaRules {
    /// Roles required before anything else; empty means no gate.
    pub(crate) role_gate: &'static [Role],
    /// `INACTIVE_BOOKINGS` lifts restricted/released/transferring.
    pub(crate) inactive_override: bool,
    /// Released and transferring can be lifted at all.
    pub(crate) location_overrides: bool,
    /// `GLOBAL_SEARCH` lifts transferring.
    pub(crate) global_in_transit: bool,
    /// `GLOBAL_SEARCH` lifts the case-load check.
    pub(crate) global_in_case_load: bool,
    /// `POM` lifts the case-load check.
    pub(crate) pom_in_case_load: bool,
    /// Membership rule for step 4.
    pub(crate) case_load: CaseLoadRule,
}

impl AreaRules {
    pub(crate) const BASELINE: Self = Self {
        role_gate: &[],
        inactive_override: true,
        location_overrides: true,
        global_in_transit: true,
        global_in_case_load: true,
        pom_in_case_load: true,
        case_load: CaseLoadRule::Any,
    };

    pub(crate) const ACTIVE_ONLY: Self = Self {
        global_in_case_load: false,
        pom_in_case_load: false,
        case_load: CaseLoadRule::Active,
        ..Self::BASELINE
    };
}
