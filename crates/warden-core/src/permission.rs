//! Per-feature permission grants.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::status::AccessStatusCode;

/// View/edit grant for one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionItem {
    /// Read access.
    pub view: bool,
    /// Write access, absent for read-only features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<bool>,
}

impl PermissionItem {
    /// A grant with both flags.
    #[must_use]
    pub fn new(view: bool, edit: bool) -> Self {
        Self {
            view,
            edit: Some(edit),
        }
    }

    /// A read-only grant.
    #[must_use]
    pub fn view_only(view: bool) -> Self {
        Self { view, edit: None }
    }

    /// Whether edit is granted.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.edit.unwrap_or(false)
    }
}

/// Features that carry a [`PermissionItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    /// Adjudications.
    Adjudications,
    /// Visits.
    Visits,
    /// Incentive levels.
    Incentives,
    /// Security category.
    Category,
    /// Categorisation tool.
    Categorisation,
    /// Alerts.
    Alerts,
    /// Appointments.
    Appointments,
    /// Activities.
    Activities,
    /// Pathfinder referrals.
    Pathfinder,
    /// Serious organised crime referrals.
    Soc,
    /// Use-of-force reports.
    UseOfForce,
    /// Key worker allocation.
    KeyWorker,
    /// Sensitive case notes.
    SensitiveCaseNotes,
    /// Cell moves.
    CellMove,
    /// CSIP referrals.
    Csip,
    /// Probation documents.
    ProbationDocuments,
    /// Case notes.
    CaseNotes,
    /// Money and balances.
    Money,
    /// Location details and history.
    Location,
}

impl Feature {
    /// Every feature, in key order.
    pub const ALL: [Self; 19] = [
        Self::Adjudications,
        Self::Visits,
        Self::Incentives,
        Self::Category,
        Self::Categorisation,
        Self::Alerts,
        Self::Appointments,
        Self::Activities,
        Self::Pathfinder,
        Self::Soc,
        Self::UseOfForce,
        Self::KeyWorker,
        Self::SensitiveCaseNotes,
        Self::CellMove,
        Self::Csip,
        Self::ProbationDocuments,
        Self::CaseNotes,
        Self::Money,
        Self::Location,
    ];

    /// JSON key for this feature.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Adjudications => "adjudications",
            Self::Visits => "visits",
            Self::Incentives => "incentives",
            Self::Category => "category",
            Self::Categorisation => "categorisation",
            Self::Alerts => "alerts",
            Self::Appointments => "appointments",
            Self::Activities => "activities",
            Self::Pathfinder => "pathfinder",
            Self::Soc => "soc",
            Self::UseOfForce => "useOfForce",
            Self::KeyWorker => "keyWorker",
            Self::SensitiveCaseNotes => "sensitiveCaseNotes",
            Self::CellMove => "cellMove",
            Self::Csip => "csip",
            Self::ProbationDocuments => "probationDocuments",
            Self::CaseNotes => "caseNotes",
            Self::Money => "money",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Grants keyed by feature.
pub type FeatureGrants = BTreeMap<Feature, PermissionItem>;

/// The permissions assembled for one request.
///
/// Feature grants exist only on the granted branch; a denied request carries
/// its access code and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permissions {
    /// The resolver refused access.
    Denied {
        /// Why.
        access_code: AccessStatusCode,
    },
    /// The resolver granted access.
    Granted {
        /// Grants for each evaluated feature.
        features: FeatureGrants,
    },
}

impl Permissions {
    /// The access code: `Ok` on the granted branch.
    #[must_use]
    pub fn access_code(&self) -> AccessStatusCode {
        match self {
            Self::Denied { access_code } => *access_code,
            Self::Granted { .. } => AccessStatusCode::Ok,
        }
    }

    /// Whether access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The grant for a feature, if it was evaluated.
    #[must_use]
    pub fn feature(&self, feature: Feature) -> Option<&PermissionItem> {
        match self {
            Self::Denied { .. } => None,
            Self::Granted { features } => features.get(&feature),
        }
    }

    /// Whether the feature's view flag is set.
    #[must_use]
    pub fn can_view(&self, feature: Feature) -> bool {
        self.feature(feature).is_some_and(|p| p.view)
    }

    /// Whether the feature's edit flag is set.
    #[must_use]
    pub fn can_edit(&self, feature: Feature) -> bool {
        self.feature(feature).is_some_and(PermissionItem::can_edit)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Denied { access_code } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("accessCode", access_code)?;
                map.end()
            },
            Self::Granted { features } => {
                let mut map = serializer.serialize_map(features.len().checked_add(1))?;
                map.serialize_entry("accessCode", &AccessStatusCode::Ok)?;
                for (feature, item) in features {
                    map.serialize_entry(feature.key(), item)?;
                }
                map.end()
            },
        }
    }
}
