//! The permissions service.
//!
//! Every aggregator runs in two stages:
//!
//! 1. Resolve the scope's access area to an [`AccessDecision`]
//! 2. On the granted branch only, evaluate the scope's features
//!
//! A denial returns [`Permissions::Denied`] straight away: no evaluator runs
//! and no collaborator is called.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use warden_core::{
    AccessDecision, Feature, FeatureGrants, Granted, PermissionItem, Permissions, Prisoner, User,
};

use crate::area::AccessArea;
use crate::evaluators;
use crate::lookup::{RestrictedPatientLookup, StaffRoleLookup};
use crate::resolver;
use crate::settings::AccessSettings;
use crate::verified::decide_verified;

/// Features assembled for the profile overview.
const OVERVIEW_FEATURES: &[Feature] = &[
    Feature::Adjudications,
    Feature::Visits,
    Feature::Incentives,
    Feature::Category,
    Feature::Categorisation,
    Feature::Alerts,
    Feature::Appointments,
    Feature::Activities,
    Feature::Pathfinder,
    Feature::Soc,
    Feature::UseOfForce,
    Feature::KeyWorker,
    Feature::SensitiveCaseNotes,
    Feature::CellMove,
    Feature::Csip,
    Feature::ProbationDocuments,
];

/// Which aggregator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Profile overview.
    Overview,
    /// Money.
    Money,
    /// Case notes.
    CaseNotes,
    /// Appointments and activities.
    Appointments,
    /// Alerts.
    Alerts,
    /// Editing alerts.
    AlertsEdit,
    /// Location and cell moves.
    Location,
    /// Probation documents.
    ProbationDocuments,
}

impl PermissionScope {
    /// Area resolved before any feature is evaluated.
    #[must_use]
    pub fn area(self) -> AccessArea {
        match self {
            Self::Overview => AccessArea::Overview,
            Self::Money => AccessArea::Money,
            Self::CaseNotes => AccessArea::CaseNotes,
            Self::Appointments | Self::AlertsEdit => AccessArea::ActiveCaseLoadOnly,
            Self::Alerts => AccessArea::Alerts,
            Self::Location => AccessArea::Location,
            Self::ProbationDocuments => AccessArea::ProbationDocuments,
        }
    }

    /// Features evaluated on the granted branch.
    #[must_use]
    pub fn features(self) -> &'static [Feature] {
        match self {
            Self::Overview => OVERVIEW_FEATURES,
            Self::Money => &[Feature::Money],
            Self::CaseNotes => &[Feature::CaseNotes, Feature::SensitiveCaseNotes],
            Self::Appointments => &[Feature::Appointments, Feature::Activities],
            Self::Alerts | Self::AlertsEdit => &[Feature::Alerts],
            Self::Location => &[Feature::Location, Feature::CellMove],
            Self::ProbationDocuments => &[Feature::ProbationDocuments],
        }
    }

    /// Name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Money => "money",
            Self::CaseNotes => "case_notes",
            Self::Appointments => "appointments",
            Self::Alerts => "alerts",
            Self::AlertsEdit => "alerts_edit",
            Self::Location => "location",
            Self::ProbationDocuments => "probation_documents",
        }
    }
}

/// Assembles [`Permissions`] for a user looking at a prisoner.
pub struct PermissionsService {
    restricted_patients: Arc<dyn RestrictedPatientLookup>,
    staff_roles: Arc<dyn StaffRoleLookup>,
    settings: AccessSettings,
}

impl PermissionsService {
    /// Create a service with default settings.
    #[must_use]
    pub fn new(
        restricted_patients: Arc<dyn RestrictedPatientLookup>,
        staff_roles: Arc<dyn StaffRoleLookup>,
    ) -> Self {
        Self {
            restricted_patients,
            staff_roles,
            settings: AccessSettings::default(),
        }
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: AccessSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &AccessSettings {
        &self.settings
    }

    /// Run the aggregator for `scope`.
    pub async fn permissions(
        &self,
        scope: PermissionScope,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        match self.decide(scope.area(), user, prisoner, client_token).await {
            Err(reason) => {
                if self.settings.log_denials {
                    info!(
                        scope = scope.as_str(),
                        username = %user.username,
                        prisoner_number = %prisoner.prisoner_number,
                        prison_id = %prisoner.prison_id,
                        access_code = %reason,
                        "Access denied"
                    );
                }
                Permissions::Denied {
                    access_code: reason.status_code(),
                }
            },
            Ok(Granted) => {
                let features = self
                    .evaluate(scope, user, prisoner, client_token)
                    .await;
                debug!(
                    scope = scope.as_str(),
                    prisoner_number = %prisoner.prisoner_number,
                    features = features.len(),
                    "Permissions assembled"
                );
                Permissions::Granted { features }
            },
        }
    }

    /// Resolve `area`, confirming the supporting prison when configured to.
    ///
    /// # Errors
    ///
    /// Returns the [`warden_core::DeniedReason`] when access is refused.
    pub async fn decide(
        &self,
        area: AccessArea,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> AccessDecision {
        if self.settings.verify_supporting_prison_active {
            decide_verified(
                area,
                user,
                prisoner,
                self.restricted_patients.as_ref(),
                client_token,
            )
            .await
        } else {
            resolver::decide(area, user, prisoner)
        }
    }

    async fn evaluate(
        &self,
        scope: PermissionScope,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> FeatureGrants {
        let mut features = FeatureGrants::new();
        for &feature in scope.features() {
            let item = match evaluators::evaluate(feature, user, prisoner) {
                Some(item) => item,
                None => self.key_worker(user, prisoner, client_token).await,
            };
            features.insert(feature, item);
        }

        if scope == PermissionScope::AlertsEdit
            && let Some(alerts) = features.get_mut(&Feature::Alerts)
        {
            alerts.view = false;
        }
        features
    }

    async fn key_worker(&self, user: &User, prisoner: &Prisoner, client_token: &str) -> PermissionItem {
        evaluators::key_worker(
            user,
            prisoner,
            self.staff_roles.as_ref(),
            client_token,
            &self.settings.key_worker_role_code,
        )
        .await
    }

    /// Profile overview permissions.
    pub async fn overview_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::Overview, user, prisoner, client_token)
            .await
    }

    /// Money permissions.
    pub async fn money_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::Money, user, prisoner, client_token)
            .await
    }

    /// Case notes permissions.
    pub async fn case_notes_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::CaseNotes, user, prisoner, client_token)
            .await
    }

    /// Appointment and activity permissions.
    pub async fn appointment_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::Appointments, user, prisoner, client_token)
            .await
    }

    /// Alerts permissions.
    pub async fn alerts_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::Alerts, user, prisoner, client_token)
            .await
    }

    /// Alerts permissions for edit pages. `view` is always false.
    pub async fn alerts_edit_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::AlertsEdit, user, prisoner, client_token)
            .await
    }

    /// Location permissions.
    pub async fn location_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(PermissionScope::Location, user, prisoner, client_token)
            .await
    }

    /// Probation documents permissions.
    pub async fn probation_documents_permissions(
        &self,
        user: &User,
        prisoner: &Prisoner,
        client_token: &str,
    ) -> Permissions {
        self.permissions(
            PermissionScope::ProbationDocuments,
            user,
            prisoner,
            client_token,
        )
        .await
    }
}

impl std::fmt::Debug for PermissionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionsService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
