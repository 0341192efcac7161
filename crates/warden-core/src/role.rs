//! Typed staff roles.
//!
//! Role strings arrive from the authentication service with an optional
//! `ROLE_` prefix (`ROLE_GLOBAL_SEARCH`, `role_POM`, `GLOBAL_SEARCH`). They are
//! normalised exactly once, in [`Role::parse`], and every check downstream
//! compares enum values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Conventional prefix carried by role names issued by the auth service.
pub const ROLE_PREFIX: &str = "ROLE_";

/// A staff role grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Search for prisoners outside the user's case loads.
    GlobalSearch,
    /// View released and transferring prisoners.
    InactiveBookings,
    /// Prison Offender Manager.
    PomUser,
    /// Reception staff.
    ReceptionUser,
    /// Read probation documents.
    ViewProbationDocuments,
    /// Review adjudications.
    AdjudicationsReviewer,
    /// Maintain incentive levels.
    MaintainIncentiveLevels,
    /// Start a categorisation.
    CreateCategorisation,
    /// Start a recategorisation.
    CreateRecategorisation,
    /// Approve categorisations.
    ApproveCategorisation,
    /// Security team categorisation referrals.
    CategorisationSecurity,
    /// Create and update alerts.
    UpdateAlert,
    /// Activities hub administration.
    ActivityHub,
    /// Pathfinder: standard prison user.
    PathfinderStdPrison,
    /// Pathfinder: standard probation user.
    PathfinderStdProbation,
    /// Pathfinder: approver.
    PathfinderApproval,
    /// Pathfinder: read-only prison user.
    PathfinderStdPrisonRo,
    /// Pathfinder: read-only probation user.
    PathfinderStdProbationRo,
    /// Pathfinder: police.
    PathfinderPolice,
    /// Pathfinder: headquarters.
    PathfinderHq,
    /// Pathfinder: psychologist.
    PathfinderPsychologist,
    /// Pathfinder: national reader.
    PathfinderNationalReader,
    /// Pathfinder: local reader.
    PathfinderLocalReader,
    /// Pathfinder: administrator.
    PathfinderAdmin,
    /// Serious organised crime: custody.
    SocCustody,
    /// Serious organised crime: community.
    SocCommunity,
    /// Serious organised crime: headquarters.
    SocHq,
    /// Serious organised crime: data analyst.
    SocDataAnalyst,
    /// Serious organised crime: data entry.
    SocDataEntry,
    /// Key worker (OMIC) administration.
    OmicAdmin,
    /// Read sensitive case notes.
    ViewSensitiveCaseNotes,
    /// Add sensitive case notes.
    AddSensitiveCaseNotes,
    /// Move prisoners between cells.
    CellMove,
    /// CSIP referral processing.
    CsipProcessor,
    /// Report use of force outside the active establishment.
    UseOfForce,
    /// Book and schedule visits.
    VisitScheduler,
    /// Any role this crate does not act on. Stored without the prefix.
    Other(String),
}

/// Canonical name for every known role.
const KNOWN_ROLES: &[(Role, &str)] = &[
    (Role::GlobalSearch, "GLOBAL_SEARCH"),
    (Role::InactiveBookings, "INACTIVE_BOOKINGS"),
    (Role::PomUser, "POM"),
    (Role::ReceptionUser, "RECEPTION_USER"),
    (Role::ViewProbationDocuments, "VIEW_PROBATION_DOCUMENTS"),
    (Role::AdjudicationsReviewer, "ADJUDICATIONS_REVIEWER"),
    (Role::MaintainIncentiveLevels, "MAINTAIN_IEP"),
    (Role::CreateCategorisation, "CREATE_CATEGORISATION"),
    (Role::CreateRecategorisation, "CREATE_RECATEGORISATION"),
    (Role::ApproveCategorisation, "APPROVE_CATEGORISATION"),
    (Role::CategorisationSecurity, "CATEGORISATION_SECURITY"),
    (Role::UpdateAlert, "UPDATE_ALERT"),
    (Role::ActivityHub, "ACTIVITY_HUB"),
    (Role::PathfinderStdPrison, "PF_STD_PRISON"),
    (Role::PathfinderStdProbation, "PF_STD_PROBATION"),
    (Role::PathfinderApproval, "PF_APPROVAL"),
    (Role::PathfinderStdPrisonRo, "PF_STD_PRISON_RO"),
    (Role::PathfinderStdProbationRo, "PF_STD_PROBATION_RO"),
    (Role::PathfinderPolice, "PF_POLICE"),
    (Role::PathfinderHq, "PF_HQ"),
    (Role::PathfinderPsychologist, "PF_PSYCHOLOGIST"),
    (Role::PathfinderNationalReader, "PF_NATIONAL_READER"),
    (Role::PathfinderLocalReader, "PF_LOCAL_READER"),
    (Role::PathfinderAdmin, "PF_ADMIN"),
    (Role::SocCustody, "SOC_CUSTODY"),
    (Role::SocCommunity, "SOC_COMMUNITY"),
    (Role::SocHq, "SOC_HQ"),
    (Role::SocDataAnalyst, "SOC_DATA_ANALYST"),
    (Role::SocDataEntry, "SOC_DATA_ENTRY"),
    (Role::OmicAdmin, "OMIC_ADMIN"),
    (Role::ViewSensitiveCaseNotes, "VIEW_SENSITIVE_CASE_NOTES"),
    (Role::AddSensitiveCaseNotes, "ADD_SENSITIVE_CASE_NOTES"),
    (Role::CellMove, "CELL_MOVE"),
    (Role::CsipProcessor, "CSIP_PROCESSOR"),
    (Role::UseOfForce, "USE_OF_FORCE"),
    (Role::VisitScheduler, "VISIT_SCHEDULER"),
];

impl Role {
    /// Parse a role string as issued by the auth service.
    ///
    /// The `ROLE_` prefix is optional and matched case-insensitively; the
    /// remainder must match the canonical name exactly. Unrecognised names
    /// become [`Role::Other`].
    ///
    /// # Example
    ///
    /// ```
    /// use warden_core::Role;
    ///
    /// assert_eq!(Role::parse("ROLE_GLOBAL_SEARCH"), Role::GlobalSearch);
    /// assert_eq!(Role::parse("role_POM"), Role::PomUser);
    /// assert_eq!(Role::parse("POM"), Role::PomUser);
    /// assert_eq!(Role::parse("ROLE_pom"), Role::Other("pom".to_string()));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let name = strip_role_prefix(raw.trim());
        KNOWN_ROLES
            .iter()
            .find(|(_, canonical)| *canonical == name)
            .map_or_else(|| Self::Other(name.to_string()), |(role, _)| role.clone())
    }

    /// Canonical name, without prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        if let Self::Other(name) = self {
            return name;
        }
        KNOWN_ROLES
            .iter()
            .find(|(role, _)| role == self)
            .map_or("", |(_, canonical)| canonical)
    }

    /// Whether this is one of the roles the access rules act on.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Roles that manage or refer categorisations.
    #[must_use]
    pub fn categorisation_roles() -> &'static [Role] {
        CATEGORISATION_ROLES
    }

    /// Every Pathfinder role.
    #[must_use]
    pub fn pathfinder_roles() -> &'static [Role] {
        PATHFINDER_ROLES
    }

    /// Every serious-organised-crime role.
    #[must_use]
    pub fn soc_roles() -> &'static [Role] {
        SOC_ROLES
    }
}

const CATEGORISATION_ROLES: &[Role] = &[
    Role::CreateCategorisation,
    Role::CreateRecategorisation,
    Role::ApproveCategorisation,
    Role::CategorisationSecurity,
];

const PATHFINDER_ROLES: &[Role] = &[
    Role::PathfinderStdPrison,
    Role::PathfinderStdProbation,
    Role::PathfinderApproval,
    Role::PathfinderStdPrisonRo,
    Role::PathfinderStdProbationRo,
    Role::PathfinderPolice,
    Role::PathfinderHq,
    Role::PathfinderPsychologist,
    Role::PathfinderNationalReader,
    Role::PathfinderLocalReader,
    Role::PathfinderAdmin,
];

const SOC_ROLES: &[Role] = &[
    Role::SocCustody,
    Role::SocCommunity,
    Role::SocHq,
    Role::SocDataAnalyst,
    Role::SocDataEntry,
];

/// Remove a leading `ROLE_` prefix, ignoring the prefix's case.
fn strip_role_prefix(raw: &str) -> &str {
    match raw.get(..ROLE_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(ROLE_PREFIX) => &raw[ROLE_PREFIX.len()..],
        _ => raw,
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// The set of roles held by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    /// An empty role set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse role strings, normalising each one.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(raw.into_iter().map(|r| Role::parse(r.as_ref())).collect())
    }

    /// Add a role.
    #[must_use]
    pub fn with(mut self, role: Role) -> Self {
        self.0.insert(role);
        self
    }

    /// Whether the role is held.
    #[must_use]
    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    /// Whether at least one of `roles` is held. An empty slice is never satisfied.
    #[must_use]
    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.0.contains(r))
    }

    /// Whether every one of `roles` is held. An empty slice is always satisfied.
    #[must_use]
    pub fn has_all(&self, roles: &[Role]) -> bool {
        roles.iter().all(|r| self.0.contains(r))
    }

    /// Number of roles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no roles are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over held roles.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
