//! Access status resolvers.
//!
//! Every area applies the same precedence, first match wins:
//!
//! 0. Area role gate not satisfied -> `NotFound`
//! 1. Restricted patient -> `Ok` for a POM holding the supporting prison's
//!    case load, or for `INACTIVE_BOOKINGS`; otherwise `RestrictedPatient`
//! 2. Released -> `Ok` for `INACTIVE_BOOKINGS`; otherwise `PrisonerIsReleased`
//! 3. Transferring -> `Ok` for `GLOBAL_SEARCH` or `INACTIVE_BOOKINGS`;
//!    otherwise `PrisonerIsTransferring`
//! 4. Case load -> `Ok` for a case-load match, `GLOBAL_SEARCH`, or (area
//!    dependent) `POM`; otherwise `NotInCaseload`
//!
//! Areas differ only in which overrides they honour.
//! A restricted patient is always judged by step 1 alone, even when the
//! `prisonId` is a release or transfer sentinel.

use warden_core::predicates::{has_role, is_active_case_load, is_in_case_load};
use warden_core::{
    AccessDecision, AccessStatusCode, DeniedReason, Granted, PrisonLocation, Prisoner, Role,
    User,
};

use crate::area::{AccessArea, AccessOptions, AreaRules, CaseLoadRule};
use crate::lookup::SupportingPrison;

/// What is known about a restricted patient's supporting prison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SupportingPrisonCheck<'a> {
    /// No upstream lookup; the prisoner record is trusted.
    Unverified,
    /// Upstream answer, `None` when missing or failed.
    Verified(Option<&'a SupportingPrison>),
}

/// Resolve access for `area`.
#[must_use]
pub fn resolve(area: AccessArea, user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    decide(area, user, prisoner).into()
}

/// Resolve access for `area` as a decision.
///
/// # Errors
///
/// Returns the [`DeniedReason`] when access is refused.
pub fn decide(area: AccessArea, user: &User, prisoner: &Prisoner) -> AccessDecision {
    apply_rules(
        user,
        prisoner,
        area.rules(),
        SupportingPrisonCheck::Unverified,
    )
}

/// Resolve access with the overview precedence adjusted by `options`.
#[must_use]
pub fn resolve_with_options(
    user: &User,
    prisoner: &Prisoner,
    options: AccessOptions,
) -> AccessStatusCode {
    apply_rules(
        user,
        prisoner,
        options.rules(),
        SupportingPrisonCheck::Unverified,
    )
    .into()
}

/// Profile overview.
#[must_use]
pub fn overview_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::Overview, user, prisoner)
}

/// Money. Released and transferring prisoners are refused whatever the
/// user's roles, and global search does not reach outside the case loads.
#[must_use]
pub fn money_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::Money, user, prisoner)
}

/// Case notes. `POM` does not lift the case-load check.
#[must_use]
pub fn case_notes_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::CaseNotes, user, prisoner)
}

/// Alerts.
#[must_use]
pub fn alerts_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::Alerts, user, prisoner)
}

/// Location details.
#[must_use]
pub fn location_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::Location, user, prisoner)
}

/// Probation documents. Users without `POM` or `VIEW_PROBATION_DOCUMENTS`
/// get `NotFound` before any custodial check.
#[must_use]
pub fn probation_documents_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::ProbationDocuments, user, prisoner)
}

/// Pages limited to the active case load.
#[must_use]
pub fn active_case_load_only_access(user: &User, prisoner: &Prisoner) -> AccessStatusCode {
    resolve(AccessArea::ActiveCaseLoadOnly, user, prisoner)
}

/// Whether resolving `area` would consult the supporting prison lookup.
///
/// Only a restricted patient whose fate hangs on the POM path needs it: the
/// inactive bookings override, a failed role gate, or a user who could never
/// pass the POM path all settle the answer without upstream data.
#[must_use]
pub(crate) fn needs_supporting_prison(rules: AreaRules, user: &User, prisoner: &Prisoner) -> bool {
    prisoner.restricted_patient
        && passes_role_gate(rules, user)
        && !inactive_override(rules, user)
        && pom_holds_supporting_case_load(user, prisoner)
}

/// Apply the precedence for one set of rules.
pub(crate) fn apply_rules(
    user: &User,
    prisoner: &Prisoner,
    rules: AreaRules,
    supporting: SupportingPrisonCheck<'_>,
) -> AccessDecision {
    if !passes_role_gate(rules, user) {
        return Err(DeniedReason::NotFound);
    }

    if prisoner.restricted_patient {
        return restricted_patient(user, prisoner, rules, supporting);
    }

    match prisoner.location() {
        PrisonLocation::Released => released(user, rules),
        PrisonLocation::Transferring => transferring(user, rules),
        PrisonLocation::Establishment(code) => case_load(user, code, rules),
    }
}

fn passes_role_gate(rules: AreaRules, user: &User) -> bool {
    rules.role_gate.is_empty() || user.user_roles.has_any(rules.role_gate)
}

fn inactive_override(rules: AreaRules, user: &User) -> bool {
    rules.inactive_override && has_role(user, &Role::InactiveBookings)
}

fn global_search(user: &User) -> bool {
    has_role(user, &Role::GlobalSearch)
}

fn pom_holds_supporting_case_load(user: &User, prisoner: &Prisoner) -> bool {
    has_role(user, &Role::PomUser)
        && prisoner
            .supporting_prison_id
            .as_deref()
            .is_some_and(|id| is_in_case_load(user, id))
}

fn restricted_patient(
    user: &User,
    prisoner: &Prisoner,
    rules: AreaRules,
    supporting: SupportingPrisonCheck<'_>,
) -> AccessDecision {
    if inactive_override(rules, user) {
        return Ok(Granted);
    }

    let supporting_confirmed = match supporting {
        SupportingPrisonCheck::Unverified => true,
        SupportingPrisonCheck::Verified(Some(found)) => {
            found.active && prisoner.supporting_prison_id.as_deref() == Some(found.agency_id.as_str())
        },
        SupportingPrisonCheck::Verified(None) => false,
    };

    if supporting_confirmed && pom_holds_supporting_case_load(user, prisoner) {
        Ok(Granted)
    } else {
        Err(DeniedReason::RestrictedPatient)
    }
}

fn released(user: &User, rules: AreaRules) -> AccessDecision {
    if rules.location_overrides && inactive_override(rules, user) {
        Ok(Granted)
    } else {
        Err(DeniedReason::PrisonerIsReleased)
    }
}

fn transferring(user: &User, rules: AreaRules) -> AccessDecision {
    let lifted =
        inactive_override(rules, user) || (rules.global_in_transit && global_search(user));
    if rules.location_overrides && lifted {
        Ok(Granted)
    } else {
        Err(DeniedReason::PrisonerIsTransferring)
    }
}

fn case_load(user: &User, prison_id: &str, rules: AreaRules) -> AccessDecision {
    let member = match rules.case_load {
        CaseLoadRule::Any => is_in_case_load(user, prison_id),
        CaseLoadRule::Active => is_active_case_load(user, prison_id),
    };
    if member || (rules.pom_in_case_load && has_role(user, &Role::PomUser)) {
        return Ok(Granted);
    }

    match (global_search(user), rules.global_in_case_load) {
        (true, true) => Ok(Granted),
        (true, false) => Err(DeniedReason::GlobalUserNotPermitted),
        (false, _) => Err(DeniedReason::NotInCaseload),
    }
}
