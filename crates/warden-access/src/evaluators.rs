//! Per-feature permission evaluators.
//!
//! Each evaluator maps a (user, prisoner) pair to a [`PermissionItem`] and
//! is independent of the status resolvers: callers consult a resolver first
//! and only evaluate features for a granted request. Every evaluator is pure
//! except [`key_worker`], which may ask the staff role lookup.
//!
//! Terms used below:
//! - *in case load*: the prisoner's `prisonId` is one of the user's case loads
//! - *active*: the prisoner's `prisonId` is the user's active case load
//! - *restricted*: the prisoner is a restricted patient

use tracing::{debug, warn};

use warden_core::predicates::{has_any_role, has_role, is_active_case_load, is_in_case_load};
use warden_core::{Feature, PermissionItem, Prisoner, Role, User};

use crate::lookup::StaffRoleLookup;

const CASE_LOAD_VIEWERS: &[Role] = &[Role::PomUser, Role::ReceptionUser];
const GLOBAL_VIEWERS: &[Role] = &[Role::GlobalSearch, Role::PomUser];
const CATEGORISATION_CREATORS: &[Role] = &[Role::CreateCategorisation, Role::CreateRecategorisation];
const PATHFINDER_EDITORS: &[Role] = &[
    Role::PathfinderStdPrison,
    Role::PathfinderStdProbation,
    Role::PathfinderApproval,
    Role::PathfinderHq,
    Role::PathfinderPsychologist,
    Role::PathfinderAdmin,
];
const SOC_EDITORS: &[Role] = &[Role::SocCustody, Role::SocCommunity, Role::SocHq];
const SENSITIVE_CASE_NOTE_ROLES: &[Role] =
    &[Role::ViewSensitiveCaseNotes, Role::AddSensitiveCaseNotes];
const CSIP_VIEWERS: &[Role] = &[Role::PomUser];

/// Facts shared by most evaluators, computed once per call.
struct Facts {
    in_case_load: bool,
    active: bool,
    restricted: bool,
    active_out: bool,
}

impl Facts {
    fn of(user: &User, prisoner: &Prisoner) -> Self {
        Self {
            in_case_load: is_in_case_load(user, &prisoner.prison_id),
            active: is_active_case_load(user, &prisoner.prison_id),
            restricted: prisoner.restricted_patient,
            active_out: prisoner.is_active_out(),
        }
    }
}

/// Adjudications.
#[must_use]
pub fn adjudications(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, CASE_LOAD_VIEWERS),
        has_role(user, &Role::AdjudicationsReviewer) && f.active,
    )
}

/// Visits.
#[must_use]
pub fn visits(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, CASE_LOAD_VIEWERS),
        has_role(user, &Role::VisitScheduler) && f.active && !f.restricted,
    )
}

/// Incentive levels.
#[must_use]
pub fn incentives(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, CASE_LOAD_VIEWERS),
        has_role(user, &Role::MaintainIncentiveLevels) && f.in_case_load && !f.restricted,
    )
}

/// Security category shown on the profile.
#[must_use]
pub fn category(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, GLOBAL_VIEWERS),
        has_any_role(user, Role::categorisation_roles()) && f.in_case_load,
    )
}

/// The categorisation tool.
///
/// `CATEGORISATION_SECURITY` can always edit; creators need the prisoner in
/// their active case load and not restricted.
#[must_use]
pub fn categorisation(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    let creator = has_any_role(user, CATEGORISATION_CREATORS) && f.active && !f.restricted;
    PermissionItem::new(
        has_any_role(user, Role::categorisation_roles()),
        creator || has_role(user, &Role::CategorisationSecurity),
    )
}

/// Alerts.
#[must_use]
pub fn alerts(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, GLOBAL_VIEWERS),
        has_role(user, &Role::UpdateAlert) && f.in_case_load && !f.restricted,
    )
}

/// Appointments.
#[must_use]
pub fn appointments(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(f.in_case_load, f.active && !f.restricted && !f.active_out)
}

/// Activities.
#[must_use]
pub fn activities(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    let hub = has_role(user, &Role::ActivityHub);
    PermissionItem::new(f.in_case_load || hub, hub && f.active)
}

/// Pathfinder referrals. Read-only pathfinder roles view but never edit.
#[must_use]
pub fn pathfinder(user: &User, _prisoner: &Prisoner) -> PermissionItem {
    PermissionItem::new(
        has_any_role(user, Role::pathfinder_roles()),
        has_any_role(user, PATHFINDER_EDITORS),
    )
}

/// Serious organised crime referrals.
#[must_use]
pub fn soc(user: &User, _prisoner: &Prisoner) -> PermissionItem {
    PermissionItem::new(
        has_any_role(user, Role::soc_roles()),
        has_any_role(user, SOC_EDITORS),
    )
}

/// Use-of-force reports. There is no read-only view.
#[must_use]
pub fn use_of_force(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    let reporter = f.active || (has_role(user, &Role::UseOfForce) && f.in_case_load);
    PermissionItem::new(false, reporter && !f.restricted)
}

/// Sensitive case notes.
#[must_use]
pub fn sensitive_case_notes(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        has_any_role(user, SENSITIVE_CASE_NOTE_ROLES),
        has_role(user, &Role::AddSensitiveCaseNotes) && f.in_case_load,
    )
}

/// Cell moves. There is no read-only view.
#[must_use]
pub fn cell_move(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        false,
        has_role(user, &Role::CellMove) && f.active && !f.restricted && !f.active_out,
    )
}

/// CSIP referrals.
#[must_use]
pub fn csip(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, CSIP_VIEWERS),
        has_role(user, &Role::CsipProcessor) && f.active && !f.restricted,
    )
}

/// Probation documents. Read-only.
#[must_use]
pub fn probation_documents(user: &User, _prisoner: &Prisoner) -> PermissionItem {
    PermissionItem::new(has_any_role(user, crate::area::PROBATION_DOCUMENT_ROLES), false)
}

/// Case notes.
#[must_use]
pub fn case_notes(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    PermissionItem::new(
        f.in_case_load || has_any_role(user, GLOBAL_VIEWERS),
        f.in_case_load && !f.restricted,
    )
}

/// Money. Read-only.
#[must_use]
pub fn money(user: &User, prisoner: &Prisoner) -> PermissionItem {
    PermissionItem::new(is_in_case_load(user, &prisoner.prison_id), false)
}

/// Location details.
#[must_use]
pub fn location(user: &User, prisoner: &Prisoner) -> PermissionItem {
    let active = is_active_case_load(user, &prisoner.prison_id);
    PermissionItem::new(active, has_role(user, &Role::CellMove) && active)
}

/// Evaluate a feature whose rule needs no upstream data.
///
/// Returns `None` for [`Feature::KeyWorker`], which goes through [`key_worker`].
#[must_use]
pub fn evaluate(feature: Feature, user: &User, prisoner: &Prisoner) -> Option<PermissionItem> {
    let evaluator: fn(&User, &Prisoner) -> PermissionItem = match feature {
        Feature::Adjudications => adjudications,
        Feature::Visits => visits,
        Feature::Incentives => incentives,
        Feature::Category => category,
        Feature::Categorisation => categorisation,
        Feature::Alerts => alerts,
        Feature::Appointments => appointments,
        Feature::Activities => activities,
        Feature::Pathfinder => pathfinder,
        Feature::Soc => soc,
        Feature::UseOfForce => use_of_force,
        Feature::SensitiveCaseNotes => sensitive_case_notes,
        Feature::CellMove => cell_move,
        Feature::Csip => csip,
        Feature::ProbationDocuments => probation_documents,
        Feature::CaseNotes => case_notes,
        Feature::Money => money,
        Feature::Location => location,
        Feature::KeyWorker => return None,
    };
    Some(evaluator(user, prisoner))
}

/// Key worker allocation.
///
/// Edit needs the prisoner in the active case load and either `OMIC_ADMIN`
/// or key-worker status there. Key-worker status comes from
/// `keyWorkerAtPrisons` when the user carries it; otherwise the staff role
/// lookup is asked for `role_code`. A failed or empty lookup means "not a
/// key worker".
pub async fn key_worker(
    user: &User,
    prisoner: &Prisoner,
    staff_roles: &dyn StaffRoleLookup,
    client_token: &str,
    role_code: &str,
) -> PermissionItem {
    let f = Facts::of(user, prisoner);
    let edit = f.active
        && (has_role(user, &Role::OmicAdmin)
            || is_key_worker(user, staff_roles, client_token, role_code).await);
    PermissionItem::new(f.in_case_load, edit)
}

async fn is_key_worker(
    user: &User,
    staff_roles: &dyn StaffRoleLookup,
    client_token: &str,
    role_code: &str,
) -> bool {
    let Some(active) = user.active_case_load() else {
        return false;
    };
    if let Some(known) = user.key_worker_at(active) {
        return known;
    }
    let Some(staff_id) = user.staff_id else {
        debug!(username = %user.username, "No staff id, skipping key worker lookup");
        return false;
    };

    match staff_roles.staff_roles(client_token, staff_id, active).await {
        Ok(Some(codes)) => codes.iter().any(|code| code == role_code),
        Ok(None) => false,
        Err(e) => {
            warn!(
                staff_id,
                prison_id = active,
                error = %e,
                "Staff role lookup failed, treating as not a key worker"
            );
            false
        },
    }
}
