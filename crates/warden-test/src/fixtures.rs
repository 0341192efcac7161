//! Test fixtures for users and prisoners.
//!
//! The default user works at `LEI` (also the active case load) and the
//! default prisoner is held there.

use warden_core::{Prisoner, Role, RoleSet, User};

/// Prisoner number used by every prisoner fixture.
pub const TEST_PRISONER_NUMBER: &str = "G6123VU";

/// Establishment the default user works at.
pub const TEST_PRISON_ID: &str = "LEI";

/// Staff id of the default user.
pub const TEST_STAFF_ID: i64 = 487_023;

/// A custody-system user with case load and active case load `LEI`.
#[must_use]
pub fn test_user() -> User {
    User::new("TEST_USER")
        .with_staff_id(TEST_STAFF_ID)
        .with_case_loads([TEST_PRISON_ID])
        .with_active_case_load(TEST_PRISON_ID)
}

/// [`test_user`] holding `roles`.
#[must_use]
pub fn test_user_with_roles(roles: &[Role]) -> User {
    roles
        .iter()
        .cloned()
        .fold(test_user(), |user, role| user.with_role(role))
}

/// [`test_user`] with `GLOBAL_SEARCH`.
#[must_use]
pub fn global_search_user() -> User {
    test_user().with_role(Role::GlobalSearch)
}

/// [`test_user`] with `POM`.
#[must_use]
pub fn pom_user() -> User {
    test_user().with_role(Role::PomUser)
}

/// [`test_user`] with `INACTIVE_BOOKINGS`.
#[must_use]
pub fn inactive_bookings_user() -> User {
    test_user().with_role(Role::InactiveBookings)
}

/// A role set parsed from auth-service strings.
#[must_use]
pub fn role_set(raw: &[&str]) -> RoleSet {
    RoleSet::parse(raw.iter().copied())
}

/// A prisoner held at `LEI`.
#[must_use]
pub fn test_prisoner() -> Prisoner {
    Prisoner::new(TEST_PRISONER_NUMBER, TEST_PRISON_ID)
}

/// A prisoner held at `prison_id`.
#[must_use]
pub fn prisoner_at(prison_id: &str) -> Prisoner {
    Prisoner::new(TEST_PRISONER_NUMBER, prison_id)
}

/// A released prisoner.
#[must_use]
pub fn released_prisoner() -> Prisoner {
    prisoner_at(warden_core::RELEASED_PRISON_ID)
}

/// A prisoner in transit.
#[must_use]
pub fn transferring_prisoner() -> Prisoner {
    prisoner_at(warden_core::TRANSFERRING_PRISON_ID)
}

/// A restricted patient supported by `supporting_prison_id`.
#[must_use]
pub fn restricted_patient(supporting_prison_id: &str) -> Prisoner {
    released_prisoner().restricted(supporting_prison_id)
}
