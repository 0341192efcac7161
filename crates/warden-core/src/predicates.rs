//! Role and case-load predicates over a [`User`].
//!
//! Missing role or case-load lists mean "none held"; none of these ever fail.
//! Case loads only exist for custody-system accounts, so every case-load
//! predicate is false for users from other identity sources.

use crate::role::Role;
use crate::user::User;

/// The user holds at least one of `roles`.
#[must_use]
pub fn has_any_role(user: &User, roles: &[Role]) -> bool {
    user.user_roles.has_any(roles)
}

/// The user holds every one of `roles`.
#[must_use]
pub fn has_all_roles(user: &User, roles: &[Role]) -> bool {
    user.user_roles.has_all(roles)
}

/// The user holds `role`.
#[must_use]
pub fn has_role(user: &User, role: &Role) -> bool {
    user.user_roles.contains(role)
}

/// Case-load ids the user is provisioned against.
pub fn case_load_ids(user: &User) -> impl Iterator<Item = &str> {
    user.case_loads
        .iter()
        .filter(|_| user.auth_source.has_case_loads())
        .map(|c| c.case_load_id.as_str())
}

/// `prison_id` is one of the user's case loads.
#[must_use]
pub fn is_in_case_load(user: &User, prison_id: &str) -> bool {
    case_load_ids(user).any(|id| id == prison_id)
}

/// `prison_id` is the user's active case load.
#[must_use]
pub fn is_active_case_load(user: &User, prison_id: &str) -> bool {
    user.auth_source.has_case_loads() && user.active_case_load() == Some(prison_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::AuthSource;

    #[test]
    fn test_case_load_membership() {
        let user = User::new("a").with_case_loads(["LEI", "MDI"]);
        assert!(is_in_case_load(&user, "LEI"));
        assert!(!is_in_case_load(&user, "BXI"));
    }

    #[test]
    fn test_active_case_load() {
        let user = User::new("a")
            .with_case_loads(["LEI", "MDI"])
            .with_active_case_load("MDI");
        assert!(is_active_case_load(&user, "MDI"));
        assert!(!is_active_case_load(&user, "LEI"));
    }

    #[test]
    fn test_no_active_case_load() {
        let user = User::new("a").with_case_loads(["LEI"]);
        assert!(!is_active_case_load(&user, "LEI"));
    }

    #[test]
    fn test_non_custody_accounts_have_no_case_loads() {
        let user = User::new("a")
            .with_case_loads(["LEI"])
            .with_active_case_load("LEI")
            .with_auth_source(AuthSource::Delius);
        assert!(!is_in_case_load(&user, "LEI"));
        assert!(!is_active_case_load(&user, "LEI"));
        assert_eq!(case_load_ids(&user).count(), 0);
    }

    #[test]
    fn test_role_predicates() {
        let user = User::new("a").with_roles(["ROLE_POM", "ROLE_CELL_MOVE"]);
        assert!(has_role(&user, &Role::PomUser));
        assert!(has_any_role(&user, &[Role::GlobalSearch, Role::CellMove]));
        assert!(has_all_roles(&user, &[Role::PomUser, Role::CellMove]));
        assert!(!has_all_roles(&user, &[Role::PomUser, Role::GlobalSearch]));
        assert!(!has_any_role(&User::new("b"), &[Role::PomUser]));
    }
}
