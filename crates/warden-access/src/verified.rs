//! Resolvers that confirm a restricted patient's supporting prison upstream.

use tracing::{debug, warn};

use warden_core::{AccessDecision, AccessStatusCode, Prisoner, User};

use crate::area::AccessArea;
use crate::lookup::RestrictedPatientLookup;
use crate::resolver::{SupportingPrisonCheck, apply_rules, needs_supporting_prison};

/// Resolve `area`, confirming the supporting prison when the answer hangs on it.
///
/// The lookup is made at most once, and only for a restricted patient whose
/// POM path is the deciding factor. A missing record or a failed lookup
/// denies with `RestrictedPatient`.
///
/// # Errors
///
/// Returns the [`warden_core::DeniedReason`] when access is refused.
pub async fn decide_verified(
    area: AccessArea,
    user: &User,
    prisoner: &Prisoner,
    lookup: &dyn RestrictedPatientLookup,
    client_token: &str,
) -> AccessDecision {
    let rules = area.rules();
    if !needs_supporting_prison(rules, user, prisoner) {
        return apply_rules(user, prisoner, rules, SupportingPrisonCheck::Unverified);
    }

    debug!(
        prisoner_number = %prisoner.prisoner_number,
        area = %area,
        "Confirming supporting prison"
    );
    let found = match lookup
        .supporting_prison(client_token, &prisoner.prisoner_number)
        .await
    {
        Ok(found) => found,
        Err(e) => {
            warn!(
                prisoner_number = %prisoner.prisoner_number,
                error = %e,
                "Supporting prison lookup failed, denying"
            );
            None
        },
    };

    apply_rules(
        user,
        prisoner,
        rules,
        SupportingPrisonCheck::Verified(found.as_ref()),
    )
}

/// Status-code form of [`decide_verified`].
pub async fn resolve_verified(
    area: AccessArea,
    user: &User,
    prisoner: &Prisoner,
    lookup: &dyn RestrictedPatientLookup,
    client_token: &str,
) -> AccessStatusCode {
    decide_verified(area, user, prisoner, lookup, client_token)
        .await
        .into()
}

/// Overview access with the supporting prison confirmed upstream.
pub async fn overview_access_verified(
    user: &User,
    prisoner: &Prisoner,
    lookup: &dyn RestrictedPatientLookup,
    client_token: &str,
) -> AccessStatusCode {
    resolve_verified(AccessArea::Overview, user, prisoner, lookup, client_token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::fakes::FakeRestrictedPatients;
    use crate::lookup::{LookupError, SupportingPrison};
    use warden_core::Role;
    use warden_test::{restricted_patient, test_prisoner, test_user};

    fn pom() -> User {
        test_user().with_role(Role::PomUser)
    }

    #[tokio::test]
    async fn test_active_supporting_prison_grants() {
        let lookup = FakeRestrictedPatients::new(Ok(Some(SupportingPrison::new("LEI", true))));
        let status =
            overview_access_verified(&pom(), &restricted_patient("LEI"), &lookup, "token").await;
        assert_eq!(status, AccessStatusCode::Ok);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_inactive_supporting_prison_denies() {
        let lookup = FakeRestrictedPatients::new(Ok(Some(SupportingPrison::new("LEI", false))));
        let status =
            overview_access_verified(&pom(), &restricted_patient("LEI"), &lookup, "token").await;
        assert_eq!(status, AccessStatusCode::RestrictedPatient);
    }

    #[tokio::test]
    async fn test_missing_record_denies() {
        let lookup = FakeRestrictedPatients::new(Ok(None));
        let status =
            overview_access_verified(&pom(), &restricted_patient("LEI"), &lookup, "token").await;
        assert_eq!(status, AccessStatusCode::RestrictedPatient);
    }

    #[tokio::test]
    async fn test_lookup_failure_denies() {
        let lookup = FakeRestrictedPatients::new(Err(LookupError::Unavailable("timeout".into())));
        let status =
            overview_access_verified(&pom(), &restricted_patient("LEI"), &lookup, "token").await;
        assert_eq!(status, AccessStatusCode::RestrictedPatient);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_lookup_for_ordinary_prisoner() {
        let lookup = FakeRestrictedPatients::new(Ok(None));
        let status = overview_access_verified(&pom(), &test_prisoner(), &lookup, "token").await;
        assert_eq!(status, AccessStatusCode::Ok);
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_lookup_when_inactive_bookings_applies() {
        let lookup = FakeRestrictedPatients::new(Ok(None));
        let user = pom().with_role(Role::InactiveBookings);
        let status =
            overview_access_verified(&user, &restricted_patient("LEI"), &lookup, "token").await;
        assert_eq!(status, AccessStatusCode::Ok);
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_lookup_when_gate_fails() {
        let lookup = FakeRestrictedPatients::new(Ok(None));
        let status = resolve_verified(
            AccessArea::ProbationDocuments,
            &test_user(),
            &restricted_patient("LEI"),
            &lookup,
            "token",
        )
        .await;
        assert_eq!(status, AccessStatusCode::NotFound);
        assert_eq!(lookup.calls(), 0);
    }
}
