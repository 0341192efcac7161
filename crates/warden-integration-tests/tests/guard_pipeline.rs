//! Route pipelines built from stock handlers and nested guards.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use common::ServiceHarness;
use warden_access::{AccessArea, PermissionScope};
use warden_core::{
    AccessError, AccessStatusCode, ErrorKind, ErrorPage, Feature, Prisoner, Role, User,
};
use warden_guard::{
    Guard, Handler, LoadPermissions, Next, PRISONER_NUMBER_PARAM, Pipeline, PipelineOutcome,
    RequestContext, RequestScope, RequireAccess, RequireFeature, RequirePrisonerNumber,
    RequireRoles, add_middleware_error, check_fn,
};
use warden_test::{
    TEST_PRISONER_NUMBER, global_search_user, init_test_logging, prisoner_at, released_prisoner,
    test_user, test_user_with_roles,
};

/// Loads the prisoner named by the route parameter, the way the host's
/// prisoner-data stage does before any guard runs.
struct LoadPrisoner {
    prisoners: HashMap<String, Prisoner>,
}

impl LoadPrisoner {
    fn with(prisoner: Prisoner) -> Self {
        let mut prisoners = HashMap::new();
        prisoners.insert(prisoner.prisoner_number.clone(), prisoner);
        Self { prisoners }
    }
}

#[async_trait]
impl Handler for LoadPrisoner {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        let ctx = scope.context();
        let found = ctx
            .param(PRISONER_NUMBER_PARAM)
            .and_then(|number| self.prisoners.get(number));
        let Some(prisoner) = found else {
            return add_middleware_error(scope, AccessError::not_found("no such prisoner"));
        };
        match ctx.set_prisoner(prisoner.clone()) {
            Ok(()) => Next::Continue,
            Err(e) => add_middleware_error(scope, e),
        }
    }

    fn name(&self) -> &str {
        "load_prisoner"
    }
}

fn request(user: User) -> RequestContext {
    init_test_logging();
    RequestContext::new(user)
        .with_client_token("token")
        .with_param(PRISONER_NUMBER_PARAM, TEST_PRISONER_NUMBER)
}

/// The alerts edit route: valid number, prisoner loaded, access or global
/// search, then the alerts-edit permission.
fn alerts_edit_route(prisoner: Prisoner, harness: &ServiceHarness) -> Pipeline {
    Pipeline::new()
        .stage(RequirePrisonerNumber::default())
        .stage(LoadPrisoner::with(prisoner))
        .stage(Guard::any(vec![
            Arc::new(RequireAccess::new(AccessArea::Overview)),
            Arc::new(RequireRoles::any([Role::GlobalSearch])),
        ]))
        .stage(LoadPermissions::new(
            Arc::clone(&harness.service),
            PermissionScope::AlertsEdit,
        ))
        .stage(RequireFeature::edit(Feature::Alerts))
}

#[tokio::test]
async fn test_alerts_edit_route_completes_for_alert_editor() {
    let harness = ServiceHarness::new();
    let pipeline = alerts_edit_route(prisoner_at("LEI"), &harness);
    let ctx = request(test_user_with_roles(&[Role::UpdateAlert]));

    assert_eq!(pipeline.run(&ctx).await, PipelineOutcome::Completed);
    let permissions = ctx.permissions().unwrap().unwrap();
    assert!(permissions.can_edit(Feature::Alerts));
    assert!(!permissions.can_view(Feature::Alerts));
    assert_eq!(ctx.errors_at(1).len(), 1);
}

#[tokio::test]
async fn test_alerts_edit_route_forbidden_renders_not_found() {
    let harness = ServiceHarness::new();
    let pipeline = alerts_edit_route(prisoner_at("LEI"), &harness);
    let ctx = request(test_user());

    let outcome = pipeline.run(&ctx).await;
    let error = outcome.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::Forbidden);
    assert_eq!(error.status_code(), 403);
    assert_eq!(outcome.error_page(), Some(ErrorPage::NotFound));
    assert_eq!(outcome.public_status(), Some(404));
}

#[tokio::test]
async fn test_global_search_passes_guard_but_not_active_case_load() {
    let harness = ServiceHarness::new();
    let pipeline = alerts_edit_route(prisoner_at("MDI"), &harness);
    let ctx = request(global_search_user().with_role(Role::UpdateAlert));

    let outcome = pipeline.run(&ctx).await;
    assert_eq!(outcome.error().map(AccessError::kind), Some(ErrorKind::NotFound));
    assert!(outcome.error().unwrap().reason().contains("GLOBAL_USER_NOT_PERMITTED"));
    assert_eq!(
        ctx.permissions().unwrap().unwrap().access_code(),
        AccessStatusCode::GlobalUserNotPermitted
    );
}

#[tokio::test]
async fn test_outer_guard_failure_names_level_and_counts() {
    let harness = ServiceHarness::new();
    let pipeline = alerts_edit_route(released_prisoner(), &harness);
    let ctx = request(test_user());

    let outcome = pipeline.run(&ctx).await;
    let error = outcome.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert!(error.reason().contains("OR guard at level 1"));
    assert!(error.reason().contains("2 of 2"));

    let recorded = ctx.errors_at(1);
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().any(|e| e.reason().contains("PRISONER_IS_RELEASED")));
    assert!(ctx.permissions().unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_prisoner_number_stops_before_loading() {
    let harness = ServiceHarness::new();
    let pipeline = alerts_edit_route(prisoner_at("LEI"), &harness);
    let ctx = RequestContext::new(test_user()).with_param(PRISONER_NUMBER_PARAM, "not-a-number");

    let outcome = pipeline.run(&ctx).await;
    assert_eq!(outcome.public_status(), Some(404));
    assert!(ctx.prisoner().unwrap().is_none());
    assert!(ctx.error_levels().is_empty());
}

#[tokio::test]
async fn test_guard_before_prisoner_load_is_a_server_error() {
    let pipeline = Pipeline::new().stage(Guard::all(vec![Arc::new(RequireAccess::new(
        AccessArea::Overview,
    ))]));
    let ctx = request(test_user());

    let outcome = pipeline.run(&ctx).await;
    assert_eq!(outcome.error().map(AccessError::kind), Some(ErrorKind::NotFound));
    assert_eq!(ctx.errors_at(1)[0].kind(), ErrorKind::Server);
    assert_eq!(ctx.errors_at(1)[0].public_status(), 500);
}

#[tokio::test]
async fn test_nested_guards_aggregate_per_level() {
    // (CELL_MOVE AND location access) OR (GLOBAL_SEARCH AND overview access)
    let cell_mover: Arc<dyn Handler> = Arc::new(Guard::all(vec![
        Arc::new(RequireRoles::any([Role::CellMove])),
        Arc::new(RequireAccess::new(AccessArea::Location)),
    ]));
    let searcher: Arc<dyn Handler> = Arc::new(Guard::all(vec![
        Arc::new(RequireRoles::any([Role::GlobalSearch])),
        Arc::new(RequireAccess::new(AccessArea::Overview)),
    ]));
    let pipeline = Pipeline::new().stage(Guard::any(vec![cell_mover, searcher]));

    let ctx = request(global_search_user()).with_prisoner(prisoner_at("MDI"));
    assert!(pipeline.run(&ctx).await.is_completed());
    assert_eq!(ctx.errors_at(1).len(), 1);
    assert_eq!(ctx.errors_at(2).len(), 2);

    let ctx = request(test_user()).with_prisoner(prisoner_at("MDI"));
    let outcome = pipeline.run(&ctx).await;
    assert!(outcome.error().is_some());
    assert_eq!(ctx.errors_at(1).len(), 2);
    assert_eq!(ctx.errors_at(2).len(), 4);
}

#[tokio::test]
async fn test_same_check_reused_standalone_and_guarded() {
    let check: Arc<dyn Handler> = Arc::new(check_fn("has staff id", |ctx: &RequestContext| {
        ctx.user()
            .staff_id
            .map(|_| ())
            .ok_or_else(|| AccessError::forbidden("no staff id"))
    }));
    let anonymous = RequestContext::new(User::new("ANON"));

    let standalone = Pipeline::new().with_stage(check.clone());
    let outcome = standalone.run(&anonymous).await;
    assert_eq!(outcome.error().map(AccessError::kind), Some(ErrorKind::Forbidden));
    assert!(anonymous.error_levels().is_empty());

    let guarded = Pipeline::new().stage(Guard::any(vec![
        check,
        Arc::new(RequireRoles::any([Role::GlobalSearch])),
    ]));
    let ctx = RequestContext::new(User::new("ANON").with_role(Role::GlobalSearch));
    assert!(guarded.run(&ctx).await.is_completed());
    assert_eq!(ctx.errors_at(1)[0].reason(), "no staff id");
}

#[tokio::test]
async fn test_route_token_skips_rest_of_pipeline() {
    let pipeline = Pipeline::new()
        .stage(check_fn("first", |_| Ok(())))
        .stage(SkipRoute)
        .stage(RequireFeature::view(Feature::Alerts));
    let ctx = request(test_user());
    assert_eq!(pipeline.run(&ctx).await, PipelineOutcome::Skipped);
}

struct SkipRoute;

#[async_trait]
impl Handler for SkipRoute {
    async fn handle(&self, _scope: &RequestScope<'_>) -> Next {
        Next::Route
    }

    fn name(&self) -> &str {
        "skip_route"
    }
}
