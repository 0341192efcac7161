//! Stock check handlers.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{error, info};

use warden_access::{
    AccessArea, AccessOptions, PermissionScope, PermissionsService, RestrictedPatientLookup,
    resolve, resolve_verified, resolve_with_options,
};
use warden_core::{AccessError, AccessResult, AccessStatusCode, ErrorKind, Feature, Role};

use crate::context::RequestContext;
use crate::guard::Handler;
use crate::next::Next;
use crate::scope::{RequestScope, add_middleware_error};

/// Route parameter holding the prisoner number.
pub const PRISONER_NUMBER_PARAM: &str = "prisonerNumber";

static PRISONER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{4}[A-Z]{2}$").expect("invalid regex"));

/// Report `result` the way every stock handler does.
fn report(scope: &RequestScope<'_>, handler: &str, result: AccessResult<()>) -> Next {
    match result {
        Ok(()) => Next::Continue,
        Err(e) => {
            if e.kind() == ErrorKind::Server {
                error!(handler, reason = e.reason(), "Guard precondition violated");
            }
            add_middleware_error(scope, e)
        },
    }
}

/// Requires roles; failure is `Forbidden`.
#[derive(Debug, Clone)]
pub struct RequireRoles {
    roles: Vec<Role>,
    all: bool,
}

impl RequireRoles {
    /// Pass when the user holds any of `roles`.
    #[must_use]
    pub fn any(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            all: false,
        }
    }

    /// Pass when the user holds every one of `roles`.
    #[must_use]
    pub fn all(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            all: true,
        }
    }

    fn check(&self, ctx: &RequestContext) -> AccessResult<()> {
        let held = &ctx.user().user_roles;
        let ok = if self.all {
            held.has_all(&self.roles)
        } else {
            held.has_any(&self.roles)
        };
        if ok {
            return Ok(());
        }
        let names: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
        Err(AccessError::forbidden(format!(
            "user {} lacks {} of roles [{}]",
            ctx.user().username,
            if self.all { "all" } else { "any" },
            names.join(", ")
        )))
    }
}

#[async_trait]
impl Handler for RequireRoles {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        report(scope, self.name(), self.check(scope.context()))
    }

    fn name(&self) -> &str {
        "require_roles"
    }
}

/// Requires an `Ok` access status for an area; failure is `NotFound`.
///
/// Runs after the prisoner has been loaded; a missing prisoner is a server
/// error.
#[derive(Clone)]
pub struct RequireAccess {
    area: AccessArea,
    options: Option<AccessOptions>,
    lookup: Option<Arc<dyn RestrictedPatientLookup>>,
}

impl RequireAccess {
    /// Check `area` with its own rules.
    #[must_use]
    pub fn new(area: AccessArea) -> Self {
        Self {
            area,
            options: None,
            lookup: None,
        }
    }

    /// Check the overview rules adjusted by `options`.
    #[must_use]
    pub fn with_options(options: AccessOptions) -> Self {
        Self {
            area: AccessArea::Overview,
            options: Some(options),
            lookup: None,
        }
    }

    /// Confirm restricted patients' supporting prisons with `lookup`.
    ///
    /// Ignored when options are set.
    #[must_use]
    pub fn verified_with(mut self, lookup: Arc<dyn RestrictedPatientLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    async fn check(&self, ctx: &RequestContext) -> AccessResult<()> {
        let prisoner = ctx.require_prisoner(self.name())?;
        let user = ctx.user();
        let code = match (&self.options, &self.lookup) {
            (Some(options), _) => resolve_with_options(user, &prisoner, *options),
            (None, Some(lookup)) => {
                resolve_verified(
                    self.area,
                    user,
                    &prisoner,
                    lookup.as_ref(),
                    ctx.client_token(),
                )
                .await
            },
            (None, None) => resolve(self.area, user, &prisoner),
        };

        if code == AccessStatusCode::Ok {
            return Ok(());
        }
        info!(
            area = %self.area,
            access_code = %code,
            username = %user.username,
            prisoner_number = %prisoner.prisoner_number,
            "Access denied"
        );
        Err(AccessError::not_found(format!(
            "{} access to {} denied: {code}",
            self.area, prisoner.prisoner_number
        )))
    }
}

impl std::fmt::Debug for RequireAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequireAccess")
            .field("area", &self.area)
            .field("options", &self.options)
            .field("verified", &self.lookup.is_some())
            .finish()
    }
}

#[async_trait]
impl Handler for RequireAccess {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        let result = self.check(scope.context()).await;
        report(scope, self.name(), result)
    }

    fn name(&self) -> &str {
        "require_access"
    }
}

/// Runs an aggregator and stores the permissions on the request.
///
/// A denial is `NotFound`; the denied permissions are still stored.
#[derive(Clone)]
pub struct LoadPermissions {
    service: Arc<PermissionsService>,
    scope: PermissionScope,
}

impl LoadPermissions {
    /// Load permissions for `scope`.
    #[must_use]
    pub fn new(service: Arc<PermissionsService>, scope: PermissionScope) -> Self {
        Self { service, scope }
    }

    async fn load(&self, ctx: &RequestContext) -> AccessResult<()> {
        let prisoner = ctx.require_prisoner(self.name())?;
        let permissions = self
            .service
            .permissions(self.scope, ctx.user(), &prisoner, ctx.client_token())
            .await;
        let code = permissions.access_code();
        ctx.set_permissions(permissions)?;

        if code == AccessStatusCode::Ok {
            Ok(())
        } else {
            Err(AccessError::not_found(format!(
                "{} permissions for {} denied: {code}",
                self.scope.as_str(),
                prisoner.prisoner_number
            )))
        }
    }
}

impl std::fmt::Debug for LoadPermissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadPermissions")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for LoadPermissions {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        let result = self.load(scope.context()).await;
        report(scope, self.name(), result)
    }

    fn name(&self) -> &str {
        "load_permissions"
    }
}

/// Requires a feature grant from previously loaded permissions; failure is
/// `Forbidden`.
#[derive(Debug, Clone, Copy)]
pub struct RequireFeature {
    feature: Feature,
    edit: bool,
}

impl RequireFeature {
    /// Require the view flag.
    #[must_use]
    pub fn view(feature: Feature) -> Self {
        Self {
            feature,
            edit: false,
        }
    }

    /// Require the edit flag.
    #[must_use]
    pub fn edit(feature: Feature) -> Self {
        Self {
            feature,
            edit: true,
        }
    }

    fn check(&self, ctx: &RequestContext) -> AccessResult<()> {
        let permissions = ctx.permissions()?.ok_or_else(|| {
            AccessError::server(format!(
                "{} ran before permissions were loaded",
                self.name()
            ))
        })?;

        let granted = if self.edit {
            permissions.can_edit(self.feature)
        } else {
            permissions.can_view(self.feature)
        };
        if granted {
            Ok(())
        } else {
            Err(AccessError::forbidden(format!(
                "{} not granted for {}",
                if self.edit { "edit" } else { "view" },
                self.feature
            )))
        }
    }
}

#[async_trait]
impl Handler for RequireFeature {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        report(scope, self.name(), self.check(scope.context()))
    }

    fn name(&self) -> &str {
        "require_feature"
    }
}

/// Requires a well-formed prisoner number route parameter; failure is
/// `NotFound`.
#[derive(Debug, Clone)]
pub struct RequirePrisonerNumber {
    param: String,
}

impl Default for RequirePrisonerNumber {
    fn default() -> Self {
        Self::new(PRISONER_NUMBER_PARAM)
    }
}

impl RequirePrisonerNumber {
    /// Validate the route parameter `param`.
    #[must_use]
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }

    fn check(&self, ctx: &RequestContext) -> AccessResult<()> {
        match ctx.param(&self.param) {
            Some(value) if PRISONER_NUMBER.is_match(value) => Ok(()),
            Some(value) => Err(AccessError::not_found(format!(
                "invalid prisoner number '{value}'"
            ))),
            None => Err(AccessError::not_found(format!(
                "missing route parameter '{}'",
                self.param
            ))),
        }
    }
}

#[async_trait]
impl Handler for RequirePrisonerNumber {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        report(scope, self.name(), self.check(scope.context()))
    }

    fn name(&self) -> &str {
        "require_prisoner_number"
    }
}

/// A handler built from a synchronous check.
pub struct CheckFn<F> {
    name: String,
    check: F,
}

impl<F> std::fmt::Debug for CheckFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckFn").field("name", &self.name).finish()
    }
}

/// Wrap a closure as a [`Handler`].
///
/// `Err` is reported through [`add_middleware_error`], so the check behaves
/// correctly both standalone and inside a guard.
#[must_use]
pub fn check_fn<F>(name: impl Into<String>, check: F) -> CheckFn<F>
where
    F: Fn(&RequestContext) -> AccessResult<()> + Send + Sync,
{
    CheckFn {
        name: name.into(),
        check,
    }
}

#[async_trait]
impl<F> Handler for CheckFn<F>
where
    F: Fn(&RequestContext) -> AccessResult<()> + Send + Sync,
{
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        report(scope, &self.name, (self.check)(scope.context()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
