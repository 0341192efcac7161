//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_guard::prelude::*;` to import all essential types.

// Request state
pub use crate::{Next, RequestContext, RequestScope, add_middleware_error};

// Composition
pub use crate::{Guard, GuardOperator, Handler, Pipeline, PipelineOutcome};

// Stock handlers
pub use crate::{
    LoadPermissions, RequireAccess, RequireFeature, RequirePrisonerNumber, RequireRoles, check_fn,
};
