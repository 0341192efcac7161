//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_core::prelude::*;` to import all essential types.

// Descriptors
pub use crate::{AuthSource, CaseLoad, Prisoner, User};

// Roles
pub use crate::{Role, RoleSet};

// Outcomes
pub use crate::{AccessDecision, AccessStatusCode, DeniedReason, Granted};
pub use crate::{Feature, FeatureGrants, PermissionItem, Permissions};

// Errors
pub use crate::{AccessError, AccessResult, ErrorPage};
