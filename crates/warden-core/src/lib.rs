//! Warden Core - Shared types for prisoner-profile access control.
//!
//! This crate provides:
//! - The [`User`] and [`Prisoner`] descriptors supplied by collaborators
//! - Typed [`Role`]s, normalised once from auth-service strings
//! - [`AccessStatusCode`] and the [`AccessDecision`] sum type
//! - [`PermissionItem`] / [`Permissions`] grants
//! - Role and case-load predicates
//! - The [`AccessError`] taxonomy raised by guard handlers
//!
//! Nothing here performs I/O. Every value is built per request and dropped
//! with the response.
//!
//! # Example
//!
//! ```
//! use warden_core::{Prisoner, Role, User, predicates};
//!
//! let user = User::new("JSMITH")
//!     .with_case_loads(["LEI"])
//!     .with_roles(["ROLE_GLOBAL_SEARCH"]);
//! let prisoner = Prisoner::new("G6123VU", "MDI");
//!
//! assert!(!predicates::is_in_case_load(&user, &prisoner.prison_id));
//! assert!(predicates::has_role(&user, &Role::GlobalSearch));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

/// Access error taxonomy.
pub mod error;
pub mod permission;
pub mod predicates;
pub mod prisoner;
pub mod role;
pub mod status;
pub mod user;

pub use error::{AccessError, AccessResult, ErrorKind, ErrorPage};
pub use permission::{Feature, FeatureGrants, PermissionItem, Permissions};
pub use prisoner::{
    ACTIVE_OUT_STATUS, PrisonLocation, Prisoner, RELEASED_PRISON_ID, TRANSFERRING_PRISON_ID,
};
pub use role::{ROLE_PREFIX, Role, RoleSet};
pub use status::{AccessDecision, AccessStatusCode, DeniedReason, Granted};
pub use user::{AuthSource, CaseLoad, User};
