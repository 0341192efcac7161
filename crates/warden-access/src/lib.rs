//! Warden Access - Access status resolution and permission assembly.
//!
//! This crate provides:
//! - Status resolvers per protected [`AccessArea`], applying the custodial
//!   precedence (restricted patient, released, transferring, case load)
//! - Lookup-backed resolvers that confirm a restricted patient's supporting
//!   prison upstream
//! - Per-feature permission [`evaluators`]
//! - The [`PermissionsService`] aggregator, which evaluates features only
//!   once access is granted
//!
//! # Example
//!
//! ```
//! use warden_access::{AccessArea, resolve};
//! use warden_core::{AccessStatusCode, Prisoner, User};
//!
//! let user = User::new("JSMITH").with_case_loads(["LEI"]);
//!
//! assert_eq!(
//!     resolve(AccessArea::Overview, &user, &Prisoner::new("G6123VU", "MDI")),
//!     AccessStatusCode::NotInCaseload,
//! );
//! assert_eq!(
//!     resolve(AccessArea::Money, &user, &Prisoner::new("G6123VU", "TRN")),
//!     AccessStatusCode::PrisonerIsTransferring,
//! );
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod area;
pub mod evaluators;
pub mod lookup;
pub mod resolver;
pub mod service;
pub mod settings;
pub mod verified;

pub use area::{AccessArea, AccessOptions, PROBATION_DOCUMENT_ROLES};
pub use lookup::{
    LookupError, LookupResult, RestrictedPatientLookup, StaffRoleLookup, SupportingPrison,
};
pub use resolver::{
    active_case_load_only_access, alerts_access, case_notes_access, decide, location_access,
    money_access, overview_access, probation_documents_access, resolve, resolve_with_options,
};
pub use service::{PermissionScope, PermissionsService};
pub use settings::{AccessSettings, DEFAULT_KEY_WORKER_ROLE_CODE};
pub use verified::{decide_verified, overview_access_verified, resolve_verified};
