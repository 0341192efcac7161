//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_access::prelude::*;` to import all essential types.

// Areas
pub use crate::{AccessArea, AccessOptions};

// Resolvers
pub use crate::{resolve, resolve_verified, resolve_with_options};

// Collaborators
pub use crate::{LookupError, RestrictedPatientLookup, StaffRoleLookup, SupportingPrison};

// Service
pub use crate::{AccessSettings, PermissionScope, PermissionsService};
