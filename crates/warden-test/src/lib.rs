//! Warden Test - Shared test utilities.
//!
//! Fixtures for users and prisoners, and mock collaborators that count
//! their calls so "no upstream call on denial" can be asserted.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! warden-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use warden_test::{MockRestrictedPatientLookup, restricted_patient, test_user};
//!
//! let lookup = MockRestrictedPatientLookup::new().with_supporting_prison("LEI", true);
//! let status = overview_access_verified(&test_user(), &restricted_patient("LEI"), &lookup, "t").await;
//! assert_eq!(lookup.calls(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

/// Install a test-writer subscriber honouring `RUST_LOG`. Safe to call from
/// every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
