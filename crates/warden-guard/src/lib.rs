//! Warden Guard - Composable request guards.
//!
//! A request runs through a [`Pipeline`] of [`Handler`] stages. Each stage
//! continues, skips the route, or fails with an
//! [`AccessError`](warden_core::AccessError). A [`Guard`] combines handlers
//! with AND or OR, runs them concurrently, and is itself a handler, so guards
//! nest.
//!
//! Handlers report failure through [`add_middleware_error`]. Outside a guard
//! the error propagates; inside one it is recorded against the guard's own
//! frame and the guard decides once every handler has finished.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use warden_access::AccessArea;
//! use warden_core::{Prisoner, Role, User};
//! use warden_guard::{Guard, Pipeline, RequestContext, RequireAccess, RequireRoles};
//!
//! # tokio_test_block_on(async {
//! let pipeline = Pipeline::new().stage(Guard::any(vec![
//!     Arc::new(RequireRoles::any([Role::GlobalSearch])),
//!     Arc::new(RequireAccess::new(AccessArea::Overview)),
//! ]));
//!
//! let user = User::new("JSMITH").with_case_loads(["LEI"]);
//! let ctx = RequestContext::new(user).with_prisoner(Prisoner::new("G6123VU", "LEI"));
//! assert!(pipeline.run(&ctx).await.is_completed());
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     futures::executor::block_on(f)
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod context;
pub mod guard;
pub mod handlers;
pub mod next;
pub mod pipeline;
pub mod scope;

pub use context::RequestContext;
pub use guard::{Guard, GuardOperator, Handler};
pub use handlers::{
    CheckFn, LoadPermissions, PRISONER_NUMBER_PARAM, RequireAccess, RequireFeature,
    RequirePrisonerNumber, RequireRoles, check_fn,
};
pub use next::Next;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use scope::{GuardFrame, RequestScope, add_middleware_error};
