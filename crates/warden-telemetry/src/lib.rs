//! Warden Telemetry - Logging and request correlation.
//!
//! This crate provides:
//! - [`LogConfig`] and [`setup_logging`] over `tracing-subscriber`
//! - Rolling file output through `tracing-appender`
//! - [`CorrelationContext`] for tying a request's log lines together
//!
//! # Example
//!
//! ```rust,no_run
//! use warden_telemetry::{CorrelationContext, LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), warden_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("warden_guard=debug");
//! setup_logging(&config)?;
//!
//! let ctx = CorrelationContext::new("profile_overview")
//!     .with_username("JSMITH")
//!     .with_prisoner_number("G6123VU");
//! let span = ctx.span();
//! let _entered = span.enter();
//! tracing::info!("Rendering profile");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{CorrelationContext, CorrelationGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
