//! Continuation outcomes.

use warden_core::AccessError;

/// What a stage or handler tells the pipeline to do next.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Next {
    /// Proceed to the next stage.
    Continue,
    /// Stop this chain without propagating an error. Inside a guard the
    /// failure has already been recorded for the guard to weigh.
    Route,
    /// Stop and surface the error.
    Error(AccessError),
}

impl Next {
    /// Whether the chain proceeds.
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Whether this is the continuation token.
    #[must_use]
    pub fn is_route(&self) -> bool {
        matches!(self, Self::Route)
    }

    /// The error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&AccessError> {
        match self {
            Self::Error(e) => Some(e),
            Self::Continue | Self::Route => None,
        }
    }
}
