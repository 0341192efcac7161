//! Guard nesting and the error aggregation primitive.
//!
//! The nesting depth is carried by [`RequestScope`] rather than stored on the
//! request: level 0 is idle, and each guard hands its handlers a child scope
//! one level deeper with a fresh [`GuardFrame`]. Dropping the child scope is
//! what returns control to the caller's level.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use warden_core::AccessError;

use crate::context::RequestContext;
use crate::next::Next;

/// Failures recorded by the handlers of one guard invocation.
#[derive(Debug)]
pub struct GuardFrame {
    level: usize,
    errors: Mutex<Vec<AccessError>>,
}

impl GuardFrame {
    fn new(level: usize) -> Self {
        Self {
            level,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Nesting depth of this frame, 1 for the outermost guard.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Failures recorded so far.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copies of the recorded errors.
    #[must_use]
    pub fn errors(&self) -> Vec<AccessError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, error: AccessError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }
}

/// A request context seen from a particular guard nesting level.
#[derive(Debug, Clone)]
pub struct RequestScope<'a> {
    context: &'a RequestContext,
    frame: Option<Arc<GuardFrame>>,
}

impl<'a> RequestScope<'a> {
    /// An idle scope, outside any guard.
    #[must_use]
    pub fn new(context: &'a RequestContext) -> Self {
        Self {
            context,
            frame: None,
        }
    }

    /// The request context.
    #[must_use]
    pub fn context(&self) -> &'a RequestContext {
        self.context
    }

    /// Current nesting depth; 0 when idle.
    #[must_use]
    pub fn level(&self) -> usize {
        self.frame.as_ref().map_or(0, |f| f.level)
    }

    /// Whether a guard is active.
    #[must_use]
    pub fn in_guard(&self) -> bool {
        self.frame.is_some()
    }

    /// The active guard's frame.
    #[must_use]
    pub fn frame(&self) -> Option<&GuardFrame> {
        self.frame.as_deref()
    }

    /// Enter a guard: a child scope one level deeper.
    #[must_use]
    pub fn enter(&self) -> Self {
        let level = self.level().saturating_add(1);
        Self {
            context: self.context,
            frame: Some(Arc::new(GuardFrame::new(level))),
        }
    }
}

/// Report a handler failure.
///
/// Outside a guard this is [`Next::Error`] with the error unchanged, so the
/// caller propagates it. Inside a guard the error is recorded against the
/// current level, both on the guard's frame and in the request's
/// errors-by-level map, and the result is [`Next::Route`].
pub fn add_middleware_error(scope: &RequestScope<'_>, error: AccessError) -> Next {
    let Some(frame) = scope.frame.as_ref() else {
        return Next::Error(error);
    };

    debug!(
        level = frame.level,
        kind = ?error.kind(),
        reason = error.reason(),
        "Recording guard failure"
    );
    frame.record(error.clone());
    scope.context.record_error(frame.level, error);
    Next::Route
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_test::test_user;

    #[test]
    fn test_idle_returns_error_unchanged() {
        let ctx = RequestContext::new(test_user());
        let scope = RequestScope::new(&ctx);
        let err = AccessError::not_found("no such prisoner");

        assert_eq!(scope.level(), 0);
        assert_eq!(add_middleware_error(&scope, err.clone()), Next::Error(err));
        assert!(ctx.error_levels().is_empty());
    }

    #[test]
    fn test_in_guard_records_and_routes() {
        let ctx = RequestContext::new(test_user());
        let scope = RequestScope::new(&ctx).enter();
        let err = AccessError::forbidden("missing role");

        assert_eq!(scope.level(), 1);
        assert_eq!(add_middleware_error(&scope, err.clone()), Next::Route);
        assert_eq!(ctx.errors_at(1), vec![err]);
        assert_eq!(scope.frame().map(GuardFrame::failures), Some(1));
    }

    #[test]
    fn test_nested_levels() {
        let ctx = RequestContext::new(test_user());
        let outer = RequestScope::new(&ctx).enter();
        let inner = outer.enter();
        assert_eq!(inner.level(), 2);

        let _ = add_middleware_error(&inner, AccessError::not_found("inner"));
        assert_eq!(ctx.errors_at(2).len(), 1);
        assert!(ctx.errors_at(1).is_empty());
        assert_eq!(outer.frame().map(GuardFrame::failures), Some(0));
    }

    #[test]
    fn test_poisoned_frame_still_counts_failures() {
        let ctx = RequestContext::new(test_user());
        let scope = RequestScope::new(&ctx).enter();
        let _ = add_middleware_error(&scope, AccessError::forbidden("first"));

        let frame = Arc::clone(scope.frame.as_ref().unwrap());
        let poisoner = std::thread::spawn(move || {
            let _guard = frame.errors.lock().unwrap();
            panic!("handler panicked mid-record");
        });
        assert!(poisoner.join().is_err());

        let _ = add_middleware_error(&scope, AccessError::forbidden("second"));
        let frame = scope.frame().unwrap();
        assert_eq!(frame.failures(), 2);
        assert_eq!(frame.errors()[1].reason(), "second");
        assert_eq!(ctx.errors_at(1).len(), 2);
    }
}
