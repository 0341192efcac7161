//! The [`Handler`] trait and the AND/OR [`Guard`].
//!
//! A guard runs its handlers concurrently and waits for all of them before
//! deciding:
//!
//! 1. Enter a child scope at `level + 1` with an empty frame
//! 2. Fan out: start every handler against the child scope
//! 3. Fan in: await all; a handler that returned [`Next::Error`] directly is
//!    recorded as a failure at the child level
//! 4. Drop the child scope, back at the caller's level
//! 5. AND passes with no failures; OR passes with fewer failures than handlers
//! 6. On failure, report a not-found error through [`add_middleware_error`]
//!    at the caller's level: recorded for an enclosing guard, or returned as
//!    [`Next::Error`] from the outermost one

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use warden_core::AccessError;

use crate::next::Next;
use crate::scope::{RequestScope, add_middleware_error};

/// A check run by a pipeline stage or a guard.
///
/// Handlers report failure through [`add_middleware_error`] so the same
/// handler works standalone (the error propagates) and inside a guard (the
/// error is recorded for the guard to weigh).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run the check.
    async fn handle(&self, scope: &RequestScope<'_>) -> Next;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// How a guard combines its handlers' outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardOperator {
    /// Every handler must pass.
    And,
    /// At least one handler must pass.
    Or,
}

impl GuardOperator {
    /// Whether `failures` out of `handlers` is a pass.
    #[must_use]
    pub fn passes(self, failures: usize, handlers: usize) -> bool {
        match self {
            Self::And => failures == 0,
            Self::Or => failures < handlers,
        }
    }
}

impl fmt::Display for GuardOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

/// Runs handlers concurrently and combines them with AND or OR.
///
/// A guard is itself a [`Handler`], so guards nest.
pub struct Guard {
    operator: GuardOperator,
    handlers: Vec<Arc<dyn Handler>>,
}

impl Guard {
    /// A guard with no handlers yet.
    #[must_use]
    pub fn new(operator: GuardOperator) -> Self {
        Self {
            operator,
            handlers: Vec::new(),
        }
    }

    /// Every handler must pass.
    #[must_use]
    pub fn all(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            operator: GuardOperator::And,
            handlers,
        }
    }

    /// At least one handler must pass.
    #[must_use]
    pub fn any(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            operator: GuardOperator::Or,
            handlers,
        }
    }

    /// Add a handler.
    #[must_use]
    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// The combination rule.
    #[must_use]
    pub fn operator(&self) -> GuardOperator {
        self.operator
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the guard has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("Guard")
            .field("operator", &self.operator)
            .field("handlers", &names)
            .finish()
    }
}

#[async_trait]
impl Handler for Guard {
    async fn handle(&self, scope: &RequestScope<'_>) -> Next {
        if self.handlers.is_empty() {
            debug!(
                level = scope.level(),
                operator = %self.operator,
                "Guard has no handlers, passing"
            );
            return Next::Continue;
        }

        let inner = scope.enter();
        let level = inner.level();

        let outcomes = join_all(self.handlers.iter().map(|h| h.handle(&inner))).await;
        for outcome in outcomes {
            if let Next::Error(error) = outcome {
                let _ = add_middleware_error(&inner, error);
            }
        }

        let failures = inner.frame().map_or(0, |f| f.failures());
        drop(inner);

        let total = self.handlers.len();
        let passed = self.operator.passes(failures, total);
        debug!(
            level,
            operator = %self.operator,
            failures,
            handlers = total,
            passed,
            "Guard evaluated"
        );

        if passed {
            Next::Continue
        } else {
            add_middleware_error(
                scope,
                AccessError::not_found(format!(
                    "{} guard at level {level} failed: {failures} of {total} handlers failed",
                    self.operator
                )),
            )
        }
    }

    fn name(&self) -> &str {
        match self.operator {
            GuardOperator::And => "guard(all)",
            GuardOperator::Or => "guard(any)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::handlers::check_fn;
    use std::time::Duration;
    use warden_core::ErrorKind;
    use warden_test::test_user;

    fn pass() -> Arc<dyn Handler> {
        Arc::new(check_fn("pass", |_| Ok(())))
    }

    fn fail(reason: &'static str) -> Arc<dyn Handler> {
        Arc::new(check_fn("fail", move |_| Err(AccessError::forbidden(reason))))
    }

    /// Fails by returning the error directly instead of recording it.
    struct Raw;

    #[async_trait]
    impl Handler for Raw {
        async fn handle(&self, _scope: &RequestScope<'_>) -> Next {
            Next::Error(AccessError::server("raw"))
        }

        fn name(&self) -> &str {
            "raw"
        }
    }

    /// Passes after a delay, so siblings finish first.
    struct Slow;

    #[async_trait]
    impl Handler for Slow {
        async fn handle(&self, _scope: &RequestScope<'_>) -> Next {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Next::Continue
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    async fn run(guard: &Guard, ctx: &RequestContext) -> Next {
        guard.handle(&RequestScope::new(ctx)).await
    }

    #[tokio::test]
    async fn test_and_all_pass() {
        let ctx = RequestContext::new(test_user());
        let guard = Guard::all(vec![pass(), pass()]);
        assert_eq!(run(&guard, &ctx).await, Next::Continue);
        assert!(ctx.error_levels().is_empty());
    }

    #[tokio::test]
    async fn test_and_one_fails() {
        let ctx = RequestContext::new(test_user());
        let guard = Guard::all(vec![pass(), fail("no role"), pass()]);
        let next = run(&guard, &ctx).await;

        assert_eq!(next.error().map(AccessError::kind), Some(ErrorKind::NotFound));
        assert_eq!(ctx.errors_at(1), vec![AccessError::forbidden("no role")]);
    }

    #[tokio::test]
    async fn test_or_one_passes() {
        let ctx = RequestContext::new(test_user());
        let guard = Guard::any(vec![fail("a"), pass(), fail("b")]);
        assert_eq!(run(&guard, &ctx).await, Next::Continue);
        assert_eq!(ctx.errors_at(1).len(), 2);
    }

    #[tokio::test]
    async fn test_or_all_fail() {
        let ctx = RequestContext::new(test_user());
        let guard = Guard::any(vec![fail("a"), fail("b")]);
        assert!(run(&guard, &ctx).await.error().is_some());
    }

    #[tokio::test]
    async fn test_zero_handlers_pass() {
        let ctx = RequestContext::new(test_user());
        assert_eq!(run(&Guard::all(vec![]), &ctx).await, Next::Continue);
        assert_eq!(run(&Guard::any(vec![]), &ctx).await, Next::Continue);
    }

    #[tokio::test]
    async fn test_direct_error_counts_as_failure() {
        let ctx = RequestContext::new(test_user());
        let guard = Guard::any(vec![Arc::new(Raw)]);
        assert!(run(&guard, &ctx).await.error().is_some());
        assert_eq!(ctx.errors_at(1), vec![AccessError::server("raw")]);
    }

    #[tokio::test]
    async fn test_nested_failure_is_one_outer_failure() {
        let ctx = RequestContext::new(test_user());
        let inner: Arc<dyn Handler> = Arc::new(Guard::all(vec![fail("x"), fail("y")]));
        let outer = Guard::any(vec![inner, pass()]);

        assert_eq!(run(&outer, &ctx).await, Next::Continue);
        assert_eq!(ctx.errors_at(2).len(), 2);
        let outer_errors = ctx.errors_at(1);
        assert_eq!(outer_errors.len(), 1);
        assert_eq!(outer_errors[0].kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_nested_failure_fails_outer_and() {
        let ctx = RequestContext::new(test_user());
        let inner: Arc<dyn Handler> = Arc::new(Guard::any(vec![fail("x")]));
        let outer = Guard::all(vec![pass(), inner]);
        assert!(run(&outer, &ctx).await.error().is_some());
    }

    #[tokio::test]
    async fn test_sibling_guards_counted_separately() {
        let ctx = RequestContext::new(test_user());
        let failing: Arc<dyn Handler> = Arc::new(Guard::all(vec![fail("x"), fail("y")]));
        let passing: Arc<dyn Handler> = Arc::new(Guard::all(vec![Arc::new(Slow), pass()]));
        let outer = Guard::any(vec![failing, passing]);

        assert_eq!(run(&outer, &ctx).await, Next::Continue);
        assert_eq!(ctx.errors_at(1).len(), 1);
    }

    #[tokio::test]
    async fn test_inner_guard_standalone_propagates() {
        let ctx = RequestContext::new(test_user());
        let scope = RequestScope::new(&ctx);
        let guard = Guard::new(GuardOperator::And).with_handler(check_fn("fail", |_| {
            Err(AccessError::not_found("missing"))
        }));
        let next = guard.handle(&scope).await;
        assert!(matches!(next, Next::Error(_)));
        assert_eq!(scope.level(), 0);
    }

    #[test]
    fn test_operator_rule() {
        assert!(GuardOperator::And.passes(0, 3));
        assert!(!GuardOperator::And.passes(1, 3));
        assert!(GuardOperator::Or.passes(2, 3));
        assert!(!GuardOperator::Or.passes(3, 3));
    }
}
