//! Correlation context for one inbound request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a request across every log line it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// Correlation ID shared with upstream and downstream calls.
    pub correlation_id: Uuid,
    /// Route or operation being served.
    pub operation: String,
    /// Staff username, once authenticated.
    pub username: Option<String>,
    /// Prisoner the request is about, if any.
    pub prisoner_number: Option<String>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
}

impl CorrelationContext {
    /// Create a context for `operation`.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            request_id: id,
            correlation_id: id,
            operation: operation.into(),
            username: None,
            prisoner_number: None,
            started_at: Utc::now(),
        }
    }

    /// Adopt a correlation ID received from a caller.
    #[must_use]
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = id;
        self
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the prisoner number.
    #[must_use]
    pub fn with_prisoner_number(mut self, prisoner_number: impl Into<String>) -> Self {
        self.prisoner_number = Some(prisoner_number.into());
        self
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// A `request` span carrying this context's fields.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            correlation_id = %self.correlation_id,
            operation = %self.operation,
            username = self.username.as_deref(),
            prisoner_number = self.prisoner_number.as_deref(),
        )
    }
}

/// Logs request start on creation and completion on drop, inside the
/// context's span.
///
/// The span is not entered by the guard, so it can be held across `.await`;
/// instrument the request future with [`CorrelationGuard::span`].
pub struct CorrelationGuard {
    context: CorrelationContext,
    span: tracing::Span,
}

impl CorrelationGuard {
    /// Start tracking a request.
    #[must_use]
    pub fn new(context: CorrelationContext) -> Self {
        let span = context.span();
        span.in_scope(|| tracing::debug!("Request started"));
        Self { context, span }
    }

    /// The request context.
    #[must_use]
    pub fn context(&self) -> &CorrelationContext {
        &self.context
    }

    /// The request span.
    #[must_use]
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }
}

impl Drop for CorrelationGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.context.elapsed_ms();
        self.span
            .in_scope(|| tracing::debug!(elapsed_ms, "Request completed"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = CorrelationContext::new("overview");
        assert_eq!(ctx.operation, "overview");
        assert_eq!(ctx.request_id, ctx.correlation_id);
        assert!(ctx.username.is_none());
        assert!(ctx.prisoner_number.is_none());
    }

    #[test]
    fn test_context_builder() {
        let correlation = Uuid::new_v4();
        let ctx = CorrelationContext::new("money")
            .with_correlation_id(correlation)
            .with_username("JSMITH")
            .with_prisoner_number("G6123VU");

        assert_eq!(ctx.correlation_id, correlation);
        assert_ne!(ctx.request_id, correlation);
        assert_eq!(ctx.username.as_deref(), Some("JSMITH"));
        assert_eq!(ctx.prisoner_number.as_deref(), Some("G6123VU"));
    }

    #[test]
    fn test_elapsed() {
        let ctx = CorrelationContext::new("test");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed_ms() >= 10);
    }

    #[test]
    fn test_guard_keeps_context() {
        let ctx = CorrelationContext::new("alerts").with_username("JSMITH");
        let guard = CorrelationGuard::new(ctx.clone());
        assert_eq!(guard.context().request_id, ctx.request_id);
    }

    #[test]
    fn test_serialization() {
        let ctx = CorrelationContext::new("case_notes").with_prisoner_number("A1234BC");
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"operation\":\"case_notes\""));

        let parsed: CorrelationContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request_id, ctx.request_id);
        assert_eq!(parsed.prisoner_number.as_deref(), Some("A1234BC"));
    }
}
