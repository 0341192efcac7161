//! Sequential request pipeline.

use std::fmt;
use std::sync::Arc;

use tracing::{Instrument, error, info};

use warden_core::{AccessError, ErrorKind, ErrorPage};
use warden_telemetry::CorrelationGuard;

use crate::context::RequestContext;
use crate::guard::Handler;
use crate::next::Next;
use crate::scope::RequestScope;

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage continued; serve the route.
    Completed,
    /// A stage skipped the rest of the route.
    Skipped,
    /// A stage failed; render the error.
    Failed(AccessError),
}

impl PipelineOutcome {
    /// Whether the route should be served.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The error, if the run failed.
    #[must_use]
    pub fn error(&self) -> Option<&AccessError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Page to render for a failure.
    #[must_use]
    pub fn error_page(&self) -> Option<ErrorPage> {
        self.error().map(AccessError::error_page)
    }

    /// Status to send for a failure.
    #[must_use]
    pub fn public_status(&self) -> Option<u16> {
        self.error().map(AccessError::public_status)
    }
}

/// Ordered stages run for every request on a route.
///
/// Stages run one after another against the outermost scope, so a failing
/// stage (or outermost guard) ends the run with its error.
#[derive(Default, Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Handler>>,
}

impl Pipeline {
    /// An empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    #[must_use]
    pub fn stage(self, handler: impl Handler + 'static) -> Self {
        self.with_stage(Arc::new(handler))
    }

    /// Append a shared stage.
    #[must_use]
    pub fn with_stage(mut self, handler: Arc<dyn Handler>) -> Self {
        self.stages.push(handler);
        self
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether there are no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage for `ctx`.
    pub async fn run(&self, ctx: &RequestContext) -> PipelineOutcome {
        let guard = CorrelationGuard::new(ctx.correlation().clone());
        let span = guard.span().clone();
        self.run_stages(ctx).instrument(span).await
    }

    async fn run_stages(&self, ctx: &RequestContext) -> PipelineOutcome {
        let scope = RequestScope::new(ctx);
        for stage in &self.stages {
            match stage.handle(&scope).await {
                Next::Continue => {},
                Next::Route => {
                    info!(stage = stage.name(), "Route skipped");
                    return PipelineOutcome::Skipped;
                },
                Next::Error(e) => {
                    if e.kind() == ErrorKind::Server {
                        error!(stage = stage.name(), reason = e.reason(), "Request failed");
                    } else {
                        info!(
                            stage = stage.name(),
                            kind = %e.kind(),
                            reason = e.reason(),
                            "Request refused"
                        );
                    }
                    return PipelineOutcome::Failed(e);
                },
            }
        }
        PipelineOutcome::Completed
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("Pipeline").field("stages", &names).finish()
    }
}
