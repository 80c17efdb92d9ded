//! Tracing-based observability hooks for chat dispatch.
//!
//! ```rust
//! use tchat::DispatchHooks;
//! use tobserve::TracingObservabilityHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use tchat::{ChatError, DispatchContext, DispatchHooks};

/// Post-processing warnings are not re-emitted here; the dispatcher already logs them
/// where they occur.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl DispatchHooks for TracingObservabilityHooks {
    fn on_dispatch_start(&self, context: &DispatchContext) {
        tracing::info!(
            phase = "dispatch",
            event = "start",
            vendor = %context.vendor,
            model = %context.model,
            session = context.session_label(),
            mode = context.mode()
        );
    }

    fn on_fragment(&self, context: &DispatchContext, fragment: &str) {
        tracing::trace!(
            phase = "dispatch",
            event = "fragment",
            vendor = %context.vendor,
            session = context.session_label(),
            fragment_chars = fragment.chars().count()
        );
    }

    fn on_dispatch_success(
        &self,
        context: &DispatchContext,
        response_chars: usize,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "dispatch",
            event = "success",
            vendor = %context.vendor,
            model = %context.model,
            session = context.session_label(),
            mode = context.mode(),
            response_chars,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_dispatch_failure(&self, context: &DispatchContext, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "dispatch",
            event = "failure",
            vendor = %context.vendor,
            model = %context.model,
            session = context.session_label(),
            mode = context.mode(),
            error_kind = ?error.kind,
            error = %error,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }
}
