//! Metrics-based observability hooks for chat dispatch.
//!
//! ```rust
//! use tchat::DispatchHooks;
//! use tobserve::MetricsObservabilityHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use tchat::{ChatError, DispatchContext, DispatchHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl DispatchHooks for MetricsObservabilityHooks {
    fn on_dispatch_start(&self, context: &DispatchContext) {
        metrics::counter!(
            "tapestry_dispatch_start_total",
            "vendor" => context.vendor.clone(),
            "mode" => context.mode()
        )
        .increment(1);
    }

    fn on_fragment(&self, context: &DispatchContext, fragment: &str) {
        metrics::counter!(
            "tapestry_dispatch_fragments_total",
            "vendor" => context.vendor.clone()
        )
        .increment(1);
        metrics::histogram!(
            "tapestry_dispatch_fragment_chars",
            "vendor" => context.vendor.clone()
        )
        .record(fragment.chars().count() as f64);
    }

    fn on_dispatch_success(
        &self,
        context: &DispatchContext,
        response_chars: usize,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tapestry_dispatch_success_total",
            "vendor" => context.vendor.clone(),
            "mode" => context.mode()
        )
        .increment(1);
        metrics::histogram!(
            "tapestry_dispatch_duration_seconds",
            "vendor" => context.vendor.clone(),
            "mode" => context.mode()
        )
        .record(elapsed.as_secs_f64());
        metrics::histogram!(
            "tapestry_dispatch_response_chars",
            "vendor" => context.vendor.clone()
        )
        .record(response_chars as f64);
    }

    fn on_dispatch_failure(&self, context: &DispatchContext, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "tapestry_dispatch_failure_total",
            "vendor" => context.vendor.clone(),
            "mode" => context.mode(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "tapestry_dispatch_duration_seconds",
            "vendor" => context.vendor.clone(),
            "mode" => context.mode()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_post_process_warning(&self, context: &DispatchContext, warning: &ChatError) {
        metrics::counter!(
            "tapestry_dispatch_post_process_warning_total",
            "vendor" => context.vendor.clone(),
            "error_kind" => format!("{:?}", warning.kind)
        )
        .increment(1);
    }
}
