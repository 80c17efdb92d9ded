//! Production-friendly observability hooks for chat dispatch.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tobserve::{
//!     FanoutDispatchHooks, MetricsObservabilityHooks, SafeDispatchHooks,
//!     TracingObservabilityHooks,
//! };
//!
//! let hooks = FanoutDispatchHooks::new()
//!     .with(Arc::new(SafeDispatchHooks::new(TracingObservabilityHooks)))
//!     .with(Arc::new(MetricsObservabilityHooks));
//! assert_eq!(hooks.len(), 2);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{FanoutDispatchHooks, SafeDispatchHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        FanoutDispatchHooks, MetricsObservabilityHooks, SafeDispatchHooks,
        TracingObservabilityHooks,
    };
}

#[cfg(test)]
mod tests;
