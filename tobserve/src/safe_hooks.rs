use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tchat::{ChatError, DispatchContext, DispatchHooks};

/// Swallows panics raised by the wrapped hooks so a faulty observer cannot abort a dispatch.
pub struct SafeDispatchHooks<H> {
    inner: H,
}

impl<H> SafeDispatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> DispatchHooks for SafeDispatchHooks<H>
where
    H: DispatchHooks,
{
    fn on_dispatch_start(&self, context: &DispatchContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_dispatch_start(context)));
    }

    fn on_fragment(&self, context: &DispatchContext, fragment: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_fragment(context, fragment)
        }));
    }

    fn on_dispatch_success(
        &self,
        context: &DispatchContext,
        response_chars: usize,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_dispatch_success(context, response_chars, elapsed)
        }));
    }

    fn on_dispatch_failure(&self, context: &DispatchContext, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_failure(context, error, elapsed)
        }));
    }

    fn on_post_process_warning(&self, context: &DispatchContext, warning: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_post_process_warning(context, warning)
        }));
    }
}

/// Forwards every callback to each hook in order.
#[derive(Clone, Default)]
pub struct FanoutDispatchHooks {
    hooks: Vec<std::sync::Arc<dyn DispatchHooks>>,
}

impl FanoutDispatchHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: std::sync::Arc<dyn DispatchHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl DispatchHooks for FanoutDispatchHooks {
    fn on_dispatch_start(&self, context: &DispatchContext) {
        for hooks in &self.hooks {
            hooks.on_dispatch_start(context);
        }
    }

    fn on_fragment(&self, context: &DispatchContext, fragment: &str) {
        for hooks in &self.hooks {
            hooks.on_fragment(context, fragment);
        }
    }

    fn on_dispatch_success(
        &self,
        context: &DispatchContext,
        response_chars: usize,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_dispatch_success(context, response_chars, elapsed);
        }
    }

    fn on_dispatch_failure(&self, context: &DispatchContext, error: &ChatError, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_dispatch_failure(context, error, elapsed);
        }
    }

    fn on_post_process_warning(&self, context: &DispatchContext, warning: &ChatError) {
        for hooks in &self.hooks {
            hooks.on_post_process_warning(context, warning);
        }
    }
}
