//! Dispatch lifecycle callbacks.

use std::time::Duration;

use tcommon::SessionName;

use crate::ChatError;

/// Identifies one dispatch for hook implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    pub vendor: String,
    pub model: String,
    pub session: Option<SessionName>,
    pub stream: bool,
}

impl DispatchContext {
    pub fn session_label(&self) -> &str {
        self.session
            .as_ref()
            .map(SessionName::as_str)
            .unwrap_or("")
    }

    pub fn mode(&self) -> &'static str {
        if self.stream { "stream" } else { "send" }
    }
}

pub trait DispatchHooks: Send + Sync {
    fn on_dispatch_start(&self, _context: &DispatchContext) {}

    fn on_fragment(&self, _context: &DispatchContext, _fragment: &str) {}

    fn on_dispatch_success(
        &self,
        _context: &DispatchContext,
        _response_chars: usize,
        _elapsed: Duration,
    ) {
    }

    fn on_dispatch_failure(&self, _context: &DispatchContext, _error: &ChatError, _elapsed: Duration) {
    }

    fn on_post_process_warning(&self, _context: &DispatchContext, _warning: &ChatError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
