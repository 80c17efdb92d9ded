use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tchat::{ChatError, DispatchContext, DispatchHooks};
use tcommon::SessionName;

use crate::{
    FanoutDispatchHooks, MetricsObservabilityHooks, SafeDispatchHooks, TracingObservabilityHooks,
};

fn sample_context() -> DispatchContext {
    DispatchContext {
        vendor: "OpenAI".to_string(),
        model: "gpt-4o-mini".to_string(),
        session: Some(SessionName::new("session-1")),
        stream: true,
    }
}

fn exercise(hooks: &dyn DispatchHooks) {
    let context = sample_context();
    let warning = ChatError::partial_apply("could not write src/main.rs");
    let failure = ChatError::transport("connection reset");

    hooks.on_dispatch_start(&context);
    hooks.on_fragment(&context, "Hel");
    hooks.on_fragment(&context, "lo");
    hooks.on_post_process_warning(&context, &warning);
    hooks.on_dispatch_success(&context, 5, Duration::from_millis(40));
    hooks.on_dispatch_failure(&context, &failure, Duration::from_millis(40));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    exercise(&TracingObservabilityHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    exercise(&MetricsObservabilityHooks);
}

#[test]
fn anonymous_session_has_empty_label() {
    let context = DispatchContext {
        session: None,
        stream: false,
        ..sample_context()
    };
    assert_eq!(context.session_label(), "");
    assert_eq!(context.mode(), "send");
    exercise(&TracingObservabilityHooks);
}

#[derive(Default, Clone)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl DispatchHooks for RecordingHooks {
    fn on_dispatch_start(&self, _context: &DispatchContext) {
        self.events.lock().expect("events lock").push("start");
    }

    fn on_fragment(&self, _context: &DispatchContext, _fragment: &str) {
        self.events.lock().expect("events lock").push("fragment");
    }

    fn on_dispatch_success(
        &self,
        _context: &DispatchContext,
        _response_chars: usize,
        _elapsed: Duration,
    ) {
        self.events.lock().expect("events lock").push("success");
    }

    fn on_dispatch_failure(
        &self,
        _context: &DispatchContext,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
        self.events.lock().expect("events lock").push("failure");
    }

    fn on_post_process_warning(&self, _context: &DispatchContext, _warning: &ChatError) {
        self.events.lock().expect("events lock").push("warning");
    }
}

struct PanickingHooks;

impl DispatchHooks for PanickingHooks {
    fn on_dispatch_start(&self, _context: &DispatchContext) {
        panic!("start hook panic");
    }

    fn on_fragment(&self, _context: &DispatchContext, _fragment: &str) {
        panic!("fragment hook panic");
    }

    fn on_dispatch_success(
        &self,
        _context: &DispatchContext,
        _response_chars: usize,
        _elapsed: Duration,
    ) {
        panic!("success hook panic");
    }

    fn on_dispatch_failure(
        &self,
        _context: &DispatchContext,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
        panic!("failure hook panic");
    }

    fn on_post_process_warning(&self, _context: &DispatchContext, _warning: &ChatError) {
        panic!("warning hook panic");
    }
}

#[test]
fn safe_hooks_forward_callbacks() {
    let recording = RecordingHooks::default();
    let safe = SafeDispatchHooks::new(recording.clone());

    exercise(&safe);

    let events = recording.events.lock().expect("events lock").clone();
    assert_eq!(
        events,
        vec!["start", "fragment", "fragment", "warning", "success", "failure"]
    );
}

#[test]
fn safe_hooks_swallow_panics() {
    exercise(&SafeDispatchHooks::new(PanickingHooks));
}

#[test]
fn fanout_keeps_going_past_a_panicking_hook_when_wrapped() {
    let recording = RecordingHooks::default();
    let hooks = FanoutDispatchHooks::new()
        .with(Arc::new(SafeDispatchHooks::new(PanickingHooks)))
        .with(Arc::new(recording.clone()));

    hooks.on_dispatch_start(&sample_context());
    hooks.on_fragment(&sample_context(), "x");

    let events = recording.events.lock().expect("events lock").clone();
    assert_eq!(events, vec!["start", "fragment"]);
}

#[derive(Default, Clone)]
struct CountingSubscriber {
    events: Arc<AtomicUsize>,
}

impl tracing::Subscriber for CountingSubscriber {
    fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
        tracing::span::Id::from_u64(1)
    }

    fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

    fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

    fn event(&self, _event: &tracing::Event<'_>) {
        self.events.fetch_add(1, Ordering::SeqCst);
    }

    fn enter(&self, _span: &tracing::span::Id) {}

    fn exit(&self, _span: &tracing::span::Id) {}
}

#[test]
fn tracing_hooks_leave_post_process_warnings_to_the_dispatcher() {
    let subscriber = CountingSubscriber::default();
    let events = subscriber.events.clone();
    let context = sample_context();
    let warning = ChatError::partial_apply("could not write src/main.rs");

    tracing::subscriber::with_default(subscriber, || {
        TracingObservabilityHooks.on_post_process_warning(&context, &warning);
        assert_eq!(events.load(Ordering::SeqCst), 0);

        TracingObservabilityHooks.on_dispatch_start(&context);
        assert_eq!(events.load(Ordering::SeqCst), 1);
    });
}
