//! Unified facade over the Tapestry workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core tapestry crates and provides runtime wiring from vendor
//! configuration plus small helpers and macros for building requests.

mod macros;

pub mod models;
pub mod prelude;
pub mod providers;
pub mod runtime;
pub mod util;

pub use tchat;
pub use tcommon;
pub use tobserve;
pub use tprovider;

pub use tchat::{
    ChatError, ChatErrorKind, ChatRequest, ChatService, ChatServiceBuilder, Context,
    ContextStore, DEFAULT_CODING_FEATURE_PATTERN, DispatchConfig, DispatchContext, DispatchHooks,
    DispatchOutcome, DispatchRequest, Dispatcher, FILE_CHANGES_MARKER, FileChange,
    FileChangeProcessor, FileOperation, FragmentEcho, InMemoryContextStore, InMemoryPatternStore,
    InMemorySessionStore, InMemoryStrategyLoader, MarkerFileChangeProcessor,
    MiniJinjaTemplateEngine, NoopDispatchHooks, PLACEHOLDER_INPUT, ParsedFileChanges, Pattern,
    PatternStore, RequestAssembler, Session, SessionStore, SilentEcho, StdoutEcho, Strategy,
    StrategyLoader, StreamErrorPolicy, TemplateEngine,
};
pub use tcommon::{BoxFuture, ChatOptions, SessionName, VariableMap};
pub use tobserve::{
    FanoutDispatchHooks, MetricsObservabilityHooks, SafeDispatchHooks, TracingObservabilityHooks,
};
pub use tprovider::{
    Fragment, FragmentReceiver, FragmentSender, Message, ModelRequest, ModelRequestBuilder,
    ProviderError, ProviderErrorKind, ProviderFuture, Role, SecretString, VendorBackend,
    VendorRegistry, fragment_channel,
};

pub use models::{VendorModels, VendorsModels};
pub use providers::{
    DEFAULT_VENDOR_TIMEOUT, VendorConfig, VendorKind, build_available_registry, build_backend,
    build_registry, list_models_for,
};
pub use runtime::{
    RuntimeBundle, RuntimeConfig, RuntimeStores, build_runtime, build_runtime_with,
    default_observability_hooks, discover_runtime, discover_runtime_with,
};
pub use util::{
    assistant_message, meta_message, parse_vendor_kind, pattern_request, request,
    session_request, system_message, user_message,
};
