//! Common imports for most Tapestry applications.

pub use crate::{
    assistant_message, build_backend, build_registry, build_runtime, build_runtime_with,
    default_observability_hooks, discover_runtime, list_models_for, meta_message, parse_vendor_kind,
    pattern_request, request, session_request, system_message, user_message,
};
pub use crate::{tp_messages, tp_msg, tp_vars};
pub use crate::{
    ChatError, ChatErrorKind, ChatOptions, ChatRequest, ChatService, ChatServiceBuilder,
    ContextStore, DispatchConfig, DispatchHooks, DispatchOutcome, InMemoryContextStore,
    InMemoryPatternStore, InMemorySessionStore, InMemoryStrategyLoader, Message,
    MiniJinjaTemplateEngine, PatternStore, ProviderError, Role, RuntimeBundle, RuntimeConfig,
    RuntimeStores, Session, SessionName, SessionStore, StrategyLoader, StreamErrorPolicy,
    VariableMap, VendorBackend, VendorConfig, VendorKind, VendorRegistry, VendorsModels,
};
