//! Session assembly and single-turn dispatch over vendor backends.

mod assembler;
mod dispatch;
mod error;
mod file_changes;
mod hooks;
mod service;
mod store;
mod template;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatRequest, ChatService, ChatServiceBuilder, Context,
        ContextStore, DispatchConfig, DispatchContext, DispatchHooks, DispatchOutcome,
        DispatchRequest, Dispatcher, FileChangeProcessor, FragmentEcho, InMemoryContextStore,
        InMemoryPatternStore, InMemorySessionStore, InMemoryStrategyLoader,
        MiniJinjaTemplateEngine, NoopDispatchHooks, Pattern, PatternStore, RequestAssembler,
        Session, SessionStore, StdoutEcho, Strategy, StrategyLoader, StreamErrorPolicy,
        TemplateEngine,
    };
    pub use tcommon::{ChatOptions, SessionName, VariableMap};
    pub use tprovider::{Message, Role, VendorBackend, VendorRegistry};
}

pub use assembler::{PLACEHOLDER_INPUT, RequestAssembler};
pub use dispatch::{
    DEFAULT_CODING_FEATURE_PATTERN, DispatchConfig, DispatchOutcome, DispatchRequest, Dispatcher,
    FragmentEcho, SilentEcho, StdoutEcho, StreamErrorPolicy,
};
pub use error::{
    ChatError, ChatErrorKind, EMPTY_RESPONSE, NO_MESSAGES_PROVIDED, NO_SESSION_PATTERN_OR_MESSAGE,
};
pub use file_changes::{
    FILE_CHANGES_MARKER, FileChange, FileChangeProcessor, FileOperation,
    MarkerFileChangeProcessor, ParsedFileChanges,
};
pub use hooks::{DispatchContext, DispatchHooks, NoopDispatchHooks};
pub use service::{ChatService, ChatServiceBuilder};
pub use store::{
    ContextStore, InMemoryContextStore, InMemoryPatternStore, InMemorySessionStore,
    InMemoryStrategyLoader, PatternStore, SessionStore, StrategyLoader,
};
pub use template::{MiniJinjaTemplateEngine, TemplateEngine};
pub use types::{ChatRequest, Context, Pattern, Session, Strategy};
pub use tcommon::{ChatOptions, SessionName, VariableMap};
