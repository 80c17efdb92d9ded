//! One chat turn: assemble, dispatch, persist.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tchat::{ChatRequest, ChatService, InMemoryPatternStore, MiniJinjaTemplateEngine};
//! use tprovider::{
//!     FragmentSender, ModelRequest, ProviderError, ProviderFuture, Role, VendorBackend,
//! };
//!
//! struct Echo;
//!
//! impl VendorBackend for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
//!         Box::pin(async { Ok(vec!["echo-1".to_string()]) })
//!     }
//!
//!     fn send<'a>(&'a self, request: ModelRequest) -> ProviderFuture<'a, Result<String, ProviderError>> {
//!         Box::pin(async move { Ok(request.messages[0].content.clone()) })
//!     }
//!
//!     fn send_stream<'a>(
//!         &'a self,
//!         _request: ModelRequest,
//!         _sender: FragmentSender,
//!     ) -> ProviderFuture<'a, Result<(), ProviderError>> {
//!         Box::pin(async { Ok(()) })
//!     }
//! }
//!
//! let patterns = InMemoryPatternStore::new(Arc::new(MiniJinjaTemplateEngine::new()))
//!     .with_pattern("summarize", "Summarize:");
//! let service = ChatService::builder(Arc::new(Echo))
//!     .pattern_store(Arc::new(patterns))
//!     .build();
//!
//! let session = service
//!     .build_session(ChatRequest::user("hello").with_pattern("summarize"), false)
//!     .unwrap();
//! assert_eq!(session.messages[0].role, Role::System);
//! assert_eq!(session.messages[1].content, "hello");
//! ```

use std::sync::Arc;

use tcommon::ChatOptions;
use tprovider::VendorBackend;

use crate::{
    ChatError, ChatRequest, ContextStore, DispatchConfig, DispatchHooks, DispatchOutcome,
    DispatchRequest, Dispatcher, FileChangeProcessor, FragmentEcho, InMemoryContextStore,
    InMemoryPatternStore, InMemorySessionStore, InMemoryStrategyLoader, MiniJinjaTemplateEngine,
    PatternStore, RequestAssembler, Session, SessionStore, StrategyLoader, TemplateEngine,
};

#[derive(Clone)]
pub struct ChatService {
    assembler: RequestAssembler,
    dispatcher: Dispatcher,
    stream: bool,
}

impl ChatService {
    pub fn builder(backend: Arc<dyn VendorBackend>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(backend)
    }

    pub fn build_session(&self, request: ChatRequest, raw: bool) -> Result<Session, ChatError> {
        self.assembler.build_session(request, raw)
    }

    /// Assembles the request, dispatches it, and persists the session when it is named.
    pub async fn send(
        &self,
        request: ChatRequest,
        options: ChatOptions,
    ) -> Result<DispatchOutcome, ChatError> {
        let pattern_name = request.pattern_name.clone();
        let session = self.build_session(request, options.raw)?;

        self.dispatcher
            .dispatch(DispatchRequest {
                session,
                options,
                stream: self.stream,
                pattern_name,
            })
            .await
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

pub struct ChatServiceBuilder {
    backend: Arc<dyn VendorBackend>,
    sessions: Arc<dyn SessionStore>,
    contexts: Arc<dyn ContextStore>,
    patterns: Option<Arc<dyn PatternStore>>,
    strategies: Arc<dyn StrategyLoader>,
    templates: Arc<dyn TemplateEngine>,
    config: DispatchConfig,
    echo: Option<Arc<dyn FragmentEcho>>,
    hooks: Option<Arc<dyn DispatchHooks>>,
    file_changes: Option<Arc<dyn FileChangeProcessor>>,
    stream: bool,
}

impl ChatServiceBuilder {
    pub fn new(backend: Arc<dyn VendorBackend>) -> Self {
        Self {
            backend,
            sessions: Arc::new(InMemorySessionStore::new()),
            contexts: Arc::new(InMemoryContextStore::new()),
            patterns: None,
            strategies: Arc::new(InMemoryStrategyLoader::new()),
            templates: Arc::new(MiniJinjaTemplateEngine::new()),
            config: DispatchConfig::default(),
            echo: None,
            hooks: None,
            file_changes: None,
            stream: false,
        }
    }

    pub fn session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn context_store(mut self, contexts: Arc<dyn ContextStore>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn pattern_store(mut self, patterns: Arc<dyn PatternStore>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn strategy_loader(mut self, strategies: Arc<dyn StrategyLoader>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn template_engine(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn echo(mut self, echo: Arc<dyn FragmentEcho>) -> Self {
        self.echo = Some(echo);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn file_changes(mut self, processor: Arc<dyn FileChangeProcessor>) -> Self {
        self.file_changes = Some(processor);
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build(self) -> ChatService {
        let patterns = self
            .patterns
            .unwrap_or_else(|| Arc::new(InMemoryPatternStore::new(self.templates.clone())));

        let assembler = RequestAssembler::new(
            self.sessions.clone(),
            self.contexts,
            patterns,
            self.strategies,
            self.templates,
        );

        let mut dispatcher = Dispatcher::new(self.backend, self.sessions, self.config);
        if let Some(echo) = self.echo {
            dispatcher = dispatcher.with_echo(echo);
        }
        if let Some(hooks) = self.hooks {
            dispatcher = dispatcher.with_hooks(hooks);
        }
        if let Some(file_changes) = self.file_changes {
            dispatcher = dispatcher.with_file_changes(file_changes);
        }

        ChatService {
            assembler,
            dispatcher,
            stream: self.stream,
        }
    }
}
