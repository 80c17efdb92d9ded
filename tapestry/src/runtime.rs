//! Runtime wiring: configured vendors, stores, and observability into one chat service.

use std::sync::Arc;

use tobserve::{
    FanoutDispatchHooks, MetricsObservabilityHooks, SafeDispatchHooks, TracingObservabilityHooks,
};

use crate::models::VendorsModels;
use crate::providers::build_available_registry;
use crate::{
    ChatError, ChatService, ContextStore, DispatchConfig, DispatchHooks, InMemoryContextStore,
    InMemoryPatternStore, InMemorySessionStore, InMemoryStrategyLoader, MiniJinjaTemplateEngine,
    PatternStore, ProviderError, SessionStore, StrategyLoader, TemplateEngine, VendorBackend,
    VendorConfig, VendorRegistry,
};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// `None` leaves the vendor to be found from the default model's listing.
    pub default_vendor: Option<String>,
    pub vendors: Vec<VendorConfig>,
    pub dispatch: DispatchConfig,
    pub stream: bool,
    pub observability: bool,
}

impl RuntimeConfig {
    pub fn new(default_vendor: impl Into<String>) -> Self {
        Self {
            default_vendor: Some(default_vendor.into()),
            ..Self::discovering()
        }
    }

    /// A config whose vendor is chosen by [`discover_runtime`] from the default model.
    pub fn discovering() -> Self {
        Self {
            default_vendor: None,
            vendors: Vec::new(),
            dispatch: DispatchConfig::default(),
            stream: false,
            observability: true,
        }
    }

    pub fn with_vendor(mut self, vendor: VendorConfig) -> Self {
        self.vendors.push(vendor);
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn observability(mut self, enabled: bool) -> Self {
        self.observability = enabled;
        self
    }
}

/// Storage collaborators shared by the assembler and the dispatcher.
#[derive(Clone)]
pub struct RuntimeStores {
    pub sessions: Arc<dyn SessionStore>,
    pub contexts: Arc<dyn ContextStore>,
    pub patterns: Arc<dyn PatternStore>,
    pub strategies: Arc<dyn StrategyLoader>,
    pub templates: Arc<dyn TemplateEngine>,
}

impl RuntimeStores {
    pub fn in_memory() -> Self {
        let templates: Arc<dyn TemplateEngine> = Arc::new(MiniJinjaTemplateEngine::new());
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            contexts: Arc::new(InMemoryContextStore::new()),
            patterns: Arc::new(InMemoryPatternStore::new(templates.clone())),
            strategies: Arc::new(InMemoryStrategyLoader::new()),
            templates,
        }
    }

    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn contexts(mut self, contexts: Arc<dyn ContextStore>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn patterns(mut self, patterns: Arc<dyn PatternStore>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn strategies(mut self, strategies: Arc<dyn StrategyLoader>) -> Self {
        self.strategies = strategies;
        self
    }
}

impl Default for RuntimeStores {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[derive(Clone)]
pub struct RuntimeBundle {
    pub registry: Arc<VendorRegistry>,
    pub backend: Arc<dyn VendorBackend>,
    pub sessions: Arc<dyn SessionStore>,
    pub chat: ChatService,
}

pub fn default_observability_hooks() -> Arc<dyn DispatchHooks> {
    Arc::new(
        FanoutDispatchHooks::new()
            .with(Arc::new(SafeDispatchHooks::new(TracingObservabilityHooks)))
            .with(Arc::new(SafeDispatchHooks::new(MetricsObservabilityHooks))),
    )
}

/// Builds the configured vendors and wires a runtime around the default one.
///
/// A vendor that fails to build only fails the runtime when it is the default; others are
/// logged and left out of the registry.
pub fn build_runtime(
    config: RuntimeConfig,
    stores: RuntimeStores,
) -> Result<RuntimeBundle, ChatError> {
    let default_vendor = config
        .default_vendor
        .as_deref()
        .ok_or_else(missing_default_vendor)?;
    let (registry, failures) = build_available_registry(&config.vendors);
    for (vendor, err) in failures {
        if vendor.eq_ignore_ascii_case(default_vendor.trim()) {
            return Err(invalid_vendor(&vendor, err));
        }
        warn_skipped_vendor(&vendor, &err);
    }
    build_runtime_with(registry, config, stores)
}

/// Builds every vendor that can be built, then picks the default from their model listings.
pub async fn discover_runtime(
    config: RuntimeConfig,
    stores: RuntimeStores,
) -> Result<RuntimeBundle, ChatError> {
    let (registry, failures) = build_available_registry(&config.vendors);
    for (vendor, err) in &failures {
        warn_skipped_vendor(vendor, err);
    }
    discover_runtime_with(registry, config, stores).await
}

/// Resolves the default vendor and model from the registry's listings.
///
/// The default model may be a model name or a 1-based number across the grouped listing. A
/// configured default vendor is kept when it offers the model.
pub async fn discover_runtime_with(
    registry: VendorRegistry,
    mut config: RuntimeConfig,
    stores: RuntimeStores,
) -> Result<RuntimeBundle, ChatError> {
    let selection = config
        .dispatch
        .default_model
        .clone()
        .filter(|model| !model.trim().is_empty())
        .ok_or_else(|| ChatError::validation("a default model is required to select a vendor"))?;

    let models = VendorsModels::collect(&registry).await;
    let (vendor, model) = models.select(&selection, config.default_vendor.as_deref())?;
    tracing::info!(
        phase = "defaults",
        event = "vendor_selected",
        vendor = %vendor,
        model = %model
    );

    config.default_vendor = Some(vendor);
    config.dispatch.default_model = Some(model);
    build_runtime_with(registry, config, stores)
}

/// Wires a runtime over an already populated registry.
///
/// The active backend is resolved once here; every later turn dispatches to it.
pub fn build_runtime_with(
    registry: VendorRegistry,
    config: RuntimeConfig,
    stores: RuntimeStores,
) -> Result<RuntimeBundle, ChatError> {
    let default_vendor = config
        .default_vendor
        .as_deref()
        .ok_or_else(missing_default_vendor)?;
    let backend = registry.get(default_vendor).ok_or_else(|| {
        ChatError::not_found(format!("vendor {default_vendor} is not configured"))
    })?;

    let mut builder = ChatService::builder(Arc::clone(&backend))
        .session_store(Arc::clone(&stores.sessions))
        .context_store(stores.contexts)
        .pattern_store(stores.patterns)
        .strategy_loader(stores.strategies)
        .template_engine(stores.templates)
        .config(config.dispatch)
        .streaming(config.stream);

    if config.observability {
        builder = builder.hooks(default_observability_hooks());
    }

    Ok(RuntimeBundle {
        registry: Arc::new(registry),
        backend,
        sessions: stores.sessions,
        chat: builder.build(),
    })
}

fn missing_default_vendor() -> ChatError {
    ChatError::validation("no default vendor configured")
}

fn invalid_vendor(vendor: &str, err: ProviderError) -> ChatError {
    ChatError::validation(format!("invalid configuration for vendor {vendor}: {err}"))
}

fn warn_skipped_vendor(vendor: &str, err: &ProviderError) {
    tracing::warn!(
        phase = "runtime",
        event = "vendor_skipped",
        vendor = %vendor,
        error = %err
    );
}
