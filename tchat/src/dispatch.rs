//! Drives one vendor call against an assembled session.
//!
//! Streaming dispatch spawns a single producer task that feeds the fragment queue while the
//! calling task drains it, echoing each fragment as it arrives. Blocking dispatch is one
//! atomic `send`. Either way, an empty result fails before anything is persisted.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tcommon::ChatOptions;
use tprovider::{Fragment, Message, ModelRequest, Role, VendorBackend, fragment_channel};

use crate::error::NO_MESSAGES_PROVIDED;
use crate::{
    ChatError, DispatchContext, DispatchHooks, FileChangeProcessor, MarkerFileChangeProcessor,
    NoopDispatchHooks, Session, SessionStore,
};

pub const DEFAULT_CODING_FEATURE_PATTERN: &str = "create_coding_feature";

/// What the consumer does with a terminal error fragment.
///
/// The default is [`StreamErrorPolicy::Fail`], so a broken stream is never persisted as a
/// reply. [`StreamErrorPolicy::Inline`] restores the older behavior of mixing the error text
/// into the generated output.
///
/// ```rust
/// use tchat::{DispatchConfig, StreamErrorPolicy};
///
/// assert_eq!(DispatchConfig::default().stream_error_policy, StreamErrorPolicy::Fail);
///
/// let legacy = DispatchConfig::new().with_stream_error_policy(StreamErrorPolicy::Inline);
/// assert_eq!(legacy.stream_error_policy, StreamErrorPolicy::Inline);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamErrorPolicy {
    /// Return the producer's error as a `Transport` failure.
    #[default]
    Fail,
    /// Append the error text to the output as if it were generated.
    Inline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub default_model: Option<String>,
    pub default_context_length: Option<u32>,
    pub coding_feature_pattern: String,
    pub project_root: PathBuf,
    pub stream_error_policy: StreamErrorPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_model: None,
            default_context_length: None,
            coding_feature_pattern: DEFAULT_CODING_FEATURE_PATTERN.to_string(),
            project_root: PathBuf::from("."),
            stream_error_policy: StreamErrorPolicy::default(),
        }
    }
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_default_context_length(mut self, length: u32) -> Self {
        self.default_context_length = Some(length);
        self
    }

    pub fn with_coding_feature_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.coding_feature_pattern = pattern.into();
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_stream_error_policy(mut self, policy: StreamErrorPolicy) -> Self {
        self.stream_error_policy = policy;
        self
    }

    /// Fills unset model and context length from the configured defaults.
    pub fn effective_options(&self, mut options: ChatOptions) -> ChatOptions {
        if options.model.as_deref().is_none_or(|model| model.trim().is_empty()) {
            options.model = self.default_model.clone();
        }
        if options.model_context_length.is_none_or(|length| length == 0) {
            options.model_context_length = self.default_context_length;
        }
        options
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub session: Session,
    pub options: ChatOptions,
    pub stream: bool,
    pub pattern_name: Option<String>,
}

impl DispatchRequest {
    pub fn new(session: Session, options: ChatOptions) -> Self {
        Self {
            session,
            options,
            stream: false,
            pattern_name: None,
        }
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_pattern(mut self, pattern_name: impl Into<String>) -> Self {
        self.pattern_name = Some(pattern_name.into());
        self
    }
}

/// Result of a successful dispatch. `warning` carries a downgraded post-processing failure.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub session: Session,
    pub text: String,
    pub warning: Option<ChatError>,
}

/// Receives each streamed fragment as soon as it is consumed.
pub trait FragmentEcho: Send + Sync {
    fn echo(&self, fragment: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutEcho;

impl FragmentEcho for StdoutEcho {
    fn echo(&self, fragment: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(fragment.as_bytes());
        let _ = stdout.flush();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentEcho;

impl FragmentEcho for SilentEcho {
    fn echo(&self, _fragment: &str) {}
}

#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn VendorBackend>,
    sessions: Arc<dyn SessionStore>,
    config: DispatchConfig,
    echo: Arc<dyn FragmentEcho>,
    hooks: Arc<dyn DispatchHooks>,
    file_changes: Arc<dyn FileChangeProcessor>,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn VendorBackend>,
        sessions: Arc<dyn SessionStore>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            backend,
            sessions,
            config,
            echo: Arc::new(StdoutEcho),
            hooks: Arc::new(NoopDispatchHooks),
            file_changes: Arc::new(MarkerFileChangeProcessor),
        }
    }

    pub fn with_echo(mut self, echo: Arc<dyn FragmentEcho>) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_file_changes(mut self, processor: Arc<dyn FileChangeProcessor>) -> Self {
        self.file_changes = processor;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn VendorBackend> {
        &self.backend
    }

    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchOutcome, ChatError> {
        let DispatchRequest {
            mut session,
            options,
            stream,
            pattern_name,
        } = request;

        let messages = session.vendor_messages();
        if messages.is_empty() {
            if session.is_named() {
                self.sessions.save(&session)?;
            }
            return Err(ChatError::validation(NO_MESSAGES_PROVIDED));
        }

        let options = self.config.effective_options(options);
        let model = options
            .model
            .clone()
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| ChatError::validation("no model selected and no default configured"))?;

        let context = DispatchContext {
            vendor: self.backend.name().to_string(),
            model: model.clone(),
            session: session.name.clone(),
            stream,
        };

        let model_request = ModelRequest::builder(model)
            .messages(messages)
            .options(&options)
            .build()?;

        self.hooks.on_dispatch_start(&context);
        let started = Instant::now();

        let result = if stream {
            self.stream_text(model_request, &context).await
        } else {
            self.backend
                .send(model_request)
                .await
                .map_err(ChatError::from)
        };

        let text = match result {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                let error = ChatError::empty_response();
                self.hooks
                    .on_dispatch_failure(&context, &error, started.elapsed());
                return Err(error);
            }
            Err(error) => {
                self.hooks
                    .on_dispatch_failure(&context, &error, started.elapsed());
                return Err(error);
            }
        };

        let (text, warning) = self.post_process(pattern_name.as_deref(), text, &context);

        session.append(Message::new(Role::Assistant, text.clone()));
        if session.is_named() {
            self.sessions.save(&session)?;
        }

        self.hooks
            .on_dispatch_success(&context, text.chars().count(), started.elapsed());

        Ok(DispatchOutcome {
            session,
            text,
            warning,
        })
    }

    async fn stream_text(
        &self,
        request: ModelRequest,
        context: &DispatchContext,
    ) -> Result<String, ChatError> {
        let (sender, mut receiver) = fragment_channel();
        let backend = Arc::clone(&self.backend);

        let producer = tokio::spawn(async move {
            let error_sender = sender.clone();
            if let Err(error) = backend.send_stream(request, sender).await {
                // Fails only when the consumer is gone, and then nobody is left to tell.
                let _ = error_sender.send_error(error).await;
            }
        });

        let mut text = String::new();
        let mut failure = None;

        while let Some(fragment) = receiver.recv().await {
            match fragment {
                Fragment::Text(part) => {
                    self.echo.echo(&part);
                    self.hooks.on_fragment(context, &part);
                    text.push_str(&part);
                }
                Fragment::Error(error) => match self.config.stream_error_policy {
                    StreamErrorPolicy::Fail => failure = Some(error),
                    StreamErrorPolicy::Inline => {
                        let rendered = error.to_string();
                        self.echo.echo(&rendered);
                        text.push_str(&rendered);
                    }
                },
            }
        }

        producer
            .await
            .map_err(|err| ChatError::transport(format!("stream producer failed: {err}")))?;

        match failure {
            Some(error) => Err(error.into()),
            None => Ok(text),
        }
    }

    fn post_process(
        &self,
        pattern_name: Option<&str>,
        text: String,
        context: &DispatchContext,
    ) -> (String, Option<ChatError>) {
        if pattern_name != Some(self.config.coding_feature_pattern.as_str()) {
            return (text, None);
        }

        let parsed = match self.file_changes.parse(&text) {
            Ok(parsed) => parsed,
            Err(error) => {
                self.report_warning(context, &error);
                return (text, Some(error));
            }
        };

        if parsed.changes.is_empty() {
            return (parsed.summary, None);
        }

        let warning = match self
            .file_changes
            .apply(&self.config.project_root, &parsed.changes)
        {
            Ok(()) => {
                tracing::info!(
                    phase = "post_process",
                    event = "file_changes_applied",
                    vendor = %context.vendor,
                    changes = parsed.changes.len(),
                    root = %self.config.project_root.display()
                );
                None
            }
            Err(error) => {
                self.report_warning(context, &error);
                Some(error)
            }
        };

        (parsed.summary, warning)
    }

    fn report_warning(&self, context: &DispatchContext, warning: &ChatError) {
        tracing::warn!(
            phase = "post_process",
            event = "warning",
            vendor = %context.vendor,
            session = context.session_label(),
            error_kind = ?warning.kind,
            error = %warning
        );
        self.hooks.on_post_process_warning(context, warning);
    }
}
