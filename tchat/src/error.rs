//! Chat-layer errors and classification.
//!
//! ```rust
//! use tchat::{ChatError, ChatErrorKind};
//!
//! let err = ChatError::no_session_pattern_or_message();
//! assert_eq!(err.kind, ChatErrorKind::Validation);
//! assert!(err.to_string().starts_with("Validation: no session"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use tprovider::ProviderError;

pub const NO_SESSION_PATTERN_OR_MESSAGE: &str = "no session, pattern or user messages provided";
pub const NO_MESSAGES_PROVIDED: &str = "no messages provided";
pub const EMPTY_RESPONSE: &str = "empty response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// A named session, context, pattern, or strategy does not exist.
    NotFound,
    Validation,
    Template,
    Transport,
    Store,
    /// File-change parse or apply failure. Only ever reported as a warning.
    PartialApply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Validation, message)
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Template, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn partial_apply(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::PartialApply, message)
    }

    pub fn no_session_pattern_or_message() -> Self {
        Self::validation(NO_SESSION_PATTERN_OR_MESSAGE)
    }

    pub fn empty_response() -> Self {
        Self::validation(EMPTY_RESPONSE)
    }

    /// Prefixes the message while keeping the kind.
    pub(crate) fn context(mut self, prefix: impl Display) -> Self {
        self.message = format!("{prefix}: {}", self.message);
        self
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        ChatError::transport(value.to_string())
    }
}
