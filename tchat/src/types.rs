//! Session, request, and asset value types.

use serde::{Deserialize, Serialize};
use tcommon::{SessionName, VariableMap};
use tprovider::{Message, Role, wire_messages};

/// Ordered conversation owned by one request until it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SessionName>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<SessionName>) -> Self {
        Self {
            name: Some(name.into()),
            messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Messages a vendor may see, in session order.
    pub fn vendor_messages(&self) -> Vec<Message> {
        wire_messages(&self.messages)
    }

    /// True when at least one vendor-visible message carries non-blank text.
    pub fn has_content(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.is_wire() && !message.content.trim().is_empty())
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }
}

/// Layered inputs of one chat turn. Empty names count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub session_name: Option<SessionName>,
    pub context_name: Option<String>,
    pub pattern_name: Option<String>,
    pub strategy_name: Option<String>,
    pub language: Option<String>,
    pub pattern_variables: VariableMap,
    pub message: Option<Message>,
    pub input_has_vars: bool,
    pub meta: Option<String>,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request carrying a single user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::default().with_message(Message::new(Role::User, content))
    }

    pub fn with_session(mut self, name: impl Into<SessionName>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    pub fn with_context(mut self, name: impl Into<String>) -> Self {
        self.context_name = Some(name.into());
        self
    }

    pub fn with_pattern(mut self, name: impl Into<String>) -> Self {
        self.pattern_name = Some(name.into());
        self
    }

    pub fn with_strategy(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = Some(name.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pattern_variables.insert(key.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: VariableMap) -> Self {
        self.pattern_variables.extend(variables);
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_input_vars(mut self) -> Self {
        self.input_has_vars = true;
        self
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub content: String,
}

impl Context {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A pattern after variable and input substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub prompt: String,
}

impl Strategy {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            prompt: prompt.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
