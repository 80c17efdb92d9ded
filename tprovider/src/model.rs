//! Vendor-agnostic message and request model types.
//!
//! ```rust
//! use tprovider::{Message, ModelRequest, ProviderErrorKind, Role};
//! use tcommon::ChatOptions;
//!
//! let ok = ModelRequest::builder("gpt-4o-mini")
//!     .message(Message::new(Role::User, "Summarize this diff"))
//!     .options(&ChatOptions::default())
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::builder("")
//!     .message(Message::new(Role::User, "hi"))
//!     .build()
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tcommon::ChatOptions;

use crate::ProviderError;

/// Closed set of conversation roles.
///
/// `Meta` entries are bookkeeping for the session transcript and have no wire equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Meta,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Meta => "meta",
        }
    }

    pub fn is_wire(self) -> bool {
        !matches!(self, Self::Meta)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn is_wire(&self) -> bool {
        self.role.is_wire()
    }
}

/// Drops transcript-only entries, keeping the relative order of everything else.
pub fn wire_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|message| message.is_wire())
        .cloned()
        .collect()
}

/// Sampling controls forwarded to a vendor. Absent entirely for raw requests.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationControls {
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub seed: Option<i64>,
    pub context_length: Option<u32>,
}

impl GenerationControls {
    pub fn from_options(options: &ChatOptions) -> Option<Self> {
        if options.raw {
            return None;
        }

        Some(Self {
            temperature: options.temperature,
            top_p: options.top_p,
            presence_penalty: options.presence_penalty,
            frequency_penalty: options.frequency_penalty,
            seed: options.seed,
            context_length: options.model_context_length,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub controls: Option<GenerationControls>,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            controls: None,
        }
    }

    pub fn with_controls(mut self, controls: GenerationControls) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn is_raw(&self) -> bool {
        self.controls.is_none()
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if self.messages.iter().any(|message| !message.is_wire()) {
            return Err(ProviderError::invalid_request(
                "meta messages must not be sent to a vendor",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    model: String,
    messages: Vec<Message>,
    controls: Option<GenerationControls>,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            controls: None,
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn options(mut self, options: &ChatOptions) -> Self {
        self.controls = GenerationControls::from_options(options);
        self
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        let request = ModelRequest {
            model: self.model,
            messages: self.messages,
            controls: self.controls,
        };

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use tcommon::ChatOptions;

    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn wire_messages_drops_meta_and_preserves_order() {
        let messages = vec![
            Message::new(Role::Meta, "audit"),
            Message::new(Role::System, "be brief"),
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "hello"),
        ];

        let wire = wire_messages(&messages);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, Role::System);
        assert_eq!(wire[1].role, Role::User);
        assert_eq!(wire[2].role, Role::Assistant);
    }

    #[test]
    fn raw_options_produce_no_controls() {
        let raw = ChatOptions::default().with_seed(3).raw_mode();
        assert_eq!(GenerationControls::from_options(&raw), None);

        let cooked = GenerationControls::from_options(&ChatOptions::default())
            .expect("non-raw options carry controls");
        assert_eq!(cooked.seed, None);
        assert_eq!(cooked.temperature, 0.7);
    }

    #[test]
    fn validate_rejects_meta_messages() {
        let request = ModelRequest::new(
            "gpt-4o-mini",
            vec![
                Message::new(Role::Meta, "audit"),
                Message::new(Role::User, "hi"),
            ],
        );

        let err = request.validate().expect_err("meta must be rejected");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn validate_rejects_empty_messages() {
        let err = ModelRequest::builder("gpt-4o-mini")
            .build()
            .expect_err("empty message list must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::new(Role::Meta, "x")).expect("serialize");
        assert_eq!(json, r#"{"role":"meta","content":"x"}"#);
    }
}
