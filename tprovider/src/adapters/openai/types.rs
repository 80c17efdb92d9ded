//! OpenAI adapter types and vendor-agnostic conversion logic.

use crate::{GenerationControls, Message, ModelRequest, ProviderError, Role};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub sampling: Option<OpenAiSampling>,
    pub stream: bool,
}

impl OpenAiRequest {
    pub(crate) fn from_model_request(
        request: ModelRequest,
        stream: bool,
    ) -> Result<Self, ProviderError> {
        let messages = request
            .messages
            .into_iter()
            .map(OpenAiMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model: request.model,
            messages,
            sampling: request.controls.map(OpenAiSampling::from),
            stream,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: OpenAiRole,
    pub content: String,
}

impl TryFrom<Message> for OpenAiMessage {
    type Error = ProviderError;

    fn try_from(value: Message) -> Result<Self, Self::Error> {
        Ok(Self {
            role: OpenAiRole::try_from(value.role)?,
            content: value.content,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl TryFrom<Role> for OpenAiRole {
    type Error = ProviderError;

    fn try_from(value: Role) -> Result<Self, Self::Error> {
        match value {
            Role::System => Ok(Self::System),
            Role::User => Ok(Self::User),
            Role::Assistant => Ok(Self::Assistant),
            Role::Meta => Err(ProviderError::invalid_request(
                "meta messages have no OpenAI role",
            )),
        }
    }
}

/// Sampling fields of a chat completion. The context length has no OpenAI equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiSampling {
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub seed: Option<i64>,
}

impl From<GenerationControls> for OpenAiSampling {
    fn from(value: GenerationControls) -> Self {
        Self {
            temperature: value.temperature,
            top_p: value.top_p,
            presence_penalty: value.presence_penalty,
            frequency_penalty: value.frequency_penalty,
            seed: value.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiResponse {
    pub model: String,
    pub content: String,
    pub system_fingerprint: Option<String>,
}
