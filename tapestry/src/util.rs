//! Small convenience constructors for common types.

use crate::{ChatRequest, Message, Role, SessionName, VendorKind};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn meta_message(content: impl Into<String>) -> Message {
    Message::new(Role::Meta, content)
}

pub fn request(input: impl Into<String>) -> ChatRequest {
    ChatRequest::user(input)
}

pub fn pattern_request(pattern: impl Into<String>, input: impl Into<String>) -> ChatRequest {
    ChatRequest::user(input).with_pattern(pattern)
}

pub fn session_request(session: impl Into<String>, input: impl Into<String>) -> ChatRequest {
    ChatRequest::user(input).with_session(SessionName::new(session))
}

pub fn parse_vendor_kind(value: &str) -> Option<VendorKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" | "openai-compatible" | "openai_compatible" | "groq" | "anthropic"
        | "lmstudio" | "lm-studio" => Some(VendorKind::OpenAiCompatible),
        "ollama" | "local" => Some(VendorKind::Ollama),
        _ => None,
    }
}
