//! OpenAI-compatible authentication.

use std::fmt::Formatter;

use crate::{ProviderError, SecretString};

#[derive(Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    ApiKey(SecretString),
    /// Local OpenAI-compatible servers that accept unauthenticated requests.
    Anonymous,
}

impl OpenAiAuth {
    pub fn api_key(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let secret = SecretString::new(api_key);
        if secret.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        Ok(Self::ApiKey(secret))
    }

    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::ApiKey(key) => builder.bearer_auth(key.expose()),
            Self::Anonymous => builder,
        }
    }
}

impl std::fmt::Debug for OpenAiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("OpenAiAuth::ApiKey([REDACTED])"),
            Self::Anonymous => f.write_str("OpenAiAuth::Anonymous"),
        }
    }
}
