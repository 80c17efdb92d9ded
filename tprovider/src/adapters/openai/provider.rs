//! OpenAI-compatible backend over a pluggable transport.

use std::sync::Arc;

use futures_util::StreamExt;

use crate::{
    FragmentSender, ModelRequest, ProviderError, ProviderFuture, VendorBackend,
};

use super::auth::OpenAiAuth;
use super::transport::OpenAiTransport;
use super::types::OpenAiRequest;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Any vendor speaking the chat-completions protocol, registered under its own name.
#[derive(Clone)]
pub struct OpenAiBackend {
    name: String,
    auth: OpenAiAuth,
    transport: Arc<dyn OpenAiTransport>,
}

impl OpenAiBackend {
    pub fn new(
        name: impl Into<String>,
        auth: OpenAiAuth,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            name: name.into(),
            auth,
            transport,
        }
    }

    pub(crate) fn build_openai_request(
        &self,
        request: ModelRequest,
        stream: bool,
    ) -> Result<OpenAiRequest, ProviderError> {
        request.validate()?;
        OpenAiRequest::from_model_request(request, stream)
    }
}

impl VendorBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move { self.transport.list_models(self.auth.clone()).await })
    }

    fn send<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let openai_request = self.build_openai_request(request, false)?;
            let response = self
                .transport
                .complete(openai_request, self.auth.clone())
                .await?;
            Ok(response.content)
        })
    }

    fn send_stream<'a>(
        &'a self,
        request: ModelRequest,
        sender: FragmentSender,
    ) -> ProviderFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            let openai_request = self.build_openai_request(request, true)?;
            let mut chunks = self
                .transport
                .stream(openai_request, self.auth.clone())
                .await?;

            while let Some(chunk) = chunks.next().await {
                sender.send_text(chunk?).await?;
            }

            Ok(())
        })
    }
}
