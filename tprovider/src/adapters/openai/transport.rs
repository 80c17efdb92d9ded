//! OpenAI transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::adapters::lines::LineBuffer;
use crate::{ProviderError, ProviderFuture};

use super::auth::OpenAiAuth;
use super::serde_api::{
    OpenAiApiModelList, OpenAiApiResponse, OpenAiApiStreamResponse, build_api_request,
    extract_error_message,
};
use super::types::{OpenAiRequest, OpenAiResponse};

/// Text deltas of a streamed completion, in arrival order.
pub type OpenAiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>>;

    fn list_models<'a>(
        &'a self,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: super::OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("OpenAI request failed with status {status}"));
        Err(ProviderError::from_status(status.as_u16(), message))
    }

    async fn post_chat(
        &self,
        request: OpenAiRequest,
        auth: &OpenAiAuth,
    ) -> Result<Response, ProviderError> {
        let api_request = build_api_request(request)?;
        let builder = self
            .client
            .post(self.endpoint("chat/completions"))
            .json(&api_request);
        let response = auth.apply(builder).send().await?;
        Self::check_status(response).await
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        mut request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            request.stream = false;
            let response = self.post_chat(request, &auth).await?;
            let parsed: OpenAiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(OpenAiResponse::from(parsed))
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self.post_chat(request, &auth).await?;

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut lines = LineBuffer::new();

                'read: while let Some(item) = chunks.next().await {
                    let bytes = item?;
                    lines.push(&bytes);

                    while let Some(line) = lines.next_line() {
                        match parse_sse_line(&line?)? {
                            SseLine::Delta(content) => yield content,
                            SseLine::Done => break 'read,
                            SseLine::Skip => {}
                        }
                    }
                }
            };

            Ok(Box::pin(stream) as OpenAiChunkStream<'a>)
        })
    }

    fn list_models<'a>(
        &'a self,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            let builder = self.client.get(self.endpoint("models"));
            let response = Self::check_status(auth.apply(builder).send().await?).await?;
            let parsed: OpenAiApiModelList = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parsed.data.into_iter().map(|model| model.id).collect())
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseLine {
    Delta(String),
    Done,
    Skip,
}

/// Interprets one server-sent event line of a streamed chat completion.
pub(crate) fn parse_sse_line(line: &str) -> Result<SseLine, ProviderError> {
    let Some(payload) = line.trim().strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };

    let payload = payload.trim();
    if payload == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload)
        .map_err(|err| ProviderError::transport(format!("malformed stream chunk: {err}")))?;

    if let Some(error) = parsed.error {
        return Err(ProviderError::transport(error.message));
    }

    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map_or(SseLine::Skip, SseLine::Delta))
}
