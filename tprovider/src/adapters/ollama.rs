//! Native Ollama backend speaking `/api/chat` and `/api/tags`.
//!
//! Streaming responses arrive as newline-delimited JSON objects, one per fragment, with a
//! final object carrying `"done": true`.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    FragmentSender, GenerationControls, ModelRequest, ProviderError, ProviderFuture,
    VendorBackend,
};

use super::lines::LineBuffer;

pub const OLLAMA_HOST_URL: &str = "http://localhost:11434";
/// Local models can take minutes to load, so the client timeout is generous.
pub const OLLAMA_DEFAULT_TIMEOUT: Duration = Duration::from_secs(1200);

pub type OllamaChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send + 'a>>;

/// Wire shape of an Ollama chat request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, Value>>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

impl OllamaChatRequest {
    pub(crate) fn from_model_request(
        request: ModelRequest,
        stream: bool,
    ) -> Result<Self, ProviderError> {
        request.validate()?;

        let messages = request
            .messages
            .into_iter()
            .map(|message| OllamaMessage {
                role: message.role.as_str().to_string(),
                content: message.content,
            })
            .collect();

        Ok(Self {
            model: request.model,
            messages,
            options: request.controls.as_ref().map(options_map),
            stream,
        })
    }
}

fn options_map(controls: &GenerationControls) -> BTreeMap<String, Value> {
    let mut options = BTreeMap::new();
    options.insert("temperature".to_string(), Value::from(controls.temperature));
    options.insert("top_p".to_string(), Value::from(controls.top_p));
    options.insert(
        "presence_penalty".to_string(),
        Value::from(controls.presence_penalty),
    );
    options.insert(
        "frequency_penalty".to_string(),
        Value::from(controls.frequency_penalty),
    );

    if let Some(context_length) = controls.context_length.filter(|length| *length > 0) {
        options.insert("num_ctx".to_string(), Value::from(context_length));
    }
    if let Some(seed) = controls.seed {
        options.insert("seed".to_string(), Value::from(seed));
    }

    options
}

pub trait OllamaTransport: Send + Sync + std::fmt::Debug {
    fn chat<'a>(
        &'a self,
        request: OllamaChatRequest,
    ) -> ProviderFuture<'a, Result<String, ProviderError>>;

    fn chat_stream<'a>(
        &'a self,
        request: OllamaChatRequest,
    ) -> ProviderFuture<'a, Result<OllamaChunkStream<'a>, ProviderError>>;

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OllamaHttpTransport {
    client: Client,
    base_url: String,
}

impl OllamaHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OLLAMA_HOST_URL.to_string(),
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
        let message = serde_json::from_str::<OllamaApiChunk>(&body)
            .ok()
            .and_then(|chunk| chunk.error)
            .unwrap_or_else(|| format!("Ollama request failed with status {status}"));

        Err(ProviderError::from_status(status.as_u16(), message))
    }

    async fn post_chat(&self, request: &OllamaChatRequest) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint("api/chat"))
            .json(request)
            .send()
            .await?;
        Self::check_status(response).await
    }
}

impl OllamaTransport for OllamaHttpTransport {
    fn chat<'a>(
        &'a self,
        mut request: OllamaChatRequest,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            request.stream = false;
            let response = self.post_chat(&request).await?;
            let parsed: OllamaApiChunk = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            parsed.into_content()
        })
    }

    fn chat_stream<'a>(
        &'a self,
        mut request: OllamaChatRequest,
    ) -> ProviderFuture<'a, Result<OllamaChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self.post_chat(&request).await?;

            let stream = try_stream! {
                let mut bytes = response.bytes_stream();
                let mut lines = LineBuffer::new();
                let mut done = false;

                'read: while let Some(item) = bytes.next().await {
                    let item = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    lines.push(&item);

                    while let Some(line) = lines.next_line() {
                        let line = line?;
                        let Some(chunk) = parse_ndjson_line(&line)? else {
                            continue;
                        };
                        done = chunk.done;
                        let content = chunk.into_content()?;
                        if !content.is_empty() {
                            yield content;
                        }
                        if done {
                            break 'read;
                        }
                    }
                }

                // Servers may omit the trailing newline on the last object.
                if !done {
                    if let Some(rest) = lines.finish() {
                        if let Some(chunk) = parse_ndjson_line(&rest?)? {
                            let content = chunk.into_content()?;
                            if !content.is_empty() {
                                yield content;
                            }
                        }
                    }
                }
            };

            Ok(Box::pin(stream) as OllamaChunkStream<'a>)
        })
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            let response = self.client.get(self.endpoint("api/tags")).send().await?;
            let response = Self::check_status(response).await?;
            let parsed: OllamaTagsResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parsed
                .models
                .into_iter()
                .filter_map(OllamaModelTag::into_id)
                .collect())
        })
    }
}

fn parse_ndjson_line(line: &str) -> Result<Option<OllamaApiChunk>, ProviderError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|err| ProviderError::transport(err.to_string()))
}

#[derive(Clone)]
pub struct OllamaBackend {
    name: String,
    transport: Arc<dyn OllamaTransport>,
}

impl OllamaBackend {
    pub fn new(transport: Arc<dyn OllamaTransport>) -> Self {
        Self {
            name: "Ollama".to_string(),
            transport,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn default_http_client() -> Result<Client, ProviderError> {
        Ok(Client::builder().timeout(OLLAMA_DEFAULT_TIMEOUT).build()?)
    }
}

impl VendorBackend for OllamaBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        self.transport.list_models()
    }

    fn send<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let request = OllamaChatRequest::from_model_request(request, false)?;
            self.transport.chat(request).await
        })
    }

    fn send_stream<'a>(
        &'a self,
        request: ModelRequest,
        sender: FragmentSender,
    ) -> ProviderFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            let request = OllamaChatRequest::from_model_request(request, true)?;
            let mut chunks = self.transport.chat_stream(request).await?;

            while let Some(chunk) = chunks.next().await {
                sender.send_text(chunk?).await?;
            }

            Ok(())
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaApiChunk {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaApiChunk {
    fn into_content(self) -> Result<String, ProviderError> {
        if let Some(error) = self.error {
            return Err(ProviderError::transport(error));
        }

        Ok(self
            .message
            .map(|message| message.content)
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl OllamaModelTag {
    fn into_id(self) -> Option<String> {
        self.model.or(self.name)
    }
}

#[cfg(test)]
mod tests {
    use tcommon::ChatOptions;

    use super::*;
    use crate::{Message, ProviderErrorKind, Role};

    fn request(options: &ChatOptions) -> OllamaChatRequest {
        let request = ModelRequest::builder("llama3.2")
            .message(Message::new(Role::User, "hi"))
            .options(options)
            .build()
            .expect("request should build");
        OllamaChatRequest::from_model_request(request, false).expect("ollama request")
    }

    #[test]
    fn options_include_num_ctx_only_when_set() {
        let plain = request(&ChatOptions::default());
        let options = plain.options.expect("non-raw request has options");
        assert!(!options.contains_key("num_ctx"));
        assert!(!options.contains_key("seed"));
        assert_eq!(options["temperature"], Value::from(0.7));

        let sized = request(&ChatOptions::default().with_context_length(4096).with_seed(0));
        let options = sized.options.expect("non-raw request has options");
        assert_eq!(options["num_ctx"], Value::from(4096));
        assert_eq!(options["seed"], Value::from(0));
    }

    #[test]
    fn raw_request_serializes_without_options() {
        let raw = request(&ChatOptions::default().with_context_length(4096).raw_mode());
        let value = serde_json::to_value(&raw).expect("serialize");
        assert!(value.get("options").is_none());
        assert_eq!(value["messages"][0]["role"], Value::from("user"));
    }

    #[test]
    fn ndjson_lines_reassembled_from_split_chunks_keep_non_ascii_text() {
        let body = "{\"message\":{\"role\":\"assistant\",\"content\":\"café\"},\"done\":false}\n";
        let bytes = body.as_bytes();
        let split = bytes
            .iter()
            .position(|byte| *byte == 0xC3)
            .expect("first byte of é")
            + 1;

        let mut lines = LineBuffer::new();
        lines.push(&bytes[..split]);
        assert!(lines.next_line().is_none());
        lines.push(&bytes[split..]);

        let line = lines.next_line().expect("line").expect("utf-8");
        let chunk = parse_ndjson_line(&line)
            .expect("valid json")
            .expect("non-blank line");
        assert!(!chunk.done);
        assert_eq!(chunk.into_content().expect("content"), "café");
        assert!(parse_ndjson_line("  \n").expect("blank").is_none());
    }

    #[test]
    fn error_chunk_becomes_transport_error() {
        let chunk: OllamaApiChunk =
            serde_json::from_str(r#"{"error":"model 'x' not found"}"#).expect("parse");
        let err = chunk.into_content().expect_err("error chunk should fail");
        assert_eq!(err.kind, ProviderErrorKind::Transport);
        assert_eq!(err.message, "model 'x' not found");
    }

    #[test]
    fn tags_accept_model_or_name_field() {
        let parsed: OllamaTagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3.2:latest","model":"llama3.2:latest"},{"name":"mistral:7b"}]}"#,
        )
        .expect("parse");
        let names = parsed
            .models
            .into_iter()
            .filter_map(OllamaModelTag::into_id)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["llama3.2:latest", "mistral:7b"]);
    }
}
