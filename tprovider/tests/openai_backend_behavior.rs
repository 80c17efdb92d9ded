#![cfg(feature = "provider-openai")]

use std::sync::{Arc, Mutex};

use futures_util::stream;
use tprovider::adapters::openai::{
    OpenAiAuth, OpenAiBackend, OpenAiChunkStream, OpenAiRequest, OpenAiResponse, OpenAiRole,
    OpenAiTransport,
};
use tprovider::{
    ChatOptions, Fragment, Message, ModelRequest, ProviderError, ProviderErrorKind,
    ProviderFuture, Role, VendorBackend, fragment_channel,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_auth: Mutex<Option<OpenAiAuth>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
    fail_stream_after_first: bool,
}

impl FakeTransport {
    fn capture(&self, request: OpenAiRequest, auth: OpenAiAuth) {
        *self.captured_request.lock().expect("request lock") = Some(request);
        *self.captured_auth.lock().expect("auth lock") = Some(auth);
    }

    fn request(&self) -> OpenAiRequest {
        self.captured_request
            .lock()
            .expect("request lock")
            .clone()
            .expect("request should be captured")
    }
}

impl OpenAiTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            self.capture(request, auth);
            Ok(OpenAiResponse {
                model: "gpt-4o-mini".to_string(),
                content: "hello world".to_string(),
                system_fingerprint: None,
            })
        })
    }

    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.capture(request, auth);
            let chunks = if self.fail_stream_after_first {
                vec![
                    Ok("hello".to_string()),
                    Err(ProviderError::transport("connection reset")),
                ]
            } else {
                vec![Ok("hello".to_string()), Ok(" world".to_string())]
            };
            Ok(Box::pin(stream::iter(chunks)) as OpenAiChunkStream<'a>)
        })
    }

    fn list_models<'a>(
        &'a self,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>> {
        Box::pin(async move {
            *self.captured_auth.lock().expect("auth lock") = Some(auth);
            Ok(vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()])
        })
    }
}

fn user_request(options: &ChatOptions) -> ModelRequest {
    ModelRequest::builder("gpt-4o")
        .message(Message::new(Role::System, "be brief"))
        .message(Message::new(Role::User, "hi"))
        .options(options)
        .build()
        .expect("request should build")
}

#[tokio::test]
async fn send_returns_text_and_forwards_api_key() {
    let transport = Arc::new(FakeTransport::default());
    let auth = OpenAiAuth::api_key("sk-live-123").expect("key should be accepted");
    let backend = OpenAiBackend::new("OpenAI", auth.clone(), transport.clone());

    let text = backend
        .send(user_request(&ChatOptions::default()))
        .await
        .expect("send should succeed");
    assert_eq!(text, "hello world");

    let captured = transport.request();
    assert_eq!(captured.model, "gpt-4o");
    assert!(!captured.stream);
    assert_eq!(captured.messages[0].role, OpenAiRole::System);
    assert_eq!(
        captured.sampling.as_ref().map(|sampling| sampling.temperature),
        Some(0.7)
    );

    let captured_auth = transport.captured_auth.lock().expect("auth lock").clone();
    assert_eq!(captured_auth, Some(auth));
}

#[tokio::test]
async fn raw_send_carries_no_sampling() {
    let transport = Arc::new(FakeTransport::default());
    let backend = OpenAiBackend::new("LM Studio", OpenAiAuth::Anonymous, transport.clone());

    backend
        .send(user_request(&ChatOptions::default().with_seed(9).raw_mode()))
        .await
        .expect("send should succeed");

    assert_eq!(transport.request().sampling, None);
}

#[tokio::test]
async fn send_stream_pushes_fragments_in_order_then_closes() {
    let transport = Arc::new(FakeTransport::default());
    let backend = OpenAiBackend::new("OpenAI", OpenAiAuth::Anonymous, transport.clone());
    let (sender, mut receiver) = fragment_channel();

    let producer = tokio::spawn(async move {
        backend
            .send_stream(user_request(&ChatOptions::default()), sender)
            .await
    });

    let mut fragments = Vec::new();
    while let Some(fragment) = receiver.recv().await {
        fragments.push(fragment);
    }

    producer
        .await
        .expect("producer should not panic")
        .expect("stream should succeed");
    assert_eq!(
        fragments,
        vec![
            Fragment::Text("hello".to_string()),
            Fragment::Text(" world".to_string()),
        ]
    );
    assert!(transport.request().stream);
}

#[tokio::test]
async fn send_stream_failure_is_returned_and_queue_still_closes() {
    let transport = Arc::new(FakeTransport {
        fail_stream_after_first: true,
        ..FakeTransport::default()
    });
    let backend = OpenAiBackend::new("OpenAI", OpenAiAuth::Anonymous, transport);
    let (sender, mut receiver) = fragment_channel();

    let producer = tokio::spawn(async move {
        backend
            .send_stream(user_request(&ChatOptions::default()), sender)
            .await
    });

    let mut fragments = Vec::new();
    while let Some(fragment) = receiver.recv().await {
        fragments.push(fragment);
    }

    let err = producer
        .await
        .expect("producer should not panic")
        .expect_err("stream should fail");
    assert_eq!(err.kind, ProviderErrorKind::Transport);
    assert_eq!(fragments, vec![Fragment::Text("hello".to_string())]);
}

#[tokio::test]
async fn meta_messages_are_rejected_before_transport() {
    let transport = Arc::new(FakeTransport::default());
    let backend = OpenAiBackend::new("OpenAI", OpenAiAuth::Anonymous, transport.clone());
    let request = ModelRequest::new(
        "gpt-4o",
        vec![
            Message::new(Role::Meta, "audit"),
            Message::new(Role::User, "hi"),
        ],
    );

    let err = backend
        .send(request)
        .await
        .expect_err("meta should be rejected");
    assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    assert!(transport.captured_request.lock().expect("lock").is_none());
}

#[tokio::test]
async fn list_models_delegates_to_transport() {
    let transport = Arc::new(FakeTransport::default());
    let backend = OpenAiBackend::new("OpenAI", OpenAiAuth::Anonymous, transport);

    let models = backend.list_models().await.expect("listing should work");
    assert_eq!(models, vec!["gpt-4o", "gpt-4o-mini"]);
}

#[test]
fn empty_api_key_is_rejected() {
    let err = OpenAiAuth::api_key("  ").expect_err("blank key should fail");
    assert_eq!(err.kind, ProviderErrorKind::Authentication);
}

#[test]
fn auth_debug_output_is_redacted() {
    let auth = OpenAiAuth::api_key("sk-live-123").expect("key should be accepted");
    assert!(!format!("{auth:?}").contains("sk-live"));
}
