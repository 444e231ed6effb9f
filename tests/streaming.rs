//! Integration tests for the streaming chat client using wiremock.

use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::time::Duration;

use paperchat::client::{ApiClient, ClientError, StaticToken};
use paperchat::model::ChatRequest;
use paperchat::options::ClientOptions;
use paperchat::stream::CancelToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(
        ClientOptions::new(server.uri()),
        Arc::new(StaticToken::new("test-token")),
    )
    .expect("client should build")
}

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

#[tokio::test]
async fn streams_deltas_in_order_and_completes_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .respond_with(sse_response(
            "data: {\"delta\":\"A\",\"conversationId\":\"c-1\"}\n\
             data: {\"delta\":\"B\"}\n\
             data: [DONE]\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let chunks = RefCell::new(Vec::new());
    let done_calls = Cell::new(0u32);

    client
        .stream_chat(
            &ChatRequest::new("hello"),
            |content, conversation_id| {
                chunks
                    .borrow_mut()
                    .push((content.to_string(), conversation_id.map(String::from)));
            },
            || done_calls.set(done_calls.get() + 1),
        )
        .await
        .expect("stream should complete");

    assert_eq!(
        *chunks.borrow(),
        vec![
            ("A".to_string(), Some("c-1".to_string())),
            ("B".to_string(), None),
        ]
    );
    assert_eq!(done_calls.get(), 1);
}

#[tokio::test]
async fn malformed_frame_is_skipped_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(sse_response(
            "data: not-json\ndata: {\"delta\":\"C\"}\ndata: [DONE]\n",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let chunks = RefCell::new(Vec::new());

    client
        .stream_chat(
            &ChatRequest::new("hello"),
            |content, _| chunks.borrow_mut().push(content.to_string()),
            || {},
        )
        .await
        .expect("malformed frame must not abort the stream");

    assert_eq!(*chunks.borrow(), vec!["C".to_string()]);
}

#[tokio::test]
async fn content_field_is_accepted_as_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(sse_response(
            "data: {\"content\":\"old-style\"}\n\
             data: {\"conversationId\":\"c-2\"}\n\
             data: [DONE]\n",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let chunks = RefCell::new(Vec::new());

    client
        .stream_chat(
            &ChatRequest::new("hello"),
            |content, _| chunks.borrow_mut().push(content.to_string()),
            || {},
        )
        .await
        .unwrap();

    // The text-less frame is skipped silently
    assert_eq!(*chunks.borrow(), vec!["old-style".to_string()]);
}

#[tokio::test]
async fn http_error_rejects_before_any_chunk() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let chunk_calls = Cell::new(0u32);

    let result = client
        .stream_chat(
            &ChatRequest::new("hello"),
            |_, _| chunk_calls.set(chunk_calls.get() + 1),
            || {},
        )
        .await;

    match result {
        Err(ClientError::Transport { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Transport error, got {:?}", other),
    }
    assert_eq!(chunk_calls.get(), 0);
}

#[tokio::test]
async fn json_body_instead_of_stream_is_stream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "0",
            "msg": "ok"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .stream_chat(&ChatRequest::new("hello"), |_, _| {}, || {})
        .await;

    assert!(matches!(result, Err(ClientError::StreamUnavailable)));
}

#[tokio::test]
async fn eof_without_done_marker_still_completes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(sse_response("data: {\"delta\":\"tail\"}\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let chunks = RefCell::new(Vec::new());
    let done_calls = Cell::new(0u32);

    client
        .stream_chat(
            &ChatRequest::new("hello"),
            |content, _| chunks.borrow_mut().push(content.to_string()),
            || done_calls.set(done_calls.get() + 1),
        )
        .await
        .unwrap();

    assert_eq!(*chunks.borrow(), vec!["tail".to_string()]);
    assert_eq!(done_calls.get(), 1);
}

#[tokio::test]
async fn empty_message_is_rejected_without_io() {
    // No mock mounted: a request hitting the server would 404 instead.
    let server = MockServer::start().await;
    let client = client_for(&server);

    let result = client
        .stream_chat(&ChatRequest::new(""), |_, _| {}, || {})
        .await;

    assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
}

#[tokio::test]
async fn anonymous_client_sends_empty_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .and(header("authorization", ""))
        .respond_with(sse_response("data: [DONE]\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(
        ClientOptions::new(server.uri()),
        Arc::new(StaticToken::anonymous()),
    )
    .unwrap();

    client
        .stream_chat(&ChatRequest::new("hello"), |_, _| {}, || {})
        .await
        .expect("backend, not the client, decides about missing auth");
}

#[tokio::test]
async fn pre_cancelled_token_short_circuits() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let cancel = CancelToken::new();
    cancel.cancel();

    let result = client
        .stream_chat_with_cancel(&ChatRequest::new("hello"), &cancel, |_, _| {}, || {})
        .await;

    assert!(matches!(result, Err(ClientError::StreamCancelled)));
}

#[tokio::test]
async fn cancel_during_stream_stops_delivery() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(
            sse_response("data: {\"delta\":\"late\"}\ndata: [DONE]\n")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let chunk_calls = Cell::new(0u32);
    let done_calls = Cell::new(0u32);

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };

    let result = client
        .stream_chat_with_cancel(
            &ChatRequest::new("hello"),
            &cancel,
            |_, _| chunk_calls.set(chunk_calls.get() + 1),
            || done_calls.set(done_calls.get() + 1),
        )
        .await;

    canceller.await.unwrap();
    assert!(matches!(result, Err(ClientError::StreamCancelled)));
    assert_eq!(chunk_calls.get(), 0);
    assert_eq!(done_calls.get(), 0);
}

#[tokio::test]
async fn cancel_after_completion_is_harmless() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat/stream"))
        .respond_with(sse_response("data: {\"delta\":\"x\"}\ndata: [DONE]\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cancel = CancelToken::new();
    let done_calls = Cell::new(0u32);

    client
        .stream_chat_with_cancel(
            &ChatRequest::new("hello"),
            &cancel,
            |_, _| {},
            || done_calls.set(done_calls.get() + 1),
        )
        .await
        .unwrap();

    // Racing or late cancellation must not double anything
    cancel.cancel();
    cancel.cancel();
    assert_eq!(done_calls.get(), 1);
}
