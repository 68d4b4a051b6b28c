//! End-to-end tests for the relay proxy: router behaviour, the direct Ollama
//! client against a throwaway upstream, and the full client -> proxy -> upstream
//! chain.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::Json;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

use chatrelay::{
    ConversationController, ConversationSettings, InMemoryKeyValueStore, InferenceClient,
    MessageStatus, OllamaClient, RelayChatUseCase, RelayProxyClient, RelayServer, Sender,
};

type Seen = Arc<Mutex<Vec<Value>>>;

/// Fake Ollama answering `/api/generate` with a fixed status and body.
async fn spawn_upstream(status: StatusCode, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = axum::Router::new()
        .route(
            "/api/generate",
            post(
                move |State(seen): State<Seen>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        seen.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(seen.clone());

    (spawn(app).await, seen)
}

async fn spawn(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// An address nothing is listening on.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn relay_to(upstream_url: Option<&str>) -> axum::Router {
    let upstream = upstream_url.map(|url| {
        Arc::new(OllamaClient::new(url).hide_location()) as Arc<dyn InferenceClient>
    });
    RelayServer::router(Arc::new(RelayChatUseCase::new(upstream, "dolphin-llama3")))
}

async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_running() {
    let response = relay_to(None)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "ok": true, "message": "Chat proxy is running" }));
}

#[tokio::test]
async fn chat_without_upstream_is_503() {
    let (status, body) = post_chat(relay_to(None), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn missing_or_blank_prompt_is_400() {
    let (upstream, seen) = spawn_upstream(StatusCode::OK, json!({ "response": "x" })).await;

    for body in [r#"{}"#, r#"{"prompt":"   "}"#, r#"{"prompt":42}"#, "not json"] {
        let (status, reply) = post_chat(relay_to(Some(&upstream)), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            reply["error"],
            json!("Missing or invalid \"prompt\" in request body")
        );
    }

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn relays_prompt_and_returns_response() {
    let (upstream, seen) = spawn_upstream(StatusCode::OK, json!({ "response": " 4 " })).await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"What is 2+2?"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "4" }));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["model"], json!("dolphin-llama3"));
    assert_eq!(seen[0]["prompt"], json!("What is 2+2?"));
    assert_eq!(seen[0]["stream"], json!(false));
}

#[tokio::test]
async fn system_prompt_is_prepended_upstream() {
    let (upstream, seen) = spawn_upstream(StatusCode::OK, json!({ "response": "ok" })).await;

    let (status, _) = post_chat(
        relay_to(Some(&upstream)),
        r#"{"prompt":"hi","model":"llama3","systemPrompt":"Be brief."}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["model"], json!("llama3"));
    assert_eq!(seen[0]["prompt"], json!("Be brief.\n\nUser: hi"));
}

#[tokio::test]
async fn empty_upstream_response_becomes_placeholder() {
    let (upstream, _) = spawn_upstream(StatusCode::OK, json!({ "done": true })).await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "(No response)" }));
}

#[tokio::test]
async fn missing_model_is_404_with_pull_hint() {
    let (upstream, _) = spawn_upstream(
        StatusCode::NOT_FOUND,
        json!({ "error": "model 'mistral' not found" }),
    )
    .await;

    let (status, body) = post_chat(
        relay_to(Some(&upstream)),
        r#"{"prompt":"hi","model":"mistral"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("mistral"));
    assert!(error.contains("ollama pull mistral"));
}

#[tokio::test]
async fn other_upstream_status_passes_through() {
    let (upstream, _) = spawn_upstream(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "out of memory" }),
    )
    .await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("out of memory"));
}

#[tokio::test]
async fn refused_upstream_is_502_without_location() {
    let upstream = closed_port_url().await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("unreachable"));
    assert!(!error.contains(&upstream));
}

/// Accepts connections, reads the request head, then hangs up without replying.
async fn hang_up_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            drop(socket);
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn upstream_bad_gateway_is_502_unreachable() {
    let (upstream, _) =
        spawn_upstream(StatusCode::BAD_GATEWAY, json!({ "error": "tunnel down" })).await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("unreachable"));
    assert!(!error.contains(&upstream));
}

#[tokio::test]
async fn upstream_hang_up_is_502_without_location() {
    let upstream = hang_up_url().await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Could not reach the inference server"));
    assert!(!error.contains("127.0.0.1"));
    assert!(!error.contains("/api/generate"));
}

#[tokio::test]
async fn unreadable_upstream_reply_is_502_generic() {
    let app = axum::Router::new().route("/api/generate", post(|| async { "not json" }));
    let upstream = spawn(app).await;

    let (status, body) = post_chat(relay_to(Some(&upstream)), r#"{"prompt":"hi"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Could not reach the inference server"));
    assert!(!error.contains("decoding"));
}

#[tokio::test]
async fn direct_client_names_unreachable_target() {
    let upstream = closed_port_url().await;
    let client = OllamaClient::new(upstream.clone());

    let err = client
        .generate(&chatrelay::GenerationRequest::new("hi", "dolphin-llama3"))
        .await
        .unwrap_err();

    assert!(err.is_unreachable());
    assert!(err.to_string().contains(&upstream));
}

#[tokio::test]
async fn controller_through_proxy_to_upstream() {
    let (upstream, _) = spawn_upstream(StatusCode::OK, json!({ "response": "4" })).await;
    let proxy = spawn(relay_to(Some(&upstream))).await;

    let mut controller = ConversationController::load(
        Arc::new(RelayProxyClient::new(proxy)),
        Arc::new(InMemoryKeyValueStore::new()),
        ConversationSettings::default(),
    )
    .await;

    let outcome = controller.submit("What is 2+2?").await.unwrap();
    assert!(!outcome.is_error());

    let messages = controller.conversation().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender(), Sender::User);
    assert_eq!(messages[0].text(), "What is 2+2?");
    assert_eq!(messages[1].sender(), Sender::Assistant);
    assert_eq!(messages[1].text(), "4");
    assert_eq!(messages[1].status(), MessageStatus::Final);
    assert!(!controller.conversation().has_pending());
}

#[tokio::test]
async fn controller_shows_proxy_configuration_error() {
    let proxy = spawn(relay_to(None)).await;

    let mut controller = ConversationController::load(
        Arc::new(RelayProxyClient::new(proxy)),
        Arc::new(InMemoryKeyValueStore::new()),
        ConversationSettings::default(),
    )
    .await;

    let outcome = controller.submit("hi").await.unwrap();
    assert!(outcome.is_error());
    assert!(outcome.message().text().contains("not configured"));
    assert!(controller.error_banner().is_some());
}
