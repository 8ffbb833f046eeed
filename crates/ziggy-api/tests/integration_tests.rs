//! Integration tests for the chat HTTP API.
//!
//! Each test builds its own router over an in-memory session store and a
//! small fixed menu, then drives it in-process with `oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ziggy_api::create_router;
use ziggy_api::handlers::{ChatResponse, HealthResponse, HistoryResponse};
use ziggy_api::state::AppState;
use ziggy_chat::{
    ChatError, ChatRouter, DirectBackend, GenerationRequest, InMemorySessionStore,
    RecommendationBackend, RemoteBackend,
};
use ziggy_core::config::{BackendKind, ChatConfig, LlmConfig};
use ziggy_core::{Catalog, Role};

// =============================================================================
// Helpers
// =============================================================================

const MENU: &str = r#"[
    {"id": 1, "name": "Paneer Tikka", "price": 9.5, "description": "Grilled cottage cheese",
     "category": "Starters", "availability": true, "spiceLevel": "medium", "rating": 4.7,
     "tags": ["vegetarian"]},
    {"id": 2, "name": "Chicken Korma", "price": 13, "description": "Mild and creamy",
     "category": "Mains", "availability": true, "spiceLevel": "low", "rating": 4.2,
     "tags": []},
    {"id": 3, "name": "Gulab Jamun", "price": 4, "description": "Syrup soaked dumplings",
     "category": "Desserts", "availability": true, "spiceLevel": "none", "rating": 4.9,
     "tags": ["vegetarian"]}
]"#;

/// Backend returning a fixed reply and counting calls.
struct CountingBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl RecommendationBackend for CountingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Direct
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("generated after {} turns", request.history.len()))
    }
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_json(MENU).unwrap())
}

fn make_state(backend: Arc<dyn RecommendationBackend>) -> AppState {
    let router = ChatRouter::new(
        catalog(),
        Arc::new(InMemorySessionStore::default()),
        backend,
        ChatConfig::default(),
    );
    AppState::new(router)
}

fn make_app() -> (axum::Router, Arc<CountingBackend>) {
    let backend = Arc::new(CountingBackend {
        calls: AtomicUsize::new(0),
    });
    (create_router(make_state(backend.clone())), backend)
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

/// Serve `router` on an ephemeral loopback port and return its base URL.
async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

// =============================================================================
// POST /api/chat
// =============================================================================

#[tokio::test]
async fn test_faq_question() {
    let (app, backend) = make_app();
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "What is your name?", "sessionId": "s1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.reply, "My name is Ziggy, your friendly assistant.");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_vegetarian_recommendation() {
    let (app, backend) = make_app();
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "can you recommend a vegetarian dish", "sessionId": "s2"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with("Here are some recommendations:"));
    assert!(reply.contains("Paneer Tikka"));
    assert!(reply.contains("Gulab Jamun"));
    assert!(!reply.contains("Chicken Korma"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_session_id_is_400() {
    let (app, _) = make_app();
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Session ID is required.");
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn test_blank_message_is_400() {
    let (app, _) = make_app();
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message": "  ", "sessionId": "s"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (app, _) = make_app();
    let resp = app
        .oneshot(post_json("/api/chat", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn test_free_form_message_uses_backend() {
    let (app, backend) = make_app();
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "I had a long day", "sessionId": "s3"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["reply"], "generated after 0 turns");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_remote_backend_unreachable_falls_back() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = Arc::new(RemoteBackend::new(
        &format!("http://{}", addr),
        Duration::from_secs(2),
        None,
    ));
    let app = create_router(make_state(backend));
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "surprise me tonight", "sessionId": "s4"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["reply"],
        "Something went wrong, please try again."
    );
}

#[tokio::test]
async fn test_direct_backend_rate_limit_is_429() {
    let upstream = axum::Router::new().route(
        "/chat/completions",
        axum::routing::post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let base = serve(upstream).await;
    let llm = LlmConfig {
        api_base: base,
        api_key: Some("sk-test".to_string()),
        ..LlmConfig::default()
    };
    let app = create_router(make_state(Arc::new(DirectBackend::new(catalog(), llm))));

    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "what goes with rice", "sessionId": "s5"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(resp).await["error"],
        "Rate limit exceeded. Please try again later."
    );
}

#[tokio::test]
async fn test_direct_backend_failure_is_500() {
    let upstream = axum::Router::new().route(
        "/chat/completions",
        axum::routing::post(|| async { (StatusCode::BAD_GATEWAY, "down") }),
    );
    let base = serve(upstream).await;
    let llm = LlmConfig {
        api_base: base,
        api_key: Some("sk-test".to_string()),
        ..LlmConfig::default()
    };
    let app = create_router(make_state(Arc::new(DirectBackend::new(catalog(), llm))));

    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "what goes with rice", "sessionId": "s6"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["error"], "Chatbot error");
}

// =============================================================================
// Session read-back and removal
// =============================================================================

#[tokio::test]
async fn test_history_after_exchanges() {
    let (app, _) = make_app();
    app.clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "what is your name", "sessionId": "h1"}"#,
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "tell me something", "sessionId": "h1"}"#,
        ))
        .await
        .unwrap();

    let resp = app.oneshot(get("/api/chat/h1/history")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: HistoryResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.session_id, "h1");
    assert_eq!(body.turns.len(), 4);
    assert_eq!(body.turns[0].role, Role::User);
    assert_eq!(body.turns[3].content, "generated after 2 turns");
}

#[tokio::test]
async fn test_history_unknown_session_is_404() {
    let (app, _) = make_app();
    let resp = app.oneshot(get("/api/chat/nobody/history")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], "not_found");
}

#[tokio::test]
async fn test_delete_session() {
    let (app, _) = make_app();
    app.clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"message": "what is your name", "sessionId": "d1"}"#,
        ))
        .await
        .unwrap();

    let delete = || {
        Request::delete("/api/chat/d1")
            .body(Body::empty())
            .unwrap()
    };
    let resp = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.oneshot(get("/api/chat/d1/history")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Health, banner, widget
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = make_app();
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.status, "ok");
    assert_eq!(body.backend, "direct");
    assert_eq!(body.menu_items, 3);
}

#[tokio::test]
async fn test_health_uses_camel_case() {
    let (app, _) = make_app();
    let body = body_json(app.oneshot(get("/health")).await.unwrap()).await;
    assert!(body.get("menuItems").is_some());
    assert!(body["uptime"].is_u64());
}

#[tokio::test]
async fn test_root_banner() {
    let (app, _) = make_app();
    let resp = app.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, b"API Working");
}

#[tokio::test]
async fn test_widget_page() {
    let (app, _) = make_app();
    let resp = app.oneshot(get("/widget")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let html = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(html.contains("/api/chat"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = make_app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/chat")
                .header("origin", "http://shop.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .unwrap()
            .to_str()
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = make_app();
    let resp = app.oneshot(get("/api/nothing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
