//! Mock image provider backends for integration tests
//!
//! Serves a Google-style predict endpoint and an OpenRouter-style chat
//! completions endpoint, counting requests and recording the last payload

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Bytes of a 1x1 PNG, enough for the broker to pass along
const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89,
];

/// Base64 body of the canned image
pub fn png_base64() -> String {
    STANDARD.encode(PNG_BYTES)
}

/// Data URI of the canned image
pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", png_base64())
}

/// Canned reply for one mock endpoint
#[derive(Debug, Clone)]
pub struct MockReply {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

impl MockReply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type: "text/plain",
            body: body.to_owned(),
        }
    }
}

/// Mock upstream that returns predictable image payloads
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    google_count: AtomicU32,
    openrouter_count: AtomicU32,
    google_reply: Mutex<MockReply>,
    openrouter_reply: Mutex<MockReply>,
    last_payload: Mutex<Option<Value>>,
    last_query: Mutex<Option<String>>,
    last_authorization: Mutex<Option<String>>,
}

impl MockUpstream {
    /// Start the mock server with successful default replies
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            google_count: AtomicU32::new(0),
            openrouter_count: AtomicU32::new(0),
            google_reply: Mutex::new(MockReply::json(
                200,
                &json!({"predictions": [{"bytesBase64Encoded": png_base64()}]}),
            )),
            openrouter_reply: Mutex::new(MockReply::json(
                200,
                &json!({"choices": [{"message": {
                    "role": "assistant",
                    "images": [{"type": "image_url", "image_url": {"url": png_data_uri()}}]
                }}]}),
            )),
            last_payload: Mutex::new(None),
            last_query: Mutex::new(None),
            last_authorization: Mutex::new(None),
        });

        let app = Router::new()
            .route("/google/predict", routing::post(handle_google))
            .route("/openrouter/api/v1/chat/completions", routing::post(handle_openrouter))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Google endpoint URL, optionally with an existing query string
    pub fn google_url(&self) -> String {
        format!("http://{}/google/predict", self.addr)
    }

    /// OpenRouter base URL; the broker appends `/chat/completions`
    pub fn openrouter_base_url(&self) -> String {
        format!("http://{}/openrouter/api/v1", self.addr)
    }

    pub fn set_google_reply(&self, reply: MockReply) {
        *self.state.google_reply.lock().unwrap() = reply;
    }

    pub fn set_openrouter_reply(&self, reply: MockReply) {
        *self.state.openrouter_reply.lock().unwrap() = reply;
    }

    pub fn google_count(&self) -> u32 {
        self.state.google_count.load(Ordering::Relaxed)
    }

    pub fn openrouter_count(&self) -> u32 {
        self.state.openrouter_count.load(Ordering::Relaxed)
    }

    /// Requests received across both endpoints
    pub fn total_count(&self) -> u32 {
        self.google_count() + self.openrouter_count()
    }

    /// JSON body of the most recent request
    pub fn last_payload(&self) -> Value {
        self.state.last_payload.lock().unwrap().clone().expect("a request was received")
    }

    /// Query string of the most recent Google request
    pub fn last_query(&self) -> Option<String> {
        self.state.last_query.lock().unwrap().clone()
    }

    /// Authorization header of the most recent OpenRouter request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn respond(reply: &MockReply) -> Response {
    (reply.status, [(header::CONTENT_TYPE, reply.content_type)], reply.body.clone()).into_response()
}

async fn handle_google(
    State(state): State<Arc<MockState>>,
    RawQuery(query): RawQuery,
    Json(payload): Json<Value>,
) -> Response {
    state.google_count.fetch_add(1, Ordering::Relaxed);
    *state.last_query.lock().unwrap() = query;
    *state.last_payload.lock().unwrap() = Some(payload);

    let reply = state.google_reply.lock().unwrap().clone();
    respond(&reply)
}

async fn handle_openrouter(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    state.openrouter_count.fetch_add(1, Ordering::Relaxed);
    *state.last_authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    *state.last_payload.lock().unwrap() = Some(payload);

    let reply = state.openrouter_reply.lock().unwrap().clone();
    respond(&reply)
}
