//! Test utilities for catat-core
//!
//! A mock AI server speaking the Gemini, Ollama and OpenAI-compatible wire
//! formats, with scriptable behavior, so HTTP status, timeout and learning
//! paths can be exercised end to end.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::models::{Category, LearnedMapping};
use crate::store::MappingStore;

/// How the mock server answers generation requests
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Pick a category from the transaction text in the prompt
    Classify,
    /// Always answer this text
    Reply(String),
    /// Answer with this HTTP status and an error body
    Status(u16),
    /// Answer 200 with no text in the payload
    Empty,
    /// Sleep, then behave like `Classify`
    Delay(Duration),
}

#[derive(Debug)]
struct ServerState {
    behavior: Mutex<MockBehavior>,
    requests: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_authorization: Mutex<Option<String>>,
}

type Shared = Arc<ServerState>;

/// Mock AI server for testing
pub struct MockAiServer {
    addr: SocketAddr,
    state: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAiServer {
    /// Start the mock server on an available port, classifying prompts
    pub async fn start() -> Self {
        Self::start_with(MockBehavior::Classify).await
    }

    /// Start with a scripted behavior
    pub async fn start_with(behavior: MockBehavior) -> Self {
        let state = Arc::new(ServerState {
            behavior: Mutex::new(behavior),
            requests: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_authorization: Mutex::new(None),
        });

        let app = Router::new()
            // Gemini: /v1beta/models/{model}:generateContent
            .route(
                "/v1beta/models/:model",
                get(handle_gemini_model).post(handle_gemini_generate),
            )
            // Ollama
            .route("/api/tags", get(handle_ollama_tags))
            .route("/api/generate", post(handle_ollama_generate))
            // OpenAI-compatible
            .route("/v1/models", get(handle_openai_models))
            .route("/v1/chat/completions", post(handle_openai_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Change behavior for subsequent requests
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }

    /// Number of generation requests served
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Prompt text of the most recent generation request
    pub fn last_prompt(&self) -> Option<String> {
        self.state.last_prompt.lock().unwrap().clone()
    }

    /// Authorization header of the most recent OpenAI-compatible request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Outcome {
    Text(String),
    Empty,
    Failed(StatusCode),
}

async fn outcome(state: &ServerState, prompt: &str) -> Outcome {
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last_prompt.lock().unwrap() = Some(prompt.to_string());

    let behavior = state.behavior.lock().unwrap().clone();
    match behavior {
        MockBehavior::Classify => Outcome::Text(classify_mock(prompt)),
        MockBehavior::Reply(text) => Outcome::Text(text),
        MockBehavior::Status(code) => Outcome::Failed(
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        ),
        MockBehavior::Empty => Outcome::Empty,
        MockBehavior::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Outcome::Text(classify_mock(prompt))
        }
    }
}

fn failure(status: StatusCode) -> Response {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": "mock failure"}})),
    )
        .into_response()
}

/// Category for the quoted transaction text in the prompt
fn classify_mock(prompt: &str) -> String {
    let description = extract_description(prompt).to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| description.contains(w));

    let category = if has(&["timezone", "arcade", "konser"]) {
        "entertainment"
    } else if has(&["warkop", "angkringan", "nasi"]) {
        "food"
    } else if has(&["apotek", "obat"]) {
        "shopping"
    } else if has(&["transfer masuk", "gaji"]) {
        "income"
    } else {
        "other"
    };
    category.to_string()
}

fn extract_description(prompt: &str) -> &str {
    const MARKER: &str = "Transaction: \"";
    if let Some(start) = prompt.find(MARKER) {
        let after_start = &prompt[start + MARKER.len()..];
        if let Some(end) = after_start.find('"') {
            return &after_start[..end];
        }
    }
    prompt
}

/// Mapping store whose every operation fails, as an unreachable database would
#[derive(Debug, Default)]
pub struct FailingMappingStore;

impl FailingMappingStore {
    fn unavailable() -> Error {
        Error::InvalidData("mapping store unavailable".to_string())
    }
}

#[async_trait]
impl MappingStore for FailingMappingStore {
    async fn get(&self, _keyword: &str) -> Result<Option<LearnedMapping>> {
        Err(Self::unavailable())
    }

    async fn upsert(&self, _keyword: &str, _category: Category) -> Result<LearnedMapping> {
        Err(Self::unavailable())
    }

    async fn list(&self) -> Result<Vec<LearnedMapping>> {
        Err(Self::unavailable())
    }

    async fn remove(&self, _keyword: &str) -> Result<bool> {
        Err(Self::unavailable())
    }
}

// --- Gemini ---

/// Gemini authenticates with the `x-goog-api-key` header
fn has_gemini_key(headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|k| !k.is_empty())
}

async fn handle_gemini_model(headers: HeaderMap) -> Response {
    if !has_gemini_key(&headers) {
        return failure(StatusCode::FORBIDDEN);
    }
    Json(json!({"name": "models/mock", "displayName": "Mock"})).into_response()
}

async fn handle_gemini_generate(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    if !has_gemini_key(&headers) {
        return failure(StatusCode::FORBIDDEN);
    }

    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    match outcome(&state, prompt).await {
        Outcome::Text(text) => Json(json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Outcome::Empty => Json(json!({"candidates": []})).into_response(),
        Outcome::Failed(status) => failure(status),
    }
}

// --- Ollama ---

async fn handle_ollama_tags() -> Json<Value> {
    Json(json!({"models": [{"name": "llama3.2:latest", "size": 4_000_000_000u64}]}))
}

async fn handle_ollama_generate(
    State(state): State<Shared>,
    Json(request): Json<Value>,
) -> Response {
    let prompt = request["prompt"].as_str().unwrap_or_default();
    let model = request["model"].as_str().unwrap_or_default().to_string();
    match outcome(&state, prompt).await {
        Outcome::Text(text) => {
            Json(json!({"model": model, "response": text, "done": true})).into_response()
        }
        Outcome::Empty => Json(json!({"model": model, "response": "", "done": true})).into_response(),
        Outcome::Failed(status) => failure(status),
    }
}

// --- OpenAI-compatible ---

async fn handle_openai_models() -> Json<Value> {
    Json(json!({"object": "list", "data": [{"id": "mock", "object": "model"}]}))
}

async fn handle_openai_chat(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    *state.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let prompt = request["messages"][0]["content"].as_str().unwrap_or_default();
    match outcome(&state, prompt).await {
        Outcome::Text(text) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Outcome::Empty => Json(json!({"choices": []})).into_response(),
        Outcome::Failed(status) => failure(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{
        GeminiBackend, GenerationOptions, OllamaBackend, OpenAICompatibleBackend, TextBackend,
    };
    use crate::error::Error;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn prompt_for(description: &str) -> String {
        format!("Pick one.\nTransaction: \"{}\"\nAnswer:", description)
    }

    #[tokio::test]
    async fn test_gemini_round_trip() {
        let server = MockAiServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.0-flash", "k", TIMEOUT).unwrap();

        assert!(backend.health_check().await);
        let reply = backend
            .generate(&prompt_for("warkop"), &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "food");
        assert_eq!(server.request_count(), 1);
        assert!(server.last_prompt().unwrap().contains("warkop"));
    }

    #[tokio::test]
    async fn test_gemini_requires_key() {
        let server = MockAiServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.0-flash", "", TIMEOUT).unwrap();
        assert!(!backend.health_check().await);
        let result = backend
            .generate("p", &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(Error::Api { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_ollama_round_trip() {
        let server = MockAiServer::start().await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2", TIMEOUT).unwrap();

        assert!(backend.health_check().await);
        let reply = backend
            .generate(&prompt_for("Timezone"), &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "entertainment");
    }

    #[tokio::test]
    async fn test_openai_round_trip_sends_bearer() {
        let server = MockAiServer::start().await;
        let backend = OpenAICompatibleBackend::new(
            &server.url(),
            "mock",
            Some("sk-test".to_string()),
            TIMEOUT,
        )
        .unwrap();

        assert!(backend.health_check().await);
        let reply = backend
            .generate(&prompt_for("apotek"), &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "shopping");
        assert_eq!(server.last_authorization().as_deref(), Some("Bearer sk-test"));
    }

    #[tokio::test]
    async fn test_status_behavior() {
        let server = MockAiServer::start_with(MockBehavior::Status(503)).await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2", TIMEOUT).unwrap();
        let result = backend.generate("p", &GenerationOptions::default()).await;
        assert!(matches!(result, Err(Error::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_empty_behavior() {
        let server = MockAiServer::start_with(MockBehavior::Empty).await;
        let options = GenerationOptions::default();

        let gemini = GeminiBackend::new(&server.url(), "m", "k", TIMEOUT).unwrap();
        assert!(matches!(
            gemini.generate("p", &options).await,
            Err(Error::EmptyResponse)
        ));

        let ollama = OllamaBackend::new(&server.url(), "m", TIMEOUT).unwrap();
        assert!(matches!(
            ollama.generate("p", &options).await,
            Err(Error::EmptyResponse)
        ));

        let openai = OpenAICompatibleBackend::new(&server.url(), "m", None, TIMEOUT).unwrap();
        assert!(matches!(
            openai.generate("p", &options).await,
            Err(Error::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_client_timeout_is_an_http_timeout() {
        let server = MockAiServer::start_with(MockBehavior::Delay(Duration::from_secs(3))).await;
        let backend =
            OllamaBackend::new(&server.url(), "m", Duration::from_millis(100)).unwrap();
        match backend.generate("p", &GenerationOptions::default()).await {
            Err(Error::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_set_behavior() {
        let server = MockAiServer::start().await;
        server.set_behavior(MockBehavior::Reply("bills".to_string()));
        let backend = OllamaBackend::new(&server.url(), "m", TIMEOUT).unwrap();
        let reply = backend
            .generate("anything", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "bills");
    }

    #[test]
    fn test_classify_mock() {
        assert_eq!(classify_mock(&prompt_for("Warkop Pak Eko")), "food");
        assert_eq!(classify_mock(&prompt_for("xyzzy")), "other");
    }
}
