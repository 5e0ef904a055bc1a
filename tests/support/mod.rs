// Mock round config service shared by every integration test in a binary.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use std::{
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

// Base URL published once the mock server is bound.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();
// Every performance update received, as (session id, body).
static REPORTS: OnceLock<Arc<Mutex<Vec<(String, Value)>>>> = OnceLock::new();

// How long the `/slow/start` route stalls before answering.
pub const SLOW_RESPONSE: Duration = Duration::from_millis(1500);

// Ensure the mock config service is running and return its base URL.
pub fn ensure_server() -> &'static str {
    // Bootstrap exactly once no matter how many tests ask for the server.
    SERVER_READY.get_or_init(|| {
        // Slot the server thread fills with its bound URL.
        let published_url = Arc::new(OnceLock::<String>::new());
        // Second handle for the thread to publish through.
        let published_url_thread = Arc::clone(&published_url);
        // Own OS thread and runtime so the mock outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            // The mock gets a multi-threaded runtime of its own.
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port so parallel test binaries never collide.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                // Read back the port the OS picked.
                let addr = listener.local_addr().expect("get local addr");
                // Publish the base URL for the waiting test thread.
                let _ = published_url_thread.set(format!("http://{}", addr));
                // Serve the scripted routes until the test process exits.
                axum::serve(listener, mock_router())
                    .await
                    .expect("mock server failed");
            });
        });
        // Block until the URL is published and the port accepts connections.
        wait_for_server_url_and_readiness(published_url);
    });

    // Every test in the binary shares this URL.
    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Absolute URL for a route on the shared mock.
pub fn endpoint(path: &str) -> String {
    format!("{}{}", ensure_server(), path)
}

// Bodies the mock received for one session, in arrival order.
pub fn reports_for(session_id: &str) -> Vec<Value> {
    let reports = reports().lock().expect("reports mutex poisoned");
    reports
        .iter()
        .filter(|(id, _)| id == session_id)
        .map(|(_, body)| body.clone())
        .collect()
}

// An address nothing listens on: bind, read the port, release it.
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind scratch port");
    let addr = listener.local_addr().expect("scratch addr");
    drop(listener);
    format!("http://{}/api/game/start", addr)
}

fn reports() -> &'static Arc<Mutex<Vec<(String, Value)>>> {
    REPORTS.get_or_init(|| Arc::new(Mutex::new(Vec::new())))
}

// One route prefix per upstream behaviour under test.
fn mock_router() -> Router {
    Router::new()
        .route("/ok/api/game/start", post(start_ok))
        .route("/alt/api/game/start", post(start_alt))
        .route("/rejected/api/game/start", post(start_rejected))
        .route("/broken/api/game/start", post(start_broken))
        .route("/garbage/api/game/start", post(start_garbage))
        .route("/empty/api/game/start", post(start_without_config))
        .route("/slow/api/game/start", post(start_slow))
        .route("/ok/api/game/{session_id}/update", post(record_update))
        .route("/down/api/game/{session_id}/update", post(update_unavailable))
}

// Success envelope with a fresh session id derived from the caller.
fn config_body(terrain: &str, player_id: &str) -> Value {
    json!({
        "success": true,
        "sessionId": format!("{player_id}-{}", uuid::Uuid::new_v4()),
        "config": {
            "terrain": {"type": terrain, "movementModifier": 0.7},
            "boss": {"speed": 90.5, "health": 240, "damage": 15, "shield": 35}
        },
        "message": ""
    })
}

fn player_id(body: &Value) -> String {
    body.get("playerId")
        .and_then(Value::as_str)
        .unwrap_or("missing")
        .to_string()
}

async fn start_ok(Json(body): Json<Value>) -> impl IntoResponse {
    Json(config_body("Sticky", &player_id(&body)))
}

async fn start_alt(Json(body): Json<Value>) -> impl IntoResponse {
    Json(config_body("rugged", &player_id(&body)))
}

async fn start_rejected() -> impl IntoResponse {
    Json(json!({"success": false, "message": "no boss available"}))
}

async fn start_broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

// 200 with a body that is not JSON at all.
async fn start_garbage() -> impl IntoResponse {
    (StatusCode::OK, "<html>definitely not json</html>")
}

async fn start_without_config() -> impl IntoResponse {
    Json(json!({"success": true, "sessionId": "lonely"}))
}

async fn start_slow(Json(body): Json<Value>) -> impl IntoResponse {
    tokio::time::sleep(SLOW_RESPONSE).await;
    Json(config_body("smooth", &player_id(&body)))
}

// Stores the update so tests can assert on the exact wire body.
async fn record_update(Path(session_id): Path<String>, Json(body): Json<Value>) -> StatusCode {
    let mut reports = reports().lock().expect("reports mutex poisoned");
    reports.push((session_id, body));
    StatusCode::OK
}

async fn update_unavailable() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"message": "stats offline"})),
    )
}

// Wait for URL publication, then for the socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    // Spin until the server thread has bound and published its URL.
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        // Short sleep keeps the wait loop off the CPU.
        std::thread::sleep(Duration::from_millis(10));
    };

    // Store globally for the helpers that build endpoints.
    let _ = SERVER_URL.set(base_url.clone());

    // Raw host:port for the TCP readiness check.
    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // A successful connect means axum is accepting.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    // Startup never reached an accepting state.
    panic!("mock server did not become ready in time");
}
