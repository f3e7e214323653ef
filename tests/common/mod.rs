//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, Response, StatusCode},
    Router,
};
use futures_util::stream::{self, StreamExt};
use telegram_api_proxy::{HttpServer, ProxyConfig, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// One request as received by the mock upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub type CaptureLog = Arc<Mutex<Vec<Captured>>>;

/// Start a mock Bot API on an ephemeral port.
///
/// - `/bot<token>/getMe` → 200 `{"ok":true}` with an `x-upstream` header
/// - `/bot<token>/echo` → 200 with the request body echoed back
/// - `/bot<token>/limited` → 429 with an upstream CORS header
/// - anything else → 404 `{"ok":false}`
pub async fn start_mock_upstream() -> (SocketAddr, CaptureLog) {
    let log: CaptureLog = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(mock_api).with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, log)
}

async fn mock_api(State(log): State<CaptureLog>, request: Request<Body>) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec();
    let path = parts.uri.path().to_string();

    log.lock().unwrap().push(Captured {
        method: parts.method,
        uri: parts.uri.to_string(),
        headers: parts.headers,
        body: body.clone(),
    });

    let builder = Response::builder().header("content-type", "application/json");
    if path.ends_with("/getMe") {
        builder
            .header("x-upstream", "mock")
            .body(Body::from(r#"{"ok":true}"#))
            .unwrap()
    } else if path.ends_with("/echo") {
        builder.body(Body::from(body)).unwrap()
    } else if path.ends_with("/limited") {
        builder
            .status(StatusCode::TOO_MANY_REQUESTS)
            .header("access-control-allow-origin", "https://upstream.example")
            .body(Body::from(r#"{"ok":false,"error_code":429}"#))
            .unwrap()
    } else {
        builder
            .status(StatusCode::NOT_FOUND)
            .body(Body::from(r#"{"ok":false}"#))
            .unwrap()
    }
}

/// First chunk sent by [`start_held_upstream`] before it waits.
pub const HELD_FIRST_CHUNK: &[u8] = b"{\"ok\":true,";
/// Remainder sent once the returned `Notify` fires.
pub const HELD_REST: &[u8] = b"\"result\":[]}";

/// Start a mock upstream whose response body is sent in two parts: the
/// first chunk right away, the rest only after the returned `Notify` fires.
pub async fn start_held_upstream() -> (SocketAddr, Arc<Notify>) {
    let release = Arc::new(Notify::new());
    let app = Router::new().fallback(held_body).with_state(release.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, release)
}

async fn held_body(State(release): State<Arc<Notify>>) -> Response<Body> {
    let first = stream::once(async { Ok::<_, std::io::Error>(Bytes::from_static(HELD_FIRST_CHUNK)) });
    let rest = stream::once(async move {
        release.notified().await;
        Ok::<_, std::io::Error>(Bytes::from_static(HELD_REST))
    });

    Response::builder()
        .header("content-type", "application/json")
        .body(Body::from_stream(first.chain(rest)))
        .unwrap()
}

/// Proxy configuration pointing at `upstream`.
pub fn proxy_config(upstream: &str, allowed_tokens: Option<&str>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = upstream.to_string();
    config.upstream.connect_timeout_secs = 2;
    config.upstream.request_timeout_secs = 5;
    config.upstream.use_env_proxy = false;
    config.access.allowed_tokens = allowed_tokens.map(str::to_string);
    config
}

/// A proxy served over TCP on an ephemeral port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    RunningProxy {
        addr,
        shutdown,
        task,
    }
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
    assert_eq!(headers["access-control-max-age"], "86400");
}
