//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Serve until shutdown, draining in-flight requests

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use url::Url;

use crate::config::ProxyConfig;
use crate::http::forward::Forwarder;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::routing::loggable_path;
use crate::security::TokenAllowlist;
use crate::upstream::{HttpUpstream, Upstream, UpstreamError};

/// Error building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] UpstreamError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that dispatches through a reqwest client.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let upstream = Arc::new(HttpUpstream::new(&config.upstream)?);
        Self::with_upstream(config, upstream)
    }

    /// Create a server around any [`Upstream`] implementation.
    pub fn with_upstream(
        config: ProxyConfig,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, ServerError> {
        let base_url = Url::parse(&config.upstream.base_url)?;
        let allowlist = TokenAllowlist::parse(config.access.allowed_tokens.as_deref());

        tracing::info!(
            upstream = %base_url,
            allowlist_tokens = allowlist.len(),
            restricted = allowlist.is_restricted(),
            "Forwarder configured"
        );

        let state = AppState {
            forwarder: Arc::new(Forwarder::new(upstream, base_url, allowlist)),
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Single entry point for every method and path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    state.forwarder.handle(request).await
}

/// Span for one request; the bot token never appears in it.
fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request.request_id(),
        method = %request.method(),
        path = %loggable_path(request.uri().path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::OutboundRequest;
    use axum::http::StatusCode;
    use futures_util::future::BoxFuture;
    use tower::ServiceExt;

    struct Unreachable;

    impl Upstream for Unreachable {
        fn send(&self, _request: OutboundRequest) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
            Box::pin(async { Err::<Response<Body>, _>(UpstreamError::Other("unreachable".into())) })
        }
    }

    fn server() -> HttpServer {
        HttpServer::with_upstream(ProxyConfig::default(), Arc::new(Unreachable)).unwrap()
    }

    #[tokio::test]
    async fn test_router_answers_every_method_and_path() {
        let router = server().router();

        let cases = [
            ("GET", "/", StatusCode::OK),
            ("POST", "/health", StatusCode::OK),
            ("OPTIONS", "/whatever", StatusCode::OK),
            ("PUT", "/other", StatusCode::BAD_REQUEST),
            ("GET", "/botT1/getMe", StatusCode::BAD_GATEWAY),
        ];
        for (method, uri, expected) in cases {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_request_id_assigned_and_echoed() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "client-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "client-42");
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "not a url".into();
        assert!(matches!(
            HttpServer::with_upstream(config, Arc::new(Unreachable)),
            Err(ServerError::BaseUrl(_))
        ));
    }
}
