//! HTTP client for the upstream API.
//!
//! # Responsibilities
//! - Hold one pooled client for the process (connection reuse, TLS)
//! - Enforce connect and total request timeouts
//! - Stream request and response bodies without collecting them

use std::time::Duration;

use axum::body::Body;
use axum::http::Response;
use futures_util::future::BoxFuture;
use hyper::ext::ReasonPhrase;

use crate::config::UpstreamConfig;
use crate::upstream::{OutboundRequest, Upstream, UpstreamError};

/// reqwest-backed [`Upstream`].
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Build a client honoring the configured timeouts.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { client })
    }
}

impl Upstream for HttpUpstream {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);

            if let Some(body) = request.body {
                builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
            }

            let upstream = builder.send().await?;
            Ok::<_, UpstreamError>(relay(upstream))
        })
    }
}

/// Convert the upstream response without touching its body.
fn relay(upstream: reqwest::Response) -> Response<Body> {
    let status = upstream.status();
    let headers = upstream.headers().clone();
    // Present only when the upstream sent a non-canonical status text.
    let reason = upstream.extensions().get::<ReasonPhrase>().cloned();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    if let Some(reason) = reason {
        response.extensions_mut().insert(reason);
    }
    response
}
