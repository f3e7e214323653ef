//! The forwarding decision pipeline.
//!
//! Checks run top to bottom and the first match answers the request:
//!
//! ```text
//! OPTIONS                      → preflight (empty, CORS only)
//! `/` or `/health`             → health JSON, 200
//! not `/bot...`                → 400
//! token outside allowlist     → 403
//! dispatch fails               → 502
//! otherwise                    → upstream response relayed verbatim
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use url::Url;

use crate::http::request::RequestIdExt;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{classify, RequestTarget};
use crate::security::{filter_request_headers, TokenAllowlist};
use crate::upstream::{build_target, OutboundRequest, Upstream, UpstreamError};

/// Terminal state reached by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Preflight,
    Health,
    InvalidPath,
    Forbidden,
    UpstreamError,
    Relayed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Health => "health",
            Self::InvalidPath => "invalid_path",
            Self::Forbidden => "forbidden",
            Self::UpstreamError => "upstream_error",
            Self::Relayed => "relayed",
        }
    }
}

/// Stateless request handler. The only shared state is read-only.
pub struct Forwarder {
    upstream: Arc<dyn Upstream>,
    base_url: Url,
    allowlist: TokenAllowlist,
}

impl Forwarder {
    pub fn new(upstream: Arc<dyn Upstream>, base_url: Url, allowlist: TokenAllowlist) -> Self {
        Self {
            upstream,
            base_url,
            allowlist,
        }
    }

    /// Answer one request. Every path ends in a well-formed response.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().clone();
        let request_id = request.request_id().to_string();

        let (outcome, response) = self.dispatch(request).await;

        tracing::debug!(
            request_id = %request_id,
            outcome = outcome.as_str(),
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request complete"
        );
        metrics::record_request(&method, outcome.as_str(), response.status(), start);
        response
    }

    async fn dispatch(&self, request: Request<Body>) -> (Outcome, Response<Body>) {
        if request.method() == Method::OPTIONS {
            return (Outcome::Preflight, response::preflight());
        }

        let path = request.uri().path().to_owned();
        let bot = match classify(&path) {
            RequestTarget::Health => return (Outcome::Health, response::health()),
            RequestTarget::Invalid => {
                tracing::debug!(path = %path, "Rejected path outside the Bot API");
                return (Outcome::InvalidPath, response::invalid_path());
            }
            RequestTarget::Bot(bot) => bot,
        };

        if !self.allowlist.permits(bot.token()) {
            tracing::warn!(path = %bot.redacted(), "Token not in allowlist");
            return (Outcome::Forbidden, response::forbidden());
        }

        let result = match self.outbound(request, &path) {
            Ok(outbound) => self.upstream.send(outbound).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(upstream) => (Outcome::Relayed, response::relay(upstream)),
            Err(e) => {
                let message = response::describe(&e);
                tracing::error!(path = %bot.redacted(), error = %message, "Upstream error");
                (Outcome::UpstreamError, response::upstream_error(message))
            }
        }
    }

    fn outbound(&self, request: Request<Body>, path: &str) -> Result<OutboundRequest, UpstreamError> {
        let (parts, body) = request.into_parts();
        let url = build_target(&self.base_url, path, parts.uri.query())?;
        let body = carries_body(&parts.method).then_some(body);

        let mut headers = filter_request_headers(&parts.headers);
        // A dropped body must not leave its length behind.
        if body.is_none() {
            headers.remove(header::CONTENT_LENGTH);
        }

        Ok(OutboundRequest {
            headers,
            method: parts.method,
            url,
            body,
        })
    }
}

/// GET and HEAD are sent without a body; every other method streams it.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}
