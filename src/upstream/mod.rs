//! Upstream dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding handler
//!     → OutboundRequest (method, target URL, filtered headers, body stream)
//!     → Upstream::send (client.rs: reqwest, streaming both ways)
//!     → Response<Body> relayed by the handler
//! ```
//!
//! # Design Decisions
//! - `Upstream` is a trait so the handler can run against a mock
//! - One attempt per request: no retries, no caching
//! - Bodies are streamed, never collected

pub mod client;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Response};
use futures_util::future::BoxFuture;
use thiserror::Error;
use url::Url;

pub use client::HttpUpstream;

/// Failure while dispatching to the upstream.
///
/// The `Display` text is reported to the client in the 502 body.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or protocol failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The target URL could not be formed from base, path and query.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[from] url::ParseError),

    /// Free-form failure, used by non-HTTP implementations.
    #[error("{0}")]
    Other(String),
}

/// A request ready to be sent upstream.
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// `None` for methods that carry no payload.
    pub body: Option<Body>,
}

/// Capability to send a request to the upstream and receive its response.
pub trait Upstream: Send + Sync {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>>;
}

/// Join the upstream origin with an inbound path and optional query.
/// A bare `?` carries no query and is dropped.
pub fn build_target(base: &Url, path: &str, query: Option<&str>) -> Result<Url, UpstreamError> {
    let origin = base.as_str().trim_end_matches('/');
    let target = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{origin}{path}?{q}"),
        None => format!("{origin}{path}"),
    };
    Ok(Url::parse(&target)?)
}
