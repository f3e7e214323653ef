//! Response construction.
//!
//! # Responsibilities
//! - Build the fixed JSON bodies answered locally (health, 400, 403, 502)
//! - Finish relayed upstream responses (strip hop-by-hop, add CORS)
//! - Attach CORS headers on every path
//!
//! # Design Decisions
//! - Relayed bodies are streamed through untouched
//! - Error bodies never expose more than the fixed messages, except the
//!   upstream failure text on 502

use std::error::Error;

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

use crate::security::headers::{apply_cors, strip_hop_by_hop};

/// Name reported by the health probe.
pub const SERVICE_NAME: &str = "telegram-api-proxy";

pub const USAGE_HINT: &str = "Replace api.telegram.org with this worker URL";
pub const INVALID_PATH_ERROR: &str = "Invalid path. Expected /bot<token>/<method>";
pub const INVALID_PATH_EXAMPLE: &str = "/botYOUR_TOKEN/sendMessage";
pub const FORBIDDEN_ERROR: &str = "Token not in allowlist";
pub const UPSTREAM_ERROR: &str = "Failed to proxy request to Telegram";

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    service: &'static str,
    usage: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ErrorBody {
    fn new(error: &'static str) -> Self {
        Self {
            error,
            example: None,
            message: None,
        }
    }
}

/// CORS preflight acknowledgement: empty body, CORS headers only.
pub fn preflight() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    apply_cors(response.headers_mut());
    response
}

pub fn health() -> Response<Body> {
    json(
        StatusCode::OK,
        &HealthBody {
            status: "ok",
            service: SERVICE_NAME,
            usage: USAGE_HINT,
        },
    )
}

pub fn invalid_path() -> Response<Body> {
    json(
        StatusCode::BAD_REQUEST,
        &ErrorBody {
            example: Some(INVALID_PATH_EXAMPLE),
            ..ErrorBody::new(INVALID_PATH_ERROR)
        },
    )
}

pub fn forbidden() -> Response<Body> {
    json(StatusCode::FORBIDDEN, &ErrorBody::new(FORBIDDEN_ERROR))
}

/// 502 carrying the failure description.
pub fn upstream_error(message: String) -> Response<Body> {
    json(
        StatusCode::BAD_GATEWAY,
        &ErrorBody {
            message: Some(message),
            ..ErrorBody::new(UPSTREAM_ERROR)
        },
    )
}

/// Finish an upstream response for the client.
///
/// Status, status text extension, headers and body are kept; CORS headers
/// replace any upstream values of the same name.
pub fn relay(mut response: Response<Body>) -> Response<Body> {
    strip_hop_by_hop(response.headers_mut());
    apply_cors(response.headers_mut());
    response
}

/// Render an error and its sources as one line.
pub fn describe(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let mut response = match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response body");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    };
    apply_cors(response.headers_mut());
    response
}
