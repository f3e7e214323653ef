//! Telegram Bot API forwarding proxy.
//!
//! Relays `/bot<token>/<method>` calls to a single upstream origin, with an
//! optional token allowlist, a fixed forwarded-header subset and CORS
//! headers on every response.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
