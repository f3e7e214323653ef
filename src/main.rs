//! Telegram Bot API forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request         ┌──────────────────────────────────────────────┐
//!     ───────────────────────┼─▶ http server (request id, trace span)       │
//!                            │        │                                     │
//!                            │        ▼                                     │
//!                            │   forwarder: preflight → health → path       │
//!                            │              → allowlist → dispatch          │
//!                            │        │                                     │
//!                            │        ▼                                     │
//!     Client Response        │   upstream client (reqwest, streaming) ──────┼──▶ api.telegram.org
//!     ◀──────────────────────┼── relay + CORS  ◀────────────────────────────┼───
//!                            └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration precedence: CLI flags, then `ALLOWED_TOKENS`, then the
//! TOML file, then built-in defaults.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use telegram_api_proxy::config::{
    apply_env_overrides, load_config, validate_config, ConfigError, ProxyConfig,
};
use telegram_api_proxy::observability::{init_logging, init_metrics};
use telegram_api_proxy::{HttpServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "telegram-api-proxy", version)]
#[command(about = "Forwarding proxy for the Telegram Bot API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream origin, e.g. https://api.telegram.org.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Comma-separated bot tokens allowed through the proxy.
    #[arg(long)]
    allowed_tokens: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ProxyConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }
        if let Some(tokens) = self.allowed_tokens {
            config.access.allowed_tokens = Some(tokens);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability);
    tracing::info!("telegram-api-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.upstream.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
