//! factchat Web 服務
//!
//! 启动: cargo run --bin factchat-web --features web
//! 监听地址取自配置 [web]，FACTCHAT_WEB_PORT 可覆盖端口

#![cfg(feature = "web")]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use factchat::config::{load_config, AppConfig};
use factchat::{http, observability, TurnOrchestrator};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let port = std::env::var("FACTCHAT_WEB_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.web.port);
    let addr: SocketAddr = format!("{}:{}", cfg.web.host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.web.host, port))?;

    let orchestrator = Arc::new(TurnOrchestrator::from_config(&cfg));

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
        }
        signal.cancel();
    });

    http::serve(orchestrator, addr, shutdown).await?;
    tracing::info!("factchat-web stopped");
    Ok(())
}
