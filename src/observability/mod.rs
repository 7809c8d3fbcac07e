//! 可觀測性：tracing 日誌初始化

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日誌：預設 info，可通過 RUST_LOG 覆蓋（如 `RUST_LOG=factchat=debug` 查看每個動作 token）
pub fn init() {
    init_with_default("info");
}

pub fn init_with_default(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}
