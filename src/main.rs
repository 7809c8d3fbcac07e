//! factchat - 終端對話
//!
//! 入口：初始化日誌、加載配置、建立編排器，逐行讀取使用者輸入並輸出回覆。
//! 指令：/facts 顯示已寫入事實（線上格式），/paths 列出已知路徑，/quit 離開。

use anyhow::Context;
use factchat::config::{load_config, AppConfig};
use factchat::facts::known_paths;
use factchat::{observability, TurnOrchestrator};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_with_default("warn");

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let user_id = cfg.app.user_id.clone();
    let orchestrator = TurnOrchestrator::from_config(&cfg);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"factchat ready. /facts /paths /quit\n> ")
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let input = line.trim();
        let output = match input {
            "" => String::new(),
            "/quit" | "/exit" => break,
            "/paths" => known_paths().join("\n"),
            "/facts" => {
                let session = orchestrator.sessions().get_or_create(&user_id).await;
                let snapshot = session.lock().await.facts.snapshot();
                serde_json::to_string_pretty(&snapshot).context("serialize facts")?
            }
            message => orchestrator.take_turn(message, &user_id).await,
        };
        if !output.is_empty() {
            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
