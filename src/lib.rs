//! factchat - 稅務 Fact Graph 對話前端
//!
//! 模塊劃分：
//! - **agent**: 對話 Agent 抽象與基於 LLM 的實作
//! - **codec**: 動作協議編解碼（`<action>SET_FACT/GET_FACT</action>` 的掃描、執行、替換）
//! - **config**: 應用配置加載（TOML + 環境變量）
//! - **core**: 錯誤類型、會話管理、對話輪次編排
//! - **facts**: 事實值與線上格式、已知路徑目錄、推導規則、Fact Store
//! - **http**: HTTP / WebSocket 介面（feature `web`）
//! - **llm**: LLM 客戶端抽象與實現（OpenAI 兼容 / DeepSeek / Mock）
//! - **locale**: 回覆中的固定用語
//! - **memory**: 會話歷史
//! - **prompt**: 系統提示詞、狀態摘要、每輪提示組合

pub mod agent;
pub mod codec;
pub mod config;
pub mod core;
pub mod facts;
#[cfg(feature = "web")]
pub mod http;
pub mod llm;
pub mod locale;
pub mod memory;
pub mod observability;
pub mod prompt;

pub use codec::ActionCodec;
pub use core::{TurnOrchestrator, TurnOutcome};
pub use facts::{FactStore, FactValue, TaggedValue};
