//! 錯誤類型
//!
//! FactError / ActionError 在編解碼層被捕獲並內嵌到回覆文字；AgentError 在編排層轉為固定的後備訊息。

use thiserror::Error;

use crate::llm::LlmError;

/// Fact Store 寫入錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactError {
    #[error("{0} is a derived fact and cannot be set directly")]
    DerivedPath(String),
}

/// 單一動作 token 的解析或執行錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("empty fact path")]
    EmptyPath,

    #[error("missing '=' in SET_FACT for {0}")]
    MissingValue(String),

    #[error("'=' is not allowed in fact path {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Store(#[from] FactError),
}

/// 對話 Agent 調用失敗
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Agent timed out after {0}s")]
    Timeout(u64),
}
