//! LLM 客戶端抽象
//!
//! 所有後端（OpenAI 兼容 / DeepSeek / Mock / Scripted）實現 LlmClient：complete（非流式）、complete_stream（流式片段）。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use thiserror::Error;

use crate::memory::Message;

/// LLM 調用錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("stream interrupted: {0}")]
    Stream(String),

    #[error("invalid request: {0}")]
    Build(String),
}

/// 流式輸出：按到達順序產出文本片段
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// LLM 客戶端 trait：非流式完成與流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 流式完成，返回片段流
    async fn complete_stream(&self, messages: &[Message]) -> Result<LlmStream, LlmError>;

    /// 獲取累計 token 使用統計：(prompt_tokens, completion_tokens, total_tokens)
    /// 預設返回 (0, 0, 0)，具體實現可覆蓋
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
