//! 對話 Agent
//!
//! ConversationalAgent 是編排層唯一依賴的外部協作者：輸入本輪提示與會話歷史，輸出最終回覆文字。
//! LlmAgent 以 LlmClient 實作：system + 最近歷史 + 本輪提示，逐片收集流式輸出並拼接。

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;

#[async_trait]
pub trait ConversationalAgent: Send + Sync {
    /// 送出本輪提示，返回完整的最終回覆（可能為空字串）
    async fn send(
        &self,
        session_key: &str,
        history: &[Message],
        prompt: &str,
    ) -> Result<String, AgentError>;
}

/// 基於 LlmClient 的 Agent
pub struct LlmAgent {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl LlmAgent {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    fn build_messages(&self, history: &[Message], prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend_from_slice(history);
        messages.push(Message::user(prompt));
        messages
    }
}

#[async_trait]
impl ConversationalAgent for LlmAgent {
    async fn send(
        &self,
        session_key: &str,
        history: &[Message],
        prompt: &str,
    ) -> Result<String, AgentError> {
        let messages = self.build_messages(history, prompt);
        tracing::debug!(
            session = session_key,
            history = history.len(),
            "sending prompt to LLM"
        );

        let stream = self.llm.complete_stream(&messages).await?;
        let reply: String = stream
            .try_fold(String::new(), |mut acc, chunk| async move {
                acc.push_str(&chunk);
                Ok(acc)
            })
            .await?;

        let (prompt_tokens, completion_tokens, _) = self.llm.token_usage();
        tracing::debug!(
            session = session_key,
            chars = reply.chars().count(),
            prompt_tokens,
            completion_tokens,
            "LLM reply received"
        );
        Ok(reply)
    }
}
