//! Mock LLM 客戶端（用於測試與離線演示，無需 API）
//!
//! - MockLlmClient：從最後一條 User 消息中識別報稅身份 / 扣除額關鍵詞，輸出帶動作 token 的回覆
//! - ScriptedLlmClient：按順序返回預設回覆（可分片、可失敗），供編排層測試

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::{LlmClient, LlmError, LlmStream};
use crate::memory::{Message, Role};
use crate::prompt::PROMPT_DIVIDER;

/// 關鍵詞 → 報稅身份（按順序匹配，較長的短語在前）
const STATUS_KEYWORDS: [(&str, &str); 12] = [
    ("married filing jointly", "married_filing_jointly"),
    ("married filing separately", "married_filing_separately"),
    ("head of household", "head_of_household"),
    ("surviving spouse", "qualifying_surviving_spouse"),
    ("已婚聯合", "married_filing_jointly"),
    ("已婚分開", "married_filing_separately"),
    ("戶長", "head_of_household"),
    ("未亡人", "qualifying_surviving_spouse"),
    ("單身", "single"),
    ("单身", "single"),
    ("single", "single"),
    ("unmarried", "single"),
];

/// Mock 客戶端：識別最後一條 User 消息中的關鍵詞並輸出動作 token
#[derive(Debug, Default)]
pub struct MockLlmClient;

impl MockLlmClient {
    fn reply_for(user_text: &str) -> String {
        // 只看分隔線後的用戶原文，避免匹配到已知事實摘要
        let question = user_text
            .rsplit_once(PROMPT_DIVIDER)
            .map(|(_, q)| q)
            .unwrap_or(user_text)
            .to_lowercase();

        let status = STATUS_KEYWORDS
            .iter()
            .find(|(kw, _)| question.contains(kw))
            .map(|(_, status)| *status);
        let asks_deduction = question.contains("deduction") || question.contains("扣除");

        match (status, asks_deduction) {
            (Some(status), _) => format!(
                "<action>SET_FACT:/filingStatus={status}</action>\
                 Filing status: {status}. Standard deduction: \
                 <action>GET_FACT:/standardDeduction</action>"
            ),
            (None, true) => {
                "Standard deduction: <action>GET_FACT:/standardDeduction</action>".to_string()
            }
            (None, false) => format!("Echo from Mock: {}", question.trim()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(Self::reply_for(last_user))
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<LlmStream, LlmError> {
        let content = self.complete(messages).await?;
        Ok(Box::pin(stream::iter(vec![Ok(content)])))
    }
}

/// 單次預設輸出
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// 流式片段，按順序產出
    Chunks(Vec<String>),
    /// 調用直接失敗
    Fail(LlmError),
    /// 片段產出一部分後流中斷
    BrokenStream(Vec<String>, LlmError),
}

/// 腳本客戶端：每次調用彈出一條預設輸出，並記錄收到的消息
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(ScriptedReply::Chunks(vec![text.into()]))
    }

    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(ScriptedReply::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    pub fn with_failure(self, err: LlmError) -> Self {
        self.push(ScriptedReply::Fail(err))
    }

    pub fn push(self, reply: ScriptedReply) -> Self {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(reply);
        }
        self
    }

    /// 已收到的全部請求（每次調用一組消息）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn next_reply(&self, messages: &[Message]) -> ScriptedReply {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| ScriptedReply::Chunks(Vec::new()))
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        match self.next_reply(messages) {
            ScriptedReply::Chunks(chunks) => Ok(chunks.concat()),
            ScriptedReply::Fail(err) | ScriptedReply::BrokenStream(_, err) => Err(err),
        }
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<LlmStream, LlmError> {
        match self.next_reply(messages) {
            ScriptedReply::Chunks(chunks) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok).collect::<Vec<_>>(),
            ))),
            ScriptedReply::Fail(err) => Err(err),
            ScriptedReply::BrokenStream(chunks, err) => {
                let mut items: Vec<Result<String, LlmError>> =
                    chunks.into_iter().map(Ok).collect();
                items.push(Err(err));
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }
}
