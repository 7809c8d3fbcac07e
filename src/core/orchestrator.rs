//! 對話輪次編排
//!
//! 一輪：取得（或建立）會話並鎖定 → 由 FactStore 產生狀態摘要 → 摘要 + 使用者訊息送給 Agent（有上限等待）
//! → 以動作協議編解碼器處理回覆 → 記錄歷史並返回文字。Agent 失敗、逾時或沒有輸出時返回固定的後備訊息，不重試。

use std::sync::Arc;
use std::time::Duration;

use crate::agent::{ConversationalAgent, LlmAgent};
use crate::codec::ActionCodec;
use crate::config::AppConfig;
use crate::core::session::{SessionManager, SharedSession};
use crate::core::AgentError;
use crate::facts::{DerivationRegistry, FactSnapshot};
use crate::llm::create_llm_from_config;
use crate::locale::Phrases;
use crate::prompt::{compose_prompt, load_system_prompt, state_summary};

/// 一輪的結果：使用者可見的回覆與本輪結束時的事實快照
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub facts: FactSnapshot,
}

pub struct TurnOrchestrator {
    agent: Arc<dyn ConversationalAgent>,
    sessions: Arc<SessionManager>,
    codec: ActionCodec,
    phrases: &'static Phrases,
    timeout: Duration,
    max_context_turns: usize,
}

impl TurnOrchestrator {
    pub fn new(
        agent: Arc<dyn ConversationalAgent>,
        sessions: Arc<SessionManager>,
        phrases: &'static Phrases,
    ) -> Self {
        Self {
            agent,
            sessions,
            codec: ActionCodec::new(phrases),
            phrases,
            timeout: Duration::from_secs(60),
            max_context_turns: 20,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_context_turns(mut self, turns: usize) -> Self {
        self.max_context_turns = turns;
        self
    }

    /// 由配置建立：LLM 後端、系統提示詞、語系、逾時、歷史輪數
    pub fn from_config(cfg: &AppConfig) -> Self {
        let llm = create_llm_from_config(cfg);
        let system_prompt = load_system_prompt(cfg.app.system_prompt_path.as_deref());
        let agent = Arc::new(LlmAgent::new(llm, system_prompt));
        let sessions = Arc::new(SessionManager::new(Arc::new(
            DerivationRegistry::with_tax_rules(),
        )));
        Self::new(agent, sessions, cfg.app.locale.phrases())
            .with_timeout(Duration::from_secs(cfg.llm.timeouts.request))
            .with_max_context_turns(cfg.app.max_context_turns)
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn phrases(&self) -> &'static Phrases {
        self.phrases
    }

    /// 處理一則使用者訊息，返回回覆文字
    pub async fn take_turn(&self, user_message: &str, session_key: &str) -> String {
        self.run_turn(user_message, session_key).await.reply
    }

    /// 處理一則使用者訊息，返回回覆與事實快照
    pub async fn run_turn(&self, user_message: &str, session_key: &str) -> TurnOutcome {
        let session = self.sessions.get_or_create(session_key).await;
        self.run_locked(&session, user_message, session_key).await
    }

    async fn run_locked(
        &self,
        session: &SharedSession,
        user_message: &str,
        session_key: &str,
    ) -> TurnOutcome {
        // 會話鎖持有整輪，同一會話的請求依序處理
        let mut session = session.lock().await;
        session.touch();

        let summary = state_summary(&session.facts, self.phrases);
        let prompt = compose_prompt(&summary, user_message, self.phrases);
        let history = session.history.window(self.max_context_turns).to_vec();

        let raw = match self.invoke_agent(session_key, &history, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(session = session_key, "agent failed: {}", e);
                return TurnOutcome {
                    reply: self.phrases.agent_failure.to_string(),
                    facts: session.facts.snapshot(),
                };
            }
        };

        if raw.trim().is_empty() {
            tracing::warn!(session = session_key, "agent returned no text");
            return TurnOutcome {
                reply: self.phrases.empty_response.to_string(),
                facts: session.facts.snapshot(),
            };
        }

        let reply = self.codec.apply(&raw, &mut session.facts);
        session.record_turn(user_message, &raw);
        tracing::info!(
            session = session_key,
            turn = session.turns,
            facts = session.facts.len(),
            "turn completed"
        );

        TurnOutcome {
            reply,
            facts: session.facts.snapshot(),
        }
    }

    async fn invoke_agent(
        &self,
        session_key: &str,
        history: &[crate::memory::Message],
        prompt: &str,
    ) -> Result<String, AgentError> {
        match tokio::time::timeout(self.timeout, self.agent.send(session_key, history, prompt)).await
        {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, ScriptedLlmClient};
    use crate::locale::ZH_TW;

    fn orchestrator(llm: Arc<ScriptedLlmClient>) -> TurnOrchestrator {
        let agent = Arc::new(LlmAgent::new(llm, "sys"));
        TurnOrchestrator::new(agent, Arc::new(SessionManager::default()), &ZH_TW)
    }

    #[tokio::test]
    async fn test_turn_applies_actions() {
        let llm = Arc::new(ScriptedLlmClient::new().with_reply(
            "<action>SET_FACT:/filingStatus=single</action>單身的標準扣除額是 <action>GET_FACT:/standardDeduction</action>。",
        ));
        let orch = orchestrator(llm);
        let outcome = orch.run_turn("我是單身", "u1").await;
        assert_eq!(outcome.reply, "單身的標準扣除額是 $14,600。");
        assert_eq!(outcome.facts.len(), 1);
        assert!(outcome.facts.contains_key("/filingStatus"));
    }

    #[tokio::test]
    async fn test_prompt_contains_summary_and_message() {
        let llm = Arc::new(
            ScriptedLlmClient::new()
                .with_reply("<action>SET_FACT:/refundViaAch=true</action>好")
                .with_reply("ok"),
        );
        let orch = orchestrator(llm.clone());
        orch.take_turn("第一句", "u1").await;
        orch.take_turn("第二句", "u1").await;

        let calls = llm.calls();
        let first = &calls[0].last().unwrap().content;
        assert_eq!(first, "當前已知資訊:\n尚無資料\n\n---\n\n第一句");
        let second = &calls[1].last().unwrap().content;
        assert_eq!(second, "當前已知資訊:\n/refundViaAch: true\n\n---\n\n第二句");
        // system + 上一輪 user/assistant + 本輪
        assert_eq!(calls[1].len(), 4);
        assert_eq!(calls[1][2].content, "<action>SET_FACT:/refundViaAch=true</action>好");
    }

    #[tokio::test]
    async fn test_agent_failure_returns_fallback() {
        let llm = Arc::new(ScriptedLlmClient::new().with_failure(LlmError::Request("down".into())));
        let orch = orchestrator(llm);
        let reply = orch.take_turn("hi", "u1").await;
        assert_eq!(reply, ZH_TW.agent_failure);

        let session = orch.sessions().get("u1").await.unwrap();
        assert!(session.lock().await.history.is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_returns_fallback() {
        let llm = Arc::new(ScriptedLlmClient::new().with_chunks(["", "  "]));
        let orch = orchestrator(llm);
        assert_eq!(orch.take_turn("hi", "u1").await, ZH_TW.empty_response);
    }

    struct SlowAgent;

    #[async_trait::async_trait]
    impl ConversationalAgent for SlowAgent {
        async fn send(
            &self,
            _session_key: &str,
            _history: &[crate::memory::Message],
            _prompt: &str,
        ) -> Result<String, AgentError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_fallback() {
        let orch = TurnOrchestrator::new(Arc::new(SlowAgent), Arc::new(SessionManager::default()), &ZH_TW)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(orch.take_turn("hi", "u1").await, ZH_TW.agent_failure);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let llm = Arc::new(
            ScriptedLlmClient::new()
                .with_reply("<action>SET_FACT:/filingStatus=head_of_household</action>ok")
                .with_reply("<action>GET_FACT:/standardDeduction</action>"),
        );
        let orch = orchestrator(llm);
        orch.take_turn("a", "alice").await;
        assert_eq!(orch.take_turn("b", "bob").await, "$14,600");
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_listing_during_slow_turn() {
        let orch = Arc::new(
            TurnOrchestrator::new(Arc::new(SlowAgent), Arc::new(SessionManager::default()), &ZH_TW)
                .with_timeout(Duration::from_secs(30)),
        );
        let turn = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.take_turn("hi", "alice").await })
        };
        // 讓該輪取得會話鎖並進入 Agent 調用
        tokio::time::sleep(Duration::from_millis(10)).await;
        let session = orch.sessions().get("alice").await.unwrap();
        assert!(session.try_lock().is_err());

        let infos = tokio::time::timeout(Duration::from_secs(2), orch.sessions().list())
            .await
            .expect("listing waited for the in-flight turn");
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].key, "alice");
        assert_eq!(infos[0].turns, 0);

        assert_eq!(turn.await.unwrap(), ZH_TW.agent_failure);
    }
}
