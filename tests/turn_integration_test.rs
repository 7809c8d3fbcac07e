//! 對話輪次集成測試：Agent → 動作協議 → Fact Store → 回覆

use std::sync::Arc;
use std::time::Duration;

use factchat::agent::LlmAgent;
use factchat::core::SessionManager;
use factchat::facts::{FactValue, TaggedValue};
use factchat::llm::{LlmClient, LlmError, MockLlmClient, ScriptedLlmClient, ScriptedReply};
use factchat::locale::{EN, ZH_TW};
use factchat::TurnOrchestrator;

fn orchestrator_with(llm: Arc<dyn LlmClient>) -> TurnOrchestrator {
    let agent = Arc::new(LlmAgent::new(llm, "system"));
    TurnOrchestrator::new(agent, Arc::new(SessionManager::default()), &ZH_TW)
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_mock_agent_sets_status_and_reports_deduction() {
    let orch = orchestrator_with(Arc::new(MockLlmClient));

    let reply = orch
        .take_turn("I am married filing jointly, what is my deduction?", "u")
        .await;
    assert_eq!(
        reply,
        "Filing status: married_filing_jointly. Standard deduction: $29,200"
    );

    let session = orch.sessions().get("u").await.unwrap();
    let facts = &session.lock().await.facts;
    assert_eq!(
        facts.get("/filingStatus"),
        Some(FactValue::from("married_filing_jointly"))
    );
    assert_eq!(
        facts.get("/standardDeduction"),
        Some(FactValue::Number(29200.0))
    );
}

#[tokio::test]
async fn test_mock_agent_without_keywords_echoes() {
    let orch = orchestrator_with(Arc::new(MockLlmClient));
    let reply = orch.take_turn("hello there", "u").await;
    assert_eq!(reply, "Echo from Mock: hello there");
}

#[tokio::test]
async fn test_facts_persist_across_turns_and_feed_the_summary() {
    let llm = Arc::new(
        ScriptedLlmClient::new()
            .with_reply("<action>SET_FACT:/filingStatus=head_of_household</action>記下了。")
            .with_reply("您的扣除額是 <action>GET_FACT:/standardDeduction</action>。"),
    );
    let orch = orchestrator_with(llm.clone());

    assert_eq!(orch.take_turn("我是戶長", "s").await, "記下了。");
    assert_eq!(
        orch.take_turn("扣除額多少？", "s").await,
        "您的扣除額是 $21,900。"
    );

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    let second_prompt = &calls[1].last().unwrap().content;
    assert!(second_prompt.starts_with("當前已知資訊:\n"));
    assert!(second_prompt.contains("/filingStatus: head_of_household"));
    assert!(second_prompt.ends_with("\n\n---\n\n扣除額多少？"));
}

#[tokio::test]
async fn test_derived_set_is_reported_inline() {
    let llm = Arc::new(ScriptedLlmClient::new().with_reply(
        "<action>SET_FACT:/standardDeduction=1</action>好的",
    ));
    let orch = orchestrator_with(llm);
    let outcome = orch.run_turn("改扣除額", "s").await;

    assert!(outcome.reply.starts_with("[設定失敗: "));
    assert!(outcome.reply.contains("/standardDeduction"));
    assert!(outcome.reply.ends_with("好的"));
    assert!(outcome.facts.is_empty());
}

#[tokio::test]
async fn test_streamed_chunks_are_joined_before_decoding() {
    let llm = Arc::new(ScriptedLlmClient::new().with_chunks([
        "<action>SET_FA",
        "CT:/payViaAch=false</action>",
        "Pay by ACH: <action>GET_FACT:/payViaAch</act",
        "ion>",
    ]));
    let orch = orchestrator_with(llm);
    let outcome = orch.run_turn("no ach", "s").await;

    assert_eq!(outcome.reply, "Pay by ACH: 否");
    assert_eq!(
        outcome.facts.get("/payViaAch"),
        Some(&TaggedValue::BooleanWrapper(false))
    );
}

#[tokio::test]
async fn test_broken_stream_falls_back_and_keeps_store() {
    let llm = Arc::new(
        ScriptedLlmClient::new()
            .with_reply("<action>SET_FACT:/refundViaAch=true</action>ok")
            .push(ScriptedReply::BrokenStream(
                vec!["<action>SET_FACT:/filingStatus=single</action>".into()],
                LlmError::Stream("connection reset".into()),
            )),
    );
    let orch = orchestrator_with(llm);

    assert_eq!(orch.take_turn("first", "s").await, "ok");
    let outcome = orch.run_turn("second", "s").await;
    assert_eq!(outcome.reply, ZH_TW.agent_failure);

    // 失敗的一輪不執行任何動作
    assert_eq!(outcome.facts.len(), 1);
    assert!(outcome.facts.contains_key("/refundViaAch"));

    let session = orch.sessions().get("s").await.unwrap();
    assert_eq!(session.lock().await.history.len(), 2);
}

#[tokio::test]
async fn test_concurrent_turns_on_one_session_are_serialized() {
    let mut llm = ScriptedLlmClient::new();
    for _ in 0..8 {
        llm = llm.with_reply("<action>GET_FACT:/filingStatus</action>");
    }
    let orch = Arc::new(orchestrator_with(Arc::new(llm)));

    let mut handles = Vec::new();
    for i in 0..8 {
        let orch = orch.clone();
        handles.push(tokio::spawn(async move {
            orch.take_turn(&format!("q{i}"), "shared").await
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), "未設定");
    }

    let session = orch.sessions().get("shared").await.unwrap();
    let session = session.lock().await;
    assert_eq!(session.turns, 8);
    assert_eq!(session.history.len(), 16);
}

#[tokio::test]
async fn test_english_phrases() {
    let llm = Arc::new(ScriptedLlmClient::new().with_reply(
        "<action>GET_FACT:/hasAdvancedPtc</action> / <action>GET_FACT:/filingStatus</action>",
    ));
    let agent = Arc::new(LlmAgent::new(llm, "system"));
    let orch = TurnOrchestrator::new(agent, Arc::new(SessionManager::default()), &EN);
    assert_eq!(orch.take_turn("status?", "s").await, "no / (not set)");
}
