//! 提示詞：系統提示詞（由已知路徑目錄生成）、狀態摘要、每輪提示組合

use std::fmt::Write as _;
use std::path::Path;

use crate::facts::catalog::{FactKind, CATALOG, FILING_STATUSES};
use crate::facts::FactStore;
use crate::locale::Phrases;

/// 狀態摘要與使用者訊息之間的分隔線
pub const PROMPT_DIVIDER: &str = "\n\n---\n\n";

/// 內建系統提示詞：角色、回應原則、可用事實與動作格式
pub fn default_system_prompt() -> String {
    let mut prompt = String::from(
        "You are a US tax assistant backed by the IRS Fact Graph.\n\n\
         ## Principles\n\
         1. Be brief: answer in one or two sentences.\n\
         2. Act on clear statements: if the user says they are single, set /filingStatus=single without asking again.\n\
         3. Look facts up instead of asking whether to look them up.\n\
         4. Never ask again for information listed under the known facts.\n\
         5. Reply in the language the user writes in.\n\n\
         ## Facts\n",
    );

    for d in CATALOG.iter() {
        let access = if d.derived { "derived, read only" } else { "settable" };
        let kind = match d.kind {
            FactKind::Enum => "enum",
            FactKind::Boolean => "true/false",
            FactKind::Dollars => "dollars",
        };
        let _ = writeln!(prompt, "- {} ({}, {}): {}", d.path, kind, access, d.description);
    }
    let _ = writeln!(prompt, "\n/filingStatus values: {}", FILING_STATUSES.join(", "));

    prompt.push_str(
        "\n## Actions\n\
         Embed actions in your reply; they are executed and replaced before the user sees the text:\n\
         <action>SET_FACT:/filingStatus=single</action>\n\
         <action>GET_FACT:/standardDeduction</action>\n\
         A SET_FACT is removed from the reply; a GET_FACT is replaced by the value, so write it where the value belongs.\n\n\
         ## Example\n\
         User: What is the standard deduction if I'm single?\n\
         Assistant: <action>SET_FACT:/filingStatus=single</action>The standard deduction for single filers is <action>GET_FACT:/standardDeduction</action>.\n",
    );
    prompt
}

/// 讀取自訂系統提示詞檔案，失敗時使用內建版本
pub fn load_system_prompt(path: Option<&Path>) -> String {
    path.and_then(|p| match std::fs::read_to_string(p) {
        Ok(s) if !s.trim().is_empty() => Some(s),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("system prompt {} unreadable ({}), using built-in", p.display(), e);
            None
        }
    })
    .unwrap_or_else(default_system_prompt)
}

/// 已寫入事實的摘要，每行 `path: value`；空 store 為 no_data 標記
pub fn state_summary(store: &FactStore, phrases: &Phrases) -> String {
    if store.is_empty() {
        return phrases.no_data.to_string();
    }
    store
        .entries()
        .map(|(path, value)| format!("{}: {}", path, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 本輪送給 Agent 的完整提示：摘要 + 分隔線 + 使用者原文
pub fn compose_prompt(summary: &str, user_message: &str, phrases: &Phrases) -> String {
    format!(
        "{}\n{}{}{}",
        phrases.known_facts_header, summary, PROMPT_DIVIDER, user_message
    )
}
