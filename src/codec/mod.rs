//! 動作協議編解碼：在 Agent 回覆中找出動作 token，對 Fact Store 執行並就地替換
//!
//! 先由左至右執行全部 SET_FACT（成功刪除、失敗換成錯誤標記），再執行全部 GET_FACT（換成格式化的值），
//! 同一則訊息中後面的 GET 一定看得到前面（或任意位置）的 SET。最後壓縮多餘空行並去掉首尾空白。

pub mod action;
pub mod format;

use std::sync::OnceLock;

use regex::Regex;

use crate::core::ActionError;
use crate::facts::{FactStore, FactValue};
use crate::locale::Phrases;

pub use action::{parse_body, rewrite, Action, Verb, ACTION_CLOSE, ACTION_OPEN};
pub use format::{format_currency, format_fact};

/// 動作協議編解碼器（無狀態，只持有顯示用語）
#[derive(Debug, Clone, Copy)]
pub struct ActionCodec {
    phrases: &'static Phrases,
}

impl ActionCodec {
    pub fn new(phrases: &'static Phrases) -> Self {
        Self { phrases }
    }

    /// 執行 text 中的全部動作並返回使用者可見的文字
    pub fn apply(&self, text: &str, store: &mut FactStore) -> String {
        let after_sets = rewrite(text, Verb::Set, |parsed| self.execute_set(parsed, store));
        let after_gets = rewrite(&after_sets, Verb::Get, |parsed| self.execute_get(parsed, store));
        normalize_whitespace(&after_gets)
    }

    fn execute_set(&self, parsed: Result<Action, ActionError>, store: &mut FactStore) -> String {
        let result = parsed.and_then(|action| match action {
            Action::Set { path, value } => store
                .set(&path, FactValue::parse_literal(&value))
                .map(|stored| (path, stored))
                .map_err(ActionError::from),
            Action::Get { path } => Err(ActionError::MissingValue(path)),
        });
        match result {
            Ok((path, stored)) => {
                tracing::debug!(%path, value = %stored, "SET_FACT applied");
                String::new()
            }
            Err(e) => {
                tracing::warn!("SET_FACT rejected: {}", e);
                format!("[{}: {}]", self.phrases.set_failed, e)
            }
        }
    }

    fn execute_get(&self, parsed: Result<Action, ActionError>, store: &FactStore) -> String {
        match parsed {
            Ok(Action::Get { path }) => {
                let value = store.get(&path);
                tracing::debug!(%path, value = ?value, "GET_FACT resolved");
                format_fact(value.as_ref(), self.phrases)
            }
            Ok(Action::Set { path, .. }) => {
                format!("[{}: {}]", self.phrases.get_failed, ActionError::InvalidPath(path))
            }
            Err(e) => {
                tracing::warn!("GET_FACT rejected: {}", e);
                format!("[{}: {}]", self.phrases.get_failed, e)
            }
        }
    }
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-line pattern"))
}

/// 三個以上連續換行壓成一個空行，並去掉首尾空白
pub fn normalize_whitespace(text: &str) -> String {
    blank_lines().replace_all(text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::catalog::*;
    use crate::locale::{EN, ZH_TW};

    fn codec() -> ActionCodec {
        ActionCodec::new(&ZH_TW)
    }

    #[test]
    fn test_set_then_get_same_message() {
        let mut store = FactStore::default();
        let out = codec().apply(
            "<action>SET_FACT:/filingStatus=single</action><action>GET_FACT:/standardDeduction</action>",
            &mut store,
        );
        assert!(out.contains("$14,600"));
        assert!(!out.contains("<action>"));
        assert!(!out.contains("</action>"));
        assert_eq!(store.get(FILING_STATUS), Some(FactValue::from("single")));
    }

    #[test]
    fn test_get_before_set_sees_the_set() {
        let mut store = FactStore::default();
        let out = codec().apply(
            "扣除額是 <action>GET_FACT:/standardDeduction</action>。<action>SET_FACT:/filingStatus=married_filing_jointly</action>",
            &mut store,
        );
        assert_eq!(out, "扣除額是 $29,200。");
    }

    #[test]
    fn test_token_free_text_unchanged() {
        let mut store = FactStore::default();
        let text = "單身的標準扣除額是多少?\n請稍候。";
        assert_eq!(codec().apply(text, &mut store), text);
        assert_eq!(codec().apply("  padded \n", &mut store), "padded");
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_set_is_inline_and_processing_continues() {
        let mut store = FactStore::default();
        let out = codec().apply(
            "A<action>SET_FACT:/standardDeduction=1</action>B<action>SET_FACT:/refundViaAch=true</action>C<action>GET_FACT:/refundViaAch</action>",
            &mut store,
        );
        assert_eq!(
            out,
            "A[設定失敗: /standardDeduction is a derived fact and cannot be set directly]BC是"
        );
        assert_eq!(store.get(REFUND_VIA_ACH), Some(FactValue::Boolean(true)));
    }

    #[test]
    fn test_malformed_tokens() {
        let mut store = FactStore::default();
        let out = ActionCodec::new(&EN).apply(
            "<action>SET_FACT:/payViaAch</action> <action>GET_FACT:</action> <action>PING</action>",
            &mut store,
        );
        assert_eq!(
            out,
            "[set failed: missing '=' in SET_FACT for /payViaAch] [lookup failed: empty fact path] <action>PING</action>"
        );
    }

    #[test]
    fn test_get_formats() {
        let mut store = FactStore::default();
        store.set("/small", 50.0).unwrap();
        let out = ActionCodec::new(&EN).apply(
            "<action>GET_FACT:/small</action>|<action>GET_FACT:/hasAdvancedPtc</action>|<action>GET_FACT:/filingStatus</action>",
            &mut store,
        );
        assert_eq!(out, "50|no|(not set)");
    }

    #[test]
    fn test_numeric_literal_is_stored_as_number() {
        let mut store = FactStore::default();
        let out = codec().apply(
            "<action>SET_FACT:/custom/income=52000</action><action>GET_FACT:/custom/income</action>",
            &mut store,
        );
        assert_eq!(out, "$52,000");
        assert_eq!(store.get("/custom/income"), Some(FactValue::Number(52000.0)));
    }

    #[test]
    fn test_blank_line_collapse() {
        assert_eq!(normalize_whitespace("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n\n\nb\n\nc"), "a\n\nb\n\nc");
        assert_eq!(normalize_whitespace("\n\na\n"), "a");

        let mut store = FactStore::default();
        let out = codec().apply(
            "好的。\n<action>SET_FACT:/filingStatus=single</action>\n\n扣除額 <action>GET_FACT:/standardDeduction</action>",
            &mut store,
        );
        assert_eq!(out, "好的。\n\n扣除額 $14,600");
    }
}
