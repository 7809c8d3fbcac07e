//! 回覆中的固定用語（是/否、未設定、後備訊息等），依 [app].locale 選擇

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-TW", alias = "zh_TW", alias = "zh-tw")]
    ZhTw,
    #[serde(rename = "en", alias = "en-US")]
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrases {
    pub yes: &'static str,
    pub no: &'static str,
    /// GET_FACT 讀到未寫入路徑時的替換文字
    pub unset: &'static str,
    /// 狀態摘要為空時的標記
    pub no_data: &'static str,
    pub known_facts_header: &'static str,
    pub set_failed: &'static str,
    pub get_failed: &'static str,
    /// Agent 調用失敗或逾時
    pub agent_failure: &'static str,
    /// Agent 沒有產生任何文字
    pub empty_response: &'static str,
}

pub const ZH_TW: Phrases = Phrases {
    yes: "是",
    no: "否",
    unset: "未設定",
    no_data: "尚無資料",
    known_facts_header: "當前已知資訊:",
    set_failed: "設定失敗",
    get_failed: "查詢失敗",
    agent_failure: "抱歉，我遇到了一些問題，請稍後再試。",
    empty_response: "抱歉，我沒有產生回應。",
};

pub const EN: Phrases = Phrases {
    yes: "yes",
    no: "no",
    unset: "(not set)",
    no_data: "no data yet",
    known_facts_header: "Known facts:",
    set_failed: "set failed",
    get_failed: "lookup failed",
    agent_failure: "Sorry, something went wrong. Please try again later.",
    empty_response: "Sorry, I did not produce a response.",
};

impl Locale {
    pub fn phrases(self) -> &'static Phrases {
        match self {
            Locale::ZhTw => &ZH_TW,
            Locale::En => &EN,
        }
    }
}
