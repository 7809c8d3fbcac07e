//! 應用配置：從 config/default.toml 與環境變量加載
//!
//! 加載順序：先讀 TOML 文件，再用環境變量 `FACTCHAT__*` 覆蓋（雙下劃線表示嵌套，如 `FACTCHAT__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::locale::Locale;

/// 應用配置根（對應 config/default.toml 的頂層）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub web: WebSection,
}

/// [app] 段：終端會話用戶、語系、對話輪數、系統提示詞路徑
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 終端對話使用的會話鍵
    pub user_id: String,
    pub locale: Locale,
    /// 每次調用 LLM 時附帶的歷史輪數
    pub max_context_turns: usize,
    /// 覆蓋內建系統提示詞的文件
    pub system_prompt_path: Option<PathBuf>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            user_id: "fact_graph_user".to_string(),
            locale: Locale::default(),
            max_context_turns: 20,
            system_prompt_path: None,
        }
    }
}

/// [llm] 段：後端選擇與超時
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 後端：mock / openai / deepseek；無 API Key 時一律退回 mock
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub deepseek: LlmModelSection,
    pub openai: LlmModelSection,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: None,
            base_url: None,
            deepseek: LlmModelSection::default(),
            openai: LlmModelSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmModelSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 單輪 Agent 調用的最長等待（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [web] 段：HTTP / WebSocket 監聽地址
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSection {
    pub host: String,
    pub port: u16,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// 從 config 目錄加載配置，環境變量 FACTCHAT__* 可覆蓋
///
/// 1. 按順序查找 config/default.toml、../config/default.toml、default.toml，找到則作為第一源
/// 2. 若傳入 config_path 且文件存在，則追加該文件（可覆蓋前面的鍵）
/// 3. 最後疊加環境變量 FACTCHAT__*（雙下劃線表示嵌套鍵）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("FACTCHAT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
