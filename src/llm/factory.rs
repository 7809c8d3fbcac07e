//! 根據配置與環境變量選擇 LLM 後端（DeepSeek / OpenAI 兼容 / Mock）

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 選中的後端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    DeepSeek { model: String },
    OpenAi { model: String, base_url: Option<String> },
    Mock,
}

/// 純決策：provider 配置 + 是否存在各 Key
pub fn select_backend(cfg: &AppConfig, has_deepseek_key: bool, has_openai_key: bool) -> Backend {
    let provider = cfg.llm.provider.to_lowercase();
    match provider.as_str() {
        "mock" => Backend::Mock,
        // 配置為 deepseek 且僅有 OpenAI Key 時也走 DeepSeek 端點
        "deepseek" if has_deepseek_key || has_openai_key => Backend::DeepSeek {
            model: cfg
                .llm
                .deepseek
                .model
                .clone()
                .or_else(|| cfg.llm.model.clone())
                .unwrap_or_else(|| DEEPSEEK_CHAT.to_string()),
        },
        "openai" if has_openai_key => Backend::OpenAi {
            model: cfg
                .llm
                .openai
                .model
                .clone()
                .or_else(|| cfg.llm.model.clone())
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            base_url: cfg.llm.base_url.clone(),
        },
        _ if has_deepseek_key => Backend::DeepSeek {
            model: cfg
                .llm
                .deepseek
                .model
                .clone()
                .unwrap_or_else(|| DEEPSEEK_CHAT.to_string()),
        },
        _ => Backend::Mock,
    }
}

pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();

    match select_backend(cfg, deepseek_key.is_some(), openai_key.is_some()) {
        Backend::DeepSeek { model } => {
            tracing::info!("Using DeepSeek LLM ({})", model);
            let key = deepseek_key.or(openai_key);
            Arc::new(OpenAiClient::new(
                Some(DEEPSEEK_BASE_URL),
                &model,
                key.as_deref(),
            ))
        }
        Backend::OpenAi { model, base_url } => {
            tracing::info!("Using OpenAI LLM ({})", model);
            Arc::new(OpenAiClient::new(
                base_url.as_deref(),
                &model,
                openai_key.as_deref(),
            ))
        }
        Backend::Mock => {
            tracing::warn!("No API key set or provider is mock, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}
