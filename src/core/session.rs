//! 會話管理
//!
//! 每個會話鍵對應一個 Session：自有的 FactStore 與只追加的對話歷史。
//! 首次互動時延遲建立，保存在行程記憶體中；會話內以 Mutex 串行處理每一輪。
//! 概要（輪數、事實數、最後活動時間）另存於短暫加鎖的 SessionInfo，列表不必等待進行中的一輪。

use std::collections::HashMap;
use std::sync::{Arc, RwLock as StdRwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::core::FactError;
use crate::facts::{DerivationRegistry, FactStore, FactValue};
use crate::memory::ConversationHistory;

pub type SessionKey = String;

/// 會話概要（供 API 列表）
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub key: SessionKey,
    pub turns: u64,
    pub facts: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

type SharedInfo = Arc<StdRwLock<SessionInfo>>;

/// 單個會話
#[derive(Debug)]
pub struct Session {
    pub key: SessionKey,
    pub facts: FactStore,
    pub history: ConversationHistory,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub turns: u64,
    info: SharedInfo,
}

impl Session {
    pub fn new(key: impl Into<SessionKey>, rules: Arc<DerivationRegistry>) -> Self {
        let key = key.into();
        let now = Utc::now();
        let info = Arc::new(StdRwLock::new(SessionInfo {
            key: key.clone(),
            turns: 0,
            facts: 0,
            created_at: now,
            last_active: now,
        }));
        Self {
            key,
            facts: FactStore::new(rules),
            history: ConversationHistory::new(),
            created_at: now,
            last_active: now,
            turns: 0,
            info,
        }
    }

    /// 記錄一輪完成的對話
    pub fn record_turn(&mut self, user_message: &str, agent_reply: &str) {
        self.history.push_turn(user_message, agent_reply);
        self.turns += 1;
        self.touch();
    }

    /// 會話外直接寫入事實（HTTP 介面），同步概要
    pub fn set_fact(&mut self, path: &str, value: impl Into<FactValue>) -> Result<FactValue, FactError> {
        let stored = self.facts.set(path, value)?;
        self.touch();
        Ok(stored)
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
        self.publish_info();
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            key: self.key.clone(),
            turns: self.turns,
            facts: self.facts.len(),
            created_at: self.created_at,
            last_active: self.last_active,
        }
    }

    fn publish_info(&self) {
        let info = self.info();
        match self.info.write() {
            Ok(mut slot) => *slot = info,
            Err(poisoned) => *poisoned.into_inner() = info,
        }
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

struct SessionEntry {
    session: SharedSession,
    info: SharedInfo,
}

/// 會話管理器：key -> Arc<Mutex<Session>>，所有會話共用同一份推導規則
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionKey, SessionEntry>>,
    rules: Arc<DerivationRegistry>,
}

impl SessionManager {
    pub fn new(rules: Arc<DerivationRegistry>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            rules,
        }
    }

    /// 取得或建立會話
    pub async fn get_or_create(&self, key: &str) -> SharedSession {
        if let Some(entry) = self.sessions.read().await.get(key) {
            return entry.session.clone();
        }

        let mut sessions = self.sessions.write().await;
        // 取得寫鎖前可能已被其他請求建立
        sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                tracing::info!("session created: {}", key);
                let session = Session::new(key, self.rules.clone());
                let info = session.info.clone();
                SessionEntry {
                    session: Arc::new(Mutex::new(session)),
                    info,
                }
            })
            .session
            .clone()
    }

    pub async fn get(&self, key: &str) -> Option<SharedSession> {
        self.sessions
            .read()
            .await
            .get(key)
            .map(|entry| entry.session.clone())
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// 會話概要列表，不鎖定會話本身
    pub async fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| match entry.info.read() {
                Ok(info) => info.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Arc::new(DerivationRegistry::with_tax_rules()))
    }
}
