//! Fact Store：路徑 → 值
//!
//! 只保存顯式寫入的可寫路徑；推導路徑在讀取時由規則即時求值，寫入推導路徑一律拒絕。
//! 每個會話各自持有一個 FactStore，不跨會話共享。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::FactError;

use super::catalog;
use super::rules::DerivationRegistry;
use super::value::{FactValue, TaggedValue};

/// 已寫入的事實（按路徑排序，輸出穩定）
pub type FactMap = BTreeMap<String, FactValue>;

/// 線上格式的快照
pub type FactSnapshot = BTreeMap<String, TaggedValue>;

#[derive(Clone)]
pub struct FactStore {
    facts: FactMap,
    rules: Arc<DerivationRegistry>,
}

impl FactStore {
    pub fn new(rules: Arc<DerivationRegistry>) -> Self {
        Self {
            facts: FactMap::new(),
            rules,
        }
    }

    /// 帶內建稅務規則的空 store
    pub fn with_tax_rules() -> Self {
        Self::new(Arc::new(DerivationRegistry::with_tax_rules()))
    }

    /// 寫入事實：推導路徑返回 DerivedPath；"true"/"false" 字串轉布林；覆蓋舊值
    pub fn set(&mut self, path: &str, value: impl Into<FactValue>) -> Result<FactValue, FactError> {
        if self.rules.is_derived(path) {
            return Err(FactError::DerivedPath(path.to_string()));
        }
        let value = value.into().coerce_boolean();
        tracing::debug!(path, value = %value, "fact set");
        self.facts.insert(path.to_string(), value.clone());
        Ok(value)
    }

    /// 讀取事實：推導路徑即時求值；未寫入的路徑返回 None
    pub fn get(&self, path: &str) -> Option<FactValue> {
        if let Some(value) = self.rules.evaluate(path, &self.facts) {
            return Some(value);
        }
        self.facts.get(path).cloned()
    }

    pub fn is_derived(&self, path: &str) -> bool {
        self.rules.is_derived(path)
    }

    pub fn list_known_paths(&self) -> Vec<String> {
        catalog::known_paths()
    }

    /// 已寫入路徑的線上格式；未寫入的推導路徑不包含在內
    pub fn snapshot(&self) -> FactSnapshot {
        self.facts
            .iter()
            .map(|(path, value)| (path.clone(), value.to_tagged()))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl Default for FactStore {
    fn default() -> Self {
        Self::with_tax_rules()
    }
}

impl std::fmt::Debug for FactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactStore")
            .field("facts", &self.facts)
            .field("derived", &self.rules.derived_paths())
            .finish()
    }
}
