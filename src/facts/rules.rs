//! 推導規則註冊表
//!
//! 所有推導事實實作 DerivationRule（path / depends_on / derive），由 DerivationRegistry 按路徑註冊與查找；
//! FactStore 讀取推導路徑時以當前狀態求值，新增規則無需改動讀寫邏輯。

use std::collections::HashMap;
use std::sync::Arc;

use super::catalog::{FILING_STATUS, HAS_ADVANCED_PTC, STANDARD_DEDUCTION, WRITABLE_HAS_ADVANCED_PTC};
use super::store::FactMap;
use super::value::FactValue;

/// 推導規則：純函式，輸入當前狀態，輸出某一推導路徑的值
pub trait DerivationRule: Send + Sync {
    /// 推導出的路徑
    fn path(&self) -> &str;

    /// 依賴的可寫路徑（供提示詞與除錯輸出）
    fn depends_on(&self) -> &[&'static str];

    fn derive(&self, facts: &FactMap) -> FactValue;
}

/// 2024 年標準扣除額，未知身份使用單身金額
pub const DEFAULT_STANDARD_DEDUCTION: f64 = 14600.0;

const STANDARD_DEDUCTION_TABLE: [(&str, f64); 5] = [
    ("single", 14600.0),
    ("married_filing_separately", 14600.0),
    ("married_filing_jointly", 29200.0),
    ("qualifying_surviving_spouse", 29200.0),
    ("head_of_household", 21900.0),
];

/// /standardDeduction：依 /filingStatus 查表
pub struct StandardDeductionRule;

impl StandardDeductionRule {
    pub fn amount_for(status: &str) -> f64 {
        STANDARD_DEDUCTION_TABLE
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, amount)| *amount)
            .unwrap_or(DEFAULT_STANDARD_DEDUCTION)
    }
}

impl DerivationRule for StandardDeductionRule {
    fn path(&self) -> &str {
        STANDARD_DEDUCTION
    }

    fn depends_on(&self) -> &[&'static str] {
        &[FILING_STATUS]
    }

    fn derive(&self, facts: &FactMap) -> FactValue {
        let amount = facts
            .get(FILING_STATUS)
            .and_then(FactValue::as_str)
            .map(Self::amount_for)
            .unwrap_or(DEFAULT_STANDARD_DEDUCTION);
        FactValue::Number(amount)
    }
}

/// /hasAdvancedPtc：直接反映 /writableHasAdvancedPtc，未設定為 false
pub struct HasAdvancedPtcRule;

impl DerivationRule for HasAdvancedPtcRule {
    fn path(&self) -> &str {
        HAS_ADVANCED_PTC
    }

    fn depends_on(&self) -> &[&'static str] {
        &[WRITABLE_HAS_ADVANCED_PTC]
    }

    fn derive(&self, facts: &FactMap) -> FactValue {
        let value = facts
            .get(WRITABLE_HAS_ADVANCED_PTC)
            .and_then(FactValue::as_bool)
            .unwrap_or(false);
        FactValue::Boolean(value)
    }
}

/// 推導規則註冊表：按路徑存儲 Arc<dyn DerivationRule>
#[derive(Default, Clone)]
pub struct DerivationRegistry {
    rules: HashMap<String, Arc<dyn DerivationRule>>,
}

impl DerivationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 內建兩條稅務規則
    pub fn with_tax_rules() -> Self {
        let mut registry = Self::new();
        registry.register(StandardDeductionRule);
        registry.register(HasAdvancedPtcRule);
        registry
    }

    pub fn register(&mut self, rule: impl DerivationRule + 'static) {
        let path = rule.path().to_string();
        self.rules.insert(path, Arc::new(rule));
    }

    pub fn get(&self, path: &str) -> Option<Arc<dyn DerivationRule>> {
        self.rules.get(path).cloned()
    }

    pub fn is_derived(&self, path: &str) -> bool {
        self.rules.contains_key(path)
    }

    pub fn evaluate(&self, path: &str, facts: &FactMap) -> Option<FactValue> {
        self.rules.get(path).map(|rule| rule.derive(facts))
    }

    pub fn derived_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.rules.keys().cloned().collect();
        paths.sort();
        paths
    }
}
