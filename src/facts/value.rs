//! 事實值與 Fact Graph 線上格式
//!
//! FactValue 是三種原生型別的和型別；TaggedValue 是對外序列化用的
//! `{"$type": "...", "item": ...}` 包裝格式，兩者可互相轉換且不丟失型別。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 事實的原生值：布林、數字、列舉字串
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Boolean(bool),
    Number(f64),
    Enum(String),
}

impl FactValue {
    /// 解析呼叫端持有的原始文字：true/false → 布林，有限數字 → 數字，其餘 → 列舉字串
    pub fn parse_literal(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            return FactValue::Boolean(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return FactValue::Boolean(false);
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => FactValue::Number(n),
            _ => FactValue::Enum(raw.to_string()),
        }
    }

    /// 字串 "true"/"false"（不分大小寫）轉為布林，其餘原樣返回
    pub fn coerce_boolean(self) -> Self {
        match self {
            FactValue::Enum(s) if s.eq_ignore_ascii_case("true") => FactValue::Boolean(true),
            FactValue::Enum(s) if s.eq_ignore_ascii_case("false") => FactValue::Boolean(false),
            other => other,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FactValue::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 包裝為線上格式
    pub fn to_tagged(&self) -> TaggedValue {
        match self {
            FactValue::Boolean(b) => TaggedValue::BooleanWrapper(*b),
            FactValue::Enum(s) => TaggedValue::EnumWrapper(EnumItem { value: s.clone() }),
            FactValue::Number(n) => TaggedValue::NumberWrapper(json_number(*n)),
        }
    }

    /// 轉為不帶包裝的 JSON 值（供 HTTP 查詢回傳）
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FactValue::Boolean(b) => serde_json::Value::Bool(*b),
            FactValue::Number(n) => serde_json::Value::Number(json_number(*n)),
            FactValue::Enum(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// 整數值輸出為 JSON 整數（14600 而非 14600.0）
fn json_number(n: f64) -> serde_json::Number {
    if is_integral(n) {
        serde_json::Number::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).unwrap_or_else(|| serde_json::Number::from(0))
    }
}

pub(crate) fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15
}

/// 數字的純文字形式：整數不帶小數點
pub fn format_plain_number(n: f64) -> String {
    if is_integral(n) {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Boolean(b) => write!(f, "{b}"),
            FactValue::Number(n) => f.write_str(&format_plain_number(*n)),
            FactValue::Enum(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FactValue {
    fn from(b: bool) -> Self {
        FactValue::Boolean(b)
    }
}

impl From<f64> for FactValue {
    fn from(n: f64) -> Self {
        FactValue::Number(n)
    }
}

impl From<i64> for FactValue {
    fn from(n: i64) -> Self {
        FactValue::Number(n as f64)
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        FactValue::Enum(s.to_string())
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        FactValue::Enum(s)
    }
}

/// EnumWrapper 的 item：`{"value": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumItem {
    pub value: String,
}

/// Fact Graph 線上格式，與既有前端相容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type", content = "item")]
pub enum TaggedValue {
    BooleanWrapper(bool),
    EnumWrapper(EnumItem),
    NumberWrapper(serde_json::Number),
}

impl From<TaggedValue> for FactValue {
    fn from(tagged: TaggedValue) -> Self {
        match tagged {
            TaggedValue::BooleanWrapper(b) => FactValue::Boolean(b),
            TaggedValue::EnumWrapper(item) => FactValue::Enum(item.value),
            TaggedValue::NumberWrapper(n) => FactValue::Number(n.as_f64().unwrap_or_default()),
        }
    }
}

impl From<&TaggedValue> for FactValue {
    fn from(tagged: &TaggedValue) -> Self {
        FactValue::from(tagged.clone())
    }
}
