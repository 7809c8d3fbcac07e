//! GET_FACT 結果的顯示格式

use crate::facts::FactValue;
use crate::locale::Phrases;

/// 大於此值的數字以金額格式顯示
pub const CURRENCY_THRESHOLD: f64 = 100.0;

/// `$` + 千分位整數，四捨五入不保留小數：14600 → "$14,600"
pub fn format_currency(amount: f64) -> String {
    // 與 Python `{:,.0f}` 一致：銀行家捨入
    let rounded = amount.round_ties_even();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// 把讀到的事實轉成回覆中的文字；None 為未設定
pub fn format_fact(value: Option<&FactValue>, phrases: &Phrases) -> String {
    match value {
        Some(FactValue::Number(n)) if *n > CURRENCY_THRESHOLD => format_currency(*n),
        Some(FactValue::Boolean(true)) => phrases.yes.to_string(),
        Some(FactValue::Boolean(false)) => phrases.no.to_string(),
        Some(other) => other.to_string(),
        None => phrases.unset.to_string(),
    }
}
