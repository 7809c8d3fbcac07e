//! 已知事實路徑目錄
//!
//! 固定清單，與前端及 Fact Graph 定義保持一致；用於探索 API 與預設系統提示詞。

pub const FILING_STATUS: &str = "/filingStatus";
pub const STANDARD_DEDUCTION: &str = "/standardDeduction";
pub const WRITABLE_HAS_ADVANCED_PTC: &str = "/writableHasAdvancedPtc";
pub const HAS_ADVANCED_PTC: &str = "/hasAdvancedPtc";
pub const REFUND_VIA_ACH: &str = "/refundViaAch";
pub const PAY_VIA_ACH: &str = "/payViaAch";

/// 報稅身份可用的列舉值
pub const FILING_STATUSES: [&str; 5] = [
    "single",
    "married_filing_jointly",
    "married_filing_separately",
    "head_of_household",
    "qualifying_surviving_spouse",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Enum,
    Boolean,
    Dollars,
}

/// 單一已知路徑的描述
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct FactDescriptor {
    pub path: &'static str,
    pub kind: FactKind,
    pub derived: bool,
    pub description: &'static str,
}

pub const CATALOG: [FactDescriptor; 6] = [
    FactDescriptor {
        path: FILING_STATUS,
        kind: FactKind::Enum,
        derived: false,
        description: "Filing status",
    },
    FactDescriptor {
        path: STANDARD_DEDUCTION,
        kind: FactKind::Dollars,
        derived: true,
        description: "Standard deduction for the current filing status (tax year 2024)",
    },
    FactDescriptor {
        path: WRITABLE_HAS_ADVANCED_PTC,
        kind: FactKind::Boolean,
        derived: false,
        description: "Received advance payments of the premium tax credit (e.g. via Healthcare.gov)",
    },
    FactDescriptor {
        path: HAS_ADVANCED_PTC,
        kind: FactKind::Boolean,
        derived: true,
        description: "Advance premium tax credit status, follows /writableHasAdvancedPtc",
    },
    FactDescriptor {
        path: REFUND_VIA_ACH,
        kind: FactKind::Boolean,
        derived: false,
        description: "Receive the refund by ACH direct deposit instead of a mailed check",
    },
    FactDescriptor {
        path: PAY_VIA_ACH,
        kind: FactKind::Boolean,
        derived: false,
        description: "Pay a balance due by ACH electronic payment",
    },
];

/// 目錄中的全部路徑（可寫 + 推導），順序固定
pub fn known_paths() -> Vec<String> {
    CATALOG.iter().map(|d| d.path.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_paths_order() {
        assert_eq!(
            known_paths(),
            vec![
                "/filingStatus",
                "/standardDeduction",
                "/writableHasAdvancedPtc",
                "/hasAdvancedPtc",
                "/refundViaAch",
                "/payViaAch",
            ]
        );
    }

    #[test]
    fn test_derived_entries() {
        let derived: Vec<&str> = CATALOG.iter().filter(|d| d.derived).map(|d| d.path).collect();
        assert_eq!(derived, vec![STANDARD_DEDUCTION, HAS_ADVANCED_PTC]);
        let refund = CATALOG.iter().find(|d| d.path == REFUND_VIA_ACH).unwrap();
        assert_eq!(refund.kind, FactKind::Boolean);
    }
}
