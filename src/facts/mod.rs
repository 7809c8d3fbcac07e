//! 事實層：值與線上格式、已知路徑目錄、推導規則、Fact Store

pub mod catalog;
pub mod rules;
pub mod store;
pub mod value;

pub use catalog::{known_paths, FactDescriptor, FactKind, CATALOG};
pub use rules::{DerivationRegistry, DerivationRule, HasAdvancedPtcRule, StandardDeductionRule};
pub use store::{FactMap, FactSnapshot, FactStore};
pub use value::{EnumItem, FactValue, TaggedValue};
