//! 記憶層：會話歷史

pub mod conversation;

pub use conversation::{ConversationHistory, Message, Role};
