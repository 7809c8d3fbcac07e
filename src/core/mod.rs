//! 核心編排層：錯誤類型、會話管理、對話輪次編排

pub mod error;
pub mod orchestrator;
pub mod session;

pub use error::{ActionError, AgentError, FactError};
pub use orchestrator::{TurnOrchestrator, TurnOutcome};
pub use session::{Session, SessionInfo, SessionKey, SessionManager, SharedSession};
