//! 核心编排层：错误、状态投影、控制台主控循环

pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::{AgentError, EMPTY_MESSAGE_TEXT, INTERNAL_FAILURE_TEXT};
pub use orchestrator::{create_agent, Command, ConsoleSession, SIGNAL_LOST_TEXT};
pub use state::{AgentPhase, ChatEntry, EntryRole, UiState};
