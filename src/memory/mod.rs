//! 记忆层：短期对话窗口

pub mod conversation;

pub use conversation::{ConversationMemory, Message, Role};
