//! 短期记忆：对话历史窗口
//!
//! 只保留最近 N 条消息（不按轮次成对），超出时自动剪枝；Sanitizer 用它截断入站历史，
//! 控制台用它维护发往规划引擎的对话记录。

use serde::{Deserialize, Serialize};

/// 消息角色：封闭的两值标签
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// 只有精确等于 "assistant" 才是 Assistant，其余一律视为 User
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some("assistant") => Role::Assistant,
            _ => Role::User,
        }
    }
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// 内容去掉首尾空白后非空
    pub fn is_meaningful(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// 有界对话窗口：最多保留 limit 条消息，最新的在末尾
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    limit: usize,
}

impl ConversationMemory {
    pub fn new(limit: usize) -> Self {
        Self {
            messages: Vec::new(),
            limit,
        }
    }

    /// 追加一条消息；内容为空白的消息直接丢弃
    pub fn push(&mut self, msg: Message) {
        if !msg.is_meaningful() {
            return;
        }
        self.messages.push(msg);
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 超出 limit 时丢弃最旧的消息
    fn prune(&mut self) {
        if self.messages.len() > self.limit {
            let excess = self.messages.len() - self.limit;
            self.messages.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
