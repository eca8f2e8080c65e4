//! 入站校验（Sanitizer）
//!
//! 把不可信的请求体转换成规划引擎的输入：message 必须是去空白后非空的字符串，
//! history 逐条宽松转换，坏条目直接丢弃，最后只保留最近 history_limit 条。

use serde_json::Value;

use crate::core::AgentError;
use crate::memory::{ConversationMemory, Message, Role};

/// 通过校验的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedRequest {
    pub message: String,
    pub history: Vec<Message>,
}

/// 校验整个请求体；message 为空是唯一的硬性拒绝
pub fn sanitize_request(payload: &Value, history_limit: usize) -> Result<SanitizedRequest, AgentError> {
    let message = match payload.get("message") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let history = sanitize_history(payload.get("history"), history_limit);

    if message.trim().is_empty() {
        tracing::debug!("rejecting request with empty message");
        return Err(AgentError::EmptyMessage);
    }

    Ok(SanitizedRequest { message, history })
}

/// 宽松转换历史：非数组视为空；元素须为对象，role 仅 "assistant" 保留，其余归为 user
pub fn sanitize_history(raw: Option<&Value>, history_limit: usize) -> Vec<Message> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    let mut window = ConversationMemory::new(history_limit);
    let mut dropped = 0usize;
    for item in items {
        match sanitize_message(item) {
            Some(msg) => window.push(msg),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, "dropped malformed history entries");
    }
    window.into_messages()
}

fn sanitize_message(item: &Value) -> Option<Message> {
    let Value::Object(fields) = item else {
        return None;
    };
    let role = Role::coerce(fields.get("role").and_then(Value::as_str));
    let content = coerce_text(fields.get("content"));
    if content.trim().is_empty() {
        return None;
    }
    Some(Message { role, content })
}

/// 任意 JSON 值转文本：字符串原样，数字/布尔取字面，null 为空，数组/对象取紧凑 JSON
fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
