//! 规划流水线错误类型
//!
//! 只有两类错误会冒泡到调用方：请求本身无效（客户端错误）与意外的内部故障（服务端错误）。
//! 其余不规整输入（坏的历史条目、未命中关键词、缺字段）都在靠近源头处修复，不成为错误。

use thiserror::Error;

/// 空消息时返回给调用方的固定文案
pub const EMPTY_MESSAGE_TEXT: &str = "Message cannot be empty.";

/// 内部故障时返回给调用方的固定文案（不泄露内部细节）
pub const INTERNAL_FAILURE_TEXT: &str =
    "Agent failed to process the request. Try again in a moment.";

/// 流水线运行中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// 入站 message 缺失、非字符串或去空白后为空
    #[error("Message cannot be empty.")]
    EmptyMessage,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 规划任务异常终止（如 spawn_blocking 中 panic）
    #[error("Planner failed: {0}")]
    PlannerFailed(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// 是否属于调用方的请求问题（4xx）；其余一律按内部故障（5xx）处理
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::EmptyMessage)
    }

    /// 可以安全展示给调用方的文案
    pub fn public_message(&self) -> &'static str {
        if self.is_client_error() {
            EMPTY_MESSAGE_TEXT
        } else {
            INTERNAL_FAILURE_TEXT
        }
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::ConfigError(e.to_string())
    }
}
