//! 规划智能体
//!
//! - **types**: PlanArtifact 及 Step / Task / Signal / Reference
//! - **extract**: 分词与显著词抽取
//! - **playbook**: 声明式 playbook 注册表与分类
//! - **planner**: 纯函数 plan(input, history)
//!
//! respond 串起完整流水线：Sanitizer → plan → 序列化 → Normalizer，供 HTTP 与控制台共用。

pub mod extract;
pub mod planner;
pub mod playbook;
pub mod types;

use serde_json::Value;

use crate::boundary::{normalize, sanitize_request};
use crate::config::AgentSection;
use crate::core::AgentError;

pub use planner::plan;
pub use playbook::{classify, PlaybookKind, REGISTRY};
pub use types::{
    PlanArtifact, Reference, Signal, SignalKind, Step, Task, TaskCategory, TaskStatus,
    DEFAULT_PLAYBOOK,
};

/// 处理一次入站请求：校验并截断 → 规划 → 出站规整
///
/// 只有空消息（客户端错误）与序列化故障（内部错误）会返回 Err。
pub fn respond(payload: &Value, limits: &AgentSection) -> Result<PlanArtifact, AgentError> {
    let request = sanitize_request(payload, limits.history_limit)?;
    tracing::info!(
        message_chars = request.message.chars().count(),
        history = request.history.len(),
        "planning request accepted"
    );

    let artifact = plan(&request.message, &request.history);
    let outbound = serde_json::to_value(&artifact)?;
    let normalized = normalize(&outbound);

    tracing::info!(
        playbook = %normalized.playbook,
        steps = normalized.steps.len(),
        tasks = normalized.tasks.len(),
        signals = normalized.signals.len(),
        "plan ready"
    );
    Ok(normalized)
}
