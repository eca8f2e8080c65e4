//! 状态定义：控制台会话的 UiState 投影
//!
//! UI 只持有轻量的 UiState（对话记录、看板、阶段、锁、错误）；完整会话由 Orchestrator 维护并投影到 UiState。

use chrono::{DateTime, Utc};

use crate::agent::{PlanArtifact, Step};
use crate::ui::board::{SessionBoard, BOOT_PLAYBOOK};

/// 启动时 agent 的欢迎语
pub const BOOT_GREETING: &str = "Relay agent online. Drop a mission (strategy, research, or execution) and I will craft a focused plan with ready-to-run next actions.";

/// 对话记录中一条消息的发送方
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryRole {
    User,
    Agent,
}

/// 对话记录条目；agent 条目可携带本轮 artifact
#[derive(Clone, Debug)]
pub struct ChatEntry {
    pub id: String,
    pub role: EntryRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub response: Option<PlanArtifact>,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(EntryRole::User, content.into(), None)
    }

    pub fn agent(content: impl Into<String>, response: Option<PlanArtifact>) -> Self {
        Self::new(EntryRole::Agent, content.into(), response)
    }

    fn new(role: EntryRole, content: String, response: Option<PlanArtifact>) -> Self {
        let prefix = match role {
            EntryRole::User => "user",
            EntryRole::Agent => "agent",
        };
        Self {
            id: crate::boundary::generate_id(prefix),
            role,
            content,
            created_at: Utc::now(),
            response,
        }
    }

    /// 固定的启动条目：Bootstrap artifact，仅一个就绪步骤
    pub fn boot() -> Self {
        let artifact = PlanArtifact {
            summary: String::new(),
            reply: BOOT_GREETING.to_string(),
            steps: vec![Step {
                id: "boot-1".to_string(),
                title: "Ready to orchestrate".to_string(),
                detail: "Tell me the objective or challenge. I'll translate it into operator-ready momentum."
                    .to_string(),
            }],
            tasks: Vec::new(),
            signals: Vec::new(),
            references: Vec::new(),
            playbook: BOOT_PLAYBOOK.to_string(),
        };
        Self::agent(BOOT_GREETING, Some(artifact))
    }
}

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Clone, Debug)]
pub struct UiState {
    pub phase: AgentPhase,
    pub entries: Vec<ChatEntry>,
    pub board: SessionBoard,
    pub input_locked: bool,
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: AgentPhase::Idle,
            entries: vec![ChatEntry::boot()],
            board: SessionBoard::default(),
            input_locked: false,
            error_message: None,
        }
    }
}

/// Agent 阶段（UI 投影用）
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    Planning,
    Error,
}
