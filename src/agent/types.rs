//! 计划产物类型
//!
//! 规划引擎每轮产出一个 PlanArtifact；所有实体都是值对象，产出后不可变，跨轮次不共享引用。
//! 序列化字段名即对外 JSON 协议。

use serde::{Deserialize, Serialize};

/// 未命中任何关键词时的默认 playbook
pub const DEFAULT_PLAYBOOK: &str = "General Partner";

/// 一次规划调用的完整输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanArtifact {
    pub summary: String,
    pub reply: String,
    pub steps: Vec<Step>,
    pub tasks: Vec<Task>,
    pub signals: Vec<Signal>,
    pub references: Vec<Reference>,
    pub playbook: String,
}

/// 有序执行步骤；detail 必须非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub detail: String,
}

/// 任务分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Analysis,
    Planning,
    Delivery,
    Research,
}

impl TaskCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "analysis" => Some(TaskCategory::Analysis),
            "planning" => Some(TaskCategory::Planning),
            "delivery" => Some(TaskCategory::Delivery),
            "research" => Some(TaskCategory::Research),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Analysis => "analysis",
            TaskCategory::Planning => "planning",
            TaskCategory::Delivery => "delivery",
            TaskCategory::Research => "research",
        }
    }
}

/// 任务状态：pending → in-progress → done → pending 循环，仅由外部用户动作推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TaskStatus::Pending),
            "in-progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// 循环中的下一个状态
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

/// 可追踪任务；跨轮合并时以不区分大小写的 title 为身份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl Task {
    /// 合并用的身份键
    pub fn identity(&self) -> String {
        self.title.to_lowercase()
    }
}

/// 信号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Insight,
    Warning,
    Success,
}

impl SignalKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "insight" => Some(SignalKind::Insight),
            "warning" => Some(SignalKind::Warning),
            "success" => Some(SignalKind::Success),
            _ => None,
        }
    }
}

/// 策略信号；去重身份为 message 文本本身
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub message: String,
}

/// 参考链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub label: String,
    pub href: String,
}
