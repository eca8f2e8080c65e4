//! Relay - 任务规划智能体
//!
//! 模块划分：
//! - **agent**: 确定性规划引擎（playbook 分类、步骤/任务/信号/参考生成）与 respond 流水线
//! - **boundary**: 入站 Sanitizer 与出站 Normalizer
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、状态投影、控制台编排
//! - **integrations**: HTTP 接入（`web` feature）
//! - **memory**: 对话窗口
//! - **observability**: 日志初始化
//! - **ui**: Ratatui TUI 界面与会话看板

pub mod agent;
pub mod boundary;
pub mod config;
pub mod core;
pub mod integrations;
pub mod memory;
pub mod observability;
pub mod ui;

pub use agent::{plan, respond, PlanArtifact};
