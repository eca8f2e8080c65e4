//! Agent 编排器：控制台主控循环
//!
//! 负责：加载配置、建立 cmd/state 两通道，并在后台任务中消费用户命令（Submit/Advance/Reset/Quit），
//! 驱动 Sanitizer → plan → Normalizer 流水线，把结果合并进看板并投影为 UiState。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use serde_json::{json, Value};
use tokio::sync::{mpsc, watch};

use crate::agent::{respond, PlanArtifact};
use crate::boundary::normalize;
use crate::config::{load_config_or_default, AgentSection};
use crate::core::state::{AgentPhase, ChatEntry, EntryRole, UiState};
use crate::core::AgentError;
use crate::ui::board::SessionBoard;

/// 流水线失败时追加的 agent 条目
pub const SIGNAL_LOST_TEXT: &str = "Signal lost while processing. Give it another shot in a moment.";

/// 一轮规划的入口，默认为 `agent::respond`
type PipelineFn = fn(&Value, &AgentSection) -> Result<PlanArtifact, AgentError>;

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交任务描述，触发一轮规划
    Submit(String),
    /// 推进指定任务的状态
    Advance(String),
    /// 软重置：对话回到启动条目，看板清空
    Reset,
    /// 退出应用
    Quit,
}

/// 单个控制台会话：对话记录 + 看板。只在编排任务内部被修改
pub struct ConsoleSession {
    entries: Vec<ChatEntry>,
    board: SessionBoard,
    limits: AgentSection,
    pipeline: PipelineFn,
    phase: AgentPhase,
    error_message: Option<String>,
}

impl ConsoleSession {
    pub fn new(limits: AgentSection) -> Self {
        Self::with_pipeline(limits, respond)
    }

    fn with_pipeline(limits: AgentSection, pipeline: PipelineFn) -> Self {
        Self {
            entries: vec![ChatEntry::boot()],
            board: SessionBoard::new(limits.signal_window),
            limits,
            pipeline,
            phase: AgentPhase::Idle,
            error_message: None,
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn board(&self) -> &SessionBoard {
        &self.board
    }

    /// 处理一条命令；返回 false 表示应退出循环
    pub fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Submit(input) => self.submit(&input),
            Command::Advance(id) => {
                if self.board.advance_task(&id).is_none() {
                    tracing::debug!(task = %id, "advance ignored, task not on board");
                }
            }
            Command::Reset => self.reset(),
            Command::Quit => return false,
        }
        true
    }

    /// 提交一条任务描述；去空白后为空则忽略
    pub fn submit(&mut self, input: &str) {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return;
        }

        // history 取提交前的对话记录
        let payload = self.request_payload(trimmed);
        self.entries.push(ChatEntry::user(trimmed));

        match self.run_pipeline(&payload) {
            Ok(artifact) => {
                self.board.apply(&artifact);
                self.entries
                    .push(ChatEntry::agent(artifact.reply.clone(), Some(artifact)));
                self.phase = AgentPhase::Idle;
                self.error_message = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "console pipeline failed");
                self.entries.push(ChatEntry::agent(SIGNAL_LOST_TEXT, None));
                self.phase = AgentPhase::Error;
                self.error_message = Some(e.public_message().to_string());
            }
        }
    }

    pub fn reset(&mut self) {
        self.entries = vec![ChatEntry::boot()];
        self.board.reset();
        self.phase = AgentPhase::Idle;
        self.error_message = None;
    }

    /// 构造与 HTTP 相同形状的请求体：agent 条目映射为 assistant
    fn request_payload(&self, message: &str) -> Value {
        let history: Vec<Value> = self
            .entries
            .iter()
            .map(|entry| {
                let role = match entry.role {
                    EntryRole::Agent => "assistant",
                    EntryRole::User => "user",
                };
                json!({ "role": role, "content": entry.content })
            })
            .collect();
        json!({ "message": message, "history": history })
    }

    /// 服务端流水线 + 客户端再规整一次出站值；规划中的 panic 转为 PlannerFailed
    fn run_pipeline(&self, payload: &Value) -> Result<PlanArtifact, AgentError> {
        let pipeline = self.pipeline;
        let limits = &self.limits;
        let artifact = std::panic::catch_unwind(AssertUnwindSafe(|| pipeline(payload, limits)))
            .unwrap_or_else(|panic| Err(AgentError::PlannerFailed(panic_text(panic.as_ref()))))?;
        let wire = serde_json::to_value(&artifact)?;
        Ok(normalize(&wire))
    }

    /// 投影为 UI 可渲染的状态
    pub fn snapshot(&self, input_locked: bool) -> UiState {
        UiState {
            phase: self.phase.clone(),
            entries: self.entries.clone(),
            board: self.board.clone(),
            input_locked,
            error_message: self.error_message.clone(),
        }
    }
}

fn panic_text(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "planner panicked".to_string())
}

/// 创建控制台运行时：返回命令发送端、状态接收端；后台任务消费命令并更新 state。
pub async fn create_agent(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<UiState>)> {
    let cfg = load_config_or_default(config_path);
    tracing::info!(
        app = cfg.app.display_name(),
        history_limit = cfg.agent.history_limit,
        signal_window = cfg.agent.signal_window,
        "console session starting"
    );

    let mut session = ConsoleSession::new(cfg.agent.clone());

    // 两通道：UI -> Core 命令；Core -> UI 状态快照
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(session.snapshot(false));

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            if let Command::Submit(_) = &cmd {
                // 先锁定输入并显示 Planning
                let mut pending = session.snapshot(true);
                pending.phase = AgentPhase::Planning;
                let _ = state_tx.send(pending);
            }
            if !session.handle(cmd) {
                break;
            }
            let _ = state_tx.send(session.snapshot(false));
        }
        tracing::info!("console session closed");
    });

    Ok((cmd_tx, state_rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TaskStatus;
    use crate::ui::board::BOOT_PLAYBOOK;

    #[test]
    fn test_session_boots_with_greeting() {
        let session = ConsoleSession::new(AgentSection::default());
        assert_eq!(session.entries().len(), 1);
        let boot = &session.entries()[0];
        assert_eq!(boot.role, EntryRole::Agent);
        let artifact = boot.response.as_ref().unwrap();
        assert_eq!(artifact.playbook, BOOT_PLAYBOOK);
        assert_eq!(artifact.steps[0].title, "Ready to orchestrate");
        assert_eq!(session.board().active_playbook(), BOOT_PLAYBOOK);
    }

    #[test]
    fn test_blank_submit_ignored() {
        let mut session = ConsoleSession::new(AgentSection::default());
        session.submit("   ");
        assert_eq!(session.entries().len(), 1);
    }

    #[test]
    fn test_submit_appends_entries_and_updates_board() {
        let mut session = ConsoleSession::new(AgentSection::default());
        session.submit("  Plan a 30-day go-to-market for a B2B SaaS beta ");

        let entries = session.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].role, EntryRole::User);
        assert_eq!(entries[1].content, "Plan a 30-day go-to-market for a B2B SaaS beta");
        assert_eq!(entries[2].role, EntryRole::Agent);
        assert!(!entries[2].content.is_empty());
        assert_eq!(session.board().active_playbook(), "Go-To-Market");
        assert!(!session.board().tasks().is_empty());
    }

    #[test]
    fn test_repeat_submit_merges_tasks_and_keeps_status() {
        let mut session = ConsoleSession::new(AgentSection::default());
        session.submit("Plan a go-to-market launch");
        let first_count = session.board().tasks().len();
        let id = session.board().tasks()[0].id.clone();
        assert!(session.handle(Command::Advance(id.clone())));

        session.submit("Refine the go-to-market launch pricing");
        let tasks = session.board().tasks();
        assert_eq!(tasks.len(), first_count);
        let kept = tasks.iter().find(|t| t.id == id).unwrap();
        assert_eq!(kept.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_request_payload_maps_agent_to_assistant() {
        let mut session = ConsoleSession::new(AgentSection::default());
        session.submit("asdf qwer");
        let payload = session.request_payload("next");
        let history = payload["history"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0]["role"], "assistant");
        assert_eq!(history[1]["role"], "user");
        assert_eq!(history[1]["content"], "asdf qwer");
        assert_eq!(payload["message"], "next");
    }

    #[test]
    fn test_planner_panic_becomes_signal_lost() {
        fn exploding(_: &Value, _: &AgentSection) -> Result<PlanArtifact, AgentError> {
            panic!("planner blew up");
        }
        let mut session = ConsoleSession::with_pipeline(AgentSection::default(), exploding);
        assert!(session.handle(Command::Submit("Plan a launch".into())));

        let last = session.entries().last().unwrap();
        assert_eq!(last.role, EntryRole::Agent);
        assert_eq!(last.content, SIGNAL_LOST_TEXT);
        assert!(last.response.is_none());
        assert!(session.board().tasks().is_empty());

        let state = session.snapshot(false);
        assert_eq!(state.phase, AgentPhase::Error);
        assert_eq!(
            state.error_message.as_deref(),
            Some(crate::core::INTERNAL_FAILURE_TEXT)
        );
    }

    #[test]
    fn test_reset_and_quit() {
        let mut session = ConsoleSession::new(AgentSection::default());
        session.submit("Research the competitor landscape");
        assert!(session.handle(Command::Reset));
        assert_eq!(session.entries().len(), 1);
        assert!(session.board().tasks().is_empty());
        assert_eq!(session.board().active_playbook(), BOOT_PLAYBOOK);
        assert!(!session.handle(Command::Quit));
    }

    #[tokio::test]
    async fn test_create_agent_publishes_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "[agent]\nsignal_window = 3\n").unwrap();

        let (cmd_tx, mut state_rx) = create_agent(Some(path)).await.unwrap();
        assert_eq!(state_rx.borrow().entries.len(), 1);

        cmd_tx.send(Command::Submit("asdf qwer".to_string())).unwrap();
        loop {
            state_rx.changed().await.unwrap();
            let state = state_rx.borrow().clone();
            if !state.input_locked && state.entries.len() == 3 {
                assert_eq!(state.board.active_playbook(), "General Partner");
                break;
            }
        }
        cmd_tx.send(Command::Quit).unwrap();
    }
}
