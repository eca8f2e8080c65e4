//! 会话看板（Reconciler）
//!
//! 控制台会话独占一个 SessionBoard，把每轮 PlanArtifact 合并进来：
//! 任务按不区分大小写的标题 upsert（保留既有 id 与 status），信号按 message 去重并只保留最近窗口。
//! 一个 artifact 在一次 `&mut self` 调用内整批合并。

use crate::agent::{PlanArtifact, Signal, Task, TaskStatus};
use crate::config::DEFAULT_SIGNAL_WINDOW;

/// 启动时（以及 reset 后）显示的 playbook 标签
pub const BOOT_PLAYBOOK: &str = "Bootstrap";

#[derive(Debug, Clone)]
pub struct SessionBoard {
    tasks: Vec<Task>,
    signals: Vec<Signal>,
    active_playbook: String,
    signal_window: usize,
}

impl Default for SessionBoard {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_WINDOW)
    }
}

impl SessionBoard {
    pub fn new(signal_window: usize) -> Self {
        Self {
            tasks: Vec::new(),
            signals: Vec::new(),
            active_playbook: BOOT_PLAYBOOK.to_string(),
            signal_window,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn active_playbook(&self) -> &str {
        &self.active_playbook
    }

    /// 合并一轮 artifact：任务 upsert、信号去重加窗口、切换 playbook
    pub fn apply(&mut self, artifact: &PlanArtifact) {
        self.merge_tasks(&artifact.tasks);
        self.push_signals(&artifact.signals);
        self.active_playbook = artifact.playbook.clone();
        tracing::debug!(
            tasks = self.tasks.len(),
            signals = self.signals.len(),
            playbook = %self.active_playbook,
            "board updated"
        );
    }

    fn merge_tasks(&mut self, incoming: &[Task]) {
        for task in incoming {
            let key = task.identity();
            match self.tasks.iter_mut().find(|t| t.identity() == key) {
                Some(current) => {
                    let id = std::mem::take(&mut current.id);
                    let status = current.status;
                    *current = Task {
                        id,
                        status,
                        ..task.clone()
                    };
                }
                None => self.tasks.push(task.clone()),
            }
        }
    }

    /// 同一 message 只保留最后一次出现的位置，然后截取最近 signal_window 条
    fn push_signals(&mut self, incoming: &[Signal]) {
        let mut combined = std::mem::take(&mut self.signals);
        combined.extend(incoming.iter().cloned());

        let mut kept: Vec<Signal> = Vec::with_capacity(combined.len());
        for signal in combined.into_iter().rev() {
            if !kept.iter().any(|s| s.message == signal.message) {
                kept.push(signal);
            }
        }
        kept.truncate(self.signal_window);
        kept.reverse();
        self.signals = kept;
    }

    /// 推进任务状态：pending → in-progress → done → pending；返回新状态，id 不存在时返回 None
    pub fn advance_task(&mut self, id: &str) -> Option<TaskStatus> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = task.status.next();
        Some(task.status)
    }

    pub fn reset(&mut self) {
        self.tasks.clear();
        self.signals.clear();
        self.active_playbook = BOOT_PLAYBOOK.to_string();
    }

    /// 已完成任务数（看板标题用）
    pub fn completed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{SignalKind, TaskCategory};

    fn task(id: &str, title: &str, description: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            category: TaskCategory::Planning,
            status: TaskStatus::Pending,
            confidence: 0.6,
            due: None,
        }
    }

    fn signal(message: &str) -> Signal {
        Signal {
            id: format!("sig-{}", message),
            kind: SignalKind::Insight,
            message: message.to_string(),
        }
    }

    fn artifact(tasks: Vec<Task>, signals: Vec<Signal>, playbook: &str) -> PlanArtifact {
        PlanArtifact {
            summary: String::new(),
            reply: "ok".to_string(),
            steps: Vec::new(),
            tasks,
            signals,
            references: Vec::new(),
            playbook: playbook.to_string(),
        }
    }

    #[test]
    fn test_new_board_boots() {
        let board = SessionBoard::default();
        assert!(board.tasks().is_empty());
        assert!(board.signals().is_empty());
        assert_eq!(board.active_playbook(), BOOT_PLAYBOOK);
    }

    #[test]
    fn test_signal_window_keeps_last_six() {
        let mut board = SessionBoard::new(6);
        for i in 0..8 {
            board.apply(&artifact(vec![], vec![signal(&format!("s{}", i))], "Go-To-Market"));
        }
        let messages: Vec<&str> = board.signals().iter().map(|s| s.message.as_str()).collect();
        assert_eq!(messages, vec!["s2", "s3", "s4", "s5", "s6", "s7"]);
    }

    #[test]
    fn test_signal_dedupe_keeps_latest_occurrence() {
        let mut board = SessionBoard::new(6);
        board.apply(&artifact(vec![], vec![signal("a"), signal("b")], "x"));
        board.apply(&artifact(vec![], vec![signal("a"), signal("c")], "x"));
        let messages: Vec<&str> = board.signals().iter().map(|s| s.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_merge_by_title_keeps_status() {
        let mut board = SessionBoard::default();
        board.apply(&artifact(vec![task("t-1", "Audit pricing", "old")], vec![], "Go-To-Market"));
        assert_eq!(board.advance_task("t-1"), Some(TaskStatus::InProgress));
        assert_eq!(board.advance_task("t-1"), Some(TaskStatus::Done));

        board.apply(&artifact(
            vec![task("t-9", "audit pricing", "new"), task("t-2", "Draft launch brief", "d")],
            vec![],
            "Product Strategy",
        ));

        let tasks = board.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "t-1");
        assert_eq!(tasks[0].status, TaskStatus::Done);
        assert_eq!(tasks[0].description.as_deref(), Some("new"));
        assert_eq!(tasks[0].title, "audit pricing");
        assert_eq!(tasks[1].title, "Draft launch brief");
        assert_eq!(board.completed(), 1);
        assert_eq!(board.active_playbook(), "Product Strategy");
    }

    #[test]
    fn test_advance_cycles_and_unknown_id() {
        let mut board = SessionBoard::default();
        board.apply(&artifact(vec![task("t-1", "One", "d")], vec![], "x"));
        board.advance_task("t-1");
        board.advance_task("t-1");
        assert_eq!(board.advance_task("t-1"), Some(TaskStatus::Pending));
        assert_eq!(board.advance_task("missing"), None);
    }

    #[test]
    fn test_reset_restores_boot_state() {
        let mut board = SessionBoard::default();
        board.apply(&artifact(vec![task("t-1", "One", "d")], vec![signal("a")], "Execution Ops"));
        board.reset();
        assert!(board.tasks().is_empty());
        assert!(board.signals().is_empty());
        assert_eq!(board.active_playbook(), BOOT_PLAYBOOK);
    }
}
