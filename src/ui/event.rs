//! 事件处理
//!
//! 轮询 crossterm 键盘事件，将 Ctrl+L/Ctrl+Q/Ctrl+C 转为 Command（Reset/Quit），
//! 其余按键交给 run_app 处理焦点、输入缓冲与看板选择。

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;

/// 应用事件：来自快捷键的 Command 或原始 KeyEvent
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    Key(KeyEvent),
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('l') if ctrl => {
                self.send(Command::Reset);
                AppEvent::Command(Command::Reset)
            }
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                self.send(Command::Quit);
                AppEvent::Command(Command::Quit)
            }
            _ => AppEvent::Key(key),
        }
    }

    pub fn send_submit(&self, input: String) {
        self.send(Command::Submit(input));
    }

    pub fn send_advance(&self, task_id: String) {
        self.send(Command::Advance(task_id));
    }

    pub fn send_quit(&self) {
        self.send(Command::Quit);
    }

    fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("orchestrator channel closed");
        }
    }
}
