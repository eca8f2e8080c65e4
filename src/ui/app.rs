//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，将用户输入与快捷键转为 Command 发送给编排器，
//! 每帧用 draw 渲染 UiState、输入缓冲与看板选中项。

use std::io::{self, Stdout};

use crossterm::event::KeyCode;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{Command, UiState};
use crate::ui::event::{AppEvent, EventHandler};
use crate::ui::render::{draw, InputFocus, ViewState};

/// 只认斜杠形式，任务描述本身可以是 "quit"
fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "/exit" | "/quit")
}

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, state_rx, cmd_tx).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    let event_handler = EventHandler::new(cmd_tx);
    let mut input_buffer = String::new();
    let mut view = ViewState::default();
    let mut last_entry_count = 0usize;

    loop {
        let state = state_rx.borrow().clone();

        // 新消息到达时滚到底部
        if state.entries.len() != last_entry_count {
            last_entry_count = state.entries.len();
            view.conversation_scroll = usize::MAX;
        }
        let task_count = state.board.tasks().len();
        view.selected_task = view.selected_task.min(task_count.saturating_sub(1));

        if let Some(ev) = event_handler.poll()? {
            match ev {
                AppEvent::Command(Command::Quit) => break,
                AppEvent::Command(_) => {
                    view.selected_task = 0;
                }
                AppEvent::Key(key) => match key.code {
                    KeyCode::Tab | KeyCode::BackTab => {
                        view.focus = match view.focus {
                            InputFocus::Input => InputFocus::Board,
                            InputFocus::Board => InputFocus::Input,
                        };
                    }
                    KeyCode::Enter => match view.focus {
                        InputFocus::Input if !state.input_locked => {
                            let input = input_buffer.trim().to_string();
                            input_buffer.clear();
                            if is_exit_command(&input) {
                                event_handler.send_quit();
                                break;
                            }
                            if !input.is_empty() {
                                event_handler.send_submit(input);
                            }
                        }
                        InputFocus::Board => {
                            if let Some(task) = state.board.tasks().get(view.selected_task) {
                                event_handler.send_advance(task.id.clone());
                            }
                        }
                        _ => {}
                    },
                    KeyCode::Backspace if view.focus == InputFocus::Input => {
                        input_buffer.pop();
                    }
                    KeyCode::Char(c) if view.focus == InputFocus::Input => {
                        input_buffer.push(c);
                    }
                    KeyCode::Up => match view.focus {
                        InputFocus::Board => {
                            view.selected_task = view.selected_task.saturating_sub(1);
                        }
                        InputFocus::Input => {
                            view.conversation_scroll = view.conversation_scroll.saturating_sub(1);
                        }
                    },
                    KeyCode::Down => match view.focus {
                        InputFocus::Board => {
                            view.selected_task =
                                (view.selected_task + 1).min(task_count.saturating_sub(1));
                        }
                        InputFocus::Input => {
                            view.conversation_scroll = view.conversation_scroll.saturating_add(1);
                        }
                    },
                    KeyCode::PageUp => {
                        view.conversation_scroll = view.conversation_scroll.saturating_sub(10);
                    }
                    KeyCode::PageDown => {
                        view.conversation_scroll = view.conversation_scroll.saturating_add(10);
                    }
                    KeyCode::Home => view.conversation_scroll = 0,
                    KeyCode::End => view.conversation_scroll = usize::MAX,
                    _ => {}
                },
            }
        }

        let mut scroll_info = (0usize, 0usize);
        terminal.draw(|f| {
            draw(f, &state, &input_buffer, &view, &mut scroll_info);
        })?;
        let (total_lines, viewport_height) = scroll_info;
        let max_scroll = total_lines.saturating_sub(viewport_height);
        view.conversation_scroll = view.conversation_scroll.min(max_scroll);

        tokio::task::yield_now().await;
    }

    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("/exit"));
        assert!(is_exit_command("/QUIT"));
        assert!(!is_exit_command("quit"));
        assert!(!is_exit_command("exit"));
        assert!(!is_exit_command("exit plan"));
    }
}
