//! 界面渲染
//!
//! 根据 UiState 与输入缓冲绘制：左侧为对话记录（按角色着色、agent 条目附带计划步骤）与输入框，
//! 右侧为 playbook 标签、任务看板与信号流。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
    Frame,
};

use crate::agent::{PlanArtifact, SignalKind, TaskStatus};
use crate::core::{AgentPhase, ChatEntry, EntryRole, UiState};
use crate::ui::board::SessionBoard;

/// 单条消息在 UI 中显示的最大字符数
const MAX_DISPLAY_CHARS: usize = 600;

/// 键盘焦点：输入框或任务看板
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFocus {
    #[default]
    Input,
    Board,
}

/// 纯视图状态（不属于会话）：焦点、看板选中项、对话滚动位置
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    pub focus: InputFocus,
    pub selected_task: usize,
    pub conversation_scroll: usize,
}

/// 对过长内容做折叠：保留前 N 字 + 省略提示
fn truncate_for_display(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= MAX_DISPLAY_CHARS {
        return content.to_string();
    }
    let head: String = chars.iter().take(MAX_DISPLAY_CHARS).collect();
    format!("{}\n... [已省略，共 {} 字]", head, chars.len())
}

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn push_wrapped<'a>(out: &mut Vec<Line<'a>>, prefix: &'a str, color: Color, text: &str, width: usize) {
    for (i, line) in wrap_text(text, width).into_iter().enumerate() {
        let pref = if i == 0 { prefix } else { "      " };
        out.push(Line::from(vec![
            Span::styled(pref, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw(line),
        ]));
    }
}

/// 计划步骤与参考链接，缩进显示在 agent 回复下方
fn artifact_lines<'a>(out: &mut Vec<Line<'a>>, artifact: &PlanArtifact, width: usize) {
    for (n, step) in artifact.steps.iter().enumerate() {
        let text = format!("{}. {}: {}", n + 1, step.title, step.detail);
        for (i, line) in wrap_text(&text, width).into_iter().enumerate() {
            let pref = if i == 0 { "    › " } else { "      " };
            out.push(Line::from(vec![
                Span::styled(pref, Style::default().fg(Color::Yellow)),
                Span::styled(line, Style::default().fg(Color::Gray)),
            ]));
        }
    }
    for reference in &artifact.references {
        out.push(Line::from(Span::styled(
            format!("    ↗ {} ({})", reference.label, reference.href),
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn transcript_lines(entries: &[ChatEntry], width: usize) -> Vec<Line<'static>> {
    let mut text_lines: Vec<Line> = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            text_lines.push(Line::from(Span::raw("")));
        }
        let (prefix, color) = match entry.role {
            EntryRole::User => ("You   ", Color::Cyan),
            EntryRole::Agent => ("Relay ", Color::Green),
        };
        text_lines.push(Line::from(Span::styled(
            entry.created_at.format("%H:%M:%S").to_string(),
            Style::default().fg(Color::DarkGray),
        )));
        push_wrapped(&mut text_lines, prefix, color, &truncate_for_display(&entry.content), width);
        if let Some(artifact) = &entry.response {
            artifact_lines(&mut text_lines, artifact, width.saturating_sub(6));
        }
    }
    text_lines
}

fn status_marker(status: TaskStatus) -> (&'static str, Color) {
    match status {
        TaskStatus::Pending => ("[ ]", Color::Gray),
        TaskStatus::InProgress => ("[~]", Color::Yellow),
        TaskStatus::Done => ("[x]", Color::Green),
    }
}

fn draw_board(f: &mut Frame, area: Rect, board: &SessionBoard, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(9),
        ])
        .split(area);

    let badge = Paragraph::new(Line::from(Span::styled(
        board.active_playbook().to_uppercase(),
        Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().title(" Playbook ").borders(Borders::ALL));
    f.render_widget(badge, chunks[0]);

    let items: Vec<ListItem> = board
        .tasks()
        .iter()
        .map(|task| {
            let (marker, color) = status_marker(task.status);
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("{} ", marker), Style::default().fg(color)),
                Span::raw(task.title.clone()),
            ])];
            let mut meta = format!(
                "    {} · {:.0}%",
                task.category.as_str(),
                task.confidence * 100.0
            );
            if let Some(due) = &task.due {
                meta.push_str(&format!(" · {}", due));
            }
            lines.push(Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))));
            ListItem::new(lines)
        })
        .collect();

    let border_color = if view.focus == InputFocus::Board {
        Color::Yellow
    } else {
        Color::Blue
    };
    let title = format!(" Tasks {}/{} ", board.completed(), board.tasks().len());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default();
    if view.focus == InputFocus::Board && !board.tasks().is_empty() {
        list_state.select(Some(view.selected_task.min(board.tasks().len() - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut list_state);

    let signal_lines: Vec<Line> = board
        .signals()
        .iter()
        .map(|signal| {
            let (tag, color) = match signal.kind {
                SignalKind::Insight => ("insight", Color::Cyan),
                SignalKind::Warning => ("warning", Color::Red),
                SignalKind::Success => ("success", Color::Green),
            };
            Line::from(vec![
                Span::styled(format!("{:<8}", tag), Style::default().fg(color)),
                Span::raw(signal.message.clone()),
            ])
        })
        .collect();
    let signals = Paragraph::new(Text::from(signal_lines))
        .block(Block::default().title(" Signals ").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(signals, chunks[2]);
}

/// 绘制一帧：左侧对话 + 输入，右侧看板；将 (总行数, 可视高度) 写入 out 供外部 clamp 滚动
pub fn draw(
    f: &mut Frame,
    state: &UiState,
    input_buffer: &str,
    view: &ViewState,
    out: &mut (usize, usize),
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(f.area());

    let input_height = 5u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(input_height)])
        .split(columns[0]);

    let conv_area = chunks[0];
    let content_width = conv_area.width.saturating_sub(2).saturating_sub(1) as usize; // 边框 + 滚动条

    let phase_str = match &state.phase {
        AgentPhase::Idle => "空闲",
        AgentPhase::Planning => "规划中…",
        AgentPhase::Error => "错误",
    };
    let title = format!(" Relay │ {} ", phase_str);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let text_lines = transcript_lines(&state.entries, content_width.max(40).saturating_sub(6));

    let content_height = conv_area.height.saturating_sub(2) as usize; // 边框
    let total_lines = text_lines.len();
    let max_scroll = total_lines.saturating_sub(content_height);
    let scroll_offset = view.conversation_scroll.min(max_scroll);

    let paragraph = Paragraph::new(Text::from(text_lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset as u16, 0));
    f.render_widget(paragraph, conv_area);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(scroll_offset)
            .viewport_content_length(content_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("█")
            .track_symbol(Some("░"));
        f.render_stateful_widget(scrollbar, conv_area, &mut scrollbar_state);
    }

    let input_prompt = if let Some(err) = &state.error_message {
        format!(" 错误: {} ", err.chars().take(36).collect::<String>())
    } else if state.input_locked {
        " 规划中… ".to_string()
    } else {
        " 任务 ".to_string()
    };

    let border_color = if state.error_message.is_some() {
        Color::Red
    } else if view.focus == InputFocus::Input {
        Color::Yellow
    } else {
        Color::Blue
    };

    let hint = " Enter 发送/推进 │ Tab 切换焦点 │ ↑↓ 选择/滚动 │ Ctrl+L 重置 │ Ctrl+Q 退出 ";
    let input_block = Block::default()
        .title(input_prompt)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let input = Paragraph::new(input_buffer)
        .block(input_block)
        .wrap(Wrap { trim: false })
        .style(if state.input_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });
    f.render_widget(input, chunks[1]);

    draw_board(f, columns[1], &state.board, view);

    out.0 = total_lines;
    out.1 = content_height;
}
