//! TUI 层：Ratatui + crossterm，主循环（app）、事件（event）、渲染（render）、会话看板（board）

pub mod app;
pub mod board;
pub mod event;
pub mod render;

pub use app::run_app;
pub use board::{SessionBoard, BOOT_PLAYBOOK};
pub use event::EventHandler;
pub use render::draw;
