//! Relay 任务规划控制台
//!
//! 入口：初始化日志、创建编排器与 TUI，并运行主循环。

use anyhow::Context;
use relay::{core::create_agent, observability, ui::run_app};

/// TUI 占用终端，日志写到此文件
const LOG_FILE: &str = "relay.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_to_file(LOG_FILE).context("Failed to open log file")?;

    // 创建编排器：返回命令发送端、状态接收端
    let (cmd_tx, state_rx) = create_agent(None).await.context("Failed to create agent")?;

    // 启动 TUI 主循环（消费 state，向 cmd_tx 发送用户指令）
    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    Ok(())
}
