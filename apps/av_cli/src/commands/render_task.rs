// apps/av_cli/src/commands/render_task.rs

//! 工作进程入口
//!
//! 从标准输入读取一个 JSON 编码的 `RenderTask` 并写出图像。
//! 失败时错误信息写到标准错误，进程以非零状态退出。

use anyhow::{Context, Result};
use av_render::{render, RenderTask};
use clap::Args;
use std::io::Read;

/// 工作进程参数
#[derive(Args)]
pub struct RenderTaskArgs {}

/// 执行单个渲染任务
pub fn execute(_args: RenderTaskArgs) -> Result<()> {
    let mut payload = String::new();
    std::io::stdin()
        .read_to_string(&mut payload)
        .context("读取任务失败")?;

    let task = RenderTask::from_json(&payload).context("任务解码失败")?;
    render(&task).with_context(|| format!("渲染失败: {}", task.output.display()))?;
    Ok(())
}
