// apps/av_cli/src/commands/mod.rs

//! 子命令实现

pub mod diff;
pub mod info;
pub mod movie;
pub mod render_task;
