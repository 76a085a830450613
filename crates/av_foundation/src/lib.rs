// crates/av_foundation/src/lib.rs

//! AmrView Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型与数值工具。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 掩码感知值域、舍入
//!
//! # 层级架构
//!
//! ```text
//! Layer 4: av_cli                      ─> 命令行应用
//! Layer 3: av_workflow                 ─> 调度与工作池
//! Layer 2: av_render / av_io / av_compare
//! Layer 1: av_config
//! Layer 0: av_foundation (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;

// 重导出常用类型
pub use error::{AvError, AvResult};
pub use float::{round_to, FiniteRange};
