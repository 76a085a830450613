// crates/av_config/src/lib.rs

//! AmrView Config Layer
//!
//! 配置层，提供渲染任务与差分工具的配置结构。
//!
//! # 模块概览
//!
//! - [`component`]: 分量选择索引对
//! - [`worker_kind`]: 工作池类型（进程/线程）
//! - [`movie_config`]: 快照动画渲染配置
//! - [`diff_config`]: 数值表差分配置
//! - [`error`]: 配置错误类型

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod diff_config;
pub mod error;
pub mod movie_config;
pub mod worker_kind;

// 重导出核心类型
pub use component::ComponentSpec;
pub use diff_config::{DiffConfig, ReportFormat};
pub use error::ConfigError;
pub use movie_config::{ImageConfig, MovieConfig};
pub use worker_kind::WorkerKind;
