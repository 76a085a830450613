// crates/av_workflow/src/error.rs

//! 工作流错误类型

use std::fmt;
use std::path::PathBuf;

use av_config::ConfigError;
use av_foundation::AvError;
use av_io::IoError;
use av_render::RenderError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 工作流结果类型
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// 单个渲染任务的失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// 快照序号
    pub index: usize,
    /// 目标输出文件
    pub output: PathBuf,
    /// 错误信息
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({}): {}", self.index, self.output.display(), self.message)
    }
}

/// 工作流错误
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// 配置错误
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 快照读取错误
    #[error("dump error: {0}")]
    Dump(#[from] IoError),

    /// 场无法归约或绘制
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// 输出目录无法创建
    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 工作池故障
    #[error("worker pool error: {0}")]
    Pool(String),

    /// 部分渲染任务失败（在所有任务结束后汇总）
    #[error("{} of {} render tasks failed; first: {}", .failures.len(), .submitted, first_failure(.failures))]
    RenderFailures {
        /// 已提交任务数
        submitted: usize,
        /// 失败记录
        failures: Vec<TaskFailure>,
    },
}

fn first_failure(failures: &[TaskFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

impl WorkflowError {
    /// 工作池错误
    pub fn pool(message: impl Into<String>) -> Self {
        Self::Pool(message.into())
    }
}

impl From<WorkflowError> for AvError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Config(e) => e.into(),
            WorkflowError::Dump(e) => e.into(),
            WorkflowError::Render(e) => e.into(),
            WorkflowError::OutputDirectory { path, source } => AvError::io_with_source(
                format!("cannot create output directory {}", path.display()),
                source,
            ),
            other => AvError::internal(other.to_string()),
        }
    }
}
