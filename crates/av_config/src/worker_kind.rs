// crates/av_config/src/worker_kind.rs

//! 工作池类型选择
//!
//! 渲染任务可以在进程池或线程池中执行。进程池中每个任务持有输入的
//! 独立副本，线程池中每个任务持有自己的画布，二者都不共享绘图状态。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 工作池类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    /// 子进程工作者
    #[default]
    Process,
    /// 线程工作者
    Thread,
}

impl WorkerKind {
    /// 获取名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Thread => "thread",
        }
    }

    /// 是否为进程池
    #[inline]
    pub fn is_process(&self) -> bool {
        matches!(self, Self::Process)
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 工作池类型解析错误
#[derive(Debug, Clone)]
pub struct WorkerKindParseError(String);

impl FromStr for WorkerKind {
    type Err = WorkerKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "thread" => Ok(Self::Thread),
            _ => Err(WorkerKindParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for WorkerKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid worker type '{}', expected 'process' or 'thread'", self.0)
    }
}

impl std::error::Error for WorkerKindParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_kind_default() {
        assert_eq!(WorkerKind::default(), WorkerKind::Process);
    }

    #[test]
    fn test_worker_kind_parse() {
        assert_eq!("thread".parse::<WorkerKind>().unwrap(), WorkerKind::Thread);
        assert_eq!("PROCESS".parse::<WorkerKind>().unwrap(), WorkerKind::Process);
        assert!("fiber".parse::<WorkerKind>().is_err());
    }

    #[test]
    fn test_worker_kind_serde() {
        let json = serde_json::to_string(&WorkerKind::Thread).unwrap();
        assert_eq!(json, "\"thread\"");
    }
}
