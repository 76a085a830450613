// crates/av_workflow/src/events.rs

//! 事件系统模块
//!
//! 调度过程中的事件定义和分发机制。

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

/// 调度事件
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// 快照已读取
    DumpRead {
        /// 快照序号
        index: usize,
        /// 快照路径
        path: PathBuf,
    },
    /// 渲染任务已提交
    TaskSubmitted {
        /// 快照序号
        index: usize,
        /// 输出文件
        output: PathBuf,
        /// 时间标签
        time_label: Option<f64>,
    },
    /// 渲染任务已完成
    TaskFinished {
        /// 快照序号
        index: usize,
        /// 输出文件
        output: PathBuf,
    },
    /// 渲染任务失败
    TaskFailed {
        /// 快照序号
        index: usize,
        /// 输出文件
        output: PathBuf,
        /// 错误信息
        error: String,
    },
    /// 序列中止（场缺失）
    Halted {
        /// 快照序号
        index: usize,
        /// 快照路径
        path: PathBuf,
        /// 缺失的场
        field: String,
    },
    /// 所有已提交任务均已结束
    Drained {
        /// 已提交数
        submitted: usize,
        /// 成功数
        rendered: usize,
        /// 失败数
        failed: usize,
    },
}

impl DispatchEvent {
    /// 事件对应的快照序号
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::DumpRead { index, .. }
            | Self::TaskSubmitted { index, .. }
            | Self::TaskFinished { index, .. }
            | Self::TaskFailed { index, .. }
            | Self::Halted { index, .. } => Some(*index),
            Self::Drained { .. } => None,
        }
    }

    /// 获取事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::DumpRead { .. } => "DumpRead",
            Self::TaskSubmitted { .. } => "TaskSubmitted",
            Self::TaskFinished { .. } => "TaskFinished",
            Self::TaskFailed { .. } => "TaskFailed",
            Self::Halted { .. } => "Halted",
            Self::Drained { .. } => "Drained",
        }
    }
}

/// 事件监听器trait
pub trait EventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &DispatchEvent);

    /// 获取监听器名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式事件监听器
pub struct FnListener<F>
where
    F: Fn(&DispatchEvent) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&DispatchEvent) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&DispatchEvent) + Send + Sync,
{
    fn on_event(&self, event: &DispatchEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志事件监听器
pub struct LoggingListener {
    prefix: String,
    verbose: bool,
}

impl LoggingListener {
    /// 创建日志监听器
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// 设置详细模式（每个任务的提交与完成也输出）
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl EventListener for LoggingListener {
    fn on_event(&self, event: &DispatchEvent) {
        match event {
            DispatchEvent::TaskFailed { output, error, .. } => {
                tracing::warn!("{}: rendering {} failed: {}", self.prefix, output.display(), error);
            }
            DispatchEvent::Drained {
                submitted,
                rendered,
                failed,
            } => {
                tracing::info!(
                    "{}: {} submitted, {} rendered, {} failed",
                    self.prefix,
                    submitted,
                    rendered,
                    failed
                );
            }
            DispatchEvent::TaskSubmitted {
                output, time_label, ..
            } if self.verbose => match time_label {
                Some(t) => tracing::info!("{}: queued {} (t = {})", self.prefix, output.display(), t),
                None => tracing::info!("{}: queued {}", self.prefix, output.display()),
            },
            DispatchEvent::TaskFinished { output, .. } if self.verbose => {
                tracing::info!("{}: saved {}", self.prefix, output.display());
            }
            _ if self.verbose => {
                tracing::info!("{}: {:?}", self.prefix, event);
            }
            _ => {}
        }
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// 创建新的事件分发器
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 添加监听器
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        let name = listener.name().to_string();
        self.listeners.write().push(listener);
        tracing::debug!("Added event listener: {}", name);
    }

    /// 添加函数式监听器
    pub fn add_fn_listener<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&DispatchEvent) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(FnListener::new(name, handler)));
    }

    /// 移除监听器
    pub fn remove_listener(&self, listener: &Arc<dyn EventListener>) {
        self.listeners.write().retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// 分发事件
    pub fn emit(&self, event: DispatchEvent) {
        let listeners = self.listeners.read();
        tracing::trace!("Emitting event: {}", event.name());
        for listener in listeners.iter() {
            listener.on_event(&event);
        }
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}
