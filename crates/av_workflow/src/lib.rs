// crates/av_workflow/src/lib.rs

//! AmrView 工作流模块
//!
//! 把一串快照文件调度为并行渲染任务。
//!
//! # 模块结构
//!
//! - [`dispatcher`]: 快照序列调度器
//! - [`pool`]: 线程/进程渲染工作池
//! - [`events`]: 事件系统
//! - [`naming`]: 输出命名与输出目录
//! - [`time_label`]: 时间标签累加器
//! - [`error`]: 工作流错误类型
//!
//! # 示例
//!
//! ```rust,ignore
//! use av_workflow::{Dispatcher, ThreadRenderPool};
//! use av_io::JsonDumpReader;
//!
//! let config = MovieConfig::new("density", files).with_workers(4, WorkerKind::Thread);
//! let dispatcher = Dispatcher::new(config, JsonDumpReader)?;
//! let report = dispatcher.run(&mut ThreadRenderPool::new(4)?)?;
//! ```

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod naming;
pub mod pool;
pub mod time_label;

// 重导出核心类型
pub use dispatcher::{DispatchReport, DispatchState, Dispatcher, HaltInfo};
pub use error::{TaskFailure, WorkflowError, WorkflowResult};
pub use events::{DispatchEvent, EventDispatcher, EventListener, FnListener, LoggingListener};
pub use naming::{output_file_name, output_path, prepare_output_directory};
pub use pool::{
    build_pool, run_task, ProcessRenderPool, RenderPool, TaskOutcome, ThreadRenderPool,
    WorkerCommand,
};
pub use time_label::TimeLabel;
