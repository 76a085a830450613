// crates/av_workflow/src/pool.rs

//! 渲染工作池
//!
//! 两种实现共享 [`RenderPool`] 接口：
//!
//! - [`ThreadRenderPool`]: rayon 线程池，每个任务独占一张画布
//! - [`ProcessRenderPool`]: 每个任务一个子进程，任务以 JSON 经 stdin 传入，
//!   同时存活的子进程数不超过工作者数
//!
//! 提交不等待任务完成；完成顺序不确定，每个任务写入各自预先确定的文件。

use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use av_config::WorkerKind;
use av_render::{render, RenderTask};

use crate::error::{TaskFailure, WorkflowError, WorkflowResult};

/// 单个任务的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    /// 快照序号
    pub index: usize,
    /// 输出文件
    pub output: PathBuf,
    /// 失败信息，成功时为 `None`
    pub error: Option<String>,
}

impl TaskOutcome {
    fn ok(index: usize, output: PathBuf) -> Self {
        Self {
            index,
            output,
            error: None,
        }
    }

    fn failed(index: usize, output: PathBuf, error: impl Into<String>) -> Self {
        Self {
            index,
            output,
            error: Some(error.into()),
        }
    }

    /// 是否成功
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// 转为失败记录
    pub fn into_failure(self) -> Option<TaskFailure> {
        let Self {
            index,
            output,
            error,
        } = self;
        error.map(|message| TaskFailure {
            index,
            output,
            message,
        })
    }
}

/// 渲染工作池
pub trait RenderPool {
    /// 工作池类型
    fn kind(&self) -> WorkerKind;

    /// 工作者数量
    fn workers(&self) -> usize;

    /// 提交任务，不等待完成
    fn submit(&mut self, task: RenderTask) -> WorkflowResult<()>;

    /// 非阻塞地取出已完成的任务结果
    fn poll(&mut self) -> Vec<TaskOutcome>;

    /// 等待全部已提交任务结束并取出结果
    fn drain(&mut self) -> Vec<TaskOutcome>;

    /// 尚未结束的任务数
    fn in_flight(&self) -> usize;
}

/// 在当前线程执行一个任务，panic 也记为失败
pub fn run_task(task: &RenderTask) -> TaskOutcome {
    match catch_unwind(AssertUnwindSafe(|| render(task))) {
        Ok(Ok(_)) => TaskOutcome::ok(task.index, task.output.clone()),
        Ok(Err(e)) => TaskOutcome::failed(task.index, task.output.clone(), e.to_string()),
        Err(_) => TaskOutcome::failed(task.index, task.output.clone(), "render task panicked"),
    }
}

// ============================================================
// 线程池
// ============================================================

/// rayon 线程工作池
pub struct ThreadRenderPool {
    pool: rayon::ThreadPool,
    workers: usize,
    sender: Sender<TaskOutcome>,
    receiver: Receiver<TaskOutcome>,
    pending: usize,
}

impl ThreadRenderPool {
    /// 创建 `workers` 个线程的工作池
    pub fn new(workers: usize) -> WorkflowResult<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("av-render-{i}"))
            .build()
            .map_err(|e| WorkflowError::pool(format!("cannot build thread pool: {e}")))?;
        let (sender, receiver) = channel();
        Ok(Self {
            pool,
            workers,
            sender,
            receiver,
            pending: 0,
        })
    }
}

impl RenderPool for ThreadRenderPool {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Thread
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn submit(&mut self, task: RenderTask) -> WorkflowResult<()> {
        let sender = self.sender.clone();
        self.pool.spawn(move || {
            let _ = sender.send(run_task(&task));
        });
        self.pending += 1;
        Ok(())
    }

    fn poll(&mut self) -> Vec<TaskOutcome> {
        let mut done = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            self.pending -= 1;
            done.push(outcome);
        }
        done
    }

    fn drain(&mut self) -> Vec<TaskOutcome> {
        let mut done = Vec::with_capacity(self.pending);
        while self.pending > 0 {
            match self.receiver.recv() {
                Ok(outcome) => {
                    self.pending -= 1;
                    done.push(outcome);
                }
                Err(_) => break,
            }
        }
        done
    }

    fn in_flight(&self) -> usize {
        self.pending
    }
}

impl std::fmt::Debug for ThreadRenderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadRenderPool")
            .field("workers", &self.workers)
            .field("pending", &self.pending)
            .finish()
    }
}

// ============================================================
// 进程池
// ============================================================

/// 工作进程命令行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    /// 可执行文件
    pub program: PathBuf,
    /// 参数
    pub args: Vec<String>,
}

impl WorkerCommand {
    /// 创建命令
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// 追加参数
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

struct RunningChild {
    index: usize,
    output: PathBuf,
    child: Child,
    stdin_error: Option<String>,
    stderr: Option<JoinHandle<String>>,
}

/// 在后台线程持续读取子进程 stderr，避免管道写满后子进程阻塞
fn spawn_stderr_reader(index: usize, child: &mut Child) -> Option<JoinHandle<String>> {
    let mut pipe = child.stderr.take()?;
    thread::Builder::new()
        .name(format!("av-worker-stderr-{index}"))
        .spawn(move || {
            let mut text = String::new();
            let _ = pipe.read_to_string(&mut text);
            text
        })
        .map_err(|e| tracing::warn!("cannot start stderr reader for task #{}: {}", index, e))
        .ok()
}

/// 子进程工作池
pub struct ProcessRenderPool {
    command: WorkerCommand,
    workers: usize,
    running: Vec<RunningChild>,
    finished: Vec<TaskOutcome>,
    poll_interval: Duration,
}

impl ProcessRenderPool {
    /// 创建工作池，最多 `workers` 个子进程同时存活
    pub fn new(command: WorkerCommand, workers: usize) -> Self {
        Self {
            command,
            workers: workers.max(1),
            running: Vec::new(),
            finished: Vec::new(),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// 回收已退出的子进程
    fn reap(&mut self) {
        let mut i = 0;
        while i < self.running.len() {
            match self.running[i].child.try_wait() {
                Ok(None) => i += 1,
                Ok(Some(status)) => {
                    let mut done = self.running.swap_remove(i);
                    let outcome = child_outcome(&mut done, status);
                    self.finished.push(outcome);
                }
                Err(e) => {
                    let done = self.running.swap_remove(i);
                    self.finished.push(TaskOutcome::failed(
                        done.index,
                        done.output,
                        format!("cannot wait for worker: {e}"),
                    ));
                }
            }
        }
    }

    fn wait_for_slot(&mut self) {
        loop {
            self.reap();
            if self.running.len() < self.workers {
                return;
            }
            thread::sleep(self.poll_interval);
        }
    }
}

fn child_outcome(done: &mut RunningChild, status: ExitStatus) -> TaskOutcome {
    let index = done.index;
    let output = done.output.clone();
    if status.success() {
        return TaskOutcome::ok(index, output);
    }
    let stderr = done
        .stderr
        .take()
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();
    let detail = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map(str::trim)
        .map(str::to_string)
        .or_else(|| done.stdin_error.clone())
        .unwrap_or_else(|| "no diagnostic output".to_string());
    TaskOutcome::failed(index, output, format!("worker exited with {status}: {detail}"))
}

impl RenderPool for ProcessRenderPool {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Process
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn submit(&mut self, task: RenderTask) -> WorkflowResult<()> {
        let payload = task
            .to_json()
            .map_err(|e| WorkflowError::pool(format!("cannot serialize render task: {e}")))?;

        self.wait_for_slot();

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                WorkflowError::pool(format!(
                    "cannot start worker {}: {e}",
                    self.command.program.display()
                ))
            })?;

        let stderr = spawn_stderr_reader(task.index, &mut child);

        // stdin 在此作用域结束时关闭，子进程读到 EOF
        let stdin_error = match child.stdin.take() {
            Some(mut stdin) => stdin
                .write_all(payload.as_bytes())
                .err()
                .map(|e| format!("cannot send task to worker: {e}")),
            None => Some("worker stdin unavailable".to_string()),
        };
        if let Some(err) = &stdin_error {
            tracing::warn!("{} (task #{})", err, task.index);
        }

        self.running.push(RunningChild {
            index: task.index,
            output: task.output,
            child,
            stdin_error,
            stderr,
        });
        Ok(())
    }

    fn poll(&mut self) -> Vec<TaskOutcome> {
        self.reap();
        std::mem::take(&mut self.finished)
    }

    fn drain(&mut self) -> Vec<TaskOutcome> {
        loop {
            self.reap();
            if self.running.is_empty() {
                break;
            }
            thread::sleep(self.poll_interval);
        }
        std::mem::take(&mut self.finished)
    }

    fn in_flight(&self) -> usize {
        self.running.len()
    }
}

impl Drop for ProcessRenderPool {
    fn drop(&mut self) {
        for running in &mut self.running {
            let _ = running.child.wait();
        }
    }
}

impl std::fmt::Debug for ProcessRenderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRenderPool")
            .field("command", &self.command)
            .field("workers", &self.workers)
            .field("running", &self.running.len())
            .finish()
    }
}

/// 按类型创建工作池
///
/// 进程池需要提供工作进程命令。
pub fn build_pool(
    kind: WorkerKind,
    workers: usize,
    command: Option<WorkerCommand>,
) -> WorkflowResult<Box<dyn RenderPool>> {
    match kind {
        WorkerKind::Thread => Ok(Box::new(ThreadRenderPool::new(workers)?)),
        WorkerKind::Process => {
            let command = command
                .ok_or_else(|| WorkflowError::pool("process workers need a worker command"))?;
            Ok(Box::new(ProcessRenderPool::new(command, workers)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use av_io::{BlockCoords, FieldTensor};
    use av_render::RenderStyle;
    use ndarray::{array, IxDyn};

    fn task(index: usize, dir: &std::path::Path, rank: usize) -> RenderTask {
        let mut shape = vec![1];
        shape.extend(std::iter::repeat(1).take(rank.saturating_sub(3)));
        shape.extend([2, 2]);
        let field = FieldTensor::from_elem(IxDyn(&shape), index as f64);
        let coords = BlockCoords::new(array![[0.0, 0.5, 1.0]], array![[0.0, 0.5, 1.0]]);
        let mut task = RenderTask::new(index, field, coords, dir.join(format!("t_{index:04}.png")));
        task.style = RenderStyle::default().with_size(64, 48);
        task
    }

    #[test]
    fn test_thread_pool_renders_all() {
        let dir = tempfile::tempdir().unwrap();
        let mut pool = ThreadRenderPool::new(3).unwrap();
        for i in 0..8 {
            pool.submit(task(i, dir.path(), 3)).unwrap();
        }
        let mut outcomes = pool.drain();
        assert_eq!(pool.in_flight(), 0);
        outcomes.sort_by_key(|o| o.index);
        assert_eq!(outcomes.len(), 8);
        for (i, o) in outcomes.iter().enumerate() {
            assert_eq!(o.index, i);
            assert!(o.is_ok(), "{:?}", o.error);
            assert!(o.output.exists());
        }
    }

    #[test]
    fn test_thread_pool_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut pool = ThreadRenderPool::new(2).unwrap();
        pool.submit(task(0, dir.path(), 3)).unwrap();
        pool.submit(task(1, dir.path(), 6)).unwrap();
        let outcomes = pool.drain();
        let failures: Vec<TaskFailure> = outcomes.into_iter().filter_map(TaskOutcome::into_failure).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 1);
        assert!(failures[0].message.contains("rank 6"));
        assert!(!dir.path().join("t_0001.png").exists());
    }

    #[test]
    fn test_build_pool_requires_command_for_processes() {
        assert!(build_pool(WorkerKind::Process, 2, None).is_err());
        let pool = build_pool(WorkerKind::Thread, 2, None).unwrap();
        assert_eq!(pool.kind(), WorkerKind::Thread);
        assert_eq!(pool.workers(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_pool_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let command = WorkerCommand::new("sh")
            .arg("-c")
            .arg("cat > /dev/null; echo 'bad task' >&2; exit 3");
        let mut pool = ProcessRenderPool::new(command, 2);
        for i in 0..3 {
            pool.submit(task(i, dir.path(), 3)).unwrap();
            assert!(pool.in_flight() <= 2);
        }
        let outcomes = pool.drain();
        assert_eq!(outcomes.len(), 3);
        for o in outcomes {
            let err = o.error.unwrap();
            assert!(err.contains("bad task"), "{err}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_process_pool_survives_chatty_stderr() {
        let dir = tempfile::tempdir().unwrap();
        // 远超管道缓冲区的 stderr 输出
        let command = WorkerCommand::new("sh").arg("-c").arg(
            "cat > /dev/null; yes 'progress line' | head -c 300000 >&2; echo 'last words' >&2; exit 2",
        );
        let mut pool = ProcessRenderPool::new(command, 1);
        pool.submit(task(0, dir.path(), 3)).unwrap();
        let outcomes = pool.drain();
        assert_eq!(outcomes.len(), 1);
        let err = outcomes[0].error.clone().unwrap();
        assert!(err.contains("last words"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_pool_payload_keeps_nan() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = task(0, dir.path(), 3);
        t.field[[0, 0, 1]] = f64::NAN;
        // grep 读完整个输入，找到编码后的 NaN 才以 0 退出
        let command = WorkerCommand::new("sh").arg("-c").arg("grep -c '\"NaN\"' > /dev/null");
        let mut pool = ProcessRenderPool::new(command, 1);
        pool.submit(t).unwrap();
        let outcomes = pool.drain();
        assert!(outcomes[0].is_ok(), "{:?}", outcomes[0].error);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_pool_success() {
        let dir = tempfile::tempdir().unwrap();
        let mut pool = ProcessRenderPool::new(WorkerCommand::new("sh").arg("-c").arg("cat > /dev/null"), 1);
        pool.submit(task(0, dir.path(), 3)).unwrap();
        pool.submit(task(1, dir.path(), 3)).unwrap();
        let outcomes = pool.drain();
        assert!(outcomes.iter().all(TaskOutcome::is_ok));
    }

    #[test]
    fn test_process_pool_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let mut pool = ProcessRenderPool::new(WorkerCommand::new("/nonexistent/av-worker"), 1);
        assert!(matches!(
            pool.submit(task(0, dir.path(), 3)),
            Err(WorkflowError::Pool(_))
        ));
    }
}
