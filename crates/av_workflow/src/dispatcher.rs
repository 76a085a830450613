// crates/av_workflow/src/dispatcher.rs

//! 快照序列调度器
//!
//! 按输入顺序逐个读取快照，选择分量，计算输出路径与时间标签，
//! 为每个快照向工作池提交一个渲染任务。
//!
//! # 状态机
//!
//! ```text
//! Idle ──► Reading ──► FieldCheck ──► Reducing ──► Submitting ──► Idle
//!             │            │              │
//!             ▼            ▼              ▼
//!          (错误)       Halted         (错误)
//! ```
//!
//! - 读取失败与阶数错误：停止提交，等待已提交任务结束后返回错误
//! - 场缺失：记录错误并中止序列，已提交任务照常完成，调度本身视为成功
//! - 所有已提交任务结束后才报告完成，任务失败在此时统一汇总
//!
//! 调度器单线程运行，是时间标签累加器的唯一写者。

use std::path::PathBuf;
use std::sync::Arc;

use av_config::{ComponentSpec, MovieConfig};
use av_io::{DumpReader, DumpSource, Framing};
use av_render::{reduce, RenderStyle, RenderTask};
use serde::{Deserialize, Serialize};

use crate::error::{TaskFailure, WorkflowError, WorkflowResult};
use crate::events::{DispatchEvent, EventDispatcher};
use crate::naming::{output_path, prepare_output_directory};
use crate::pool::{RenderPool, TaskOutcome};
use crate::time_label::TimeLabel;

/// 调度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchState {
    /// 等待下一个快照
    Idle,
    /// 读取快照
    Reading,
    /// 检查场是否存在
    FieldCheck,
    /// 分量选择
    Reducing,
    /// 提交渲染任务
    Submitting,
    /// 场缺失，序列中止
    Halted,
    /// 输入已全部处理
    Finished,
}

/// 序列中止信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaltInfo {
    /// 中止时的快照序号
    pub index: usize,
    /// 中止时的快照路径
    pub path: PathBuf,
    /// 缺失的场
    pub field: String,
}

/// 调度报告
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchReport {
    /// 已提交任务的输出路径（提交顺序）
    pub submitted: Vec<PathBuf>,
    /// 成功写出的图像（按序号排序）
    pub rendered: Vec<PathBuf>,
    /// 失败的任务
    pub failures: Vec<TaskFailure>,
    /// 中止信息
    pub halted: Option<HaltInfo>,
}

impl DispatchReport {
    /// 是否因场缺失中止
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }
}

/// 快照序列调度器
pub struct Dispatcher<R: DumpReader> {
    config: MovieConfig,
    components: ComponentSpec,
    reader: R,
    style: RenderStyle,
    events: Arc<EventDispatcher>,
}

impl<R: DumpReader> Dispatcher<R> {
    /// 创建调度器，配置无效时直接返回错误
    pub fn new(config: MovieConfig, reader: R) -> WorkflowResult<Self> {
        config.validate()?;
        let components = config.components()?;
        let style = RenderStyle::from_image_config(&config.image);
        Ok(Self {
            config,
            components,
            reader,
            style,
            events: Arc::new(EventDispatcher::new()),
        })
    }

    /// 覆盖渲染样式
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// 使用共享的事件分发器
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    /// 事件分发器
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// 配置
    pub fn config(&self) -> &MovieConfig {
        &self.config
    }

    /// 执行调度
    pub fn run(&self, pool: &mut dyn RenderPool) -> WorkflowResult<DispatchReport> {
        prepare_output_directory(&self.config.output_directory)?;

        let files = &self.config.files;
        tracing::info!("Total files to process: {}", files.len());
        tracing::debug!(
            "Rendering \"{}\" component {} with {} {} workers",
            self.config.field,
            self.components,
            pool.workers(),
            pool.kind()
        );

        let mut report = DispatchReport::default();
        let mut labels = TimeLabel::new(self.config.time_step);
        let mut fatal: Option<WorkflowError> = None;
        let mut state = DispatchState::Idle;

        for (index, path) in files.iter().enumerate() {
            self.collect(pool.poll(), &mut report);

            state = self.transition(state, DispatchState::Reading);
            let dump = match self.reader.open(path) {
                Ok(dump) => dump,
                Err(e) => {
                    tracing::error!("Cannot read {}: {}", path.display(), e);
                    fatal = Some(e.into());
                    break;
                }
            };
            self.events.emit(DispatchEvent::DumpRead {
                index,
                path: path.clone(),
            });

            state = self.transition(state, DispatchState::FieldCheck);
            if !dump.has_field(&self.config.field) {
                tracing::error!(
                    "No such field \"{}\" in {}. This will lead to stop further processing",
                    self.config.field,
                    path.display()
                );
                let halt = HaltInfo {
                    index,
                    path: path.clone(),
                    field: self.config.field.clone(),
                };
                self.events.emit(DispatchEvent::Halted {
                    index,
                    path: halt.path.clone(),
                    field: halt.field.clone(),
                });
                report.halted = Some(halt);
                state = self.transition(state, DispatchState::Halted);
                break;
            }

            tracing::debug!("Submitting {}", path.display());
            state = self.transition(state, DispatchState::Reducing);
            let task = match self.build_task(index, &dump, labels.current()) {
                Ok(task) => task,
                Err(e) => {
                    tracing::error!("Cannot prepare {}: {}", path.display(), e);
                    fatal = Some(e);
                    break;
                }
            };

            state = self.transition(state, DispatchState::Submitting);
            let output = task.output.clone();
            let time_label = task.time_label;
            if let Err(e) = pool.submit(task) {
                fatal = Some(e);
                break;
            }
            self.events.emit(DispatchEvent::TaskSubmitted {
                index,
                output: output.clone(),
                time_label,
            });
            report.submitted.push(output);

            labels.advance();
            state = self.transition(state, DispatchState::Idle);
        }

        if fatal.is_none() && state == DispatchState::Idle {
            self.transition(state, DispatchState::Finished);
        }
        tracing::info!("All files are sent to the processor");

        let outcomes = pool.drain();
        self.collect(outcomes, &mut report);
        report.rendered.sort();
        report.failures.sort_by_key(|f| f.index);
        self.events.emit(DispatchEvent::Drained {
            submitted: report.submitted.len(),
            rendered: report.rendered.len(),
            failed: report.failures.len(),
        });

        if let Some(e) = fatal {
            return Err(e);
        }
        if !report.failures.is_empty() {
            return Err(WorkflowError::RenderFailures {
                submitted: report.submitted.len(),
                failures: report.failures,
            });
        }

        tracing::info!("All done");
        Ok(report)
    }

    fn transition(&self, from: DispatchState, to: DispatchState) -> DispatchState {
        tracing::trace!("dispatch state {:?} -> {:?}", from, to);
        to
    }

    fn collect(&self, outcomes: Vec<TaskOutcome>, report: &mut DispatchReport) {
        for outcome in outcomes {
            match &outcome.error {
                None => {
                    self.events.emit(DispatchEvent::TaskFinished {
                        index: outcome.index,
                        output: outcome.output.clone(),
                    });
                    report.rendered.push(outcome.output);
                }
                Some(error) => {
                    tracing::error!("Rendering {} failed: {}", outcome.output.display(), error);
                    self.events.emit(DispatchEvent::TaskFailed {
                        index: outcome.index,
                        output: outcome.output.clone(),
                        error: error.clone(),
                    });
                    report.failures.extend(outcome.into_failure());
                }
            }
        }
    }

    /// 由一个快照构建渲染任务
    ///
    /// 调试模式使用含 ghost 区的坐标和数据，并附带内部/外边界与块编号；
    /// 否则使用无 ghost 框架和内部数据。
    fn build_task(
        &self,
        index: usize,
        dump: &R::Dump,
        time_label: Option<f64>,
    ) -> WorkflowResult<RenderTask> {
        let debug = self.config.debug;
        let field = dump.field(&self.config.field, !debug)?;
        let reduced = reduce(&field, self.components)?;

        let output = output_path(&self.config.output_directory, &self.config.prefix, index);
        let coords = if debug {
            dump.coords(Framing::Ghost)
        } else {
            dump.coords(Framing::NoGhost)
        };

        let mut task = RenderTask::new(index, reduced.into_dyn(), coords, output);
        task.time_label = time_label;
        task.mesh = self.config.draws_mesh();
        task.components = self.components;
        task.style = self.style.clone();
        if debug {
            task.block_ids = dump.block_ids().map(<[i64]>::to_vec);
            task.interior = Some(dump.coords(Framing::Interior));
            task.exterior = Some(dump.coords(Framing::Exterior));
        }
        Ok(task)
    }
}

impl<R: DumpReader> std::fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("field", &self.config.field)
            .field("files", &self.config.files.len())
            .field("components", &self.components)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use av_config::WorkerKind;
    use av_io::{DumpBuilder, JsonDumpReader};
    use parking_lot::Mutex;
    use std::path::Path;

    use crate::pool::ThreadRenderPool;

    fn write_dumps(dir: &Path, n: usize) -> Vec<PathBuf> {
        (0..n)
            .map(|i| {
                let path = dir.join(format!("dump.{i:05}.json"));
                DumpBuilder::new(2, 1, 3)
                    .with_ghost(1)
                    .scalar("density", move |x, y| x + y + i as f64)
                    .build()
                    .save(&path)
                    .unwrap();
                path
            })
            .collect()
    }

    fn config(dir: &Path, files: Vec<PathBuf>) -> MovieConfig {
        MovieConfig::new("density", files)
            .with_workers(2, WorkerKind::Thread)
            .with_output(dir.join("frames"), "run")
            .with_image_size(96, 72)
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), write_dumps(dir.path(), 1));
        cfg.vector_component = Some(0);
        cfg.tensor_component = Some([0, 0]);
        assert!(matches!(
            Dispatcher::new(cfg, JsonDumpReader),
            Err(WorkflowError::Config(_))
        ));
        assert!(!dir.path().join("frames").exists());
    }

    #[test]
    fn test_time_labels_in_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), write_dumps(dir.path(), 4)).with_time_step(0.25);
        let dispatcher = Dispatcher::new(cfg, JsonDumpReader).unwrap();

        let labels = Arc::new(Mutex::new(Vec::new()));
        let sink = labels.clone();
        dispatcher.events().add_fn_listener("labels", move |e| {
            if let DispatchEvent::TaskSubmitted { time_label, .. } = e {
                sink.lock().push(*time_label);
            }
        });

        let mut pool = ThreadRenderPool::new(2).unwrap();
        let report = dispatcher.run(&mut pool).unwrap();
        assert_eq!(report.rendered.len(), 4);
        assert_eq!(
            *labels.lock(),
            vec![Some(0.0), Some(0.25), Some(0.5), Some(0.75)]
        );
    }

    #[test]
    fn test_zero_time_step_gives_no_labels() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), write_dumps(dir.path(), 2)).with_time_step(0.0);
        let dispatcher = Dispatcher::new(cfg, JsonDumpReader).unwrap();
        let labels = Arc::new(Mutex::new(Vec::new()));
        let sink = labels.clone();
        dispatcher.events().add_fn_listener("labels", move |e| {
            if let DispatchEvent::TaskSubmitted { time_label, .. } = e {
                sink.lock().push(*time_label);
            }
        });
        dispatcher.run(&mut ThreadRenderPool::new(1).unwrap()).unwrap();
        assert_eq!(*labels.lock(), vec![None, None]);
    }

    #[test]
    fn test_debug_mode_renders() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), write_dumps(dir.path(), 1));
        cfg.debug = true;
        let dispatcher = Dispatcher::new(cfg, JsonDumpReader).unwrap();
        let report = dispatcher.run(&mut ThreadRenderPool::new(1).unwrap()).unwrap();
        assert_eq!(report.rendered, vec![dir.path().join("frames").join("run_0000.png")]);
    }

    fn black_pixels(task: &RenderTask) -> usize {
        av_render::render_image(task)
            .unwrap()
            .pixels()
            .filter(|p| p.0 == [0, 0, 0, 255])
            .count()
    }

    #[test]
    fn test_plain_frames_outline_blocks_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_dumps(dir.path(), 1);
        let dump = JsonDumpReader.open(&files[0]).unwrap();

        let dispatcher = Dispatcher::new(config(dir.path(), files.clone()), JsonDumpReader).unwrap();
        let outlined = dispatcher.build_task(0, &dump, None).unwrap();
        assert!(outlined.mesh);
        assert_eq!(outlined.coords, dump.coords(Framing::NoGhost));
        assert_eq!(outlined.field.shape(), &[2, 3, 3]);
        assert!(outlined.block_ids.is_none());
        assert!(outlined.interior.is_none());
        assert!(outlined.exterior.is_none());

        let mut cfg = config(dir.path(), files);
        cfg.mesh = false;
        let bare = Dispatcher::new(cfg, JsonDumpReader)
            .unwrap()
            .build_task(0, &dump, None)
            .unwrap();
        assert!(!bare.mesh);
        // 两块共享的边只在绘制轮廓时出现
        assert!(black_pixels(&outlined) > black_pixels(&bare));
    }

    #[test]
    fn test_debug_frames_carry_ghost_overlays() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_dumps(dir.path(), 1);
        let dump = JsonDumpReader.open(&files[0]).unwrap();

        let mut cfg = config(dir.path(), files);
        cfg.debug = true;
        cfg.mesh = false;
        let task = Dispatcher::new(cfg, JsonDumpReader)
            .unwrap()
            .build_task(0, &dump, Some(0.5))
            .unwrap();
        assert!(task.mesh);
        assert_eq!(task.field.shape(), &[2, 5, 5]);
        assert_eq!(task.coords, dump.coords(Framing::Ghost));
        assert_eq!(task.block_ids, Some(vec![0, 1]));
        assert_eq!(task.interior, Some(dump.coords(Framing::Interior)));
        assert_eq!(task.exterior, Some(dump.coords(Framing::Exterior)));
        assert_eq!(task.time_label, Some(0.5));
    }

    #[test]
    fn test_unreadable_dump_is_fatal_after_drain() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_dumps(dir.path(), 2);
        files.insert(1, dir.path().join("missing.json"));
        let dispatcher = Dispatcher::new(config(dir.path(), files), JsonDumpReader).unwrap();
        let err = dispatcher.run(&mut ThreadRenderPool::new(2).unwrap()).unwrap_err();
        assert!(matches!(err, WorkflowError::Dump(_)));
        // 第 0 个任务在报错前已完成
        assert!(dir.path().join("frames").join("run_0000.png").exists());
        assert!(!dir.path().join("frames").join("run_0002.png").exists());
    }
}
