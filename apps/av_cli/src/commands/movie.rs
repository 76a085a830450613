// apps/av_cli/src/commands/movie.rs

//! 快照动画渲染命令
//!
//! 按顺序读取快照，把选定场（及分量）渲染为 `{prefix}_{index:04}.png`。

use anyhow::{bail, Context, Result};
use av_config::{MovieConfig, WorkerKind};
use av_io::JsonDumpReader;
use av_render::{Colormap, RenderStyle};
use av_workflow::{build_pool, Dispatcher, LoggingListener, WorkerCommand};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 渲染参数
#[derive(Args)]
pub struct MovieArgs {
    /// 要绘制的场名
    pub field: Option<String>,

    /// 按顺序排列的快照文件
    pub files: Vec<PathBuf>,

    /// 从 JSON 配置文件加载（命令行参数优先）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 把最终生效的配置写入 JSON 文件
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// 矢量分量索引
    #[arg(long, conflicts_with = "tensor_component")]
    pub vector_component: Option<usize>,

    /// 张量分量索引对
    #[arg(long, num_args = 2, value_names = ["I", "J"])]
    pub tensor_component: Option<Vec<usize>>,

    /// 并行工作者数量 [默认 10]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// 工作池类型 (process, thread) [默认 process]
    #[arg(long = "worker-type")]
    pub worker_type: Option<WorkerKind>,

    /// 每个快照的时间步长 [s]，0 关闭时间标签 [默认 1.0]
    #[arg(long)]
    pub time_step: Option<f64>,

    /// 输出目录 [默认 .]
    #[arg(short = 'd', long)]
    pub output_directory: Option<PathBuf>,

    /// 输出文件名前缀 [默认 default_run]
    #[arg(long)]
    pub prefix: Option<String>,

    /// 调试模式：含 ghost 区、块轮廓与块编号
    #[arg(long)]
    pub debug: bool,

    /// 非调试模式下不绘制块边界
    #[arg(long)]
    pub no_mesh: bool,

    /// 图像宽度 [px]
    #[arg(long)]
    pub width: Option<u32>,

    /// 图像高度 [px]
    #[arg(long)]
    pub height: Option<u32>,

    /// 色表 (viridis, magma, gray)
    #[arg(long, default_value = "viridis")]
    pub colormap: Colormap,
}

impl MovieArgs {
    /// 合并配置文件与命令行参数
    pub fn into_config(self) -> Result<MovieConfig> {
        let mut config = match &self.config {
            Some(path) => MovieConfig::from_file(path)
                .with_context(|| format!("加载配置失败: {}", path.display()))?,
            None => {
                let Some(field) = self.field.clone() else {
                    bail!("缺少场名：请提供 FIELD 参数或 --config");
                };
                MovieConfig::new(field, Vec::new())
            }
        };

        if let Some(field) = self.field {
            config.field = field;
        }
        if !self.files.is_empty() {
            config.files = self.files;
        }
        if let Some(v) = self.vector_component {
            config.vector_component = Some(v);
            config.tensor_component = None;
        }
        if let Some(pair) = self.tensor_component {
            config.tensor_component = Some([pair[0], pair[1]]);
            config.vector_component = None;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(kind) = self.worker_type {
            config.worker_kind = kind;
        }
        if let Some(dt) = self.time_step {
            config.time_step = dt;
        }
        if let Some(dir) = self.output_directory {
            config.output_directory = dir;
        }
        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        config.debug |= self.debug;
        if self.no_mesh {
            config.mesh = false;
        }
        if let Some(width) = self.width {
            config.image.width = width;
        }
        if let Some(height) = self.height {
            config.image.height = height;
        }

        config.validate().context("配置无效")?;
        Ok(config)
    }
}

/// 执行渲染命令
pub fn execute(args: MovieArgs) -> Result<()> {
    let colormap = args.colormap;
    let save_config = args.save_config.clone();
    let config = args.into_config()?;

    if let Some(path) = save_config {
        config
            .save_to_file(&path)
            .with_context(|| format!("保存配置失败: {}", path.display()))?;
        info!("配置已保存: {}", path.display());
    }

    let worker_command = if config.worker_kind.is_process() {
        let exe = std::env::current_exe().context("无法定位当前可执行文件")?;
        Some(
            WorkerCommand::new(exe)
                .arg("--log-level")
                .arg("warn")
                .arg("render-task"),
        )
    } else {
        None
    };
    let mut pool = build_pool(config.worker_kind, config.workers, worker_command)?;

    let style = RenderStyle {
        colormap,
        ..RenderStyle::from_image_config(&config.image)
    };
    let dispatcher = Dispatcher::new(config, JsonDumpReader)?.with_style(style);
    dispatcher
        .events()
        .add_listener(Arc::new(LoggingListener::new("movie")));

    let report = dispatcher.run(pool.as_mut())?;

    if let Some(halt) = &report.halted {
        warn!(
            "序列在第 {} 个快照 ({}) 中止：缺少场 \"{}\"",
            halt.index,
            halt.path.display(),
            halt.field
        );
    }
    info!(
        "共写出 {} 帧到 {}",
        report.rendered.len(),
        dispatcher.config().output_directory.display()
    );

    Ok(())
}
