// apps/av_cli/src/main.rs

//! AmrView 命令行界面
//!
//! 把块结构 AMR 快照序列渲染为 PNG 帧，并提供数值表差分工具。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 4: Application**：
//! - 命令行参数转换为 `MovieConfig` / `DiffConfig`
//! - 工作池通过 `WorkerKind` 在运行时选择
//! - 进程工作者重新调用本程序的隐藏子命令 `render-task`

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// AmrView 块结构快照可视化工具
#[derive(Parser)]
#[command(name = "av_cli")]
#[command(author = "AmrView Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render block-structured AMR dumps to PNG frames", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 渲染快照序列
    Movie(commands::movie::MovieArgs),
    /// 比较两个数值表
    Diff(commands::diff::DiffArgs),
    /// 显示快照信息
    Info(commands::info::InfoArgs),
    /// 工作进程入口：从标准输入读取一个渲染任务
    #[command(hide = true)]
    RenderTask(commands::render_task::RenderTaskArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    // 调试渲染同时打开调试日志
    let level = match &cli.command {
        Commands::Movie(args) if args.debug => level.max(Level::DEBUG),
        _ => level,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Movie(args) => commands::movie::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::RenderTask(args) => commands::render_task::execute(args),
    }
}
