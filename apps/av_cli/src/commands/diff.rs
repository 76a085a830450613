// apps/av_cli/src/commands/diff.rs

//! 数值表差分命令
//!
//! 发现差异时以退出码 1 结束，便于在回归脚本中使用。

use anyhow::{Context, Result};
use av_compare::compare_files;
use av_config::{DiffConfig, ReportFormat};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 报告格式
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// 纯文本
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// 差分参数
#[derive(Args)]
pub struct DiffArgs {
    /// 第一个表文件
    pub file1: PathBuf,

    /// 第二个表文件
    pub file2: PathBuf,

    /// 相对容差
    #[arg(short, long, default_value = "1e-8")]
    pub tolerance: f64,

    /// 报告格式
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

impl From<DiffArgs> for DiffConfig {
    fn from(args: DiffArgs) -> Self {
        let mut config = DiffConfig::new(args.file1, args.file2).with_tolerance(args.tolerance);
        config.format = args.format.into();
        config
    }
}

/// 执行差分命令
pub fn execute(args: DiffArgs) -> Result<()> {
    let config = DiffConfig::from(args);
    let report = compare_files(&config).with_context(|| {
        format!(
            "比较失败: {} vs {}",
            config.file1.display(),
            config.file2.display()
        )
    })?;

    match config.format {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    if report.has_diffs() {
        tracing::debug!(
            "{} entries differ, max relative difference {:e}",
            report.count(),
            report.max_difference().unwrap_or(0.0)
        );
        std::process::exit(1);
    }
    Ok(())
}
