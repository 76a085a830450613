// apps/av_cli/src/commands/info.rs

//! 快照信息命令
//!
//! 列出快照的时间、块数、ghost 层数以及各场的形状与类型。

use anyhow::{Context, Result};
use av_foundation::FiniteRange;
use av_io::{DumpSource, Framing, JsonDump};
use av_render::FieldKind;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 快照文件
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// 同时显示各场的有限值范围
    #[arg(long)]
    pub ranges: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== AmrView 快照信息 ===");

    for (i, path) in args.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let dump = JsonDump::open(path).with_context(|| format!("无法读取 {}", path.display()))?;
        print_dump(&dump, args.ranges)?;
    }
    Ok(())
}

fn print_dump(dump: &JsonDump, ranges: bool) -> Result<()> {
    println!("=== {} ===", dump.path().display());
    match dump.time() {
        Some(t) => println!("时间: {t}"),
        None => println!("时间: -"),
    }
    println!("块数: {}", dump.num_blocks());
    println!("ghost 层数: {}", dump.num_ghost());

    let interior = dump.coords(Framing::Interior);
    if interior.num_blocks() > 0 {
        let (x0, x1, y0, y1) = (0..interior.num_blocks())
            .map(|b| interior.bounds(b))
            .fold(
                (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
                |acc, b| (acc.0.min(b.0), acc.1.max(b.1), acc.2.min(b.2), acc.3.max(b.3)),
            );
        println!("计算域: x ∈ [{x0}, {x1}], y ∈ [{y0}, {y1}]");
    }

    println!("场:");
    for name in dump.variables() {
        let field = dump.field(name, false)?;
        let kind = FieldKind::classify(field.ndim());
        let mut line = format!("  {name:<16} {:<12} {:?}", kind.name(), field.shape());
        if ranges {
            match FiniteRange::from_values(field.iter().copied()) {
                Some(r) => line.push_str(&format!("  [{:e}, {:e}]", r.min, r.max)),
                None => line.push_str("  [-]"),
            }
        }
        println!("{line}");
    }
    Ok(())
}
