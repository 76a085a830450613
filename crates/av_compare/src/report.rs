// crates/av_compare/src/report.rs

//! 差分报告

use std::fmt;

use serde::{Deserialize, Serialize};

/// 超出容差的一个位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// 行号（从 0 开始）
    pub row: usize,
    /// 列号（从 0 开始）
    pub column: usize,
    /// 相对差
    pub value: f64,
}

/// 差分报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    /// 使用的容差
    pub tolerance: f64,
    /// 表形状 (行, 列)
    pub shape: (usize, usize),
    /// 超出容差的位置，按行主序排列
    pub diffs: Vec<DiffEntry>,
}

impl DiffReport {
    /// 是否存在差异
    pub fn has_diffs(&self) -> bool {
        !self.diffs.is_empty()
    }

    /// 差异个数
    pub fn count(&self) -> usize {
        self.diffs.len()
    }

    /// 差异位置
    pub fn locations(&self) -> Vec<(usize, usize)> {
        self.diffs.iter().map(|d| (d.row, d.column)).collect()
    }

    /// 最大相对差
    pub fn max_difference(&self) -> Option<f64> {
        self.diffs.iter().map(|d| d.value).reduce(f64::max)
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_diffs() {
            return writeln!(f, "No diffs found!");
        }
        writeln!(f, "Diffs found!")?;
        let locations: Vec<String> = self
            .diffs
            .iter()
            .map(|d| format!("({}, {})", d.row, d.column))
            .collect();
        writeln!(f, "Diff locations (row, column) = [{}]", locations.join(", "))?;
        let values: Vec<String> = self.diffs.iter().map(|d| format!("{:e}", d.value)).collect();
        writeln!(f, "Diffs = [{}]", values.join(", "))
    }
}
