// crates/av_io/src/table.rs

//! 数值文本表
//!
//! 按空白分隔的列读取二维数值表：
//! - `#` 之后的内容为注释
//! - 空行跳过
//! - 每行列数必须一致
//! - 单行或单列仍得到二维表

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use ndarray::Array2;

use crate::error::{IoError, IoResult};

/// 读取数值表文件
pub fn load_table(path: &Path) -> IoResult<Array2<f64>> {
    let content = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_table(&content, &path.display().to_string())?;
    tracing::debug!(
        "Loaded table {} ({}x{})",
        path.display(),
        table.nrows(),
        table.ncols()
    );
    Ok(table)
}

/// 解析数值表文本
///
/// `source` 仅用于错误信息。
pub fn parse_table(content: &str, source: &str) -> IoResult<Array2<f64>> {
    let mut values = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let start = values.len();
        for token in line.split_whitespace() {
            let v: f64 = token.parse().map_err(|_| IoError::ParseError {
                file: source.to_string(),
                line: line_no,
                message: format!("could not convert '{token}' to a number"),
            })?;
            values.push(v);
        }
        let count = values.len() - start;

        match ncols {
            None => ncols = Some(count),
            Some(n) if n != count => {
                return Err(IoError::ParseError {
                    file: source.to_string(),
                    line: line_no,
                    message: format!("expected {n} columns, found {count}"),
                });
            }
            Some(_) => {}
        }
        nrows += 1;
    }

    let ncols = ncols.unwrap_or(0);
    Array2::from_shape_vec((nrows, ncols), values).map_err(|e| IoError::ParseError {
        file: source.to_string(),
        line: 0,
        message: e.to_string(),
    })
}

/// 写出数值表（每行一行，空格分隔，科学计数法）
pub fn save_table(path: &Path, table: &Array2<f64>) -> IoResult<()> {
    let mut out = String::new();
    for row in table.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.18e}")).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    fs::write(path, out).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
