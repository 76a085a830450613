// crates/av_compare/src/lib.rs

//! AmrView 数值差分
//!
//! 比较两份形状相同的数值表（例如两个求解器的历史输出），
//! 报告相对差严格大于容差的位置。输入不会被修改。
//!
//! ```
//! use av_compare::compare;
//! use ndarray::array;
//!
//! let a = array![[1.0]];
//! let b = array![[1.0002]];
//! assert!(compare(&a, &b, 1e-4).unwrap().has_diffs());
//! assert!(!compare(&a, &b, 2e-4).unwrap().has_diffs());
//! ```

pub mod error;
pub mod metric;
pub mod report;

use av_config::DiffConfig;
use av_io::load_table;
use ndarray::Array2;

pub use error::{CompareError, CompareResult};
pub use metric::{relative_difference, relative_differences};
pub use report::{DiffEntry, DiffReport};

/// 比较两张表
///
/// 相对差为 NaN 的位置不计为差异。
pub fn compare(a: &Array2<f64>, b: &Array2<f64>, tolerance: f64) -> CompareResult<DiffReport> {
    let diffs = relative_differences(a, b)?;
    let entries = diffs
        .indexed_iter()
        .filter(|&(_, &d)| d > tolerance)
        .map(|((row, column), &value)| DiffEntry { row, column, value })
        .collect();
    Ok(DiffReport {
        tolerance,
        shape: a.dim(),
        diffs: entries,
    })
}

/// 按配置读取两个表文件并比较
pub fn compare_files(config: &DiffConfig) -> CompareResult<DiffReport> {
    config.validate()?;
    let a = load_table(&config.file1)?;
    let b = load_table(&config.file2)?;
    let report = compare(&a, &b, config.tolerance)?;
    tracing::debug!(
        "Compared {} and {}: {} of {} entries above {}",
        config.file1.display(),
        config.file2.display(),
        report.count(),
        a.len(),
        config.tolerance
    );
    Ok(report)
}
