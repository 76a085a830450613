// crates/av_compare/src/metric.rs

//! 对称相对差
//!
//! `d(a, b) = 2·|a − b| / (a + b + ε)`，`ε = 1e-20` 防止两值均为零时除零。
//! 分母不取绝对值，符号相反的数据可能得到负值或极大值。

use av_foundation::float::REL_DIFF_EPSILON;
use ndarray::{Array2, Zip};

use crate::error::{CompareError, CompareResult};

/// 两个标量的相对差
#[inline]
pub fn relative_difference(a: f64, b: f64) -> f64 {
    2.0 * (a - b).abs() / (a + b + REL_DIFF_EPSILON)
}

/// 逐元素相对差，两表形状必须一致
pub fn relative_differences(a: &Array2<f64>, b: &Array2<f64>) -> CompareResult<Array2<f64>> {
    if a.dim() != b.dim() {
        return Err(CompareError::ShapeMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(Zip::from(a).and(b).map_collect(|&x, &y| relative_difference(x, y)))
}
