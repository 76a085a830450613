// crates/av_foundation/src/float.rs

//! 浮点数工具
//!
//! 提供掩码感知的值域统计和按小数位舍入。
//!
//! # 示例
//!
//! ```
//! use av_foundation::float::{round_to, FiniteRange};
//!
//! let range = FiniteRange::from_values([1.0, f64::NAN, -2.0]).unwrap();
//! assert_eq!(range.min, -2.0);
//! assert_eq!(round_to(0.1 + 0.2, 2), 0.3);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// 数值常量
// ============================================================================

/// 相对差分母下限，避免两值均为零时除零
pub const REL_DIFF_EPSILON: f64 = 1e-20;

/// 浮点数相等性比较的默认容差
pub const DEFAULT_EPSILON: f64 = 1e-12;

// ============================================================================
// 舍入
// ============================================================================

/// 舍入到指定小数位（半数远离零）
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// 近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

// ============================================================================
// 有限值域
// ============================================================================

/// 忽略 NaN/Inf 后的取值范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiniteRange {
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
}

impl FiniteRange {
    /// 从值序列统计范围，没有任何有限值时返回 `None`
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut range: Option<Self> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                None => Self { min: v, max: v },
                Some(r) => Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            });
        }
        range
    }

    /// 值域跨度
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// 归一化到 [0, 1]，超出范围的值被截断
    ///
    /// 退化范围（min == max）统一映射为 0。
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}
