// crates/av_workflow/src/time_label.rs

//! 时间标签累加器
//!
//! 第 n 个提交的快照得到 `round(n·Δ, 2)`；Δ 为 0 时不产生标签。
//! 由计数器直接计算，不累积舍入误差。

use av_foundation::round_to;

/// 标签保留的小数位
pub const LABEL_DECIMALS: u32 = 2;

/// 时间标签累加器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeLabel {
    step: f64,
    count: u64,
}

impl TimeLabel {
    /// 以每快照步长创建
    pub fn new(step: f64) -> Self {
        Self { step, count: 0 }
    }

    /// 是否产生标签
    pub fn enabled(&self) -> bool {
        self.step != 0.0
    }

    /// 当前标签
    ///
    /// 取 `round(n·Δ, 2)`，n 为计数器；不对每步的累加和先行舍入。
    /// 例如 Δ = 0.333 时第 2 步为 0.67，逐步舍入再相加会得到 0.66。
    pub fn current(&self) -> Option<f64> {
        self.enabled()
            .then(|| round_to(self.count as f64 * self.step, LABEL_DECIMALS))
    }

    /// 前进一步
    pub fn advance(&mut self) {
        if self.enabled() {
            self.count += 1;
        }
    }

    /// 已前进的步数
    pub fn steps(&self) -> u64 {
        self.count
    }
}
