// crates/av_io/src/dump/mod.rs

//! 块结构快照
//!
//! 渲染与调度只依赖 [`DumpSource`] 能力接口，不依赖任何具体文件编码。
//!
//! # 坐标框架
//!
//! 每个块在两个空间方向上各有一组面坐标（长度 = 单元数 + 1），提供四种框架：
//!
//! | 框架       | 说明                                   |
//! |------------|----------------------------------------|
//! | `Ghost`    | 含 ghost 区的全部面坐标                |
//! | `Interior` | 去掉 ghost 区后的内部面坐标            |
//! | `Exterior` | 外边界（含 ghost 区）的面坐标          |
//! | `NoGhost`  | 与不含 ghost 区的场数据配套的面坐标    |
//!
//! # 场张量
//!
//! 场按块存储，阶数取决于场的类型：
//! 标量 `(block, y, x)`、矢量 `(block, c, y, x)`、张量 `(block, c1, c2, y, x)`。

pub mod builder;
pub mod float_codec;
pub mod json;

use std::path::Path;

use ndarray::{s, Array2, ArrayD, Axis, Slice};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// 场张量（任意阶，最后两维为 y、x）
pub type FieldTensor = ArrayD<f64>;

// ============================================================
// 坐标框架
// ============================================================

/// 坐标框架
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// 含 ghost 区
    Ghost,
    /// 仅内部
    Interior,
    /// 外边界
    Exterior,
    /// 无 ghost 区
    NoGhost,
}

impl Framing {
    /// 全部框架
    pub const ALL: [Framing; 4] = [
        Framing::Ghost,
        Framing::Interior,
        Framing::Exterior,
        Framing::NoGhost,
    ];
}

/// 每块的面坐标
///
/// `x` 形状为 `(blocks, nx + 1)`，`y` 形状为 `(blocks, ny + 1)`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCoords {
    /// x 方向面坐标
    #[serde(with = "float_codec::array2")]
    pub x: Array2<f64>,
    /// y 方向面坐标
    #[serde(with = "float_codec::array2")]
    pub y: Array2<f64>,
}

impl BlockCoords {
    /// 创建坐标集
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Self {
        Self { x, y }
    }

    /// 块数
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.x.nrows()
    }

    /// 第 `block` 块的包围盒 `(x0, x1, y0, y1)`
    ///
    /// 取首尾面坐标。
    pub fn bounds(&self, block: usize) -> (f64, f64, f64, f64) {
        let xr = self.x.row(block);
        let yr = self.y.row(block);
        (xr[0], xr[xr.len() - 1], yr[0], yr[yr.len() - 1])
    }

    /// 去掉两端各 `n` 个面
    pub fn trimmed(&self, n: usize) -> Self {
        let trim = |a: &Array2<f64>| {
            let len = a.ncols();
            a.slice(s![.., n..len - n]).to_owned()
        };
        Self {
            x: trim(&self.x),
            y: trim(&self.y),
        }
    }
}

// ============================================================
// 能力接口
// ============================================================

/// 快照数据源
pub trait DumpSource {
    /// 快照来源路径
    fn path(&self) -> &Path;

    /// 已知场名
    fn variables(&self) -> Vec<&str>;

    /// 是否包含场
    fn has_field(&self, name: &str) -> bool {
        self.variables().iter().any(|v| *v == name)
    }

    /// 读取场张量
    ///
    /// `interior` 为真时去掉两空间维上的 ghost 区。
    fn field(&self, name: &str, interior: bool) -> IoResult<FieldTensor>;

    /// 指定框架的面坐标
    fn coords(&self, framing: Framing) -> BlockCoords;

    /// 块编号
    fn block_ids(&self) -> Option<&[i64]>;

    /// 快照内记录的模拟时间
    fn time(&self) -> Option<f64>;

    /// 块数
    fn num_blocks(&self) -> usize {
        self.coords(Framing::Ghost).num_blocks()
    }
}

/// 快照读取器
pub trait DumpReader: Send + Sync {
    /// 读取得到的快照类型
    type Dump: DumpSource;

    /// 打开一个快照文件
    fn open(&self, path: &Path) -> IoResult<Self::Dump>;
}

// ============================================================
// 辅助函数
// ============================================================

/// 去掉场张量最后两维两端各 `num_ghost` 个单元
pub fn strip_ghost_cells(field: &FieldTensor, num_ghost: usize, path: &Path) -> IoResult<FieldTensor> {
    if num_ghost == 0 {
        return Ok(field.clone());
    }
    let ndim = field.ndim();
    if ndim < 2 {
        return Err(IoError::malformed(path, format!("field of rank {ndim} has no spatial axes")));
    }
    for axis in [ndim - 2, ndim - 1] {
        let len = field.len_of(Axis(axis));
        if len <= 2 * num_ghost {
            return Err(IoError::malformed(
                path,
                format!("axis {axis} of length {len} cannot hold {num_ghost} ghost cells per side"),
            ));
        }
    }
    let view = field.slice_each_axis(|ax| {
        if ax.axis.index() + 2 >= ndim {
            Slice::from(num_ghost as isize..(ax.len - num_ghost) as isize)
        } else {
            Slice::from(..)
        }
    });
    Ok(view.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};
    use std::path::PathBuf;

    #[test]
    fn test_bounds() {
        let coords = BlockCoords::new(array![[0.0, 0.5, 1.0]], array![[2.0, 3.0]]);
        assert_eq!(coords.bounds(0), (0.0, 1.0, 2.0, 3.0));
        assert_eq!(coords.num_blocks(), 1);
    }

    #[test]
    fn test_trimmed() {
        let coords = BlockCoords::new(
            array![[-1.0, 0.0, 1.0, 2.0, 3.0]],
            array![[-1.0, 0.0, 1.0, 2.0]],
        );
        let inner = coords.trimmed(1);
        assert_eq!(inner.x, array![[0.0, 1.0, 2.0]]);
        assert_eq!(inner.y, array![[0.0, 1.0]]);
    }

    #[test]
    fn test_strip_ghost_cells_rank4() {
        // (block=1, comp=2, y=4, x=5)
        let data: Vec<f64> = (0..40).map(|v| v as f64).collect();
        let field = FieldTensor::from_shape_vec(IxDyn(&[1, 2, 4, 5]), data).unwrap();
        let inner = strip_ghost_cells(&field, 1, &PathBuf::from("t")).unwrap();
        assert_eq!(inner.shape(), &[1, 2, 2, 3]);
        // 第一个内部单元对应原始 (0, 0, 1, 1)
        assert_eq!(inner[[0, 0, 0, 0]], 6.0);
        assert_eq!(inner[[0, 1, 1, 2]], field[[0, 1, 2, 3]]);
    }

    #[test]
    fn test_strip_ghost_cells_too_small() {
        let field = FieldTensor::zeros(IxDyn(&[1, 2, 2]));
        assert!(strip_ghost_cells(&field, 1, &PathBuf::from("t")).is_err());
    }
}
