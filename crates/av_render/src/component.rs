// crates/av_render/src/component.rs

//! 分量选择
//!
//! 把按块存储的多维场张量归约为每块一张二维标量场 `(block, y, x)`：
//!
//! | 阶数 | 布局                         | 归约                        |
//! |------|------------------------------|-----------------------------|
//! | 3    | `(block, y, x)`              | 原样返回                    |
//! | 4    | `(block, c, y, x)`           | 轴 1 取 `inner`             |
//! | 5    | `(block, c1, c2, y, x)`      | 轴 1 取 `outer`，轴 2 取 `inner` |
//! | 其他 | -                            | [`RenderError::UnsupportedRank`] |

use av_config::ComponentSpec;
use av_io::FieldTensor;
use ndarray::{Array3, ArrayViewD, Axis, Ix3};

use crate::error::{RenderError, RenderResult};

/// 每块二维标量场 `(block, y, x)`
pub type ReducedField = Array3<f64>;

/// 场类型（由阶数决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 3 阶标量场
    Scalar,
    /// 4 阶矢量场
    Vector,
    /// 5 阶张量场
    Tensor,
    /// 不支持的阶数
    Unsupported(usize),
}

impl FieldKind {
    /// 按阶数分类
    pub fn classify(rank: usize) -> Self {
        match rank {
            3 => Self::Scalar,
            4 => Self::Vector,
            5 => Self::Tensor,
            other => Self::Unsupported(other),
        }
    }

    /// 是否可归约
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Tensor => "tensor",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

fn select(view: ArrayViewD<'_, f64>, axis: usize, index: usize) -> RenderResult<ArrayViewD<'_, f64>> {
    let len = view.len_of(Axis(axis));
    if index >= len {
        return Err(RenderError::ComponentOutOfRange { axis, index, len });
    }
    Ok(view.index_axis_move(Axis(axis), index))
}

/// 按分量索引对归约场张量
pub fn reduce(field: &FieldTensor, spec: ComponentSpec) -> RenderResult<ReducedField> {
    let view = field.view();
    let reduced = match FieldKind::classify(field.ndim()) {
        FieldKind::Scalar => view,
        FieldKind::Vector => select(view, 1, spec.inner)?,
        FieldKind::Tensor => {
            let outer = select(view, 1, spec.outer)?;
            select(outer, 1, spec.inner)?
        }
        FieldKind::Unsupported(rank) => return Err(RenderError::UnsupportedRank { rank }),
    };
    reduced
        .to_owned()
        .into_dimensionality::<Ix3>()
        .map_err(|e| RenderError::shape_mismatch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn ramp(shape: &[usize]) -> FieldTensor {
        let n: usize = shape.iter().product();
        FieldTensor::from_shape_vec(IxDyn(shape), (0..n).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(FieldKind::classify(3), FieldKind::Scalar);
        assert_eq!(FieldKind::classify(4), FieldKind::Vector);
        assert_eq!(FieldKind::classify(5), FieldKind::Tensor);
        assert_eq!(FieldKind::classify(6), FieldKind::Unsupported(6));
        assert!(!FieldKind::classify(2).is_supported());
    }

    #[test]
    fn test_rank3_identity() {
        let field = ramp(&[2, 3, 4]);
        let out = reduce(&field, ComponentSpec::tensor(1, 1)).unwrap();
        assert_eq!(out.shape(), &[2, 3, 4]);
        assert_eq!(out.as_slice().unwrap(), field.as_slice().unwrap());
    }

    #[test]
    fn test_rank4_selects_inner() {
        let field = ramp(&[2, 3, 2, 2]);
        let out = reduce(&field, ComponentSpec::vector(2)).unwrap();
        assert_eq!(out.shape(), &[2, 2, 2]);
        for b in 0..2 {
            for j in 0..2 {
                for i in 0..2 {
                    assert_eq!(out[[b, j, i]], field[[b, 2, j, i]]);
                }
            }
        }
    }

    #[test]
    fn test_rank5_selects_pair() {
        let field = ramp(&[2, 3, 3, 2, 2]);
        let out = reduce(&field, ComponentSpec::tensor(2, 1)).unwrap();
        assert_eq!(out.shape(), &[2, 2, 2]);
        assert_eq!(out[[1, 1, 0]], field[[1, 2, 1, 1, 0]]);
    }

    #[test]
    fn test_rank6_rejected() {
        let field = FieldTensor::zeros(IxDyn(&[1, 1, 1, 1, 2, 2]));
        let err = reduce(&field, ComponentSpec::scalar()).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedRank { rank: 6 }));
    }

    #[test]
    fn test_rank2_rejected() {
        let field = FieldTensor::zeros(IxDyn(&[2, 2]));
        assert!(reduce(&field, ComponentSpec::scalar()).unwrap_err().is_unsupported_rank());
    }

    #[test]
    fn test_component_out_of_range() {
        let field = ramp(&[1, 2, 2, 2]);
        let err = reduce(&field, ComponentSpec::vector(5)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ComponentOutOfRange { axis: 1, index: 5, len: 2 }
        ));
    }
}
