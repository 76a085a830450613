// crates/av_config/src/component.rs

//! 分量选择配置
//!
//! 将矢量/张量分量请求归约为统一的 (outer, inner) 索引对：
//!
//! | 请求            | 索引对       |
//! |-----------------|--------------|
//! | 无（标量）      | `(0, 0)`     |
//! | 矢量分量 `v`    | `(0, v)`     |
//! | 张量分量 `(i,j)`| `(i, j)`     |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 分量索引对
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// 外层分量索引（仅 5 阶张量使用）
    pub outer: usize,
    /// 内层分量索引（4 阶取此索引，5 阶为第二个分量）
    pub inner: usize,
}

impl ComponentSpec {
    /// 创建索引对
    pub const fn new(outer: usize, inner: usize) -> Self {
        Self { outer, inner }
    }

    /// 标量场默认索引对
    pub const fn scalar() -> Self {
        Self::new(0, 0)
    }

    /// 矢量分量请求
    pub const fn vector(component: usize) -> Self {
        Self::new(0, component)
    }

    /// 张量分量请求
    pub const fn tensor(outer: usize, inner: usize) -> Self {
        Self::new(outer, inner)
    }

    /// 从互斥的矢量/张量请求构建
    ///
    /// 两者同时给出时返回 [`ConfigError::ConflictingComponents`]。
    pub fn from_requests(
        vector: Option<usize>,
        tensor: Option<[usize; 2]>,
    ) -> Result<Self, ConfigError> {
        match (vector, tensor) {
            (Some(vector), Some(tensor)) => {
                Err(ConfigError::ConflictingComponents { vector, tensor })
            }
            (Some(v), None) => Ok(Self::vector(v)),
            (None, Some([i, j])) => Ok(Self::tensor(i, j)),
            (None, None) => Ok(Self::scalar()),
        }
    }
}

impl std::fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.outer, self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_scalar() {
        assert_eq!(ComponentSpec::default(), ComponentSpec::scalar());
        assert_eq!(ComponentSpec::from_requests(None, None).unwrap(), ComponentSpec::new(0, 0));
    }

    #[test]
    fn test_vector_request() {
        let spec = ComponentSpec::from_requests(Some(2), None).unwrap();
        assert_eq!(spec, ComponentSpec::new(0, 2));
    }

    #[test]
    fn test_tensor_request() {
        let spec = ComponentSpec::from_requests(None, Some([1, 2])).unwrap();
        assert_eq!(spec, ComponentSpec::new(1, 2));
    }

    #[test]
    fn test_both_requests_rejected() {
        let err = ComponentSpec::from_requests(Some(0), Some([0, 0])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingComponents { vector: 0, tensor: [0, 0] }
        ));
    }
}
