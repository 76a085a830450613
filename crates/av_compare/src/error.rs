// crates/av_compare/src/error.rs

//! 差分错误类型

use av_config::ConfigError;
use av_foundation::AvError;
use av_io::IoError;
use thiserror::Error;

/// 差分结果类型
pub type CompareResult<T> = Result<T, CompareError>;

/// 差分错误
#[derive(Error, Debug)]
pub enum CompareError {
    /// 两表形状不同
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    /// 读取失败
    #[error(transparent)]
    Io(#[from] IoError),

    /// 配置无效
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 报告序列化失败
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<CompareError> for AvError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::ShapeMismatch { .. } => AvError::invalid_input(err.to_string()),
            CompareError::Io(e) => e.into(),
            CompareError::Config(e) => e.into(),
            CompareError::Serialize(e) => AvError::serialization(e.to_string()),
        }
    }
}
