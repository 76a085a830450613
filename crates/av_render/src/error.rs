// crates/av_render/src/error.rs

//! 渲染错误类型

use std::path::PathBuf;

use av_foundation::AvError;
use thiserror::Error;

/// 渲染结果类型
pub type RenderResult<T> = Result<T, RenderError>;

/// 渲染错误
#[derive(Error, Debug)]
pub enum RenderError {
    /// 场张量阶数不受支持（只处理 3~5 阶）
    #[error("unsupported field rank {rank}: expected 3 (scalar), 4 (vector) or 5 (tensor)")]
    UnsupportedRank { rank: usize },

    /// 分量索引越界
    #[error("component index {index} out of range on axis {axis} of length {len}")]
    ComponentOutOfRange { axis: usize, index: usize, len: usize },

    /// 坐标与场形状不一致
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// 图像编码失败
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// 文件系统错误
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// 形状不一致
    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::ShapeMismatch(message.into())
    }

    /// 是否为阶数错误
    pub fn is_unsupported_rank(&self) -> bool {
        matches!(self, Self::UnsupportedRank { .. })
    }
}

impl From<RenderError> for AvError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnsupportedRank { .. } | RenderError::ComponentOutOfRange { .. } => {
                AvError::invalid_input(err.to_string())
            }
            RenderError::ShapeMismatch(message) => AvError::invalid_input(message),
            RenderError::Image(e) => AvError::serialization(e.to_string()),
            RenderError::Io { path, source } => {
                AvError::io_with_source(format!("failed to write {}", path.display()), source)
            }
        }
    }
}
