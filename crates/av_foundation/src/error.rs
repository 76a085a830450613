// crates/av_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `AvError` 枚举和 `AvResult` 类型别名。各层 crate 定义自己的错误枚举，
//! 并实现到 `AvError` 的转换，以便在应用层统一上报。
//!
//! # 示例
//!
//! ```
//! use av_foundation::error::{AvError, AvResult};
//!
//! fn read_config() -> AvResult<()> {
//!     Err(AvError::config("vector and tensor components both set"))
//! }
//! assert!(read_config().is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type AvResult<T> = Result<T, AvError>;

/// AmrView 错误类型
#[derive(Error, Debug)]
pub enum AvError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO error: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件解析错误
    #[error("parse error in {file} line {line}: {message}")]
    ParseError {
        /// 文件路径
        file: PathBuf,
        /// 行号（从 1 开始，0 表示未知）
        line: usize,
        /// 错误信息
        message: String,
    },

    // ========================================================================
    // 数据相关错误
    // ========================================================================
    /// 无效输入
    #[error("invalid input: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    // ========================================================================
    // 配置与运行时错误
    // ========================================================================
    /// 配置错误
    #[error("configuration error: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 序列化错误
    #[error("serialization error: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// 资源未找到
    #[error("not found: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 内部错误
    #[error("internal error: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl AvError {
    /// 创建带源的 IO 错误
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for AvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================
