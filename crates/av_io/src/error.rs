// crates/av_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，所有错误最终可转换为 `AvError`。

use std::path::PathBuf;

use av_foundation::AvError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 读取失败
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入失败
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 快照内容无法解码
    #[error("failed to decode dump {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// 快照结构不一致
    #[error("malformed dump {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// 场不存在
    #[error("no such field \"{name}\" in {path}")]
    FieldNotFound { name: String, path: PathBuf },

    /// 文本表解析错误
    #[error("parse error in {file}:{line} - {message}")]
    ParseError {
        file: String,
        line: usize,
        message: String,
    },

    /// 基础层错误转换
    #[error("foundation error: {0}")]
    Foundation(#[from] AvError),
}

impl IoError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<IoError> for AvError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Read { path, source } => {
                AvError::io_with_source(format!("failed to read {}", path.display()), source)
            }
            IoError::Write { path, source } => {
                AvError::io_with_source(format!("failed to write {}", path.display()), source)
            }
            IoError::Decode { path, message } | IoError::Malformed { path, message } => {
                AvError::parse(path, 0, message)
            }
            IoError::FieldNotFound { name, path } => {
                AvError::not_found(format!("field \"{name}\" in {}", path.display()))
            }
            IoError::ParseError { file, line, message } => AvError::parse(file, line, message),
            IoError::Foundation(e) => e,
        }
    }
}
