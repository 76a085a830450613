// crates/av_config/src/error.rs

//! 配置层错误类型

use av_foundation::AvError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("parse error: {0}")]
    Parse(String),

    /// 无效值
    #[error("invalid value for '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("missing configuration: {0}")]
    Missing(String),

    /// 矢量分量与张量分量同时指定
    #[error("only one of vector component ({vector}) and tensor component ({tensor:?}) may be set")]
    ConflictingComponents {
        /// 矢量分量请求
        vector: usize,
        /// 张量分量请求
        tensor: [usize; 2],
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl ToString, reason: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ConfigError> for AvError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => AvError::io_with_source("failed to access configuration", e),
            other => AvError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "workers".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn test_conflicting_components_display() {
        let err = ConfigError::ConflictingComponents {
            vector: 1,
            tensor: [0, 2],
        };
        let msg = err.to_string();
        assert!(msg.contains("vector component (1)"));
        assert!(msg.contains("[0, 2]"));
    }

    #[test]
    fn test_into_foundation_error() {
        let err: AvError = ConfigError::Missing("field".into()).into();
        assert!(matches!(err, AvError::Config { .. }));
    }
}
