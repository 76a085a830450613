// crates/av_config/src/diff_config.rs

//! DiffConfig - 数值表差分配置

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// 差分报告输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// 纯文本
    #[default]
    Text,
    /// JSON
    Json,
}

/// 数值表差分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// 第一个表文件
    pub file1: PathBuf,
    /// 第二个表文件
    pub file2: PathBuf,
    /// 相对容差
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// 报告格式
    #[serde(default)]
    pub format: ReportFormat,
}

fn default_tolerance() -> f64 { 1e-8 }

impl DiffConfig {
    /// 以默认容差创建配置
    pub fn new(file1: impl Into<PathBuf>, file2: impl Into<PathBuf>) -> Self {
        Self {
            file1: file1.into(),
            file2: file2.into(),
            tolerance: default_tolerance(),
            format: ReportFormat::default(),
        }
    }

    /// 设置容差
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "tolerance",
                self.tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        let c = DiffConfig::new("a.hst", "b.hst");
        assert_eq!(c.tolerance, 1e-8);
        assert_eq!(c.format, ReportFormat::Text);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(DiffConfig::new("a", "b").with_tolerance(-1.0).validate().is_err());
        assert!(DiffConfig::new("a", "b").with_tolerance(f64::NAN).validate().is_err());
    }
}
