// crates/av_config/src/movie_config.rs

//! MovieConfig - 快照动画渲染配置
//!
//! 描述一次批量渲染所需的全部参数：目标场、输入文件序列、分量选择、
//! 工作池、时间标签步长以及输出命名。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::component::ComponentSpec;
use crate::error::ConfigError;
use crate::worker_kind::WorkerKind;

/// 快照动画渲染配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieConfig {
    /// 要绘制的场名
    pub field: String,

    /// 按顺序排列的输入快照文件
    pub files: Vec<PathBuf>,

    /// 矢量分量索引（与 `tensor_component` 互斥）
    #[serde(default)]
    pub vector_component: Option<usize>,

    /// 张量分量索引对（与 `vector_component` 互斥）
    #[serde(default)]
    pub tensor_component: Option<[usize; 2]>,

    /// 并行工作者数量
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// 工作池类型
    #[serde(default)]
    pub worker_kind: WorkerKind,

    /// 每个快照的时间步长 [s]，0 表示不显示时间标签
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// 输出目录
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// 输出文件名前缀
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// 调试模式：含 ghost 区坐标、网格轮廓与块编号
    #[serde(default)]
    pub debug: bool,

    /// 绘制块外边界（默认开启；关闭后非调试模式只画色块）
    #[serde(default = "default_mesh")]
    pub mesh: bool,

    /// 输出图像尺寸
    #[serde(default)]
    pub image: ImageConfig,
}

fn default_workers() -> usize { 10 }
fn default_time_step() -> f64 { 1.0 }
fn default_output_directory() -> PathBuf { PathBuf::from(".") }
fn default_prefix() -> String { "default_run".to_string() }
fn default_mesh() -> bool { true }

/// 图像尺寸配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// 宽度 [px]
    #[serde(default = "default_width")]
    pub width: u32,
    /// 高度 [px]
    #[serde(default = "default_height")]
    pub height: u32,
}

// 6.4 x 4.8 英寸 @ 300 dpi
fn default_width() -> u32 { 1920 }
fn default_height() -> u32 { 1440 }

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl MovieConfig {
    /// 以默认参数创建配置
    pub fn new(field: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            field: field.into(),
            files,
            vector_component: None,
            tensor_component: None,
            workers: default_workers(),
            worker_kind: WorkerKind::default(),
            time_step: default_time_step(),
            output_directory: default_output_directory(),
            prefix: default_prefix(),
            debug: false,
            mesh: default_mesh(),
            image: ImageConfig::default(),
        }
    }

    /// 设置工作池
    pub fn with_workers(mut self, workers: usize, kind: WorkerKind) -> Self {
        self.workers = workers;
        self.worker_kind = kind;
        self
    }

    /// 设置输出目录与前缀
    pub fn with_output(mut self, directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        self.output_directory = directory.into();
        self.prefix = prefix.into();
        self
    }

    /// 设置时间步长
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// 设置图像尺寸
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image = ImageConfig { width, height };
        self
    }

    /// 分量索引对
    pub fn components(&self) -> Result<ComponentSpec, ConfigError> {
        ComponentSpec::from_requests(self.vector_component, self.tensor_component)
    }

    /// 是否显示时间标签
    #[inline]
    pub fn time_labels_enabled(&self) -> bool {
        self.time_step != 0.0
    }

    /// 是否绘制块轮廓
    #[inline]
    pub fn draws_mesh(&self) -> bool {
        self.debug || self.mesh
    }

    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: MovieConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.trim().is_empty() {
            return Err(ConfigError::Missing("field".to_string()));
        }

        if self.files.is_empty() {
            return Err(ConfigError::Missing("files".to_string()));
        }

        self.components()?;

        if self.workers == 0 {
            return Err(ConfigError::invalid("workers", self.workers, "must be at least 1"));
        }

        if !self.time_step.is_finite() || self.time_step < 0.0 {
            return Err(ConfigError::invalid(
                "time_step",
                self.time_step,
                "must be finite and non-negative",
            ));
        }

        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::invalid(
                "image",
                format!("{}x{}", self.image.width, self.image.height),
                "dimensions must be positive",
            ));
        }

        Ok(())
    }
}
