// crates/av_render/src/lib.rs

//! AmrView 渲染层
//!
//! 把块结构快照的一个场分量绘制为一张 PNG 图像。
//!
//! # 模块
//!
//! - [`component`]: 分量选择，把 3~5 阶场张量归约为每块二维标量场
//! - [`renderer`]: 渲染任务与栅格化
//! - [`canvas`]: 画布与视口
//! - [`colormap`]: 内置色表
//! - [`font`]: 5×7 点阵字体
//! - [`error`]: 渲染错误类型
//!
//! # 示例
//!
//! ```rust,ignore
//! use av_render::{reduce, render, RenderTask};
//!
//! let q = reduce(&field, ComponentSpec::vector(1))?;
//! let mut task = RenderTask::new(0, q.into_dyn(), coords, "out/run_0000.png");
//! task.time_label = Some(0.0);
//! render(&task)?;
//! ```

#![warn(clippy::all)]

pub mod canvas;
pub mod colormap;
pub mod component;
pub mod error;
pub mod font;
pub mod renderer;

pub use colormap::Colormap;
pub use component::{reduce, FieldKind, ReducedField};
pub use error::{RenderError, RenderResult};
pub use renderer::{format_time_label, render, render_image, RenderStyle, RenderTask};
