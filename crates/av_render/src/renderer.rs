// crates/av_render/src/renderer.rs

//! 块结构快照渲染器
//!
//! 一次渲染调用处理一个快照：
//!
//! 1. 必要时按分量索引对归约场张量
//! 2. 掩码非有限值，统计整张快照共享的色标范围
//! 3. 逐块逐单元填充色块（按面坐标划分）
//! 4. 可选的块外边界（实线）与内部边界（虚线）
//! 5. 可选的块编号标签与时间标题
//! 6. 编码为 PNG
//!
//! 画布归单次调用所有，任何退出路径上都会被释放，
//! 因此多个渲染任务可以在不同线程或进程中并行执行。

use std::path::PathBuf;

use av_config::{ComponentSpec, ImageConfig};
use av_foundation::FiniteRange;
use av_io::{BlockCoords, FieldTensor};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, LineStyle, Viewport};
use crate::colormap::Colormap;
use crate::component::{reduce, ReducedField};
use crate::error::{RenderError, RenderResult};
use crate::font::text_height;

// ============================================================
// 样式
// ============================================================

/// 渲染样式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// 图像宽度 [px]
    #[serde(default = "default_width")]
    pub width: u32,
    /// 图像高度 [px]
    #[serde(default = "default_height")]
    pub height: u32,
    /// 四周留白 [px]
    #[serde(default = "default_margin")]
    pub margin: u32,
    /// 色表
    #[serde(default)]
    pub colormap: Colormap,
    /// 背景色
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    /// 边框颜色
    #[serde(default = "default_outline")]
    pub outline: [u8; 4],
    /// 块编号颜色
    #[serde(default = "default_label")]
    pub label: [u8; 4],
    /// 标题颜色
    #[serde(default = "default_outline")]
    pub title: [u8; 4],
    /// 标题字形放大倍数
    #[serde(default = "default_title_scale")]
    pub title_scale: u32,
    /// 块编号字形放大倍数
    #[serde(default = "default_label_scale")]
    pub label_scale: u32,
    /// 虚线实段/空段像素数
    #[serde(default = "default_dash")]
    pub dash: [u32; 2],
}

fn default_width() -> u32 { ImageConfig::default().width }
fn default_height() -> u32 { ImageConfig::default().height }
fn default_margin() -> u32 { 120 }
fn default_background() -> [u8; 4] { [255, 255, 255, 255] }
fn default_outline() -> [u8; 4] { [0, 0, 0, 255] }
fn default_label() -> [u8; 4] { [255, 255, 255, 255] }
fn default_title_scale() -> u32 { 5 }
fn default_label_scale() -> u32 { 3 }
fn default_dash() -> [u32; 2] { [12, 8] }

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin: default_margin(),
            colormap: Colormap::default(),
            background: default_background(),
            outline: default_outline(),
            label: default_label(),
            title: default_outline(),
            title_scale: default_title_scale(),
            label_scale: default_label_scale(),
            dash: default_dash(),
        }
    }
}

impl RenderStyle {
    /// 按图像配置设置尺寸
    pub fn from_image_config(image: &ImageConfig) -> Self {
        Self::default().with_size(image.width, image.height)
    }

    /// 设置尺寸，留白按高度比例缩放
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self.margin = (self.height / 12).min(self.width / 12);
        let unit = (self.height / 288).max(1);
        self.title_scale = unit;
        self.label_scale = (unit * 3 / 5).max(1);
        self
    }

    fn dashed(&self) -> LineStyle {
        LineStyle::Dashed {
            on: self.dash[0],
            off: self.dash[1],
        }
    }
}

// ============================================================
// 渲染任务
// ============================================================

/// 单个快照的渲染任务
///
/// 自包含且可序列化，可直接以 JSON 发送给工作进程。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTask {
    /// 快照在序列中的位置
    pub index: usize,
    /// 场张量（通常已归约为 3 阶），NaN 与无穷大按字符串编码
    #[serde(with = "av_io::dump::float_codec::tensor")]
    pub field: FieldTensor,
    /// 绘制用面坐标
    pub coords: BlockCoords,
    /// 输出文件
    pub output: PathBuf,
    /// 时间标签
    #[serde(default)]
    pub time_label: Option<f64>,
    /// 是否绘制块边界
    #[serde(default)]
    pub mesh: bool,
    /// 块编号
    #[serde(default)]
    pub block_ids: Option<Vec<i64>>,
    /// 内部边界面坐标（虚线）
    #[serde(default)]
    pub interior: Option<BlockCoords>,
    /// 外边界面坐标（实线），缺省取 `coords`
    #[serde(default)]
    pub exterior: Option<BlockCoords>,
    /// 分量索引对
    #[serde(default)]
    pub components: ComponentSpec,
    /// 样式
    #[serde(default)]
    pub style: RenderStyle,
}

impl RenderTask {
    /// 以最少参数创建任务
    pub fn new(index: usize, field: FieldTensor, coords: BlockCoords, output: impl Into<PathBuf>) -> Self {
        Self {
            index,
            field,
            coords,
            output: output.into(),
            time_label: None,
            mesh: false,
            block_ids: None,
            interior: None,
            exterior: None,
            components: ComponentSpec::default(),
            style: RenderStyle::default(),
        }
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// 从 JSON 反序列化
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

/// 格式化时间标签
///
/// 整数值保留一位小数（`1.0`），其余取最短表示（`0.25`）。
pub fn format_time_label(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ============================================================
// 渲染
// ============================================================

/// 渲染并写出 PNG，返回输出路径
pub fn render(task: &RenderTask) -> RenderResult<PathBuf> {
    let canvas = draw(task)?;
    canvas.save_png(&task.output)?;
    match task.time_label {
        Some(t) => tracing::debug!(
            "Saved {}s time-step to {}",
            format_time_label(t),
            task.output.display()
        ),
        None => tracing::debug!("Saved {}", task.output.display()),
    }
    Ok(task.output.clone())
}

/// 渲染到内存图像
pub fn render_image(task: &RenderTask) -> RenderResult<RgbaImage> {
    draw(task).map(Canvas::into_image)
}

fn draw(task: &RenderTask) -> RenderResult<Canvas> {
    let q = reduce(&task.field, task.components)?;
    check_coords("coords", &task.coords, &q)?;
    let exterior = task.exterior.as_ref().unwrap_or(&task.coords);
    check_blocks("exterior", exterior, q.shape()[0])?;
    if let Some(interior) = &task.interior {
        check_blocks("interior", interior, q.shape()[0])?;
    }
    if let Some(ids) = &task.block_ids {
        if ids.len() != q.shape()[0] {
            return Err(RenderError::shape_mismatch(format!(
                "{} block ids for {} blocks",
                ids.len(),
                q.shape()[0]
            )));
        }
    }

    let style = &task.style;
    let mut canvas = Canvas::new(style.width, style.height, Rgba(style.background));

    let title_band = if task.time_label.is_some() {
        text_height(style.title_scale) as f64 * 2.0
    } else {
        0.0
    };
    let margin = style.margin as f64;
    let area = (
        margin,
        margin + title_band,
        (style.width as f64 - 2.0 * margin).max(1.0),
        (style.height as f64 - 2.0 * margin - title_band).max(1.0),
    );
    let mut bounds = data_bounds(&task.coords);
    if task.mesh {
        bounds = union(bounds, data_bounds(exterior));
    }
    let viewport = Viewport::fit(bounds.unwrap_or((0.0, 1.0, 0.0, 1.0)), area);

    let range = FiniteRange::from_values(q.iter().copied());
    let outline = Rgba(style.outline);

    for b in 0..q.shape()[0] {
        if let Some(range) = &range {
            draw_block(&mut canvas, &viewport, &task.coords, &q, b, range, style.colormap);
        }

        if task.mesh {
            let (x0, x1, y0, y1) = exterior.bounds(b);
            let (px0, py0) = viewport.to_pixel(x0, y0);
            let (px1, py1) = viewport.to_pixel(x1, y1);
            canvas.rect_outline(px0, py0, px1, py1, outline, LineStyle::Solid);
            if let Some(interior) = &task.interior {
                let (x0, x1, y0, y1) = interior.bounds(b);
                let (px0, py0) = viewport.to_pixel(x0, y0);
                let (px1, py1) = viewport.to_pixel(x1, y1);
                canvas.rect_outline(px0, py0, px1, py1, outline, style.dashed());
            }
        }
    }

    // 标签最后绘制，避免被相邻块覆盖
    if let Some(ids) = &task.block_ids {
        for (b, id) in ids.iter().enumerate() {
            let (x0, x1, y0, y1) = task.coords.bounds(b);
            let (cx, cy) = viewport.to_pixel(0.5 * (x0 + x1), 0.5 * (y0 + y1));
            canvas.draw_text_centered(cx, cy, &id.to_string(), style.label_scale, Rgba(style.label));
        }
    }

    // 坐标轴边框
    if let Some((x0, x1, y0, y1)) = bounds {
        let (px0, py0) = viewport.to_pixel(x0, y0);
        let (px1, py1) = viewport.to_pixel(x1, y1);
        canvas.rect_outline(px0, py0, px1, py1, outline, LineStyle::Solid);
    }

    if let Some(t) = task.time_label {
        let title = format!("t = {} seconds", format_time_label(t));
        canvas.draw_text_centered(
            style.width as f64 / 2.0,
            margin + title_band / 2.0,
            &title,
            style.title_scale,
            Rgba(style.title),
        );
    }

    Ok(canvas)
}

fn draw_block(
    canvas: &mut Canvas,
    viewport: &Viewport,
    coords: &BlockCoords,
    q: &ReducedField,
    b: usize,
    range: &FiniteRange,
    colormap: Colormap,
) {
    let xf = coords.x.row(b);
    let yf = coords.y.row(b);
    let (ny, nx) = (q.shape()[1], q.shape()[2]);
    for j in 0..ny {
        for i in 0..nx {
            let v = q[[b, j, i]];
            if !v.is_finite() {
                continue;
            }
            let [r, g, bl] = colormap.sample(range.normalize(v));
            let (px0, py0) = viewport.to_pixel(xf[i], yf[j]);
            let (px1, py1) = viewport.to_pixel(xf[i + 1], yf[j + 1]);
            canvas.fill_rect(px0, py0, px1, py1, Rgba([r, g, bl, 255]));
        }
    }
}

fn check_blocks(name: &str, coords: &BlockCoords, blocks: usize) -> RenderResult<()> {
    if coords.x.nrows() != blocks || coords.y.nrows() != blocks {
        return Err(RenderError::shape_mismatch(format!(
            "{name} coordinates cover {}x{} blocks, field has {blocks}",
            coords.x.nrows(),
            coords.y.nrows()
        )));
    }
    if coords.x.ncols() < 2 || coords.y.ncols() < 2 {
        return Err(RenderError::shape_mismatch(format!(
            "{name} coordinates need at least two faces per axis"
        )));
    }
    Ok(())
}

fn check_coords(name: &str, coords: &BlockCoords, q: &ReducedField) -> RenderResult<()> {
    let (blocks, ny, nx) = q.dim();
    check_blocks(name, coords, blocks)?;
    if coords.x.ncols() != nx + 1 || coords.y.ncols() != ny + 1 {
        return Err(RenderError::shape_mismatch(format!(
            "{name} faces ({}, {}) do not bound a {ny}x{nx} field",
            coords.y.ncols(),
            coords.x.ncols()
        )));
    }
    Ok(())
}

fn data_bounds(coords: &BlockCoords) -> Option<(f64, f64, f64, f64)> {
    let x = FiniteRange::from_values(coords.x.iter().copied())?;
    let y = FiniteRange::from_values(coords.y.iter().copied())?;
    Some((x.min, x.max, y.min, y.max))
}

fn union(
    a: Option<(f64, f64, f64, f64)>,
    b: Option<(f64, f64, f64, f64)>,
) -> Option<(f64, f64, f64, f64)> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3))),
        (a, None) => a,
        (None, b) => b,
    }
}
