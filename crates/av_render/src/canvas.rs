// crates/av_render/src/canvas.rs

//! 栅格画布
//!
//! 在 `RgbaImage` 上绘制填充矩形、实线/虚线矩形框与点阵文本，
//! 并提供数据坐标到像素坐标的等比例映射 [`Viewport`]。

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{RenderError, RenderResult};
use crate::font::{glyph_or_blank, text_height, text_width, GLYPH_SPACING, GLYPH_WIDTH};

/// 线型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// 实线
    Solid,
    /// 虚线（实段像素数，空段像素数）
    Dashed { on: u32, off: u32 },
}

impl LineStyle {
    /// 第 `step` 个像素是否绘制
    #[inline]
    fn paints(&self, step: u32) -> bool {
        match *self {
            Self::Solid => true,
            Self::Dashed { on, off } => {
                let period = (on + off).max(1);
                step % period < on
            }
        }
    }
}

/// 栅格画布
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// 创建填充背景色的画布
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    /// 宽度
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// 高度
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 读取像素
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.width() && y < self.height()).then(|| *self.image.get_pixel(x, y))
    }

    /// 写像素，越界忽略
    #[inline]
    pub fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u64) < self.width() as u64 && (y as u64) < self.height() as u64 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// 填充像素坐标矩形
    ///
    /// 端点顺序任意，边界四舍五入到像素；不足一个像素的矩形至少占一个像素。
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>) {
        let (ix0, ix1) = pixel_span(x0, x1);
        let (iy0, iy1) = pixel_span(y0, y1);
        let ix0 = ix0.max(0);
        let iy0 = iy0.max(0);
        let ix1 = ix1.min(self.width() as i64);
        let iy1 = iy1.min(self.height() as i64);
        for y in iy0..iy1 {
            for x in ix0..ix1 {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    /// 水平线段
    pub fn hline(&mut self, x0: f64, x1: f64, y: f64, color: Rgba<u8>, style: LineStyle) {
        let (a, b) = pixel_span(x0, x1);
        let y = y.round() as i64;
        // 裁剪到画布，虚线相位仍从线段起点算起
        for x in a.max(-1)..=b.min(self.width() as i64) {
            if style.paints(x.wrapping_sub(a) as u32) {
                self.put(x, y, color);
            }
        }
    }

    /// 竖直线段
    pub fn vline(&mut self, x: f64, y0: f64, y1: f64, color: Rgba<u8>, style: LineStyle) {
        let (a, b) = pixel_span(y0, y1);
        let x = x.round() as i64;
        for y in a.max(-1)..=b.min(self.height() as i64) {
            if style.paints(y.wrapping_sub(a) as u32) {
                self.put(x, y, color);
            }
        }
    }

    /// 矩形边框
    pub fn rect_outline(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>, style: LineStyle) {
        self.hline(x0, x1, y0, color, style);
        self.hline(x0, x1, y1, color, style);
        self.vline(x0, y0, y1, color, style);
        self.vline(x1, y0, y1, color, style);
    }

    /// 以 `(cx, cy)` 为中心绘制文本
    pub fn draw_text_centered(&mut self, cx: f64, cy: f64, text: &str, scale: u32, color: Rgba<u8>) {
        let scale = scale.max(1);
        let left = (cx - text_width(text, scale) as f64 / 2.0).round() as i64;
        let top = (cy - text_height(scale) as f64 / 2.0).round() as i64;
        let advance = ((GLYPH_WIDTH + GLYPH_SPACING) * scale) as i64;

        for (k, c) in text.chars().enumerate() {
            let gx = left + k as i64 * advance;
            for (row, bits) in glyph_or_blank(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = gx + (col * scale) as i64;
                    let py = top + (row as u32 * scale) as i64;
                    for dy in 0..scale as i64 {
                        for dx in 0..scale as i64 {
                            self.put(px + dx, py + dy, color);
                        }
                    }
                }
            }
        }
    }

    /// 借出底层图像
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// 取出底层图像
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// 编码为 PNG 写入文件
    pub fn save_png(&self, path: &Path) -> RenderResult<()> {
        let file = File::create(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.image.write_to(&mut writer, ImageFormat::Png)?;
        Ok(())
    }
}

/// 将实数区间转为半开像素区间 `[a, b)`，至少含一个像素
fn pixel_span(a: f64, b: f64) -> (i64, i64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let lo = lo.round() as i64;
    let hi = (hi.round() as i64).max(lo.saturating_add(1));
    (lo, hi)
}

// ============================================================
// 视口
// ============================================================

/// 数据坐标到像素坐标的等比例映射
///
/// 数据 y 轴向上，像素 y 轴向下。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    x_min: f64,
    y_min: f64,
    scale: f64,
    left: f64,
    bottom: f64,
}

impl Viewport {
    /// 把数据范围 `(x0, x1, y0, y1)` 等比例居中放入像素区域
    ///
    /// `area = (left, top, width, height)`。退化范围按单位长度处理。
    pub fn fit(bounds: (f64, f64, f64, f64), area: (f64, f64, f64, f64)) -> Self {
        let (x0, x1, y0, y1) = bounds;
        let (left, top, width, height) = area;
        let dx = if x1 > x0 { x1 - x0 } else { 1.0 };
        let dy = if y1 > y0 { y1 - y0 } else { 1.0 };
        let scale = (width / dx).min(height / dy);
        let pad_x = (width - dx * scale) / 2.0;
        let pad_y = (height - dy * scale) / 2.0;
        Self {
            x_min: x0,
            y_min: y0,
            scale,
            left: left + pad_x,
            bottom: top + height - pad_y,
        }
    }

    /// 数据坐标转像素坐标
    #[inline]
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.left + (x - self.x_min) * self.scale,
            self.bottom - (y - self.y_min) * self.scale,
        )
    }

    /// 每数据单位的像素数
    pub fn scale(&self) -> f64 {
        self.scale
    }
}
