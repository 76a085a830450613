// crates/av_render/src/colormap.rs

//! 色表
//!
//! 连续色表由 `[0, 1]` 上严格递增的色标组成，采样时在相邻色标间线性插值。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 色标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// 归一化位置
    pub t: f64,
    /// sRGB 颜色
    pub rgb: [u8; 3],
}

const fn stop(t: f64, rgb: [u8; 3]) -> ColorStop {
    ColorStop { t, rgb }
}

/// viridis 采样点（每 1/16 一个）
const VIRIDIS: [ColorStop; 17] = [
    stop(0.0000, [68, 1, 84]),
    stop(0.0625, [72, 26, 108]),
    stop(0.1250, [71, 47, 125]),
    stop(0.1875, [65, 68, 135]),
    stop(0.2500, [59, 82, 139]),
    stop(0.3125, [52, 96, 141]),
    stop(0.3750, [44, 113, 142]),
    stop(0.4375, [39, 127, 142]),
    stop(0.5000, [33, 145, 140]),
    stop(0.5625, [31, 158, 137]),
    stop(0.6250, [39, 173, 129]),
    stop(0.6875, [62, 188, 116]),
    stop(0.7500, [94, 201, 98]),
    stop(0.8125, [132, 212, 75]),
    stop(0.8750, [170, 220, 50]),
    stop(0.9375, [213, 226, 26]),
    stop(1.0000, [253, 231, 37]),
];

const MAGMA: [ColorStop; 9] = [
    stop(0.000, [0, 0, 4]),
    stop(0.125, [28, 16, 68]),
    stop(0.250, [79, 18, 123]),
    stop(0.375, [129, 37, 129]),
    stop(0.500, [181, 54, 122]),
    stop(0.625, [229, 80, 100]),
    stop(0.750, [251, 135, 97]),
    stop(0.875, [254, 194, 135]),
    stop(1.000, [252, 253, 191]),
];

const GRAY: [ColorStop; 2] = [stop(0.0, [0, 0, 0]), stop(1.0, [255, 255, 255])];

/// 内置色表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    /// viridis（默认）
    #[default]
    Viridis,
    /// magma
    Magma,
    /// 灰度
    Gray,
}

impl Colormap {
    /// 全部色表
    pub const ALL: [Colormap; 3] = [Colormap::Viridis, Colormap::Magma, Colormap::Gray];

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::Magma => "magma",
            Self::Gray => "gray",
        }
    }

    /// 色标
    pub fn stops(&self) -> &'static [ColorStop] {
        match self {
            Self::Viridis => &VIRIDIS,
            Self::Magma => &MAGMA,
            Self::Gray => &GRAY,
        }
    }

    /// 在归一化位置 `t` 处采样，`t` 被截断到 `[0, 1]`
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let i = stops
            .windows(2)
            .position(|w| t <= w[1].t)
            .unwrap_or(stops.len() - 2);
        let (a, b) = (stops[i], stops[i + 1]);
        let f = if b.t > a.t { (t - a.t) / (b.t - a.t) } else { 0.0 };
        let lerp = |x: u8, y: u8| (x as f64 + f * (y as f64 - x as f64)).round() as u8;
        [
            lerp(a.rgb[0], b.rgb[0]),
            lerp(a.rgb[1], b.rgb[1]),
            lerp(a.rgb[2], b.rgb[2]),
        ]
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viridis" => Ok(Self::Viridis),
            "magma" => Ok(Self::Magma),
            "gray" | "grey" => Ok(Self::Gray),
            other => Err(format!("unknown colormap '{other}', expected viridis, magma or gray")),
        }
    }
}
