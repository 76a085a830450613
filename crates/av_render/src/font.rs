// crates/av_render/src/font.rs

//! 5×7 点阵字体
//!
//! 覆盖数字、符号 `- + . =`、空格以及标题与 `nan`/`inf` 需要的小写字母。
//! 每行 5 位，最高位（bit 4）在最左侧。未收录字符按空白处理。

/// 字形宽度（像素，未缩放）
pub const GLYPH_WIDTH: u32 = 5;
/// 字形高度（像素，未缩放）
pub const GLYPH_HEIGHT: u32 = 7;
/// 字间距（像素，未缩放）
pub const GLYPH_SPACING: u32 = 1;

/// 字形点阵
pub type Glyph = [u8; 7];

const BLANK: Glyph = [0; 7];

/// 查找字形
pub fn glyph(c: char) -> Option<&'static Glyph> {
    let g: &'static Glyph = match c {
        '0' => &[0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => &[0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => &[0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => &[0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => &[0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => &[0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => &[0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => &[0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => &[0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => &[0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => &[0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => &[0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '.' => &[0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '=' => &[0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        ' ' => &BLANK,
        'a' => &[0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'c' => &[0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'd' => &[0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        'e' => &[0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'f' => &[0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'i' => &[0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'n' => &[0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        'o' => &[0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        's' => &[0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        't' => &[0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        _ => return None,
    };
    Some(g)
}

/// 字形或空白
#[inline]
pub fn glyph_or_blank(c: char) -> &'static Glyph {
    glyph(c).unwrap_or(&BLANK)
}

/// 文本像素宽度
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING) * scale
}

/// 文本像素高度
#[inline]
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}
