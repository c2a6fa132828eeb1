//! Text measurement and rasterization.
//!
//! A [`Face`] turns a string into a [`GlyphRun`]: the advance width the
//! layout code reasons about, plus an 8-bit coverage mask positioned
//! relative to the pen origin on the alphabetic baseline. Measurement and
//! rasterization walk the same pen arithmetic, so a run drawn at a size
//! always occupies exactly the width `measure` reported for it.

use fontdue::Font;

/// Horizontal shear applied per unit of height above the baseline (~12°).
const ITALIC_SKEW: f32 = 0.21;

/// Built-in face metrics, as fractions of the font size.
const BLOCK_ADVANCE: f32 = 0.6;
const BLOCK_NARROW_ADVANCE: f32 = 0.3;
const BLOCK_WIDE_ADVANCE: f32 = 0.8;
const BLOCK_CAP_HEIGHT: f32 = 0.72;
const BLOCK_SIDE_BEARING: f32 = 0.08;

pub enum Face {
    Outline(Box<Font>),
    /// Deterministic fallback: every visible glyph is a solid cap-height bar.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub letter_spacing: f32,
    pub italic: bool,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            letter_spacing: 0.0,
            italic: false,
        }
    }

    pub fn with_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Pen start for a run of `width` anchored at `x`.
    pub fn start_x(self, x: f32, width: f32) -> f32 {
        match self {
            Self::Left => x,
            Self::Center => x - width / 2.0,
            Self::Right => x - width,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlyphRun {
    /// Advance width, letter spacing included (canvas `measureText` semantics).
    pub width: f32,
    /// Mask offset from the pen start.
    pub left: i32,
    /// Mask offset from the baseline; negative is above it.
    pub top: i32,
    pub mask_width: u32,
    pub mask_height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphRun {
    pub fn is_blank(&self) -> bool {
        self.mask_width == 0 || self.mask_height == 0
    }
}

struct GlyphMask {
    x: i32,
    y: i32,
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

impl Face {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Block)
    }

    pub fn measure(&self, text: &str, style: TextStyle) -> f32 {
        let mut pen = 0.0_f32;
        self.walk(text, style, |_, _, advance| pen += advance);
        pen
    }

    pub fn layout(&self, text: &str, style: TextStyle) -> GlyphRun {
        let mut masks = Vec::new();
        let mut pen = 0.0_f32;
        self.walk(text, style, |ch, kern_pen, advance| {
            if let Some(mask) = self.rasterize_glyph(ch, kern_pen, style.size) {
                masks.push(mask);
            }
            pen += advance;
        });
        merge_masks(&masks, pen, if style.italic { ITALIC_SKEW } else { 0.0 })
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        match self {
            Self::Outline(font) => ch.is_whitespace() || font.lookup_glyph_index(ch) != 0,
            Self::Block => true,
        }
    }

    /// Calls `visit(ch, glyph_pen_x, advance_including_kern_and_spacing)` per character.
    fn walk(&self, text: &str, style: TextStyle, mut visit: impl FnMut(char, f32, f32)) {
        let mut pen = 0.0_f32;
        let mut previous: Option<char> = None;
        for ch in text.chars() {
            let kern = match (self, previous) {
                (Self::Outline(font), Some(prev)) => {
                    font.horizontal_kern(prev, ch, style.size).unwrap_or(0.0)
                }
                _ => 0.0,
            };
            let glyph_x = pen + kern;
            let advance = kern + self.advance(ch, style.size) + style.letter_spacing;
            visit(ch, glyph_x, advance);
            pen += advance;
            previous = Some(ch);
        }
    }

    fn advance(&self, ch: char, size: f32) -> f32 {
        match self {
            Self::Outline(font) => font.metrics(ch, size).advance_width,
            Self::Block => block_advance(ch) * size,
        }
    }

    fn rasterize_glyph(&self, ch: char, pen: f32, size: f32) -> Option<GlyphMask> {
        match self {
            Self::Outline(font) => {
                let (metrics, bitmap) = font.rasterize(ch, size);
                if metrics.width == 0 || metrics.height == 0 {
                    return None;
                }
                Some(GlyphMask {
                    x: (pen + metrics.xmin as f32).round() as i32,
                    y: -(metrics.height as i32 + metrics.ymin),
                    width: metrics.width,
                    height: metrics.height,
                    coverage: bitmap,
                })
            }
            Self::Block => block_glyph(ch, pen, size),
        }
    }
}

fn block_advance(ch: char) -> f32 {
    match ch {
        ' ' | '\u{a0}' => BLOCK_NARROW_ADVANCE,
        'I' | 'i' | 'l' | '1' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => BLOCK_NARROW_ADVANCE,
        'M' | 'W' | 'm' | 'w' => BLOCK_WIDE_ADVANCE,
        _ => BLOCK_ADVANCE,
    }
}

fn block_glyph(ch: char, pen: f32, size: f32) -> Option<GlyphMask> {
    if ch.is_whitespace() || size <= 0.0 {
        return None;
    }
    let advance = block_advance(ch) * size;
    let x0 = pen + advance * BLOCK_SIDE_BEARING;
    let x1 = pen + advance * (1.0 - BLOCK_SIDE_BEARING);
    let y0 = -BLOCK_CAP_HEIGHT * size;
    let y1 = 0.0_f32;

    let left = x0.floor() as i32;
    let top = y0.floor() as i32;
    let width = (x1.ceil() as i32 - left).max(0) as usize;
    let height = (y1.ceil() as i32 - top).max(0) as usize;
    if width == 0 || height == 0 {
        return None;
    }

    let span = |lo: f32, hi: f32, pixel: i32| {
        let start = lo.max(pixel as f32);
        let end = hi.min(pixel as f32 + 1.0);
        (end - start).clamp(0.0, 1.0)
    };

    let mut coverage = vec![0_u8; width * height];
    for row in 0..height {
        let vertical = span(y0, y1, top + row as i32);
        for col in 0..width {
            let horizontal = span(x0, x1, left + col as i32);
            coverage[row * width + col] = (horizontal * vertical * 255.0).round() as u8;
        }
    }

    Some(GlyphMask {
        x: left,
        y: top,
        width,
        height,
        coverage,
    })
}

/// Union of per-glyph masks into one run mask; overlapping pixels keep the max.
fn merge_masks(masks: &[GlyphMask], width: f32, skew: f32) -> GlyphRun {
    let shift = |row_from_baseline: i32| (-(row_from_baseline as f32 + 0.5) * skew).round() as i32;

    let mut bounds: Option<(i32, i32, i32, i32)> = None;
    for mask in masks {
        let top = mask.y;
        let bottom = mask.y + mask.height as i32;
        let shift_top = shift(top);
        let shift_bottom = shift(bottom - 1);
        let left = mask.x + shift_top.min(shift_bottom);
        let right = mask.x + mask.width as i32 + shift_top.max(shift_bottom);
        bounds = Some(match bounds {
            None => (left, top, right, bottom),
            Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
        });
    }

    let Some((left, top, right, bottom)) = bounds else {
        return GlyphRun {
            width,
            ..GlyphRun::default()
        };
    };

    let mask_width = (right - left).max(0) as u32;
    let mask_height = (bottom - top).max(0) as u32;
    let mut coverage = vec![0_u8; mask_width as usize * mask_height as usize];

    for mask in masks {
        for row in 0..mask.height {
            let y = mask.y + row as i32;
            let dy = (y - top) as usize;
            let dx0 = mask.x + shift(y) - left;
            for col in 0..mask.width {
                let value = mask.coverage[row * mask.width + col];
                if value == 0 {
                    continue;
                }
                let dx = (dx0 + col as i32) as usize;
                let index = dy * mask_width as usize + dx;
                coverage[index] = coverage[index].max(value);
            }
        }
    }

    GlyphRun {
        width,
        left,
        top,
        mask_width,
        mask_height,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_measure_is_linear_in_size() {
        let face = Face::Block;
        let at_100 = face.measure("ARSENAL", TextStyle::new(100.0));
        let at_50 = face.measure("ARSENAL", TextStyle::new(50.0));
        assert!((at_100 - 2.0 * at_50).abs() < 1e-3);
        // A R S E N A L: all regular advance.
        assert!((at_100 - 7.0 * 60.0).abs() < 1e-3);
    }

    #[test]
    fn letter_spacing_follows_every_character() {
        let face = Face::Block;
        let plain = face.measure("AB", TextStyle::new(10.0));
        let spaced = face.measure("AB", TextStyle::new(10.0).with_spacing(6.0));
        assert!((spaced - plain - 12.0).abs() < 1e-4);
    }

    #[test]
    fn layout_width_matches_measure() {
        let face = Face::Block;
        let style = TextStyle::new(48.0).with_spacing(6.0);
        let run = face.layout("PREMIER LEAGUE", style);
        assert_eq!(run.width, face.measure("PREMIER LEAGUE", style));
        assert!(!run.is_blank());
        assert!(run.top < 0, "glyphs sit above the baseline");
        assert_eq!(run.coverage.len(), (run.mask_width * run.mask_height) as usize);
    }

    #[test]
    fn whitespace_only_text_has_advance_but_no_mask() {
        let run = Face::Block.layout("   ", TextStyle::new(20.0));
        assert!(run.is_blank());
        assert!((run.width - 18.0).abs() < 1e-4);
    }

    #[test]
    fn italic_widens_the_mask_but_not_the_advance() {
        let face = Face::Block;
        let upright = face.layout("VS", TextStyle::new(80.0));
        let slanted = face.layout("VS", TextStyle::new(80.0).italic());
        assert_eq!(upright.width, slanted.width);
        assert!(slanted.mask_width > upright.mask_width);
    }

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(Face::Block.measure("", TextStyle::new(130.0)), 0.0);
        assert!(Face::Block.layout("", TextStyle::new(130.0)).is_blank());
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(TextAlign::Left.start_x(100.0, 40.0), 100.0);
        assert_eq!(TextAlign::Center.start_x(100.0, 40.0), 80.0);
        assert_eq!(TextAlign::Right.start_x(100.0, 40.0), 60.0);
    }
}
