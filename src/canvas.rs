//! Drawing surface for the banner renderer.
//!
//! Wraps a premultiplied RGBA [`Pixmap`] and exposes the handful of
//! primitives the layouts need. Shadows are an argument of each draw call
//! rather than surface state, so a shadowed draw can never bleed into the
//! next one.

use anyhow::{anyhow, Result};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, GradientStop, IntSize, LinearGradient, Paint, PathBuilder,
    Pixmap, PixmapPaint, Point, RadialGradient, Rect, Shader, SpreadMode, Stroke, Transform,
};

use crate::schema::ColorRgba;
use crate::text::{Face, GlyphRun, TextAlign, TextStyle};

/// Drop shadow with zero offset, matching canvas `shadowBlur` semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: ColorRgba,
    pub blur: f32,
}

impl Shadow {
    pub const fn new(color: ColorRgba, blur: f32) -> Self {
        Self { color, blur }
    }

    fn sigma(self) -> f32 {
        self.blur / 2.0
    }

    fn radius(self) -> u32 {
        (self.sigma() * 3.0).ceil().max(0.0) as u32
    }

    fn is_visible(self) -> bool {
        self.blur > 0.0 && self.color.a > 0
    }
}

pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("failed to allocate canvas {width}x{height}"))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Straight-alpha color at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorRgba> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(ColorRgba::rgba(
            color.red(),
            color.green(),
            color.blue(),
            color.alpha(),
        ))
    }

    pub fn fill(&mut self, color: ColorRgba) {
        self.pixmap.fill(color.to_skia());
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: ColorRgba) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        let paint = solid_paint(color);
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Linear gradient across the whole surface.
    pub fn fill_linear_gradient(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        stops: &[(f32, ColorRgba)],
    ) {
        let shader = LinearGradient::new(
            Point::from_xy(start.0, start.1),
            Point::from_xy(end.0, end.1),
            gradient_stops(stops),
            SpreadMode::Pad,
            Transform::identity(),
        );
        if let Some(shader) = shader {
            self.fill_surface(shader);
        }
    }

    /// Concentric radial gradient across the whole surface. Stop positions
    /// run from `inner_radius` (0.0) to `outer_radius` (1.0); everything
    /// inside the inner circle takes the first stop.
    pub fn fill_radial_gradient(
        &mut self,
        center: (f32, f32),
        inner_radius: f32,
        outer_radius: f32,
        stops: &[(f32, ColorRgba)],
    ) {
        if outer_radius <= 0.0 || inner_radius >= outer_radius {
            return;
        }
        let inner = inner_radius.max(0.0) / outer_radius;
        let remapped = stops
            .iter()
            .map(|(position, color)| (inner + position * (1.0 - inner), *color))
            .collect::<Vec<_>>();
        let center = Point::from_xy(center.0, center.1);
        let shader = RadialGradient::new(
            center,
            center,
            outer_radius,
            gradient_stops(&remapped),
            SpreadMode::Pad,
            Transform::identity(),
        );
        if let Some(shader) = shader {
            self.fill_surface(shader);
        }
    }

    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: ColorRgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut builder = PathBuilder::new();
        builder.move_to(first.0, first.1);
        for (x, y) in rest {
            builder.line_to(*x, *y);
        }
        builder.close();
        let Some(path) = builder.finish() else {
            return;
        };
        let paint = solid_paint(color);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: ColorRgba) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        let paint = solid_paint(color);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    pub fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: ColorRgba,
    ) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let paint = solid_paint(color);
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    pub fn stroke_line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        line_width: f32,
        color: ColorRgba,
    ) {
        let mut builder = PathBuilder::new();
        builder.move_to(from.0, from.1);
        builder.line_to(to.0, to.1);
        let Some(path) = builder.finish() else {
            return;
        };
        let paint = solid_paint(color);
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draws `image` scaled into the destination rectangle. Overflow is clipped.
    pub fn draw_image(
        &mut self,
        image: &Pixmap,
        dest: (f32, f32, f32, f32),
        opacity: f32,
        shadow: Option<Shadow>,
    ) {
        let (x, y, width, height) = dest;
        if image.width() == 0 || image.height() == 0 || width <= 0.0 || height <= 0.0 {
            return;
        }
        let scale_x = width / image.width() as f32;
        let scale_y = height / image.height() as f32;
        if !scale_x.is_finite() || !scale_y.is_finite() {
            return;
        }

        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };

        let shadow = shadow.filter(|shadow| shadow.is_visible());
        let Some(shadow) = shadow else {
            let transform = Transform::from_row(scale_x, 0.0, 0.0, scale_y, x, y);
            self.pixmap
                .draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
            return;
        };

        // Render the scaled image once off-screen so the shadow sees exactly
        // the pixels that get composited.
        let pad = shadow.radius();
        let origin_x = x.floor();
        let origin_y = y.floor();
        let sprite_width = (x + width).ceil() as i64 - origin_x as i64;
        let sprite_height = (y + height).ceil() as i64 - origin_y as i64;
        let Some(mut sprite) = Pixmap::new(
            (sprite_width.max(1) as u32).saturating_add(pad * 2),
            (sprite_height.max(1) as u32).saturating_add(pad * 2),
        ) else {
            return;
        };
        let transform = Transform::from_row(
            scale_x,
            0.0,
            0.0,
            scale_y,
            x - origin_x + pad as f32,
            y - origin_y + pad as f32,
        );
        sprite.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);

        let alpha = sprite
            .pixels()
            .iter()
            .map(|pixel| pixel.alpha())
            .collect::<Vec<_>>();
        let dest_x = origin_x as i32 - pad as i32;
        let dest_y = origin_y as i32 - pad as i32;
        if let Some(shadow_pixmap) = shadow_pixmap(&alpha, sprite.width(), sprite.height(), shadow) {
            self.blit(&shadow_pixmap, dest_x, dest_y);
        }
        self.blit(&sprite, dest_x, dest_y);
    }

    /// Draws text with its baseline at `baseline_y`. Returns the advance width.
    pub fn draw_text(
        &mut self,
        face: &Face,
        text: &str,
        style: TextStyle,
        anchor: (f32, f32),
        align: TextAlign,
        color: ColorRgba,
        shadow: Option<Shadow>,
    ) -> f32 {
        let run = face.layout(text, style);
        if run.is_blank() || color.a == 0 {
            return run.width;
        }
        let pen_x = align.start_x(anchor.0, run.width).round() as i32;
        let baseline = anchor.1.round() as i32;
        let dest_x = pen_x + run.left;
        let dest_y = baseline + run.top;

        if let Some(shadow) = shadow.filter(|shadow| shadow.is_visible()) {
            let pad = shadow.radius();
            let padded = pad_mask(&run, pad);
            if let Some(shadow_pixmap) = shadow_pixmap(
                &padded,
                run.mask_width + pad * 2,
                run.mask_height + pad * 2,
                shadow,
            ) {
                self.blit(&shadow_pixmap, dest_x - pad as i32, dest_y - pad as i32);
            }
        }

        if let Some(glyphs) = tinted_pixmap(&run.coverage, run.mask_width, run.mask_height, color) {
            self.blit(&glyphs, dest_x, dest_y);
        }
        run.width
    }

    /// Straight-alpha RGBA8 bytes of the whole surface.
    pub fn to_rgba8(&self) -> Vec<u8> {
        pixmap_to_rgba8(&self.pixmap)
    }

    fn blit(&mut self, sprite: &Pixmap, x: i32, y: i32) {
        self.pixmap.draw_pixmap(
            x,
            y,
            sprite.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn fill_surface(&mut self, shader: Shader<'_>) {
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
        else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }
}

pub fn pixmap_to_rgba8(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        out.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    out
}

/// Premultiplied pixmap from straight-alpha RGBA8 pixels.
pub fn pixmap_from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Option<Pixmap> {
    if rgba.len() != width as usize * height as usize * 4 {
        return None;
    }
    let mut data = Vec::with_capacity(rgba.len());
    for chunk in rgba.chunks_exact(4) {
        let pixel = ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
        data.extend_from_slice(&[pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()]);
    }
    Pixmap::from_vec(data, IntSize::from_wh(width, height)?)
}

fn solid_paint(color: ColorRgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn gradient_stops(stops: &[(f32, ColorRgba)]) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|(position, color)| GradientStop::new(*position, color.to_skia()))
        .collect()
}

fn pad_mask(run: &GlyphRun, pad: u32) -> Vec<u8> {
    let width = run.mask_width as usize;
    let padded_width = width + pad as usize * 2;
    let padded_height = run.mask_height as usize + pad as usize * 2;
    let mut out = vec![0_u8; padded_width * padded_height];
    for row in 0..run.mask_height as usize {
        let src = &run.coverage[row * width..(row + 1) * width];
        let start = (row + pad as usize) * padded_width + pad as usize;
        out[start..start + width].copy_from_slice(src);
    }
    out
}

fn tinted_pixmap(alpha: &[u8], width: u32, height: u32, color: ColorRgba) -> Option<Pixmap> {
    let mut data = Vec::with_capacity(alpha.len() * 4);
    for &coverage in alpha {
        let a = ((u16::from(coverage) * u16::from(color.a) + 127) / 255) as u8;
        let pixel = ColorU8::from_rgba(color.r, color.g, color.b, a).premultiply();
        data.extend_from_slice(&[pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()]);
    }
    Pixmap::from_vec(data, IntSize::from_wh(width, height)?)
}

fn shadow_pixmap(alpha: &[u8], width: u32, height: u32, shadow: Shadow) -> Option<Pixmap> {
    let kernel = gaussian_kernel_q16(shadow.radius(), shadow.sigma());
    let blurred = blur_alpha(alpha, width as usize, height as usize, &kernel);
    tinted_pixmap(&blurred, width, height, shadow.color)
}

/// Normalized Gaussian weights in 16.16 fixed point; they sum to exactly 1.0.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> Vec<u32> {
    if radius == 0 || !sigma.is_finite() || sigma <= 0.0 {
        return vec![1 << 16];
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f = (-r..=r)
        .map(|i| (-(f64::from(i) * f64::from(i)) / denom).exp())
        .collect::<Vec<_>>();
    let sum = weights_f.iter().sum::<f64>();

    let mut weights = weights_f
        .iter()
        .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect::<Vec<_>>();
    let total = weights.iter().map(|w| i64::from(*w)).sum::<i64>();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - total).clamp(0, 65536) as u32;
    weights
}

/// Separable blur of a single 8-bit channel; samples outside the mask are zero.
fn blur_alpha(src: &[u8], width: usize, height: usize, kernel: &[u32]) -> Vec<u8> {
    if kernel.len() == 1 {
        return src.to_vec();
    }
    let radius = (kernel.len() / 2) as isize;
    let mut tmp = vec![0_u8; src.len()];
    let mut dst = vec![0_u8; src.len()];

    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0_u64;
            for (ki, &weight) in kernel.iter().enumerate() {
                let sx = x as isize + ki as isize - radius;
                if sx >= 0 && (sx as usize) < width {
                    acc += u64::from(weight) * u64::from(row[sx as usize]);
                }
            }
            tmp[y * width + x] = q16_to_u8(acc);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0_u64;
            for (ki, &weight) in kernel.iter().enumerate() {
                let sy = y as isize + ki as isize - radius;
                if sy >= 0 && (sy as usize) < height {
                    acc += u64::from(weight) * u64::from(tmp[sy as usize * width + x]);
                }
            }
            dst[y * width + x] = q16_to_u8(acc);
        }
    }
    dst
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}
