//! The layout rendering engine.
//!
//! One pass per frame: base fill, background, then the drawing function
//! selected by [`ManualLayout`]. Every pass starts by repainting the whole
//! surface, so drawing the same inputs twice into one canvas yields the
//! same pixels.

use anyhow::Result;
use tiny_skia::Pixmap;

use crate::canvas::{Canvas, Shadow};
use crate::font_assets::FontBook;
use crate::layout::{cover_rect, elite, logo_rect, ElitePlacement};
use crate::preset::RenderPreset;
use crate::schema::{ColorRgba, ManualLayout, MatchDetails};
use crate::text::{Face, TextAlign, TextStyle};

const BASE_FILL: ColorRgba = ColorRgba::rgb(0x05, 0x08, 0x0f);
const BROADCAST_GRADIENT_EDGE: ColorRgba = ColorRgba::rgb(0x0a, 0x0f, 0x1a);
const BROADCAST_GRADIENT_MID: ColorRgba = ColorRgba::rgb(0x1e, 0x29, 0x3b);
const COMPACT_GRADIENT_START: ColorRgba = ColorRgba::rgb(0x0f, 0x17, 0x2a);
const COMPACT_GRADIENT_END: ColorRgba = ColorRgba::rgb(0x1e, 0x29, 0x3b);

const BACKGROUND_OPACITY: f32 = 0.95;
const VIGNETTE_INNER_RADIUS: f32 = 400.0;
const STADIUM_LINE_SPACING: f32 = 40.0;
const BOTTOM_BAR_HEIGHT: f32 = 150.0;
const BOTTOM_TEXT_SIZE: f32 = 80.0;
const BOTTOM_LOGO_SIZE: f32 = 100.0;
const BOTTOM_LOGO_INSET: f32 = 100.0;
const VS_SIZE: f32 = 120.0;
const VS_BASELINE_OFFSET: f32 = 40.0;
/// Shared by the Compact footer's tournament and date lines.
const FOOTER_SPACING: f32 = 5.0;

/// Decoded rasters available for this frame. A `None` slot is drawn with
/// fallback visuals.
#[derive(Clone, Copy, Default)]
pub struct LoadedAssets<'a> {
    pub background: Option<&'a Pixmap>,
    pub home_logo: Option<&'a Pixmap>,
    pub away_logo: Option<&'a Pixmap>,
}

/// Renders one frame at the preset's resolution.
pub fn render_banner(
    details: &MatchDetails,
    assets: LoadedAssets<'_>,
    fonts: &FontBook,
    preset: RenderPreset,
) -> Result<Pixmap> {
    let (width, height) = preset.dimensions_px();
    let mut canvas = Canvas::new(width, height)?;
    render_into(&mut canvas, details, assets, fonts, preset);
    Ok(canvas.into_pixmap())
}

/// Redraws the whole canvas. Previous contents never show through.
pub fn render_into(
    canvas: &mut Canvas,
    details: &MatchDetails,
    assets: LoadedAssets<'_>,
    fonts: &FontBook,
    preset: RenderPreset,
) {
    let scene = Scene {
        details,
        assets,
        fonts,
        preset,
        width: canvas.width() as f32,
        height: canvas.height() as f32,
        scale: canvas.width() as f32 / crate::preset::REFERENCE_WIDTH,
    };
    log::debug!(
        "drawing {} layout on {} preset ({}x{})",
        details.layout.keyword(),
        preset.keyword(),
        canvas.width(),
        canvas.height()
    );

    canvas.fill(BASE_FILL);
    match preset {
        RenderPreset::Broadcast => draw_broadcast(canvas, &scene),
        RenderPreset::Compact => draw_compact(canvas, &scene),
    }
}

struct Scene<'a> {
    details: &'a MatchDetails,
    assets: LoadedAssets<'a>,
    fonts: &'a FontBook,
    preset: RenderPreset,
    width: f32,
    height: f32,
    /// Reference units to pixels; only the Elite layout is expressed in
    /// reference units.
    scale: f32,
}

fn draw_broadcast(canvas: &mut Canvas, scene: &Scene<'_>) {
    let (w, h) = (scene.width, scene.height);
    match scene.assets.background {
        Some(background) => {
            draw_cover(canvas, background, w, h, BACKGROUND_OPACITY);
            canvas.fill_radial_gradient(
                (w / 2.0, h / 2.0),
                VIGNETTE_INNER_RADIUS * scene.scale,
                w / 2.0,
                &[
                    (0.0, ColorRgba::black().with_opacity(0.05)),
                    (1.0, ColorRgba::black().with_opacity(0.4)),
                ],
            );
        }
        None => canvas.fill_linear_gradient(
            (0.0, 0.0),
            (w, h),
            &[
                (0.0, BROADCAST_GRADIENT_EDGE),
                (0.5, BROADCAST_GRADIENT_MID),
                (1.0, BROADCAST_GRADIENT_EDGE),
            ],
        ),
    }

    draw_layout(canvas, scene);
}

fn draw_compact(canvas: &mut Canvas, scene: &Scene<'_>) {
    let (w, h) = (scene.width, scene.height);
    let accent = scene.details.accent_color;

    match scene.assets.background {
        Some(background) => draw_cover(canvas, background, w, h, 1.0),
        None => {
            canvas.fill_linear_gradient(
                (0.0, 0.0),
                (w, h),
                &[(0.0, COMPACT_GRADIENT_START), (1.0, COMPACT_GRADIENT_END)],
            );
            let line = ColorRgba::white().with_opacity(0.05);
            let mut x = 0.0;
            while x < w {
                canvas.stroke_line((x, 0.0), (x, h), 1.0, line);
                x += STADIUM_LINE_SPACING;
            }
        }
    }

    canvas.fill_rect(0.0, 0.0, w, h, ColorRgba::black().with_opacity(0.4));
    canvas.fill_radial_gradient(
        (w / 2.0, h / 2.0),
        0.0,
        800.0,
        &[
            (0.0, accent.with_alpha(0)),
            (1.0, accent.with_alpha(0x22)),
        ],
    );

    draw_layout(canvas, scene);

    if scene.preset.draws_border() {
        canvas.stroke_rect(20.0, 20.0, w - 40.0, h - 40.0, 10.0, accent);
    }
}

fn draw_compact_footer(canvas: &mut Canvas, scene: &Scene<'_>) {
    let center_x = scene.width / 2.0;
    canvas.draw_text(
        &scene.fonts.body,
        &scene.details.tournament_display(),
        TextStyle::new(24.0).with_spacing(FOOTER_SPACING),
        (center_x, 80.0),
        TextAlign::Center,
        ColorRgba::white(),
        None,
    );
    canvas.draw_text(
        &scene.fonts.body,
        &scene.details.match_date.to_uppercase(),
        TextStyle::new(20.0).with_spacing(FOOTER_SPACING),
        (center_x, 120.0),
        TextAlign::Center,
        scene.details.accent_color,
        None,
    );
}

fn draw_cover(canvas: &mut Canvas, image: &Pixmap, width: f32, height: f32, opacity: f32) {
    if let Some(dest) = cover_rect(width, height, image.width() as f32, image.height() as f32) {
        canvas.draw_image(image, dest, opacity, None);
    }
}

fn draw_elite(canvas: &mut Canvas, scene: &Scene<'_>) {
    let details = scene.details;
    let display = &scene.fonts.display;
    let s = scene.scale;
    let (w, h) = (scene.width, scene.height);
    let white = ColorRgba::white();
    let shadow = |blur: f32| Some(Shadow::new(ColorRgba::black(), blur * s));

    let home = details.home_display();
    let away = details.away_display();
    let placement = ElitePlacement::compute(w, h, s, &home, &away, |text, size| {
        display.measure(text, TextStyle::new(size))
    });

    canvas.draw_text(
        display,
        &details.tournament_display(),
        TextStyle::new(elite::TOURNAMENT_SIZE * s).with_spacing(elite::TOURNAMENT_SPACING * s),
        (w / 2.0, placement.tournament_baseline()),
        TextAlign::Center,
        white,
        shadow(15.0),
    );

    canvas.draw_text(
        display,
        "vs",
        TextStyle::new(elite::VS_SIZE * s).italic(),
        (w / 2.0, placement.vs_baseline()),
        TextAlign::Center,
        white,
        shadow(12.0),
    );
    canvas.draw_text(
        display,
        &home,
        TextStyle::new(placement.home_size),
        (placement.home_anchor_x, placement.name_baseline),
        TextAlign::Right,
        white,
        shadow(12.0),
    );
    canvas.draw_text(
        display,
        &away,
        TextStyle::new(placement.away_size),
        (placement.away_anchor_x, placement.name_baseline),
        TextAlign::Left,
        white,
        shadow(12.0),
    );

    let logo_shadow = Some(Shadow::new(ColorRgba::black().with_opacity(0.8), 30.0 * s));
    if let Some(logo) = scene.assets.home_logo {
        draw_logo(canvas, logo, placement.home_logo_center, placement.logo_size, logo_shadow);
    }
    if let Some(logo) = scene.assets.away_logo {
        draw_logo(canvas, logo, placement.away_logo_center, placement.logo_size, logo_shadow);
    }

    canvas.draw_text(
        &scene.fonts.body,
        &details.match_date,
        TextStyle::new(elite::DATE_SIZE * s),
        (w / 2.0, placement.date_baseline()),
        TextAlign::Center,
        white,
        shadow(8.0),
    );
}

/// Dispatches on the layout. Elite carries its own tournament and date
/// lines; the other layouts get the preset's heading or footer.
fn draw_layout(canvas: &mut Canvas, scene: &Scene<'_>) {
    let body: fn(&mut Canvas, &Scene<'_>, &TeamBlock) = match scene.details.layout {
        ManualLayout::EliteBroadcast => return draw_elite(canvas, scene),
        ManualLayout::ClassicVs => draw_classic_vs,
        ManualLayout::SplitScreen => draw_split_screen,
        ManualLayout::BottomBranding => draw_bottom_branding,
    };
    let block = TeamBlock::for_preset(scene.preset);
    match scene.preset {
        RenderPreset::Broadcast => {
            draw_broadcast_heading(canvas, scene);
            body(canvas, scene, &block);
        }
        RenderPreset::Compact => {
            body(canvas, scene, &block);
            draw_compact_footer(canvas, scene);
        }
    }
}

fn draw_broadcast_heading(canvas: &mut Canvas, scene: &Scene<'_>) {
    canvas.draw_text(
        &scene.fonts.body,
        &scene.details.tournament_display(),
        TextStyle::new(36.0),
        (scene.width / 2.0, 100.0),
        TextAlign::Center,
        ColorRgba::white(),
        None,
    );
}

// Secondary layouts use constants in the preset's own pixels.
fn draw_classic_vs(canvas: &mut Canvas, scene: &Scene<'_>, block: &TeamBlock) {
    let (w, h) = (scene.width, scene.height);
    let logo_size = block.classic_logo_size;
    if scene.preset == RenderPreset::Compact {
        draw_vs(canvas, scene);
    }
    let (home_x, away_x) = block.classic_columns;
    block.draw(canvas, scene, &scene.details.home_display(), scene.assets.home_logo, (w * home_x, h / 2.0), logo_size);
    block.draw(canvas, scene, &scene.details.away_display(), scene.assets.away_logo, (w * away_x, h / 2.0), logo_size);
    if scene.preset == RenderPreset::Broadcast {
        draw_vs(canvas, scene);
    }
}

fn draw_split_screen(canvas: &mut Canvas, scene: &Scene<'_>, block: &TeamBlock) {
    let (w, h) = (scene.width, scene.height);
    let tint = scene.details.accent_color.with_alpha(block.split_tint_alpha);
    canvas.fill_polygon(&block.split_polygon(w, h), tint);
    block.draw(canvas, scene, &scene.details.home_display(), scene.assets.home_logo, (w * 0.25, h / 2.0), block.split_logo_size);
    block.draw(canvas, scene, &scene.details.away_display(), scene.assets.away_logo, (w * 0.75, h / 2.0), block.split_logo_size);
}

fn draw_vs(canvas: &mut Canvas, scene: &Scene<'_>) {
    canvas.draw_text(
        &scene.fonts.display,
        "VS",
        TextStyle::new(VS_SIZE),
        (scene.width / 2.0, scene.height / 2.0 + VS_BASELINE_OFFSET),
        TextAlign::Center,
        scene.details.accent_color,
        None,
    );
}

fn draw_bottom_branding(canvas: &mut Canvas, scene: &Scene<'_>, block: &TeamBlock) {
    let details = scene.details;
    let (w, h) = (scene.width, scene.height);
    let bar_top = h - BOTTOM_BAR_HEIGHT;
    let bar_center = bar_top + BOTTOM_BAR_HEIGHT / 2.0;

    canvas.fill_rect(0.0, bar_top, w, BOTTOM_BAR_HEIGHT, ColorRgba::black().with_opacity(0.8));

    let headline = format!("{} VS {}", details.home_display(), details.away_display());
    let baseline = bar_center + BOTTOM_TEXT_SIZE * crate::layout::CAP_HEIGHT_RATIO / 2.0;
    canvas.draw_text(
        &scene.fonts.display,
        &headline,
        TextStyle::new(BOTTOM_TEXT_SIZE),
        (w / 2.0, baseline),
        TextAlign::Center,
        details.text_color,
        None,
    );

    if let Some(logo) = scene.assets.home_logo {
        draw_logo(canvas, logo, (BOTTOM_LOGO_INSET, bar_center), BOTTOM_LOGO_SIZE, block.logo_shadow);
    }
    if let Some(logo) = scene.assets.away_logo {
        draw_logo(canvas, logo, (w - BOTTOM_LOGO_INSET, bar_center), BOTTOM_LOGO_SIZE, block.logo_shadow);
    }
}

/// Logo above, name below, both centered on the anchor column.
struct TeamBlock {
    logo_offset: f32,
    logo_shadow: Option<Shadow>,
    placeholder: bool,
    name_size: f32,
    name_offset: f32,
    name_blur: f32,
    classic_columns: (f32, f32),
    classic_logo_size: f32,
    split_logo_size: f32,
    split_tint_alpha: u8,
    /// Split polygon corners as fractions of the frame.
    split_shape: [(f32, f32); 4],
}

impl TeamBlock {
    fn for_preset(preset: RenderPreset) -> Self {
        match preset {
            RenderPreset::Broadcast => Self {
                logo_offset: 100.0,
                logo_shadow: Some(Shadow::new(ColorRgba::black().with_opacity(0.8), 30.0)),
                placeholder: preset.logo_placeholder(),
                name_size: 90.0,
                name_offset: 220.0,
                name_blur: 15.0,
                classic_columns: (0.28, 0.72),
                classic_logo_size: 400.0,
                split_logo_size: 450.0,
                split_tint_alpha: 0x33,
                split_shape: [(0.4, 0.0), (0.6, 0.0), (0.5, 1.0), (0.3, 1.0)],
            },
            RenderPreset::Compact => Self {
                logo_offset: 80.0,
                logo_shadow: None,
                placeholder: preset.logo_placeholder(),
                name_size: 60.0,
                name_offset: 160.0,
                name_blur: 10.0,
                classic_columns: (0.25, 0.75),
                classic_logo_size: 300.0,
                split_logo_size: 250.0,
                split_tint_alpha: 0x44,
                split_shape: [(0.0, 0.0), (0.5, 0.0), (0.4, 1.0), (0.0, 1.0)],
            },
        }
    }

    fn split_polygon(&self, w: f32, h: f32) -> [(f32, f32); 4] {
        self.split_shape.map(|(fx, fy)| (w * fx, h * fy))
    }

    fn draw(
        &self,
        canvas: &mut Canvas,
        scene: &Scene<'_>,
        name: &str,
        logo: Option<&Pixmap>,
        anchor: (f32, f32),
        logo_size: f32,
    ) {
        let logo_center = (anchor.0, anchor.1 - self.logo_offset);
        match logo {
            Some(logo) => draw_logo(canvas, logo, logo_center, logo_size, self.logo_shadow),
            None if self.placeholder => canvas.fill_circle(
                logo_center.0,
                logo_center.1,
                logo_size / 2.0,
                ColorRgba::white().with_opacity(0.1),
            ),
            None => {}
        }

        draw_name(
            canvas,
            &scene.fonts.display,
            name,
            self.name_size,
            (anchor.0, anchor.1 + self.name_offset),
            scene.details.text_color,
            Shadow::new(ColorRgba::black(), self.name_blur),
        );
    }
}

fn draw_name(
    canvas: &mut Canvas,
    face: &Face,
    name: &str,
    size: f32,
    anchor: (f32, f32),
    color: ColorRgba,
    shadow: Shadow,
) {
    canvas.draw_text(face, name, TextStyle::new(size), anchor, TextAlign::Center, color, Some(shadow));
}

/// Aspect-correct logo centered on `center` inside a `size` square.
fn draw_logo(canvas: &mut Canvas, logo: &Pixmap, center: (f32, f32), size: f32, shadow: Option<Shadow>) {
    if let Some(dest) = logo_rect(logo.width() as f32, logo.height() as f32, center, size) {
        canvas.draw_image(logo, dest, 1.0, shadow);
    }
}
