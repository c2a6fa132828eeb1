//! Stateful wrapper around the renderer: owns the asset cache, the redraw
//! debounce and the last drawn frame.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tiny_skia::Pixmap;

use crate::assets::AssetCache;
use crate::canvas::Canvas;
use crate::encoding::{export_frame, ExportArtifact, DEFAULT_JPEG_QUALITY};
use crate::font_assets::FontBook;
use crate::preset::RenderPreset;
use crate::renderer::render_into;
use crate::schedule::{RedrawScheduler, DEFAULT_DEBOUNCE};
use crate::schema::MatchDetails;

pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub preset: RenderPreset,
    pub display_font: Option<PathBuf>,
    pub body_font: Option<PathBuf>,
    pub jpeg_quality: u8,
    pub debounce: Duration,
    pub asset_timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preset: RenderPreset::default(),
            display_font: None,
            body_font: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            debounce: DEFAULT_DEBOUNCE,
            asset_timeout: DEFAULT_ASSET_TIMEOUT,
        }
    }
}

impl RenderOptions {
    pub fn with_preset(mut self, preset: RenderPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Clamps the JPEG quality into 1..=100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Loads the faces these options name, probing system fonts otherwise.
    pub fn load_fonts(&self) -> Result<FontBook> {
        FontBook::load(self.display_font.as_deref(), self.body_font.as_deref())
    }
}

pub struct BannerEngine {
    options: RenderOptions,
    fonts: FontBook,
    details: Option<MatchDetails>,
    assets: AssetCache,
    scheduler: RedrawScheduler,
    canvas: Option<Canvas>,
    draw_count: u64,
}

impl BannerEngine {
    pub fn new(options: RenderOptions, fonts: FontBook) -> Self {
        let scheduler = RedrawScheduler::new(options.debounce);
        Self {
            options,
            fonts,
            details: None,
            assets: AssetCache::new(),
            scheduler,
            canvas: None,
            draw_count: 0,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn details(&self) -> Option<&MatchDetails> {
        self.details.as_ref()
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// When the next debounced draw is due, for callers that sleep between pumps.
    pub fn next_redraw_at(&self) -> Option<Instant> {
        self.scheduler.due_at()
    }

    /// Replaces the details wholesale and schedules a redraw.
    pub fn set_details(&mut self, details: MatchDetails, now: Instant) {
        self.assets.sync(&details);
        self.details = Some(details);
        self.scheduler.request(now);
    }

    /// Applies finished decodes and draws once the debounce has elapsed.
    /// Returns whether a draw happened.
    pub fn pump(&mut self, now: Instant) -> Result<bool> {
        if self.assets.poll() {
            self.scheduler.request(now);
        }
        if !self.scheduler.take_due(now) {
            return Ok(false);
        }
        self.render_now()
    }

    /// Waits (bounded) for outstanding decodes, then draws.
    pub fn settle(&mut self, timeout: Duration) -> Result<bool> {
        self.assets.wait(timeout);
        self.scheduler.cancel();
        self.render_now()
    }

    /// Draws immediately. Returns `false` when there are no details yet.
    pub fn render_now(&mut self) -> Result<bool> {
        let Some(details) = self.details.as_ref() else {
            return Ok(false);
        };
        let preset = self.options.preset;
        let (width, height) = preset.dimensions_px();

        let canvas = match self.canvas.take() {
            Some(canvas) if canvas.width() == width && canvas.height() == height => canvas,
            _ => Canvas::new(width, height)?,
        };
        let canvas = self.canvas.insert(canvas);
        render_into(canvas, details, self.assets.loaded_assets(), &self.fonts, preset);
        self.draw_count += 1;
        log::debug!("frame {} drawn", self.draw_count);
        Ok(true)
    }

    pub fn frame(&self) -> Option<&Pixmap> {
        self.canvas.as_ref().map(Canvas::pixmap)
    }

    /// Encodes the frame as it is right now; `None` before the first draw.
    pub fn export(&self) -> Result<Option<ExportArtifact>> {
        let (Some(frame), Some(details)) = (self.frame(), self.details.as_ref()) else {
            log::debug!("export requested before the first draw");
            return Ok(None);
        };
        export_frame(
            frame,
            self.options.preset,
            &details.home_team,
            &details.away_team,
            self.options.jpeg_quality,
        )
        .map(Some)
    }
}
