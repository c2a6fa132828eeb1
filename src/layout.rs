//! Pure placement math. Nothing here touches pixels, so every rule the
//! layouts rely on (auto-fit, cover scale, logo safe zone) is testable
//! against arbitrary text widths.

/// Elite Broadcast constants, in 1920-wide reference units.
pub mod elite {
    pub const BASE_NAME_SIZE: f32 = 130.0;
    pub const MAX_NAME_WIDTH: f32 = 550.0;
    pub const VS_SLOT_WIDTH: f32 = 140.0;
    pub const NAME_GAP: f32 = 60.0;
    pub const LOGO_GAP: f32 = 120.0;
    pub const LOGO_SIZE: f32 = 180.0;
    pub const SAFE_MARGIN: f32 = 150.0;
    pub const TOURNAMENT_Y: f32 = 420.0;
    pub const TOURNAMENT_SIZE: f32 = 48.0;
    pub const TOURNAMENT_SPACING: f32 = 6.0;
    pub const VS_SIZE: f32 = 80.0;
    pub const VS_BASELINE_OFFSET: f32 = 30.0;
    pub const NAME_BASELINE_OFFSET: f32 = 50.0;
    pub const DATE_SIZE: f32 = 42.0;
    pub const DATE_BASELINE_OFFSET: f32 = 160.0;
}

/// Approximate cap height used for text bounding boxes.
pub const CAP_HEIGHT_RATIO: f32 = 0.72;

/// Font size that makes text measured at `base_size` fit `max_width`.
/// Only ever shrinks; there is no lower bound.
pub fn fit_font_size(measured_at_base: f32, base_size: f32, max_width: f32) -> f32 {
    if measured_at_base > max_width {
        base_size * (max_width / measured_at_base)
    } else {
        base_size
    }
}

/// Destination rectangle `(x, y, w, h)` that covers the frame with the
/// image's aspect preserved, centered, overflow cropped.
pub fn cover_rect(frame_width: f32, frame_height: f32, image_width: f32, image_height: f32) -> Option<(f32, f32, f32, f32)> {
    if image_width <= 0.0 || image_height <= 0.0 {
        return None;
    }
    let scale = (frame_width / image_width).max(frame_height / image_height);
    let width = image_width * scale;
    let height = image_height * scale;
    Some((
        frame_width / 2.0 - width / 2.0,
        frame_height / 2.0 - height / 2.0,
        width,
        height,
    ))
}

/// Size of an image fitted inside a `box_size` square without distortion.
pub fn contain_in_square(image_width: f32, image_height: f32, box_size: f32) -> Option<(f32, f32)> {
    if image_width <= 0.0 || image_height <= 0.0 || box_size <= 0.0 {
        return None;
    }
    let aspect = image_width / image_height;
    let mut width = box_size;
    let mut height = box_size / aspect;
    if height > box_size {
        height = box_size;
        width = box_size * aspect;
    }
    Some((width, height))
}

/// Centered placement of an image inside a square box around `center`.
pub fn logo_rect(image_width: f32, image_height: f32, center: (f32, f32), box_size: f32) -> Option<(f32, f32, f32, f32)> {
    let (width, height) = contain_in_square(image_width, image_height, box_size)?;
    Some((center.0 - width / 2.0, center.1 - height / 2.0, width, height))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn centered(center: (f32, f32), width: f32, height: f32) -> Self {
        Self {
            left: center.0 - width / 2.0,
            top: center.1 - height / 2.0,
            right: center.0 + width / 2.0,
            bottom: center.1 + height / 2.0,
        }
    }

    pub fn text(start_x: f32, baseline: f32, width: f32, size: f32) -> Self {
        Self {
            left: start_x,
            top: baseline - size * CAP_HEIGHT_RATIO,
            right: start_x + width,
            bottom: baseline,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Where every Elite Broadcast element lands for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ElitePlacement {
    pub scale: f32,
    pub center: (f32, f32),
    pub home_size: f32,
    pub away_size: f32,
    /// Right edge of the right-aligned home name.
    pub home_anchor_x: f32,
    /// Left edge of the left-aligned away name.
    pub away_anchor_x: f32,
    pub home_width: f32,
    pub away_width: f32,
    pub name_baseline: f32,
    pub home_logo_center: (f32, f32),
    pub away_logo_center: (f32, f32),
    pub logo_size: f32,
}

impl ElitePlacement {
    /// `measure(text, size)` returns the rendered width of `text` at `size`.
    pub fn compute(
        frame_width: f32,
        frame_height: f32,
        scale: f32,
        home: &str,
        away: &str,
        measure: impl Fn(&str, f32) -> f32,
    ) -> Self {
        let center = (frame_width / 2.0, frame_height / 2.0);
        let base = elite::BASE_NAME_SIZE * scale;
        let max_width = elite::MAX_NAME_WIDTH * scale;

        let home_size = fit_font_size(measure(home, base), base, max_width);
        let away_size = fit_font_size(measure(away, base), base, max_width);

        let inner_offset = (elite::VS_SLOT_WIDTH / 2.0 + elite::NAME_GAP) * scale;
        let home_anchor_x = center.0 - inner_offset;
        let away_anchor_x = center.0 + inner_offset;

        // Widths are re-measured at the fitted size; logos follow the real text.
        let home_width = measure(home, home_size);
        let away_width = measure(away, away_size);

        let logo_gap = elite::LOGO_GAP * scale;
        let margin = elite::SAFE_MARGIN * scale;
        let home_logo_x = (home_anchor_x - home_width - logo_gap).max(margin);
        let away_logo_x = (away_anchor_x + away_width + logo_gap).min(frame_width - margin);

        Self {
            scale,
            center,
            home_size,
            away_size,
            home_anchor_x,
            away_anchor_x,
            home_width,
            away_width,
            name_baseline: center.1 + elite::NAME_BASELINE_OFFSET * scale,
            home_logo_center: (home_logo_x, center.1),
            away_logo_center: (away_logo_x, center.1),
            logo_size: elite::LOGO_SIZE * scale,
        }
    }

    pub fn vs_baseline(&self) -> f32 {
        self.center.1 + elite::VS_BASELINE_OFFSET * self.scale
    }

    pub fn tournament_baseline(&self) -> f32 {
        elite::TOURNAMENT_Y * self.scale
    }

    pub fn date_baseline(&self) -> f32 {
        self.center.1 + elite::DATE_BASELINE_OFFSET * self.scale
    }

    pub fn home_name_bounds(&self) -> Bounds {
        Bounds::text(
            self.home_anchor_x - self.home_width,
            self.name_baseline,
            self.home_width,
            self.home_size,
        )
    }

    pub fn away_name_bounds(&self) -> Bounds {
        Bounds::text(
            self.away_anchor_x,
            self.name_baseline,
            self.away_width,
            self.away_size,
        )
    }

    pub fn vs_bounds(&self, vs_width: f32) -> Bounds {
        Bounds::text(
            self.center.0 - vs_width / 2.0,
            self.vs_baseline(),
            vs_width,
            elite::VS_SIZE * self.scale,
        )
    }

    pub fn home_logo_bounds(&self) -> Bounds {
        Bounds::centered(self.home_logo_center, self.logo_size, self.logo_size)
    }

    pub fn away_logo_bounds(&self) -> Bounds {
        Bounds::centered(self.away_logo_center, self.logo_size, self.logo_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monospace(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.6
    }

    #[test]
    fn short_names_keep_base_size() {
        assert_eq!(fit_font_size(549.9, 130.0, 550.0), 130.0);
        assert_eq!(fit_font_size(550.0, 130.0, 550.0), 130.0);
    }

    #[test]
    fn long_names_shrink_proportionally() {
        let size = fit_font_size(1100.0, 130.0, 550.0);
        assert!((size - 65.0).abs() < 1e-4);
    }

    #[test]
    fn zero_width_text_is_not_an_error() {
        assert_eq!(fit_font_size(0.0, 130.0, 550.0), 130.0);
    }

    #[test]
    fn cover_fills_frame_and_centers_overflow() {
        let (x, y, w, h) = cover_rect(1920.0, 1080.0, 1000.0, 1000.0).unwrap();
        assert_eq!((w, h), (1920.0, 1920.0));
        assert_eq!(x, 0.0);
        assert_eq!(y, -420.0);
        assert!(cover_rect(1920.0, 1080.0, 0.0, 10.0).is_none());
    }

    #[test]
    fn contain_limits_the_long_side() {
        assert_eq!(contain_in_square(400.0, 200.0, 180.0), Some((180.0, 90.0)));
        assert_eq!(contain_in_square(200.0, 400.0, 180.0), Some((90.0, 180.0)));
        assert_eq!(contain_in_square(50.0, 50.0, 180.0), Some((180.0, 180.0)));
        assert_eq!(contain_in_square(0.0, 50.0, 180.0), None);
    }

    #[test]
    fn elite_anchors_mirror_around_center() {
        let placement = ElitePlacement::compute(1920.0, 1080.0, 1.0, "HOME", "AWAY", monospace);
        assert_eq!(placement.home_anchor_x, 830.0);
        assert_eq!(placement.away_anchor_x, 1090.0);
        assert_eq!(placement.name_baseline, 590.0);
        assert_eq!(placement.home_size, 130.0);
    }

    #[test]
    fn elite_logos_respect_safe_zone_for_long_names() {
        let long = "WOLVERHAMPTON WANDERERS";
        let placement = ElitePlacement::compute(1920.0, 1080.0, 1.0, long, long, monospace);
        assert!(placement.home_size < 130.0);
        assert!(placement.home_width <= 550.0 + 1e-3);
        assert!(placement.home_logo_center.0 >= 150.0);
        assert!(placement.away_logo_center.0 <= 1920.0 - 150.0);
    }

    #[test]
    fn text_bounds_intersection() {
        let a = Bounds::text(0.0, 100.0, 50.0, 100.0);
        let b = Bounds::text(49.0, 100.0, 10.0, 100.0);
        let c = Bounds::text(50.0, 100.0, 10.0, 100.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
