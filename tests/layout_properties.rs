use matchday::font_assets::FontBook;
use matchday::layout::{elite, fit_font_size, ElitePlacement};
use matchday::preset::RenderPreset;
use matchday::renderer::{render_banner, LoadedAssets};
use matchday::schema::{ManualLayout, MatchDetails};
use matchday::text::{Face, TextStyle};

const NAMES: [&str; 10] = [
    "AC",
    "ROMA",
    "ARSENAL",
    "TOTTENHAM",
    "REAL MADRID",
    "FC BARCELONA",
    "BORUSSIA MÖNCHENGLADBACH",
    "WOLVERHAMPTON WANDERERS",
    "MMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMM",
    "I",
];

fn measure(face: &Face) -> impl Fn(&str, f32) -> f32 + '_ {
    move |text: &str, size: f32| face.measure(text, TextStyle::new(size))
}

#[test]
fn short_names_keep_the_base_size_exactly() {
    let fonts = FontBook::builtin();
    for name in ["AC", "ROMA", "ARSENAL", "LYON"] {
        let measured = fonts.display.measure(name, TextStyle::new(elite::BASE_NAME_SIZE));
        assert!(measured <= elite::MAX_NAME_WIDTH, "{name} should fit at base size");
        assert_eq!(
            fit_font_size(measured, elite::BASE_NAME_SIZE, elite::MAX_NAME_WIDTH),
            elite::BASE_NAME_SIZE
        );
    }
}

#[test]
fn long_names_shrink_to_exactly_fit() {
    let fonts = FontBook::builtin();
    for name in NAMES {
        let measured = fonts.display.measure(name, TextStyle::new(elite::BASE_NAME_SIZE));
        if measured <= elite::MAX_NAME_WIDTH {
            continue;
        }
        let size = fit_font_size(measured, elite::BASE_NAME_SIZE, elite::MAX_NAME_WIDTH);
        let expected = elite::BASE_NAME_SIZE * elite::MAX_NAME_WIDTH / measured;
        assert!((size - expected).abs() < 1e-3, "{name}: {size} vs {expected}");

        let refit = fonts.display.measure(name, TextStyle::new(size));
        assert!(refit <= elite::MAX_NAME_WIDTH + 0.01, "{name} re-measures at {refit}");
    }
}

#[test]
fn logos_never_enter_the_safe_margin() {
    let fonts = FontBook::builtin();
    for preset in [RenderPreset::Broadcast, RenderPreset::Compact] {
        let (width, height) = preset.dimensions_px();
        let (width, height) = (width as f32, height as f32);
        let scale = preset.unit_scale();
        let margin = elite::SAFE_MARGIN * scale;
        for home in NAMES {
            for away in NAMES {
                let placement =
                    ElitePlacement::compute(width, height, scale, home, away, measure(&fonts.display));
                assert!(
                    placement.home_logo_center.0 >= margin - 1e-3,
                    "{home} logo at {} on {}",
                    placement.home_logo_center.0,
                    preset.keyword()
                );
                assert!(
                    placement.away_logo_center.0 <= width - margin + 1e-3,
                    "{away} logo at {} on {}",
                    placement.away_logo_center.0,
                    preset.keyword()
                );
            }
        }
    }
}

#[test]
fn tottenham_arsenal_elements_do_not_overlap() {
    let fonts = FontBook::builtin();
    let mut details = MatchDetails::new("TOTTENHAM", "ARSENAL");
    details.tournament = "PREMIER LEAGUE".to_owned();
    details.layout = ManualLayout::EliteBroadcast;

    let frame = render_banner(&details, LoadedAssets::default(), &fonts, RenderPreset::Broadcast)
        .expect("elite render should succeed");
    assert_eq!((frame.width(), frame.height()), (1920, 1080));

    let placement = ElitePlacement::compute(
        1920.0,
        1080.0,
        1.0,
        &details.home_display(),
        &details.away_display(),
        measure(&fonts.display),
    );
    let vs_width = fonts
        .display
        .measure("vs", TextStyle::new(elite::VS_SIZE).italic());
    let home = placement.home_name_bounds();
    let away = placement.away_name_bounds();
    let vs = placement.vs_bounds(vs_width);

    assert!(!home.intersects(&vs), "home name {home:?} overlaps vs {vs:?}");
    assert!(!away.intersects(&vs), "away name {away:?} overlaps vs {vs:?}");
    assert!(!home.intersects(&away));
    assert!(!placement.home_logo_bounds().intersects(&home));
    assert!(!placement.away_logo_bounds().intersects(&away));
}

#[test]
fn missing_background_uses_the_fallback_gradient() {
    let fonts = FontBook::builtin();
    let details = MatchDetails::new("TOTTENHAM", "ARSENAL");
    let frame = render_banner(&details, LoadedAssets::default(), &fonts, RenderPreset::Broadcast)
        .expect("render should succeed");

    let edge = [0x0a, 0x0f, 0x1a];
    let base = [0x05, 0x08, 0x0f];
    for (x, y) in [(0, 0), (1919, 1079)] {
        let pixel = frame.pixel(x, y).expect("corner pixel");
        let rgb = [pixel.red(), pixel.green(), pixel.blue()];
        for channel in 0..3 {
            assert!(
                rgb[channel].abs_diff(edge[channel]) <= 2,
                "corner ({x},{y}) is {rgb:?}, expected gradient endpoint {edge:?}"
            );
        }
        assert_ne!(rgb, base, "corner ({x},{y}) shows the bare base fill");
    }

    // Midway along the diagonal the gradient reaches its lighter stop.
    let mid = frame.pixel(200, 960).expect("diagonal pixel");
    assert!(mid.blue() > 0x1a);
}

#[test]
fn switching_layouts_never_fails() {
    let fonts = FontBook::builtin();
    let mut details = MatchDetails::new("Real Madrid", "FC Barcelona");
    details.tournament = "La Liga".to_owned();
    details.match_date = "21:00 CET".to_owned();

    for preset in [RenderPreset::Broadcast, RenderPreset::Compact] {
        let mut frames = Vec::new();
        for layout in ManualLayout::ALL {
            details.layout = layout;
            let frame = render_banner(&details, LoadedAssets::default(), &fonts, preset)
                .unwrap_or_else(|error| panic!("{} failed: {error:#}", layout.keyword()));
            assert_eq!((frame.width(), frame.height()), preset.dimensions_px());
            frames.push(frame);
        }
        for pair in frames.windows(2) {
            assert_ne!(pair[0].data(), pair[1].data(), "layouts should differ on {}", preset.keyword());
        }
    }
}

#[test]
fn degenerate_names_render_without_error() {
    let fonts = FontBook::builtin();
    let details = MatchDetails::new("", "   ");
    for layout in ManualLayout::ALL {
        let mut details = details.clone();
        details.layout = layout;
        assert!(render_banner(&details, LoadedAssets::default(), &fonts, RenderPreset::Broadcast).is_ok());
    }
}
