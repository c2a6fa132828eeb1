//! Banner render benchmarks, one per layout and preset.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use matchday::encoding::{encode_frame, DEFAULT_JPEG_QUALITY};
use matchday::font_assets::FontBook;
use matchday::preset::RenderPreset;
use matchday::renderer::{render_banner, LoadedAssets};
use matchday::schema::{ManualLayout, MatchDetails};

fn details(layout: ManualLayout) -> MatchDetails {
    let mut details = MatchDetails::new("Borussia Mönchengladbach", "Bayern München");
    details.tournament = "Bundesliga".to_owned();
    details.match_date = "Sat 18:30".to_owned();
    details.layout = layout;
    details
}

fn bench_layouts(c: &mut Criterion) {
    let fonts = FontBook::builtin();
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    for preset in [RenderPreset::Broadcast, RenderPreset::Compact] {
        for layout in ManualLayout::ALL {
            let details = details(layout);
            let id = format!("{}_{}", preset.keyword(), layout.keyword());
            group.bench_function(id, |b| {
                b.iter(|| {
                    black_box(
                        render_banner(&details, LoadedAssets::default(), &fonts, preset)
                            .expect("render"),
                    )
                });
            });
        }
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let fonts = FontBook::builtin();
    let mut group = c.benchmark_group("export_frame");
    group.sample_size(20);

    for preset in [RenderPreset::Broadcast, RenderPreset::Compact] {
        let frame = render_banner(
            &details(ManualLayout::EliteBroadcast),
            LoadedAssets::default(),
            &fonts,
            preset,
        )
        .expect("render");
        let format = preset.export_format();
        group.bench_function(preset.keyword(), |b| {
            b.iter(|| black_box(encode_frame(&frame, format, DEFAULT_JPEG_QUALITY).expect("encode")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layouts, bench_export);
criterion_main!(benches);
