use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use matchday::assets::{describe_source, AssetSlot};
use matchday::encoding::{frame_sha256, DEFAULT_JPEG_QUALITY};
use matchday::engine::{BannerEngine, RenderOptions};
use matchday::error_codes::{envelope_for, find_coded_error, CodedErrorKind};
use matchday::font_assets::missing_codepoints;
use matchday::manifest::load_and_validate_match;
use matchday::preset::RenderPreset;
use matchday::prompt::{build_banner_prompt, LogoAttachments};
use matchday::schema::{ManualLayout, MatchDetails};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MATCHDAY_GIT_HASH"), ")");

#[derive(Debug, Parser)]
#[command(name = "matchday")]
#[command(about = "Render match-day hype banners from a match file")]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a match file and summarize it.
    Check {
        match_file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Resolve assets, render one frame and export it.
    Render {
        match_file: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[arg(long, default_value = "broadcast")]
        preset: String,
        /// Overrides the layout named in the match file.
        #[arg(long)]
        layout: Option<String>,
        #[arg(long)]
        display_font: Option<PathBuf>,
        #[arg(long)]
        body_font: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        quality: u8,
        #[arg(long)]
        json: bool,
    },
    /// Print the generative-banner prompt for a match file.
    Prompt { match_file: PathBuf },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Self::Check { json, .. } | Self::Render { json, .. } => *json,
            Self::Prompt { .. } => false,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let json = cli.command.wants_json();

    let result = match cli.command {
        Commands::Check { match_file, json } => run_check(&match_file, json),
        Commands::Render {
            match_file,
            output,
            preset,
            layout,
            display_font,
            body_font,
            quality,
            json,
        } => {
            let request = RenderRequest {
                match_file,
                output,
                preset,
                layout,
                display_font,
                body_font,
                quality,
                json,
            };
            run_render(request)
        }
        Commands::Prompt { match_file } => run_prompt(&match_file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_error(&error, json),
    }
}

fn report_error(error: &anyhow::Error, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(&envelope_for(error)) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("error: {error:#}"),
        }
    } else {
        eprintln!("error: {error:#}");
    }
    match find_coded_error(error).map(|coded| coded.kind) {
        Some(CodedErrorKind::Usage) => ExitCode::from(2),
        Some(CodedErrorKind::Input) => ExitCode::from(3),
        None => ExitCode::FAILURE,
    }
}

fn run_check(match_path: &Path, json: bool) -> Result<()> {
    let details = load_and_validate_match(match_path)?;

    if json {
        let sources = AssetSlot::ALL
            .iter()
            .map(|slot| {
                (
                    slot.key().to_owned(),
                    json!(slot.source_in(&details).map(describe_source)),
                )
            })
            .collect::<serde_json::Map<_, _>>();
        let summary = json!({
            "ok": true,
            "homeTeam": details.home_team,
            "awayTeam": details.away_team,
            "tournament": details.tournament,
            "matchDate": details.match_date,
            "layout": details.layout.keyword(),
            "style": details.style.keyword(),
            "textColor": details.text_color.to_string(),
            "accentColor": details.accent_color.to_string(),
            "sources": sources,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "OK: {} ({} vs {}, layout {}, style {})",
        match_path.display(),
        details.home_display(),
        details.away_display(),
        details.layout.keyword(),
        details.style.keyword()
    );
    for slot in AssetSlot::ALL {
        let source = slot
            .source_in(&details)
            .map_or_else(|| "-".to_owned(), describe_source);
        println!("{:<9} {}", slot.key(), source);
    }
    Ok(())
}

struct RenderRequest {
    match_file: PathBuf,
    output: Option<PathBuf>,
    preset: String,
    layout: Option<String>,
    display_font: Option<PathBuf>,
    body_font: Option<PathBuf>,
    quality: u8,
    json: bool,
}

fn run_render(request: RenderRequest) -> Result<()> {
    let preset = RenderPreset::from_keyword(&request.preset)?;
    let mut details = load_and_validate_match(&request.match_file)?;
    if let Some(layout) = request.layout.as_deref() {
        details.layout = ManualLayout::from_keyword(layout)?;
    }

    let options = RenderOptions {
        preset,
        display_font: request.display_font,
        body_font: request.body_font,
        ..RenderOptions::default()
    }
    .with_jpeg_quality(request.quality);
    let fonts = options.load_fonts()?;
    let builtin_font = fonts.display.is_builtin();
    for name in [details.home_display(), details.away_display()] {
        let missing = missing_codepoints(&fonts.display, &name);
        if !missing.is_empty() {
            log::warn!("display font has no glyphs for {missing:?} in '{name}'");
        }
    }

    eprintln!(
        "rendering {} on {} preset...",
        details.layout.keyword(),
        preset.keyword()
    );
    let mut engine = BannerEngine::new(options, fonts);
    engine.set_details(details, Instant::now());
    let timeout = engine.options().asset_timeout;
    engine.settle(timeout)?;

    let artifact = engine
        .export()?
        .ok_or_else(|| anyhow!("no frame was rendered"))?;
    let frame = engine
        .frame()
        .ok_or_else(|| anyhow!("no frame was rendered"))?;
    let digest = frame_sha256(frame);
    let output_path = request
        .output
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    artifact.write_to(&output_path)?;

    if request.json {
        let loaded = AssetSlot::ALL
            .iter()
            .map(|slot| (slot.key().to_owned(), json!(engine.assets().get(*slot).is_some())))
            .collect::<serde_json::Map<_, _>>();
        let layout = engine.details().map(|details| details.layout.keyword());
        let summary = json!({
            "ok": true,
            "layout": layout,
            "path": output_path.display().to_string(),
            "fileName": artifact.file_name,
            "mime": artifact.mime,
            "width": frame.width(),
            "height": frame.height(),
            "sha256": digest,
            "builtinFont": builtin_font,
            "assets": loaded,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Wrote {}", output_path.display());
        println!("sha256 {digest}");
    }
    Ok(())
}

fn run_prompt(match_path: &Path) -> Result<()> {
    let details: MatchDetails = load_and_validate_match(match_path)?;
    println!(
        "{}",
        build_banner_prompt(&details, LogoAttachments::from_details(&details))
    );
    Ok(())
}
