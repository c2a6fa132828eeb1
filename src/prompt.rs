//! Text prompt for the generative banner path. Pure string building; the
//! image service itself lives outside this crate.

use serde::{Deserialize, Serialize};

use crate::schema::{BannerStyle, MatchDetails};

/// What a generator integration hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerResult {
    pub image_url: String,
    pub prompt: String,
}

/// Which logo references accompany the prompt as image parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoAttachments {
    pub home: bool,
    pub away: bool,
}

impl LogoAttachments {
    /// Assumes every non-empty logo source can be attached.
    pub fn from_details(details: &MatchDetails) -> Self {
        Self {
            home: details.home_logo_source().is_some(),
            away: details.away_logo_source().is_some(),
        }
    }
}

pub fn style_theme(style: BannerStyle) -> &'static str {
    match style {
        BannerStyle::Modern => "Ultra-modern sports broadcasting aesthetic. Use glassmorphism, clean sans-serif typography (like Inter or Montserrat), dynamic gradient overlays, and sharp geometric vector elements. High-end digital look.",
        BannerStyle::Epic => "Cinematic stadium atmosphere at dusk. Heavy atmosphere with smoke, volumetric lighting, dramatic spotlights, and high-contrast shadows. Text should feel heavy and powerful like a movie title.",
        BannerStyle::Neon => "Cyberpunk-inspired sports aesthetic. Vibrant glowing outlines, electric team colors, digital glitch artifacts, and synthwave sunset lighting. Text should have a neon tube glow effect.",
        BannerStyle::Vintage => "1970s classic football poster. Distressed paper texture, halftone dot patterns, limited color palette, bold blocky slab-serif typography. High-quality print scan look with authentic grain.",
        BannerStyle::Minimal => "Swiss design school influence. Extreme focus on white space, bold Swiss-style layout, primary geometric shapes, and massive, clear typography. Elegant and strictly organized.",
    }
}

fn branding_rules(home: &str, away: &str) -> String {
    format!(
        "CRITICAL TYPOGRAPHY & BRANDING RULES (MANDATORY):
1. CHARACTER-BY-CHARACTER SPELLING: You must render the team names exactly: \"{home}\" and \"{away}\".
   - Perform a spelling audit: Count the letters and match them exactly.
2. IMMUTABLE TEXT: Treat team names as raw data strings. No artistic interpretation.
3. HIGH-CONTRAST TYPOGRAPHY: Use bold, clean, and solid fonts.
4. ABSOLUTE LOGO PRESERVATION: Render the provided club logos as EXACT REPRODUCTIONS.
5. LOGO PROTECTION ZONES: Keep logos in clear \"Safe Zones\" on the left and right. Zero overlap with text.
6. BACKGROUND DEPTH: Apply a professional 20% background blur to the stadium only. THE TEXT AND LOGOS MUST BE 100% SHARP.
7. NO TEXT HALLUCINATION: Ensure no extra letters appear anywhere."
    )
}

pub fn build_banner_prompt(details: &MatchDetails, logos: LogoAttachments) -> String {
    let home = details.home_team.as_str();
    let away = details.away_team.as_str();

    let mut prompt = format!(
        "Act as a Master Sports Graphic Designer for a professional TV Broadcast.
Task: Create a 4K \"Match Day\" banner with PERFECT SPELLING.

PRIMARY TEXT ASSETS:
- HOME: {home_upper}
- AWAY: {away_upper}
- TOURNAMENT: {tournament}
- TIME: {date}

VISUAL STYLE:
- Theme: {theme}

{rules}

TECHNICAL SPECIFICATIONS:
- Resolution: 4K UHD, 16:9 Aspect Ratio.
- Accuracy: Zero spelling errors on \"{home}\" and \"{away}\".",
        home_upper = details.home_display(),
        away_upper = details.away_display(),
        tournament = details.tournament_display(),
        date = details.match_date,
        theme = style_theme(details.style),
        rules = branding_rules(home, away),
    );

    if logos.home {
        prompt.push_str(&format!("\n- USE LOGO ASSET 1 FOR {}.", details.home_display()));
    }
    if logos.away {
        prompt.push_str(&format!("\n- USE LOGO ASSET 2 FOR {}.", details.away_display()));
    }
    prompt
}
