use std::fmt;

use anyhow::{anyhow, Result};
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

use crate::error_codes::{CodedError, EMPTY_TEAM_NAME, INVALID_COLOR, INVALID_LAYOUT, INVALID_STYLE};

/// One banner request. Replaced wholesale on every edit; never mutated by the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchDetails {
    pub home_team: String,
    pub away_team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_logo_url: Option<String>,
    #[serde(default)]
    pub tournament: String,
    #[serde(default)]
    pub match_date: String,
    #[serde(default)]
    pub style: BannerStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    #[serde(default)]
    pub layout: ManualLayout,
    #[serde(default = "ColorRgba::white")]
    pub text_color: ColorRgba,
    #[serde(default = "ColorRgba::white")]
    pub accent_color: ColorRgba,
}

impl MatchDetails {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_logo: None,
            home_logo_url: None,
            away_logo: None,
            away_logo_url: None,
            tournament: String::new(),
            match_date: String::new(),
            style: BannerStyle::default(),
            custom_background: None,
            background_url: None,
            layout: ManualLayout::default(),
            text_color: ColorRgba::white(),
            accent_color: ColorRgba::white(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("homeTeam", &self.home_team), ("awayTeam", &self.away_team)] {
            if value.trim().is_empty() {
                return Err(anyhow!(CodedError::input(
                    EMPTY_TEAM_NAME,
                    format!("{field} must not be empty"),
                )
                .with_details(json!({ "field": field }))));
            }
        }
        Ok(())
    }

    /// Inline upload wins over the URL form; blank strings count as absent.
    pub fn background_source(&self) -> Option<&str> {
        first_present(&self.custom_background, &self.background_url)
    }

    pub fn home_logo_source(&self) -> Option<&str> {
        first_present(&self.home_logo, &self.home_logo_url)
    }

    pub fn away_logo_source(&self) -> Option<&str> {
        first_present(&self.away_logo, &self.away_logo_url)
    }

    pub fn home_display(&self) -> String {
        self.home_team.to_uppercase()
    }

    pub fn away_display(&self) -> String {
        self.away_team.to_uppercase()
    }

    pub fn tournament_display(&self) -> String {
        self.tournament.to_uppercase()
    }
}

fn first_present<'a>(inline: &'a Option<String>, url: &'a Option<String>) -> Option<&'a str> {
    [inline, url]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Visual theme for the generated (AI) banner. Ignored by the layout renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BannerStyle {
    Modern,
    #[default]
    Epic,
    Neon,
    Vintage,
    Minimal,
}

impl BannerStyle {
    pub const ALL: [Self; 5] = [
        Self::Modern,
        Self::Epic,
        Self::Neon,
        Self::Vintage,
        Self::Minimal,
    ];

    pub fn from_keyword(value: &str) -> Result<Self> {
        let normalized = normalize_keyword(value);
        Self::ALL
            .into_iter()
            .find(|style| {
                normalized == style.keyword() || normalized == normalize_keyword(style.label())
            })
            .ok_or_else(|| {
                anyhow!(CodedError::usage(INVALID_STYLE, format!("invalid banner style '{value}'"))
                    .with_details(json!({
                        "provided": value,
                        "allowed": Self::ALL.map(Self::keyword),
                    })))
            })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Epic => "epic",
            Self::Neon => "neon",
            Self::Vintage => "vintage",
            Self::Minimal => "minimal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Modern => "Modern & Clean",
            Self::Epic => "Epic Stadium",
            Self::Neon => "Neon Cyberpunk",
            Self::Vintage => "Vintage Classic",
            Self::Minimal => "Minimalist",
        }
    }
}

/// Which drawing algorithm composes the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManualLayout {
    #[default]
    EliteBroadcast,
    ClassicVs,
    SplitScreen,
    BottomBranding,
}

impl ManualLayout {
    pub const ALL: [Self; 4] = [
        Self::EliteBroadcast,
        Self::ClassicVs,
        Self::SplitScreen,
        Self::BottomBranding,
    ];

    pub fn from_keyword(value: &str) -> Result<Self> {
        let normalized = normalize_keyword(value);
        Self::ALL
            .into_iter()
            .find(|layout| {
                normalized == layout.keyword() || normalized == normalize_keyword(layout.label())
            })
            .ok_or_else(|| {
                anyhow!(CodedError::usage(INVALID_LAYOUT, format!("invalid layout '{value}'"))
                    .with_details(json!({
                        "provided": value,
                        "allowed": Self::ALL.map(Self::keyword),
                    })))
            })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::EliteBroadcast => "elite-broadcast",
            Self::ClassicVs => "classic-vs",
            Self::SplitScreen => "split-screen",
            Self::BottomBranding => "bottom-branding",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EliteBroadcast => "Elite Broadcast (TV Style)",
            Self::ClassicVs => "Classic VS",
            Self::SplitScreen => "Split Screen",
            Self::BottomBranding => "Bottom Branding",
        }
    }
}

/// Lower-cases and collapses every run of non-alphanumerics to a single `-`,
/// so "Classic VS", "classic_vs" and "classic-vs" all compare equal.
fn normalize_keyword(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

macro_rules! keyword_serde {
    ($ty:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::from_keyword(&raw).map_err(|error| D::Error::custom(format!("{error:#}")))
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.keyword())
            }
        }
    };
}

keyword_serde!(BannerStyle);
keyword_serde!(ManualLayout);

/// 8-bit straight-alpha color, written as `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Same color at `alpha` (0..=1) of full opacity.
    pub fn with_opacity(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Same color with the alpha byte replaced, like appending `33` to `#rrggbb`.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    pub fn parse_hex(value: &str) -> Result<Self> {
        let invalid = || {
            anyhow!(CodedError::input(INVALID_COLOR, format!("invalid color '{value}'"))
                .with_details(json!({
                    "provided": value,
                    "expected": "#rgb, #rrggbb or #rrggbbaa",
                })))
        };

        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16);
        let nibble = |index: usize| u8::from_str_radix(&hex[index..index + 1], 16).map(|v| v * 17);

        let parsed = match hex.len() {
            3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
            6 => (byte(0), byte(2), byte(4), Ok(255)),
            8 => (byte(0), byte(2), byte(4), byte(6)),
            _ => return Err(invalid()),
        };
        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self { r, g, b, a }),
            _ => Err(invalid()),
        }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for ColorRgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for ColorRgba {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse_hex(&raw).map_err(|error| D::Error::custom(format!("{error:#}")))
    }
}

impl Serialize for ColorRgba {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::find_coded_error;

    #[test]
    fn inline_source_takes_precedence_over_url() {
        let mut details = MatchDetails::new("Home", "Away");
        details.home_logo_url = Some("https://cdn.example/home.png".to_owned());
        assert_eq!(details.home_logo_source(), Some("https://cdn.example/home.png"));

        details.home_logo = Some("data:image/png;base64,AAAA".to_owned());
        assert_eq!(details.home_logo_source(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn blank_inline_source_falls_through_to_url() {
        let mut details = MatchDetails::new("Home", "Away");
        details.custom_background = Some("   ".to_owned());
        details.background_url = Some("bg.png".to_owned());
        assert_eq!(details.background_source(), Some("bg.png"));

        details.background_url = Some(String::new());
        assert_eq!(details.background_source(), None);
    }

    #[test]
    fn layout_accepts_labels_and_keywords() {
        assert_eq!(
            ManualLayout::from_keyword("Elite Broadcast (TV Style)").unwrap(),
            ManualLayout::EliteBroadcast
        );
        assert_eq!(ManualLayout::from_keyword("classic_vs").unwrap(), ManualLayout::ClassicVs);
        assert_eq!(ManualLayout::from_keyword("Split-Screen").unwrap(), ManualLayout::SplitScreen);
        assert_eq!(BannerStyle::from_keyword("Neon Cyberpunk").unwrap(), BannerStyle::Neon);
    }

    #[test]
    fn unknown_layout_is_coded() {
        let error = ManualLayout::from_keyword("diagonal").unwrap_err();
        let coded = find_coded_error(&error).expect("layout error should be coded");
        assert_eq!(coded.code, INVALID_LAYOUT);
    }

    #[test]
    fn hex_colors_parse_in_all_widths() {
        assert_eq!(ColorRgba::parse_hex("#fff").unwrap(), ColorRgba::white());
        assert_eq!(ColorRgba::parse_hex("#1e293b").unwrap(), ColorRgba::rgb(0x1e, 0x29, 0x3b));
        assert_eq!(
            ColorRgba::parse_hex("#ff000033").unwrap(),
            ColorRgba::rgba(0xff, 0, 0, 0x33)
        );
        assert!(ColorRgba::parse_hex("red").is_err());
        assert!(ColorRgba::parse_hex("#12345").is_err());
        assert!(ColorRgba::parse_hex("#gggggg").is_err());
    }

    #[test]
    fn colors_round_trip_through_display() {
        let color = ColorRgba::rgba(0x4f, 0xe1, 0xb8, 0x22);
        assert_eq!(color.to_string(), "#4fe1b822");
        assert_eq!(ColorRgba::rgb(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn empty_team_name_fails_validation() {
        let details = MatchDetails::new("  ", "Arsenal");
        let error = details.validate().unwrap_err();
        assert_eq!(find_coded_error(&error).map(|e| e.code), Some(EMPTY_TEAM_NAME));
        assert!(MatchDetails::new("Spurs", "Arsenal").validate().is_ok());
    }

    #[test]
    fn match_details_deserialize_with_defaults() {
        let details: MatchDetails = serde_json::from_str(
            r##"{"homeTeam":"Tottenham","awayTeam":"Arsenal","layout":"Classic VS","accentColor":"#e11d48"}"##,
        )
        .expect("details should deserialize");
        assert_eq!(details.layout, ManualLayout::ClassicVs);
        assert_eq!(details.style, BannerStyle::Epic);
        assert_eq!(details.text_color, ColorRgba::white());
        assert_eq!(details.accent_color, ColorRgba::rgb(0xe1, 0x1d, 0x48));
        assert_eq!(details.home_display(), "TOTTENHAM");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<MatchDetails>(
            r#"{"homeTeam":"A","awayTeam":"B","venue":"Wembley"}"#,
        );
        assert!(result.is_err());
    }
}
