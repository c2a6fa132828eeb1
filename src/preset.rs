use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::json;

use crate::error_codes::{CodedError, INVALID_PRESET};

/// Reference width every layout constant is expressed in.
pub const REFERENCE_WIDTH: f32 = 1920.0;

/// Output targets. The two are deliberately distinct renderers, not one
/// renderer at two sizes: they differ in background treatment, overlays,
/// border policy and export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPreset {
    /// Full HD JPEG, no decorative border.
    #[default]
    Broadcast,
    /// 720p PNG with dark overlay, accent tint, footer text and border.
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl RenderPreset {
    pub fn from_keyword(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "broadcast" | "primary" | "1080p" => Ok(Self::Broadcast),
            "compact" | "alternate" | "offline" | "720p" => Ok(Self::Compact),
            _ => Err(anyhow!(CodedError::usage(
                INVALID_PRESET,
                format!("invalid render preset '{value}'"),
            )
            .with_details(json!({
                "provided": value,
                "allowed": ["broadcast", "compact"]
            })))),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::Compact => "compact",
        }
    }

    pub fn dimensions_px(self) -> (u32, u32) {
        match self {
            Self::Broadcast => (1920, 1080),
            Self::Compact => (1280, 720),
        }
    }

    /// Multiplier from reference units to this preset's pixels.
    pub fn unit_scale(self) -> f32 {
        let (width, _) = self.dimensions_px();
        width as f32 / REFERENCE_WIDTH
    }

    pub fn export_format(self) -> ExportFormat {
        match self {
            Self::Broadcast => ExportFormat::Jpeg,
            Self::Compact => ExportFormat::Png,
        }
    }

    pub fn file_stem_prefix(self) -> &'static str {
        match self {
            Self::Broadcast => "matchday",
            Self::Compact => "offline-banner",
        }
    }

    pub fn draws_border(self) -> bool {
        matches!(self, Self::Compact)
    }

    /// Whether team blocks show a translucent disc where a logo is missing.
    pub fn logo_placeholder(self) -> bool {
        matches!(self, Self::Compact)
    }
}
