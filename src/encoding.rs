use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tiny_skia::Pixmap;

use crate::canvas::pixmap_to_rgba8;
use crate::preset::{ExportFormat, RenderPreset};

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// An encoded frame ready to be written or handed to a download action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
        }
        fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write banner '{}'", path.display()))
    }
}

pub fn encode_frame(frame: &Pixmap, format: ExportFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        bail!("cannot encode an empty frame");
    }
    let rgba = pixmap_to_rgba8(frame);
    let mut out = Vec::new();

    match format {
        ExportFormat::Jpeg => {
            let rgb = rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect::<Vec<_>>();
            JpegEncoder::new_with_quality(&mut out, jpeg_quality.clamp(1, 100))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .context("failed to encode JPEG")?;
        }
        ExportFormat::Png => {
            PngEncoder::new(&mut out)
                .write_image(&rgba, width, height, ExtendedColorType::Rgba8)
                .context("failed to encode PNG")?;
        }
    }
    Ok(out)
}

pub fn export_frame(
    frame: &Pixmap,
    preset: RenderPreset,
    home_team: &str,
    away_team: &str,
    jpeg_quality: u8,
) -> Result<ExportArtifact> {
    let format = preset.export_format();
    let bytes = encode_frame(frame, format, jpeg_quality)?;
    Ok(ExportArtifact {
        file_name: suggested_filename(preset, home_team, away_team),
        mime: format.mime(),
        bytes,
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Digest of the raw premultiplied frame; stable across encoders.
pub fn frame_sha256(frame: &Pixmap) -> String {
    sha256_hex(frame.data())
}

/// `<prefix>-<home>-vs-<away>.<ext>`, lower-case alphanumerics and `-` only.
pub fn suggested_filename(preset: RenderPreset, home_team: &str, away_team: &str) -> String {
    format!(
        "{}-{}-vs-{}.{}",
        preset.file_stem_prefix(),
        slugify(home_team),
        slugify(away_team),
        preset.export_format().extension()
    )
}

fn slugify(value: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators = SEPARATORS.get_or_init(|| {
        Regex::new(r"[^a-z0-9]+").expect("separator regex should compile")
    });
    let lowered = value.to_lowercase();
    let slug = separators.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "team".to_owned()
    } else {
        slug.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::pixmap_from_rgba8;

    fn frame() -> Pixmap {
        pixmap_from_rgba8(4, 2, &[10_u8, 20, 30, 255].repeat(8)).unwrap()
    }

    #[test]
    fn filename_is_lowercase_and_ordered() {
        let name = suggested_filename(RenderPreset::Broadcast, "Real Madrid", "FC Barcelona");
        assert_eq!(name, "matchday-real-madrid-vs-fc-barcelona.jpg");
        assert_eq!(
            suggested_filename(RenderPreset::Compact, "  Man. United!! ", "Atlético"),
            "offline-banner-man-united-vs-atl-tico.png"
        );
    }

    #[test]
    fn unrepresentable_names_fall_back() {
        assert_eq!(
            suggested_filename(RenderPreset::Broadcast, "???", "Inter"),
            "matchday-team-vs-inter.jpg"
        );
    }

    #[test]
    fn encodes_jpeg_and_png_signatures() {
        let jpeg = encode_frame(&frame(), ExportFormat::Jpeg, 92).unwrap();
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);
        let png = encode_frame(&frame(), ExportFormat::Png, 92).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn sha256_is_lowercase_hex() {
        let hex = sha256_hex(b"matchday");
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
        assert_eq!(frame_sha256(&frame()), frame_sha256(&frame()));
    }

    #[test]
    fn png_round_trips_pixels() {
        let png = encode_frame(&frame(), ExportFormat::Png, 0).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 1).0, [10, 20, 30, 255]);
    }
}
