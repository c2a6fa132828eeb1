use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use fontdue::{Font, FontSettings};

use crate::encoding::sha256_hex;
use crate::text::Face;

/// Heavy faces tried for team names, "vs" and the Elite tournament line.
pub const DISPLAY_FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Regular faces tried for dates and secondary captions.
pub const BODY_FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The two faces every layout draws with.
pub struct FontBook {
    pub display: Face,
    pub body: Face,
}

impl FontBook {
    /// Both roles on the built-in block face; output depends on nothing on disk.
    pub fn builtin() -> Self {
        Self {
            display: Face::Block,
            body: Face::Block,
        }
    }

    /// Explicit paths must load. Missing paths fall back to the first readable
    /// system candidate, then to the built-in face.
    pub fn load(display: Option<&Path>, body: Option<&Path>) -> Result<Self> {
        Ok(Self {
            display: resolve_face("display", display, &DISPLAY_FONT_CANDIDATES)?,
            body: resolve_face("body", body, &BODY_FONT_CANDIDATES)?,
        })
    }
}

fn resolve_face(role: &str, explicit: Option<&Path>, candidates: &[&str]) -> Result<Face> {
    if let Some(path) = explicit {
        return load_face(path).with_context(|| format!("failed to load {role} font"));
    }

    if let Some(path) = probe_candidates(candidates) {
        match load_face(&path) {
            Ok(face) => return Ok(face),
            Err(error) => log::warn!("skipping {role} font candidate: {error:#}"),
        }
    }

    log::warn!("no {role} font found; using the built-in block face");
    Ok(Face::Block)
}

pub fn probe_candidates(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

pub fn load_face(path: &Path) -> Result<Face> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read font file '{}'", path.display()))?;
    let fingerprint = sha256_hex(&bytes);
    let font = Font::from_bytes(bytes, FontSettings::default())
        .map_err(|error| anyhow!("failed to parse font '{}': {error}", path.display()))?;
    log::info!("loaded font {} (sha256={})", path.display(), &fingerprint[..12]);
    Ok(Face::Outline(Box::new(font)))
}

/// Characters the face would draw as `.notdef`, each once, in code point order.
pub fn missing_codepoints(face: &Face, text: &str) -> Vec<char> {
    text.chars()
        .filter(|ch| !face.has_glyph(*ch))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
