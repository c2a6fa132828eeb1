//! Asset resolution: source parsing, background decoding, and the per-slot
//! cache the renderer reads from.
//!
//! Each request decodes on its own worker thread and reports back over a
//! channel. Only [`AssetCache::poll`] and [`AssetCache::wait`] mutate the
//! cache, so the render path never races a decode.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tiny_skia::Pixmap;
use url::Url;

use crate::canvas::pixmap_from_rgba8;
use crate::renderer::LoadedAssets;
use crate::schema::MatchDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    Background,
    HomeLogo,
    AwayLogo,
}

impl AssetSlot {
    pub const ALL: [Self; 3] = [Self::Background, Self::HomeLogo, Self::AwayLogo];

    pub fn key(self) -> &'static str {
        match self {
            Self::Background => "bg",
            Self::HomeLogo => "homeLogo",
            Self::AwayLogo => "awayLogo",
        }
    }

    /// The effective source for this slot, inline data first.
    pub fn source_in(self, details: &MatchDetails) -> Option<&str> {
        match self {
            Self::Background => details.background_source(),
            Self::HomeLogo => details.home_logo_source(),
            Self::AwayLogo => details.away_logo_source(),
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Inline { mime: String, bytes: Vec<u8> },
    Remote(Url),
    File(PathBuf),
}

impl AssetSource {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("asset source is empty");
        }

        if let Some(rest) = strip_prefix_ignore_case(raw, "data:") {
            return parse_data_url(rest);
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).with_context(|| format!("invalid asset URL '{raw}'"))?;
            return Ok(Self::Remote(url));
        }
        if lower.starts_with("file://") {
            let url = Url::parse(raw).with_context(|| format!("invalid file URL '{raw}'"))?;
            let path = url
                .to_file_path()
                .map_err(|_| anyhow!("file URL '{raw}' does not name a local path"))?;
            return Ok(Self::File(path));
        }
        if let Some((scheme, _)) = raw.split_once("://") {
            bail!("unsupported asset scheme '{scheme}'");
        }

        Ok(Self::File(PathBuf::from(raw)))
    }

    pub fn load_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Inline { bytes, .. } => Ok(bytes.clone()),
            Self::Remote(url) => fetch_remote(url),
            Self::File(path) => {
                fs::read(path).with_context(|| format!("failed to read asset '{}'", path.display()))
            }
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn parse_data_url(rest: &str) -> Result<AssetSource> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("data URL has no payload separator"))?;
    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim();
    let mime = if mime.is_empty() { "text/plain" } else { mime };
    if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
        bail!("only base64 data URLs are supported (got '{mime}')");
    }

    let compact = payload
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect::<String>();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .context("data URL payload is not valid base64")?;
    Ok(AssetSource::Inline {
        mime: mime.to_owned(),
        bytes,
    })
}

#[cfg(feature = "remote_assets")]
fn fetch_remote(url: &Url) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .context("failed to build HTTP client")?;
    let response = client
        .get(url.clone())
        .send()
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("request to {url} was rejected"))?;
    let bytes = response
        .bytes()
        .with_context(|| format!("failed to read body of {url}"))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote_assets"))]
fn fetch_remote(url: &Url) -> Result<Vec<u8>> {
    bail!("cannot fetch {url}: built without the remote_assets feature")
}

/// Short form for logs; data URLs are reduced to their mime type and size.
pub fn describe_source(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(rest) = strip_prefix_ignore_case(raw, "data:") {
        let mime = rest.split([';', ',']).next().unwrap_or_default();
        return format!("data:{mime} ({} chars)", raw.len());
    }
    raw.to_owned()
}

/// Decodes PNG/JPEG/WebP bytes into a premultiplied pixmap.
pub fn decode_image(bytes: &[u8]) -> Result<Pixmap> {
    let image = image::load_from_memory(bytes).context("failed to decode image")?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        bail!("decoded image is empty");
    }
    pixmap_from_rgba8(width, height, rgba.as_raw())
        .ok_or_else(|| anyhow!("decoded image {width}x{height} does not fit a pixmap"))
}

pub fn load_source(raw: &str) -> Result<Pixmap> {
    let source = AssetSource::parse(raw)?;
    let bytes = source.load_bytes()?;
    decode_image(&bytes)
}

struct Completion {
    slot: AssetSlot,
    source: String,
    result: Result<Pixmap>,
}

struct LoadedAsset {
    source: String,
    image: Pixmap,
}

/// Decoded images keyed by slot, invalidated when a slot's source changes.
pub struct AssetCache {
    requested: HashMap<AssetSlot, String>,
    loaded: HashMap<AssetSlot, LoadedAsset>,
    in_flight: usize,
    sender: mpsc::Sender<Completion>,
    receiver: mpsc::Receiver<Completion>,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetCache {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            requested: HashMap::new(),
            loaded: HashMap::new(),
            in_flight: 0,
            sender,
            receiver,
        }
    }

    /// Requests every slot's current source. Returns whether the loaded set
    /// changed right away (a slot was cleared).
    pub fn sync(&mut self, details: &MatchDetails) -> bool {
        let mut changed = false;
        for slot in AssetSlot::ALL {
            changed |= self.request(slot, slot.source_in(details));
        }
        changed
    }

    /// Starts a decode when `source` differs from the last request for
    /// `slot`. The previous image stays visible until its replacement lands.
    pub fn request(&mut self, slot: AssetSlot, source: Option<&str>) -> bool {
        self.request_with(slot, source, load_source)
    }

    fn request_with(
        &mut self,
        slot: AssetSlot,
        source: Option<&str>,
        load: fn(&str) -> Result<Pixmap>,
    ) -> bool {
        let Some(source) = source.map(str::trim).filter(|source| !source.is_empty()) else {
            self.requested.remove(&slot);
            return self.loaded.remove(&slot).is_some();
        };
        if self.requested.get(&slot).map(String::as_str) == Some(source) {
            return false;
        }

        self.requested.insert(slot, source.to_owned());
        log::debug!("requesting {slot} from {}", describe_source(source));

        let sender = self.sender.clone();
        let owned = source.to_owned();
        let spawned = thread::Builder::new()
            .name(format!("matchday-asset-{}", slot.key()))
            .spawn(move || {
                // A panicking decoder still reports, so `in_flight` drains.
                let result = panic::catch_unwind(AssertUnwindSafe(|| load(&owned)))
                    .unwrap_or_else(|_| Err(anyhow!("decoder panicked")));
                let _ = sender.send(Completion {
                    slot,
                    source: owned,
                    result,
                });
            });

        match spawned {
            Ok(_) => {
                self.in_flight += 1;
                false
            }
            Err(error) => {
                log::warn!("failed to spawn decoder for {slot}: {error}");
                self.loaded.remove(&slot).is_some()
            }
        }
    }

    /// Applies finished decodes without blocking. Returns whether any slot changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.receiver.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    /// Blocks until every outstanding decode reports or `timeout` passes.
    /// A timeout too large for an `Instant` waits without a deadline.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut changed = self.poll();
        while self.in_flight > 0 {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        log::warn!("{} asset decode(s) still pending after {timeout:?}", self.in_flight);
                        break;
                    }
                    self.receiver.recv_timeout(remaining).ok()
                }
                None => match self.receiver.recv() {
                    Ok(completion) => Some(completion),
                    Err(_) => break,
                },
            };
            if let Some(completion) = received {
                changed |= self.apply(completion);
            }
        }
        changed
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight
    }

    pub fn get(&self, slot: AssetSlot) -> Option<&Pixmap> {
        self.loaded.get(&slot).map(|asset| &asset.image)
    }

    /// The source string the image in `slot` was decoded from.
    pub fn loaded_source(&self, slot: AssetSlot) -> Option<&str> {
        self.loaded.get(&slot).map(|asset| asset.source.as_str())
    }

    pub fn loaded_assets(&self) -> LoadedAssets<'_> {
        LoadedAssets {
            background: self.get(AssetSlot::Background),
            home_logo: self.get(AssetSlot::HomeLogo),
            away_logo: self.get(AssetSlot::AwayLogo),
        }
    }

    fn apply(&mut self, completion: Completion) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Completion {
            slot,
            source,
            result,
        } = completion;

        if self.requested.get(&slot) != Some(&source) {
            log::debug!("dropping superseded {slot} decode of {}", describe_source(&source));
            return false;
        }

        match result {
            Ok(image) => {
                log::info!(
                    "loaded {slot} ({}x{}) from {}",
                    image.width(),
                    image.height(),
                    describe_source(&source)
                );
                self.loaded.insert(slot, LoadedAsset { source, image });
                true
            }
            Err(error) => {
                log::warn!("failed to load {slot} from {}: {error:#}", describe_source(&source));
                self.loaded.remove(&slot).is_some()
            }
        }
    }
}
