//! Deterministic match-day banner rendering.
//!
//! A [`schema::MatchDetails`] plus decoded assets goes in, a composited
//! frame comes out through [`renderer::render_banner`], or statefully
//! through [`engine::BannerEngine`] with asset decoding and a debounced
//! redraw.

pub mod assets;
pub mod canvas;
pub mod encoding;
pub mod engine;
pub mod error_codes;
pub mod font_assets;
pub mod layout;
pub mod manifest;
pub mod preset;
pub mod prompt;
pub mod renderer;
pub mod schedule;
pub mod schema;
pub mod text;
