//! Render configuration, loadable from TOML.

use crate::error::{RenderError, RenderResult};
use rastyle_canvas::{FontConfig, ResolvedFontConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bounds for the number of concurrent raster fetches.
pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 64;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Concurrent raw-raster fetches; clamped to [1, 64] when used.
    pub max_workers: usize,
    /// Accept requests whose aspect ratio differs from the native one.
    pub allow_reaspect: bool,
    /// Relative aspect ratio difference tolerated without re-aspecting.
    pub aspect_tolerance: f64,
    pub relief: ReliefConfig,
    pub font: FontSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_workers: 1,
            allow_reaspect: false,
            aspect_tolerance: 0.01,
            relief: ReliefConfig::default(),
            font: FontSettings::default(),
        }
    }
}

/// Light source for shaded relief, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefConfig {
    /// Compass direction of the light, clockwise from north.
    pub azimuth: f64,
    /// Elevation of the light above the horizon.
    pub altitude: f64,
}

impl Default for ReliefConfig {
    fn default() -> Self {
        Self {
            azimuth: 315.0,
            altitude: 45.0,
        }
    }
}

/// Font settings for label rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    pub load_system_fonts: bool,
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl FontSettings {
    pub fn to_font_config(&self) -> FontConfig {
        FontConfig {
            load_system_fonts: self.load_system_fonts,
            font_dirs: self.font_dirs.clone(),
            ..FontConfig::default()
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(content: &str) -> RenderResult<Self> {
        toml::from_str(content).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RenderError::Config(format!("failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Font database for contexts that render labels, e.g.
    /// `GraphicsContext::new_bitmap(w, h)?.with_fonts(&config.resolve_fonts())`.
    pub fn resolve_fonts(&self) -> ResolvedFontConfig {
        let fonts = self.font.to_font_config().resolve();
        log::debug!(target: "vector", "{} font faces available for labels", fonts.face_count());
        fonts
    }

    /// `max_workers` clamped to the supported range.
    pub fn worker_count(&self) -> usize {
        self.max_workers.clamp(MIN_WORKERS, MAX_WORKERS)
    }
}
