//! Editor configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialised to a TOML value and the user file is merged on top of it, so a
//! config file only needs the keys it wants to change. The configuration is
//! read-only: nothing the editor does is written back.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [crop]
//! min_size = 40.0        # Smallest crop edge, display px
//! handle_radius = 10.0   # Handle hit radius, display px
//! move_inset = 20.0      # Inner margin that starts a move
//!
//! [zoom]
//! max_image = 10.0       # Zoom ceiling for the single image
//! max_tile = 5.0         # Zoom ceiling for grid tiles
//! wheel_step = 1.1       # Zoom factor per wheel notch
//!
//! [banners]
//! default_ratio = 0.25   # Thickness ratio of an empty banner
//! gap = 12               # Gap between banner and content, px
//! gap_at_banners = true
//!
//! [grid]
//! columns = 2
//! gap = 12
//! background = "#111111"
//! policy = "uniform"     # "uniform" or "fit"
//! export_long_edge = 3000
//!
//! [effects]
//! blur_per_strength = 0.5
//! reference_dimension = 1000.0
//! debounce_ms = 150
//!
//! [output]
//! crop_suffix = "_cropped"
//! collage_suffix = "_collage"
//! jpeg_quality = 98
//! status_ms = 3000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::crop::CropSettings;
use crate::grid::{CellPolicy, GridSettings};
use crate::imaging::{EffectParams, Quality};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub crop: CropConfig,
    pub zoom: ZoomConfig,
    pub banners: BannersConfig,
    pub grid: GridConfig,
    pub effects: EffectsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub min_size: f64,
    pub handle_radius: f64,
    pub move_inset: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_size: 40.0,
            handle_radius: 10.0,
            move_inset: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    pub max_image: f64,
    pub max_tile: f64,
    pub wheel_step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            max_image: 10.0,
            max_tile: 5.0,
            wheel_step: 1.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BannersConfig {
    pub default_ratio: f64,
    pub gap: u32,
    pub gap_at_banners: bool,
}

impl Default for BannersConfig {
    fn default() -> Self {
        Self {
            default_ratio: 0.25,
            gap: 12,
            gap_at_banners: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub columns: usize,
    pub gap: u32,
    pub background: String,
    pub policy: CellPolicy,
    pub export_long_edge: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            gap: 12,
            background: "#111111".to_string(),
            policy: CellPolicy::Uniform,
            export_long_edge: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectsConfig {
    pub blur_per_strength: f64,
    pub reference_dimension: f64,
    pub debounce_ms: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            blur_per_strength: 0.5,
            reference_dimension: 1000.0,
            debounce_ms: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub crop_suffix: String,
    pub collage_suffix: String,
    pub jpeg_quality: u32,
    pub status_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            crop_suffix: "_cropped".to_string(),
            collage_suffix: "_collage".to_string(),
            jpeg_quality: 98,
            status_ms: 3000,
        }
    }
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        _ => None,
    }
}

impl EditorConfig {
    /// Reject values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("crop.min_size", self.crop.min_size),
            ("crop.handle_radius", self.crop.handle_radius),
            ("zoom.wheel_step", self.zoom.wheel_step),
            ("banners.default_ratio", self.banners.default_ratio),
            ("effects.reference_dimension", self.effects.reference_dimension),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!("{key} must be positive")));
            }
        }
        if !(self.crop.move_inset >= 0.0) || !(self.effects.blur_per_strength >= 0.0) {
            return Err(ConfigError::Validation(
                "crop.move_inset and effects.blur_per_strength must not be negative".into(),
            ));
        }
        if !(self.zoom.max_image >= 1.0 && self.zoom.max_tile >= 1.0) {
            return Err(ConfigError::Validation(
                "zoom.max_image and zoom.max_tile must be at least 1".into(),
            ));
        }
        if self.grid.columns == 0 {
            return Err(ConfigError::Validation("grid.columns must be at least 1".into()));
        }
        if self.grid.export_long_edge == 0 {
            return Err(ConfigError::Validation(
                "grid.export_long_edge must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if parse_hex_color(&self.grid.background).is_none() {
            return Err(ConfigError::Validation(format!(
                "grid.background '{}' is not a hex colour",
                self.grid.background
            )));
        }
        Ok(())
    }

    pub fn crop_settings(&self) -> CropSettings {
        CropSettings {
            min_size: self.crop.min_size,
            handle_radius: self.crop.handle_radius,
            move_inset: self.crop.move_inset,
        }
    }

    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            columns: self.grid.columns,
            gap: self.grid.gap,
            background: self.background(),
            policy: self.grid.policy,
            max_zoom: self.zoom.max_tile,
            gap_at_banners: self.banners.gap_at_banners,
        }
    }

    /// Grid background; falls back to the stock colour if unparsable.
    pub fn background(&self) -> [u8; 3] {
        parse_hex_color(&self.grid.background).unwrap_or([0x11, 0x11, 0x11])
    }

    pub fn effect_params(&self) -> EffectParams {
        EffectParams {
            blur_per_strength: self.effects.blur_per_strength,
            reference_dimension: self.effects.reference_dimension,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.effects.debounce_ms)
    }

    pub fn status_duration(&self) -> Duration {
        Duration::from_millis(self.output.status_ms)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table, the bottom layer of every resolved config.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(EditorConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config: {e}")))
}

/// Deep-merge `overlay` into `base`: tables merge per key, anything else in
/// `overlay` replaces the base value, and base-only keys survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. A missing file is `Ok(None)`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EditorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path` over the stock defaults.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Commented stock `config.toml`, printed by `cropper gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Cropper Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Crop interaction (display pixels)
# ---------------------------------------------------------------------------
[crop]
# Rectangles smaller than this on either edge are discarded on release.
min_size = 40.0
# A press within this distance of a handle starts a resize.
handle_radius = 10.0
# A press this far inside the rectangle starts a move.
move_inset = 20.0

# ---------------------------------------------------------------------------
# Zoom
# ---------------------------------------------------------------------------
[zoom]
# Zoom ceiling for the single image (floor is always 1).
max_image = 10.0
# Zoom ceiling for each grid tile.
max_tile = 5.0
# Zoom factor applied per mouse-wheel notch.
wheel_step = 1.1

# ---------------------------------------------------------------------------
# Banners
# ---------------------------------------------------------------------------
[banners]
# Thickness ratio for a banner with no image (relative to the content edge).
default_ratio = 0.25
# Gap between a banner and the content, in pixels.
gap = 12
# Set to false to butt banners directly against the content.
gap_at_banners = true

# ---------------------------------------------------------------------------
# Collage grid
# ---------------------------------------------------------------------------
[grid]
columns = 2
# Gap between cells, in pixels.
gap = 12
# Canvas colour behind cells and empty banners.
background = "#111111"
# "uniform": equal cells, each tile cropped to cover its cell.
# "fit": rows sized so every tile shows whole at its own aspect.
policy = "uniform"
# Long edge of the exported collage, in pixels.
export_long_edge = 3000

# ---------------------------------------------------------------------------
# Effects
# ---------------------------------------------------------------------------
[effects]
# Blur sigma per strength unit for an image whose long edge is
# reference_dimension pixels; larger images blur proportionally more.
blur_per_strength = 0.5
reference_dimension = 1000.0
# Slider changes are coalesced; the preview recomputes this long after the last one.
debounce_ms = 150

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Saved files are named <stem><suffix><ext>, then <stem><suffix>_1<ext>, ...
crop_suffix = "_cropped"
collage_suffix = "_collage"
# JPEG encoding quality (1 = worst, 100 = best).
jpeg_quality = 98
# How long "Saved as" stays up before the editor resets, in milliseconds.
status_ms = 3000
"##
}
