//! Parameter types for image operations.
//!
//! These describe *what* to do, not *how*: the compositor and the save path
//! read them, the backend never does.
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 98). Clamped on construction.
//! - [`EffectKind`] / [`EffectState`]: the masked effect and its strength.
//! - [`EffectParams`]: constants of the resolution-aware strength formulas.
//! - [`OutputFormat`]: encoder chosen from the destination extension.

use serde::{Deserialize, Serialize};
use std::path::Path;


/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(98)
    }
}

pub const MAX_STRENGTH: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    None,
    Blur,
    Pixelate,
}

impl EffectKind {
    pub fn label(self) -> &'static str {
        match self {
            EffectKind::None => "none",
            EffectKind::Blur => "blur",
            EffectKind::Pixelate => "pixelate",
        }
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(EffectKind::None),
            "blur" => Ok(EffectKind::Blur),
            "pixelate" => Ok(EffectKind::Pixelate),
            other => Err(format!("unknown effect '{other}'")),
        }
    }
}

/// Current effect selection. Strength is always within `0..=MAX_STRENGTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectState {
    kind: EffectKind,
    strength: u32,
    enabled_for_save: bool,
}

impl EffectState {
    pub fn new(kind: EffectKind, strength: u32) -> Self {
        Self {
            kind,
            strength: strength.min(MAX_STRENGTH),
            enabled_for_save: true,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    pub fn enabled_for_save(&self) -> bool {
        self.enabled_for_save
    }

    pub fn set_kind(&mut self, kind: EffectKind) {
        self.kind = kind;
    }

    pub fn set_strength(&mut self, strength: u32) {
        self.strength = strength.min(MAX_STRENGTH);
    }

    pub fn set_enabled_for_save(&mut self, enabled: bool) {
        self.enabled_for_save = enabled;
    }

    /// True when compositing would change any pixel.
    pub fn is_active(&self) -> bool {
        self.kind != EffectKind::None && self.strength > 0
    }

    pub fn applies_to_save(&self) -> bool {
        self.enabled_for_save && self.is_active()
    }
}

impl Default for EffectState {
    fn default() -> Self {
        Self::new(EffectKind::None, 10)
    }
}

/// Constants of the strength → radius formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    /// Blur sigma per strength unit at `reference_dimension`.
    pub blur_per_strength: f64,
    /// Long edge (px) at which `blur_per_strength` applies unscaled.
    pub reference_dimension: f64,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            blur_per_strength: 0.5,
            reference_dimension: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Tiff,
    WebP,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Format named by a path's extension, if it is one we encode.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
            OutputFormat::WebP => "webp",
        }
    }
}
