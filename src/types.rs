//! Shared types used across the layout, viewport, crop and imaging modules.
//!
//! Two coordinate families live here:
//!
//! - **Integer rectangles** ([`Rect`]) are what the layout solver emits and what
//!   the renderer draws into. They serialize, so a shell (or the CLI) can dump a
//!   layout as JSON.
//! - **Float rectangles** ([`RectF`], [`SourceRect`]) carry sub-pixel geometry:
//!   cell rectangles, displayed image bounds, and the canonical crop selection.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A decoded 3-channel raster. Immutable once decoded; replaced wholesale on load.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width() as f64, self.pixels.height() as f64)
    }

    /// Width over height. A zero-height raster reports 1.0.
    pub fn aspect(&self) -> f64 {
        if self.pixels.height() == 0 {
            1.0
        } else {
            self.pixels.width() as f64 / self.pixels.height() as f64
        }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

impl From<RgbImage> for RasterImage {
    fn from(pixels: RgbImage) -> Self {
        Self::new(pixels)
    }
}

/// A width/height pair in floating point (display pixels or source pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Integer pixel rectangle, as emitted by the layout solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// True when the two rectangles share any interior area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    pub fn to_f64(&self) -> RectF {
        RectF::new(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }
}

/// Floating-point rectangle in origin + size form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Shrink by `inset` on every side. A negative result collapses to the center.
    pub fn inset(&self, inset: f64) -> RectF {
        let w = (self.width - 2.0 * inset).max(0.0);
        let h = (self.height - 2.0 * inset).max(0.0);
        let c = self.center();
        RectF::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// Round to the integer grid, keeping at least one pixel on each axis.
    pub fn round(&self) -> Rect {
        let x = self.x.round();
        let y = self.y.round();
        let w = (self.right().round() - x).max(1.0);
        let h = (self.bottom().round() - y).max(1.0);
        Rect::new(x as i32, y as i32, w as u32, h as u32)
    }
}

/// Canonical crop selection in source-pixel space.
///
/// Always normalized: `x0 <= x1` and `y0 <= y1`. Constructors normalize, so
/// no mutation path can produce an inverted rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl SourceRect {
    /// Build from any two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::from_corners(Point::new(x0, y0), Point::new(x1, y1))
    }

    pub fn x0(&self) -> f64 {
        self.x0
    }

    pub fn y0(&self) -> f64 {
        self.y0
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn y1(&self) -> f64 {
        self.y1
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x0, self.y0, self.x1, self.y1)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    /// Clamp into `[0, width] x [0, height]`.
    pub fn clamped_to(&self, width: f64, height: f64) -> Self {
        Self::new(
            self.x0.clamp(0.0, width),
            self.y0.clamp(0.0, height),
            self.x1.clamp(0.0, width),
            self.y1.clamp(0.0, height),
        )
    }

    /// Integer pixel box `(x, y, w, h)` for cropping, clipped to the raster.
    ///
    /// Edges are floored/ceiled so the box covers every partially selected pixel.
    pub fn pixel_box(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x0 = (self.x0.floor().max(0.0) as u32).min(width);
        let y0 = (self.y0.floor().max(0.0) as u32).min(height);
        let x1 = (self.x1.ceil().max(0.0) as u32).min(width);
        let y1 = (self.y1.ceil().max(0.0) as u32).min(height);
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// One of the four banner positions around the content rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Left/right banners sit beside the content and share its height.
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(format!("unknown banner side '{other}'")),
        }
    }
}
