//! Source ↔ display coordinate mapping with pan and zoom.
//!
//! A [`Viewport`] places an image of natural size `(W, H)` inside a frame
//! rectangle `C = (cx, cy, cw, ch)`:
//!
//! ```text
//! base      = min(cw/W, ch/H)          (Contain: primary image)
//!           = max(cw/W, ch/H)          (Cover: grid tile)
//! displayed = (W·base·s, H·base·s)
//! origin    = (cx + (cw − displayedW)/2 + ox, cy + (ch − displayedH)/2 + oy)
//! source    = (display − origin) / (base·s)
//! ```
//!
//! ## Pan clamp
//!
//! After every pan, zoom or frame change, each axis is clamped independently:
//! when the displayed size does not exceed the frame the offset is forced to
//! zero (centered, never stretched); otherwise it is limited to
//! `±(displayed − frame)/2`, so the image always covers the frame on that axis.

use crate::types::{Point, RectF, Size, SourceRect};

/// How the image is scaled into its frame at zoom 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Whole image visible, letterboxed on one axis.
    Contain,
    /// Frame fully covered, overflow cropped.
    Cover,
}

pub const MIN_ZOOM: f64 = 1.0;

/// Clamp one axis of a pan offset against displayed and frame extents.
pub fn clamp_offset(offset: f64, displayed: f64, frame: f64) -> f64 {
    if displayed <= frame {
        0.0
    } else {
        let limit = (displayed - frame) / 2.0;
        offset.clamp(-limit, limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    frame: RectF,
    image: Size,
    fit: FitMode,
    zoom: f64,
    max_zoom: f64,
    offset: Point,
}

impl Viewport {
    pub fn new(frame: RectF, image: Size, fit: FitMode, max_zoom: f64) -> Self {
        Self {
            frame,
            image,
            fit,
            zoom: MIN_ZOOM,
            max_zoom: max_zoom.max(MIN_ZOOM),
            offset: Point::default(),
        }
    }

    /// Restore a stored zoom/offset pair, re-applying both clamps.
    pub fn with_state(mut self, zoom: f64, offset: Point) -> Self {
        self.zoom = zoom.clamp(MIN_ZOOM, self.max_zoom);
        self.offset = offset;
        self.clamp();
        self
    }

    pub fn frame(&self) -> RectF {
        self.frame
    }

    pub fn image(&self) -> Size {
        self.image
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Scale at zoom 1.
    pub fn base_scale(&self) -> f64 {
        if self.image.is_empty() || self.frame.width <= 0.0 || self.frame.height <= 0.0 {
            return 1.0;
        }
        let sx = self.frame.width / self.image.width;
        let sy = self.frame.height / self.image.height;
        match self.fit {
            FitMode::Contain => sx.min(sy),
            FitMode::Cover => sx.max(sy),
        }
    }

    /// Display pixels per source pixel.
    pub fn scale(&self) -> f64 {
        self.base_scale() * self.zoom
    }

    pub fn displayed_size(&self) -> Size {
        let s = self.scale();
        Size::new(self.image.width * s, self.image.height * s)
    }

    pub fn origin(&self) -> Point {
        let displayed = self.displayed_size();
        Point::new(
            self.frame.x + (self.frame.width - displayed.width) / 2.0 + self.offset.x,
            self.frame.y + (self.frame.height - displayed.height) / 2.0 + self.offset.y,
        )
    }

    /// Where the whole image lands on screen (may extend past the frame).
    pub fn image_rect(&self) -> RectF {
        let origin = self.origin();
        let size = self.displayed_size();
        RectF::new(origin.x, origin.y, size.width, size.height)
    }

    /// Part of the image visible through the frame, in display space.
    pub fn visible_rect(&self) -> RectF {
        let img = self.image_rect();
        let x0 = img.x.max(self.frame.x);
        let y0 = img.y.max(self.frame.y);
        let x1 = img.right().min(self.frame.right());
        let y1 = img.bottom().min(self.frame.bottom());
        RectF::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    pub fn to_source(&self, p: Point) -> Point {
        let origin = self.origin();
        let s = self.scale();
        Point::new((p.x - origin.x) / s, (p.y - origin.y) / s)
    }

    pub fn to_display(&self, p: Point) -> Point {
        let origin = self.origin();
        let s = self.scale();
        Point::new(origin.x + p.x * s, origin.y + p.y * s)
    }

    /// Project a source-space rectangle onto the display.
    pub fn rect_to_display(&self, r: &SourceRect) -> RectF {
        let a = self.to_display(Point::new(r.x0(), r.y0()));
        let b = self.to_display(Point::new(r.x1(), r.y1()));
        RectF::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }

    /// Map a display rectangle (any two corners) into source space.
    pub fn rect_to_source(&self, a: Point, b: Point) -> SourceRect {
        SourceRect::from_corners(self.to_source(a), self.to_source(b))
    }

    /// Apply the pan clamp law to the current offset.
    pub fn clamp(&mut self) {
        let displayed = self.displayed_size();
        self.offset = Point::new(
            clamp_offset(self.offset.x, displayed.width, self.frame.width),
            clamp_offset(self.offset.y, displayed.height, self.frame.height),
        );
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset = Point::new(self.offset.x + dx, self.offset.y + dy);
        self.clamp();
    }

    /// Replace the frame (container resize) and re-clamp.
    pub fn set_frame(&mut self, frame: RectF) {
        self.frame = frame;
        self.clamp();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, self.max_zoom);
        self.clamp();
    }

    /// Multiply the zoom by `factor`, keeping the image point under `anchor` fixed
    /// (as far as the pan clamp allows).
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let pinned = self.to_source(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, self.max_zoom);

        let s = self.scale();
        let displayed = self.displayed_size();
        self.offset = Point::new(
            anchor.x - pinned.x * s - self.frame.x - (self.frame.width - displayed.width) / 2.0,
            anchor.y - pinned.y * s - self.frame.y - (self.frame.height - displayed.height) / 2.0,
        );
        self.clamp();
    }

    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.offset = Point::default();
    }
}
