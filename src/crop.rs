//! Crop selection state machine.
//!
//! ```text
//!            press outside handles/inset          release (≥ min size)
//!   Idle ───────────────────────────────▶ Creating ─────────────────▶ Idle + rect
//!    │ │                                      │ release (< min size)
//!    │ │ press inside inset                   └──────────────────────▶ Idle, no rect
//!    │ └──────────────▶ Moving ──release──▶ Idle
//!    └─ press on handle ─▶ Resizing(handle) ──release──▶ Idle
//! ```
//!
//! The controller owns the crop rectangle in **source-pixel space**. Pointer
//! input arrives in display space together with the current [`Viewport`];
//! every display rectangle is projected from the source rectangle on demand
//! through [`CropController::display_rect`] and never stored.

use tracing::debug;

use crate::aspect::{AspectMode, HandleSet, aspect_fit};
use crate::types::{Point, RectF, Size, SourceRect};
use crate::viewport::Viewport;

/// Pixel thresholds for hit testing and minimum size, all in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSettings {
    /// Rectangles smaller than this on either axis are discarded on creation.
    pub min_size: f64,
    /// Distance within which a press grabs a handle.
    pub handle_radius: f64,
    /// Presses must be this far inside the rectangle to start a move.
    pub move_inset: f64,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            min_size: 40.0,
            handle_radius: 10.0,
            move_inset: 20.0,
        }
    }
}

/// Resize handle, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const CORNERS: [Handle; 4] = [Handle::NW, Handle::NE, Handle::SE, Handle::SW];
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    pub fn is_corner(self) -> bool {
        matches!(self, Handle::NE | Handle::NW | Handle::SE | Handle::SW)
    }

    pub fn for_set(set: HandleSet) -> &'static [Handle] {
        match set {
            HandleSet::All => &Handle::ALL,
            HandleSet::CornersOnly => &Handle::CORNERS,
        }
    }

    /// Anchor position on a display rectangle.
    fn position(self, r: &RectF) -> Point {
        let c = r.center();
        match self {
            Handle::N => Point::new(c.x, r.y),
            Handle::S => Point::new(c.x, r.bottom()),
            Handle::E => Point::new(r.right(), c.y),
            Handle::W => Point::new(r.x, c.y),
            Handle::NE => Point::new(r.right(), r.y),
            Handle::NW => Point::new(r.x, r.y),
            Handle::SE => Point::new(r.right(), r.bottom()),
            Handle::SW => Point::new(r.x, r.bottom()),
        }
    }

    /// The corner held fixed while this corner handle is dragged.
    fn opposite_corner(self, r: &SourceRect) -> Point {
        match self {
            Handle::NE => Point::new(r.x0(), r.y1()),
            Handle::NW => Point::new(r.x1(), r.y1()),
            Handle::SE => Point::new(r.x0(), r.y0()),
            Handle::SW => Point::new(r.x1(), r.y0()),
            // Edge handles have no opposite corner; callers only ask for corners.
            Handle::N | Handle::W => Point::new(r.x1(), r.y1()),
            Handle::S | Handle::E => Point::new(r.x0(), r.y0()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropState {
    Idle,
    Creating { anchor: Point },
    Moving { start: Point, snapshot: SourceRect },
    Resizing { handle: Handle, snapshot: SourceRect },
}

/// What a call changed, so the caller can invalidate derived caches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropEvent {
    Nothing,
    /// An existing rectangle (and anything derived from it) was dropped.
    Cleared,
    Started,
    Updated,
    Committed(SourceRect),
    /// Released below the minimum size; no rectangle persists.
    Discarded,
    /// A resize ended below the minimum size and was rolled back.
    Reverted,
}

impl CropEvent {
    /// True when derived data (effect preview) keyed on the rectangle is stale.
    pub fn invalidates(self) -> bool {
        !matches!(self, CropEvent::Nothing | CropEvent::Started)
    }
}

#[derive(Debug, Clone)]
pub struct CropController {
    settings: CropSettings,
    mode: AspectMode,
    state: CropState,
    rect: Option<SourceRect>,
}

impl CropController {
    pub fn new(settings: CropSettings) -> Self {
        Self {
            settings,
            mode: AspectMode::Free,
            state: CropState::Idle,
            rect: None,
        }
    }

    pub fn settings(&self) -> &CropSettings {
        &self.settings
    }

    pub fn mode(&self) -> AspectMode {
        self.mode
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    /// The canonical crop rectangle, in source pixels.
    pub fn rect(&self) -> Option<SourceRect> {
        self.rect
    }

    /// Projection of the crop rectangle through the current transform.
    pub fn display_rect(&self, viewport: &Viewport) -> Option<RectF> {
        self.rect.map(|r| viewport.rect_to_display(&r))
    }

    /// Handle anchors for rendering; corners only under an aspect lock.
    pub fn handles(&self, viewport: &Viewport) -> Vec<(Handle, Point)> {
        let Some(r) = self.display_rect(viewport) else {
            return Vec::new();
        };
        Handle::for_set(self.mode.handle_set())
            .iter()
            .map(|h| (*h, h.position(&r)))
            .collect()
    }

    /// Switch aspect mode. An existing rectangle is discarded.
    pub fn set_mode(&mut self, mode: AspectMode) -> CropEvent {
        if mode == self.mode {
            return CropEvent::Nothing;
        }
        self.mode = mode;
        self.cancel()
    }

    /// Install a rectangle directly (headless use), clamped to the image.
    ///
    /// Under an aspect lock the rectangle is refitted from its top-left
    /// corner the same way a drag would be.
    pub fn set_rect(&mut self, rect: SourceRect, image: Size) -> CropEvent {
        self.state = CropState::Idle;
        let mut clamped = rect.clamped_to(image.width, image.height);
        if let Some(ratio) = self.lock_ratio(image) {
            let anchor = Point::new(clamped.x0(), clamped.y0());
            clamped = span(anchor, Point::new(clamped.x1(), clamped.y1()), Some(ratio), image);
        }
        if clamped.width() <= 0.0 || clamped.height() <= 0.0 {
            self.rect = None;
            return CropEvent::Discarded;
        }
        self.rect = Some(clamped);
        CropEvent::Committed(clamped)
    }

    /// Escape: drop the rectangle and return to idle.
    pub fn cancel(&mut self) -> CropEvent {
        self.state = CropState::Idle;
        match self.rect.take() {
            Some(_) => CropEvent::Cleared,
            None => CropEvent::Nothing,
        }
    }

    pub fn press(&mut self, p: Point, viewport: &Viewport) -> CropEvent {
        if let Some(rect) = self.rect {
            if let Some(handle) = self.hit_handle(p, viewport) {
                self.state = CropState::Resizing {
                    handle,
                    snapshot: rect,
                };
                debug!(?handle, "crop resize started");
                return CropEvent::Started;
            }
            let display = viewport.rect_to_display(&rect);
            if display.inset(self.settings.move_inset).contains(p) {
                self.state = CropState::Moving {
                    start: viewport.to_source(p),
                    snapshot: rect,
                };
                return CropEvent::Started;
            }
        }

        let anchor = clamp_point(viewport.to_source(p), viewport.image());
        self.state = CropState::Creating { anchor };
        match self.rect.take() {
            Some(_) => CropEvent::Cleared,
            None => CropEvent::Started,
        }
    }

    pub fn drag(&mut self, p: Point, viewport: &Viewport) -> CropEvent {
        let image = viewport.image();
        let current = clamp_point(viewport.to_source(p), image);
        let ratio = self.lock_ratio(image);

        match self.state {
            CropState::Idle => return CropEvent::Nothing,
            CropState::Creating { anchor } => {
                self.rect = Some(span(anchor, current, ratio, image));
            }
            CropState::Moving { start, snapshot } => {
                let raw = viewport.to_source(p);
                self.rect = Some(translate_within(
                    &snapshot,
                    raw.x - start.x,
                    raw.y - start.y,
                    image,
                ));
            }
            CropState::Resizing { handle, snapshot } => {
                self.rect = Some(resize(&snapshot, handle, current, ratio, image));
            }
        }
        CropEvent::Updated
    }

    pub fn release(&mut self, p: Point, viewport: &Viewport) -> CropEvent {
        if matches!(self.state, CropState::Idle) {
            return CropEvent::Nothing;
        }
        self.drag(p, viewport);
        let state = std::mem::replace(&mut self.state, CropState::Idle);

        let too_small = self.rect.is_none_or(|r| self.below_minimum(&r, viewport));
        match state {
            CropState::Creating { .. } if too_small => {
                self.rect = None;
                debug!("crop below minimum size, discarded");
                CropEvent::Discarded
            }
            CropState::Resizing { snapshot, .. } if too_small => {
                self.rect = Some(snapshot);
                CropEvent::Reverted
            }
            _ => match self.rect {
                Some(r) => {
                    debug!(rect = ?r.as_tuple(), "crop committed");
                    CropEvent::Committed(r)
                }
                None => CropEvent::Discarded,
            },
        }
    }

    fn lock_ratio(&self, image: Size) -> Option<f64> {
        let natural = if image.height > 0.0 {
            image.width / image.height
        } else {
            0.0
        };
        self.mode.lock_ratio(natural)
    }

    fn below_minimum(&self, r: &SourceRect, viewport: &Viewport) -> bool {
        let d = viewport.rect_to_display(r);
        d.width < self.settings.min_size || d.height < self.settings.min_size
    }

    fn hit_handle(&self, p: Point, viewport: &Viewport) -> Option<Handle> {
        self.handles(viewport)
            .into_iter()
            .map(|(h, pos)| (h, pos.distance(p)))
            .filter(|(_, d)| *d <= self.settings.handle_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }
}

impl Default for CropController {
    fn default() -> Self {
        Self::new(CropSettings::default())
    }
}

fn clamp_point(p: Point, image: Size) -> Point {
    Point::new(p.x.clamp(0.0, image.width), p.y.clamp(0.0, image.height))
}

/// Rectangle from `anchor` to `current`, aspect-locked and kept inside the image.
fn span(anchor: Point, current: Point, ratio: Option<f64>, image: Size) -> SourceRect {
    let Some(ratio) = ratio else {
        return SourceRect::from_corners(anchor, current);
    };
    let end = aspect_fit(anchor, current, ratio);
    SourceRect::from_corners(anchor, shrink_into(anchor, end, image))
}

/// Scale the vector `anchor → end` down uniformly until `end` lies inside the
/// image. Uniform scaling keeps the ratio.
fn shrink_into(anchor: Point, end: Point, image: Size) -> Point {
    let dx = end.x - anchor.x;
    let dy = end.y - anchor.y;
    let room_x = if dx >= 0.0 { image.width - anchor.x } else { anchor.x };
    let room_y = if dy >= 0.0 { image.height - anchor.y } else { anchor.y };

    let mut k: f64 = 1.0;
    if dx.abs() > room_x {
        k = k.min(room_x / dx.abs());
    }
    if dy.abs() > room_y {
        k = k.min(room_y / dy.abs());
    }
    Point::new(anchor.x + dx * k, anchor.y + dy * k)
}

fn translate_within(r: &SourceRect, dx: f64, dy: f64, image: Size) -> SourceRect {
    let mut dx = dx;
    let mut dy = dy;
    if r.x0() + dx < 0.0 {
        dx = -r.x0();
    } else if r.x1() + dx > image.width {
        dx = image.width - r.x1();
    }
    if r.y0() + dy < 0.0 {
        dy = -r.y0();
    } else if r.y1() + dy > image.height {
        dy = image.height - r.y1();
    }
    r.translated(dx, dy)
}

fn resize(
    snapshot: &SourceRect,
    handle: Handle,
    current: Point,
    ratio: Option<f64>,
    image: Size,
) -> SourceRect {
    if handle.is_corner() {
        return span(handle.opposite_corner(snapshot), current, ratio, image);
    }
    let (x0, y0, x1, y1) = snapshot.as_tuple();
    match handle {
        Handle::N => SourceRect::new(x0, current.y, x1, y1),
        Handle::S => SourceRect::new(x0, y0, x1, current.y),
        Handle::E => SourceRect::new(x0, y0, current.x, y1),
        Handle::W => SourceRect::new(current.x, y0, x1, y1),
        _ => *snapshot,
    }
}
