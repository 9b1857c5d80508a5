//! Banner slots: optional fixed-aspect border regions around the content.
//!
//! Each side has an independent on/off flag and an optional image. A slot's
//! *natural ratio* feeds the layout solver:
//!
//! | Side | Ratio | Empty slot |
//! |---|---|---|
//! | left / right | image width / image height | default (0.25) |
//! | top / bottom | image height / image width | default (0.25) |
//!
//! A populated banner always covers its rectangle and can be panned and
//! zoomed inside it like a uniform grid cell. Its pan offset follows the
//! banner's rendered size across layout passes, so the export shows what the
//! screen showed.

use crate::grid::{DEFAULT_TILE_MAX_ZOOM, Tile};
use crate::layout::{BannerRatios, LayoutResult};
use crate::types::{Point, RectF, Side};
use crate::viewport::{FitMode, Viewport};

pub const DEFAULT_BANNER_RATIO: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct BannerSlot {
    side: Side,
    enabled: bool,
    tile: Option<Tile>,
}

impl BannerSlot {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            enabled: false,
            tile: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn tile(&self) -> Option<&Tile> {
        self.tile.as_ref()
    }

    /// Ratio along the banner's thickness axis; see the module table.
    pub fn natural_ratio(&self, default: f64) -> f64 {
        let Some(tile) = &self.tile else {
            return default;
        };
        let (w, h) = (tile.image().width() as f64, tile.image().height() as f64);
        if w <= 0.0 || h <= 0.0 {
            return default;
        }
        if self.side.is_vertical() { w / h } else { h / w }
    }
}

/// The four banner slots of a single image or a grid.
#[derive(Debug, Clone)]
pub struct Banners {
    slots: [BannerSlot; 4],
    default_ratio: f64,
}

impl Banners {
    pub fn new(default_ratio: f64) -> Self {
        Self {
            slots: Side::ALL.map(BannerSlot::new),
            default_ratio,
        }
    }

    fn index(side: Side) -> usize {
        match side {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }

    pub fn slot(&self, side: Side) -> &BannerSlot {
        &self.slots[Self::index(side)]
    }

    fn slot_mut(&mut self, side: Side) -> &mut BannerSlot {
        &mut self.slots[Self::index(side)]
    }

    /// Flip a side on or off; returns the new state.
    pub fn toggle(&mut self, side: Side) -> bool {
        let slot = self.slot_mut(side);
        slot.enabled = !slot.enabled;
        slot.enabled
    }

    pub fn set_enabled(&mut self, side: Side, enabled: bool) {
        self.slot_mut(side).enabled = enabled;
    }

    /// Populate a side with an image. Populating also switches the side on.
    pub fn set_image(&mut self, side: Side, tile: Tile) {
        let slot = self.slot_mut(side);
        slot.tile = Some(tile);
        slot.enabled = true;
    }

    pub fn clear_image(&mut self, side: Side) -> Option<Tile> {
        self.slot_mut(side).tile.take()
    }

    pub fn any_enabled(&self) -> bool {
        self.slots.iter().any(|s| s.enabled)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &BannerSlot> {
        self.slots.iter().filter(|s| s.enabled)
    }

    /// Enabled, populated side whose rectangle in `layout` contains `p`.
    pub fn side_at(&self, layout: &LayoutResult, p: Point) -> Option<Side> {
        if layout.degenerate {
            return None;
        }
        self.enabled()
            .filter(|slot| slot.tile.is_some())
            .map(|slot| slot.side)
            .find(|side| layout.banner(*side).is_some_and(|r| r.to_f64().contains(p)))
    }

    /// Viewport of a populated, enabled banner drawn into `rect`.
    pub fn viewport(&self, side: Side, rect: RectF) -> Option<Viewport> {
        let slot = self.slot(side);
        if !slot.enabled {
            return None;
        }
        let tile = slot.tile.as_ref()?;
        Some(tile.export_viewport(rect, FitMode::Cover, DEFAULT_TILE_MAX_ZOOM))
    }

    pub fn pan(&mut self, side: Side, rect: RectF, dx: f64, dy: f64) -> bool {
        self.update_view(side, rect, |vp| vp.pan_by(dx, dy))
    }

    pub fn zoom(&mut self, side: Side, rect: RectF, factor: f64, anchor: Point) -> bool {
        self.update_view(side, rect, |vp| vp.zoom_at(factor, anchor))
    }

    fn update_view(&mut self, side: Side, rect: RectF, f: impl FnOnce(&mut Viewport)) -> bool {
        let Some(mut vp) = self.viewport(side, rect) else {
            return false;
        };
        f(&mut vp);
        match self.slot_mut(side).tile.as_mut() {
            Some(tile) => {
                tile.store(&vp);
                true
            }
            None => false,
        }
    }

    /// Ratios of the enabled sides, ready for the layout solver.
    pub fn ratios(&self) -> BannerRatios {
        let mut ratios = BannerRatios::none();
        for slot in self.enabled() {
            ratios.set(slot.side, Some(slot.natural_ratio(self.default_ratio)));
        }
        ratios
    }
}

impl Default for Banners {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_RATIO)
    }
}
