//! The editor session: the synchronous interaction surface a UI shell drives.
//!
//! A [`Session`] is in one of three modes:
//!
//! | Mode | Content | Primary drag | Secondary drag | Wheel |
//! |---|---|---|---|---|
//! | Welcome | nothing | - | - | - |
//! | Single | one image + banners | crop create/move/resize | pan | zoom at pointer |
//! | Grid | tile grid + banners | pan tile | swap onto another tile | zoom tile |
//!
//! In either editing mode a drag or wheel over a banner holding an image pans
//! or zooms that banner instead.
//!
//! Every command runs to completion before returning and re-applies the clamp
//! and derivation rules of the geometry modules, so [`Session::frame`] is
//! always consistent. Time never comes from a clock inside the session: the
//! shell passes `now` to the commands that schedule work and calls
//! [`Session::tick`] to run whatever has come due (the debounced effect
//! preview, the reset after a save).

use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use crate::aspect::{AspectMode, ContentAspect};
use crate::banner::Banners;
use crate::config::EditorConfig;
use crate::crop::{CropController, CropEvent, CropState, Handle};
use crate::debounce::Debouncer;
use crate::grid::{CellPolicy, GridModel, Tile};
use crate::imaging::compose::{render_collage, single_main, with_banners};
use crate::imaging::{
    EffectKind, EffectState, ImageBackend, ImagingError, composite, load, preview,
    save_with_increment,
};
use crate::layout::{LayoutRequest, LayoutResult, solve};
use crate::naming::{OutputName, display_name};
use crate::types::{Point, RasterImage, RectF, Side, Size, SourceRect};
use crate::viewport::{FitMode, Viewport};

pub const STATUS_SAVE_HINT: &str = "Press ENTER or SPACE to save • ESC to cancel";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Imaging(#[from] ImagingError),
    #[error("no image loaded")]
    NoImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Welcome,
    Single,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
}

/// What [`Session::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub preview_refreshed: bool,
    pub reset: bool,
}

/// Everything a shell needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub mode: Mode,
    pub layout: Option<LayoutResult>,
    /// Where the single image lands (may extend past the content rectangle).
    pub image: Option<RectF>,
    /// Projection of the crop rectangle.
    pub crop: Option<RectF>,
    pub handles: Vec<(Handle, Point)>,
    /// Visible part of each tile, in tile order.
    pub tiles: Vec<RectF>,
    /// Visible part of each populated banner image.
    pub banners: Vec<(Side, RectF)>,
    pub status: Option<String>,
    pub locked: bool,
}

#[derive(Debug, Clone)]
struct SingleImage {
    path: PathBuf,
    image: RasterImage,
    banners: Banners,
    zoom: f64,
    offset: Point,
}

#[derive(Debug, Clone)]
enum Content {
    Welcome,
    Single(Box<SingleImage>),
    Grid(GridModel),
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Crop,
    Pan { last: Point },
    TilePan { index: usize, last: Point },
    TileSwap { from: usize },
    BannerPan { side: Side, last: Point },
}

/// Display-sized copy of the single image, keyed by its size.
#[derive(Debug, Default)]
struct PreviewCache {
    size: Option<(u32, u32)>,
    base: Option<RgbImage>,
    effected: Option<RgbImage>,
}

impl PreviewCache {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct Session {
    config: EditorConfig,
    container: Size,
    content: Content,
    crop: CropController,
    effect: EffectState,
    effect_debounce: Debouncer,
    preview: PreviewCache,
    gesture: Option<Gesture>,
    gap_at_banners: bool,
    status: Option<String>,
    locked: bool,
    reset_at: Option<Instant>,
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            container: Size::default(),
            content: Content::Welcome,
            crop: CropController::new(config.crop_settings()),
            effect: EffectState::default(),
            effect_debounce: Debouncer::new(config.debounce()),
            preview: PreviewCache::default(),
            gesture: None,
            gap_at_banners: config.banners.gap_at_banners,
            status: None,
            locked: false,
            reset_at: None,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        match self.content {
            Content::Welcome => Mode::Welcome,
            Content::Single(_) => Mode::Single,
            Content::Grid(_) => Mode::Grid,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn crop_rect(&self) -> Option<SourceRect> {
        self.crop.rect()
    }

    pub fn crop_state(&self) -> CropState {
        self.crop.state()
    }

    pub fn aspect(&self) -> AspectMode {
        match &self.content {
            Content::Grid(grid) => grid.aspect(),
            _ => self.crop.mode(),
        }
    }

    pub fn effect(&self) -> &EffectState {
        &self.effect
    }

    pub fn grid(&self) -> Option<&GridModel> {
        match &self.content {
            Content::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&RasterImage> {
        match &self.content {
            Content::Single(single) => Some(&single.image),
            _ => None,
        }
    }

    pub fn banners(&self) -> Option<&Banners> {
        match &self.content {
            Content::Welcome => None,
            Content::Single(single) => Some(&single.banners),
            Content::Grid(grid) => Some(grid.banners()),
        }
    }

    fn banners_mut(&mut self) -> Option<&mut Banners> {
        match &mut self.content {
            Content::Welcome => None,
            Content::Single(single) => Some(&mut single.banners),
            Content::Grid(grid) => Some(grid.banners_mut()),
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn layout(&self) -> Option<LayoutResult> {
        let request = match &self.content {
            Content::Welcome => return None,
            Content::Single(single) => LayoutRequest {
                container: self.container,
                banners: single.banners.ratios(),
                content: ContentAspect::Fit(single.image.aspect()),
                gap: self.config.banners.gap,
                gap_at_banners: self.gap_at_banners,
            },
            Content::Grid(grid) => grid.layout_request(self.container),
        };
        Some(solve(&request))
    }

    /// Viewport of the single image, if there is room to show it.
    pub fn viewport(&self) -> Option<Viewport> {
        let Content::Single(single) = &self.content else {
            return None;
        };
        let layout = self.layout()?;
        if layout.degenerate {
            return None;
        }
        Some(
            Viewport::new(
                layout.content.to_f64(),
                single.image.size(),
                FitMode::Contain,
                self.config.zoom.max_image,
            )
            .with_state(single.zoom, single.offset),
        )
    }

    fn banner_rect(&self, side: Side) -> Option<RectF> {
        let layout = self.layout().filter(|l| !l.degenerate)?;
        layout.banner(side).map(|r| r.to_f64())
    }

    /// Populated banner under `p`.
    fn banner_at(&self, p: Point) -> Option<Side> {
        let layout = self.layout()?;
        self.banners()?.side_at(&layout, p)
    }

    fn store_view(&mut self, viewport: &Viewport) {
        if let Content::Single(single) = &mut self.content {
            single.zoom = viewport.zoom();
            single.offset = viewport.offset();
        }
    }

    fn relayout(&mut self) {
        if let Some(vp) = self.viewport() {
            self.store_view(&vp);
            return;
        }
        let Some(layout) = self.layout().filter(|l| !l.degenerate) else {
            return;
        };
        if let Content::Grid(grid) = &mut self.content {
            grid.relayout(layout.content.to_f64());
        }
    }

    /// Container resize. Re-clamps every pan offset.
    pub fn set_container(&mut self, width: f64, height: f64) {
        self.container = Size::new(width.max(0.0), height.max(0.0));
        self.relayout();
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace everything with a single image. On error nothing changes.
    pub fn load_image(
        &mut self,
        backend: &dyn ImageBackend,
        path: &Path,
    ) -> Result<(), SessionError> {
        let image = load(backend, path)?;
        self.reset();
        self.content = Content::Single(Box::new(SingleImage {
            path: path.to_path_buf(),
            image,
            banners: Banners::new(self.config.banners.default_ratio),
            zoom: 1.0,
            offset: Point::default(),
        }));
        self.relayout();
        Ok(())
    }

    /// One path loads a single image, several start a grid.
    pub fn load_images(
        &mut self,
        backend: &dyn ImageBackend,
        paths: &[PathBuf],
    ) -> Result<(), SessionError> {
        match paths {
            [] => Err(SessionError::NoImage),
            [one] => self.load_image(backend, one),
            many => {
                let tiles = many
                    .iter()
                    .map(|p| load(backend, p).map(|img| Tile::new(img).with_path(p)))
                    .collect::<Result<Vec<_>, _>>()?;
                self.reset();
                let banners = Banners::new(self.config.banners.default_ratio);
                self.content = Content::Grid(self.new_grid(banners).with_tiles(tiles));
                info!(tiles = many.len(), "started grid");
                self.relayout();
                Ok(())
            }
        }
    }

    fn new_grid(&self, banners: Banners) -> GridModel {
        let mut grid = GridModel::new(self.config.grid_settings(), banners);
        grid.set_gap_at_banners(self.gap_at_banners);
        grid
    }

    /// Add an image as a grid tile, converting a single image into a grid.
    pub fn add_to_grid(
        &mut self,
        backend: &dyn ImageBackend,
        path: &Path,
    ) -> Result<(), SessionError> {
        if self.locked {
            return Ok(());
        }
        if self.mode() == Mode::Welcome {
            return self.load_image(backend, path);
        }
        let tile = Tile::new(load(backend, path)?).with_path(path);
        let content = std::mem::replace(&mut self.content, Content::Welcome);
        self.content = match content {
            Content::Welcome => Content::Welcome,
            Content::Single(single) => {
                let SingleImage {
                    path: first_path,
                    image,
                    banners,
                    ..
                } = *single;
                self.crop.cancel();
                self.preview.clear();
                self.status = None;
                debug!("converted single image to grid");
                Content::Grid(
                    self.new_grid(banners)
                        .with_tiles([Tile::new(image).with_path(first_path), tile]),
                )
            }
            Content::Grid(mut grid) => {
                grid.push(tile);
                Content::Grid(grid)
            }
        };
        self.relayout();
        Ok(())
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_press(&mut self, p: Point, button: PointerButton) {
        if self.locked {
            return;
        }
        if let Some(side) = self.banner_at(p) {
            self.gesture = Some(Gesture::BannerPan { side, last: p });
            return;
        }
        self.gesture = match (self.mode(), button) {
            (Mode::Single, PointerButton::Primary) => {
                let Some(vp) = self.viewport() else { return };
                let event = self.crop.press(p, &vp);
                self.on_crop_event(event);
                Some(Gesture::Crop)
            }
            (Mode::Single, PointerButton::Secondary) => Some(Gesture::Pan { last: p }),
            (Mode::Grid, PointerButton::Primary) => self
                .grid()
                .and_then(|grid| grid.tile_at(p))
                .map(|index| Gesture::TilePan { index, last: p }),
            (Mode::Grid, PointerButton::Secondary) => self
                .grid()
                .and_then(|grid| grid.tile_at(p))
                .map(|from| Gesture::TileSwap { from }),
            (Mode::Welcome, _) => None,
        };
    }

    pub fn pointer_drag(&mut self, p: Point) {
        if self.locked {
            return;
        }
        match self.gesture {
            Some(Gesture::Crop) => {
                if let Some(vp) = self.viewport() {
                    let event = self.crop.drag(p, &vp);
                    self.on_crop_event(event);
                }
            }
            Some(Gesture::Pan { last }) => {
                if let Some(mut vp) = self.viewport() {
                    vp.pan_by(p.x - last.x, p.y - last.y);
                    self.store_view(&vp);
                }
                self.gesture = Some(Gesture::Pan { last: p });
            }
            Some(Gesture::TilePan { index, last }) => {
                if let Content::Grid(grid) = &mut self.content {
                    grid.pan_tile(index, p.x - last.x, p.y - last.y);
                }
                self.gesture = Some(Gesture::TilePan { index, last: p });
            }
            Some(Gesture::BannerPan { side, last }) => {
                if let Some(rect) = self.banner_rect(side) {
                    if let Some(banners) = self.banners_mut() {
                        banners.pan(side, rect, p.x - last.x, p.y - last.y);
                    }
                }
                self.gesture = Some(Gesture::BannerPan { side, last: p });
            }
            Some(Gesture::TileSwap { .. }) | None => {}
        }
    }

    pub fn pointer_release(&mut self, p: Point) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if self.locked {
            return;
        }
        match gesture {
            Gesture::Crop => {
                if let Some(vp) = self.viewport() {
                    let event = self.crop.release(p, &vp);
                    self.on_crop_event(event);
                }
            }
            Gesture::Pan { .. } | Gesture::TilePan { .. } | Gesture::BannerPan { .. } => {
                self.pointer_drag_to(p, gesture)
            }
            Gesture::TileSwap { from } => {
                if let Content::Grid(grid) = &mut self.content {
                    if let Some(to) = grid.tile_at(p) {
                        grid.swap(from, to);
                    }
                }
            }
        }
    }

    fn pointer_drag_to(&mut self, p: Point, gesture: Gesture) {
        self.gesture = Some(gesture);
        self.pointer_drag(p);
        self.gesture = None;
    }

    /// Wheel zoom by `notches` (positive zooms in) anchored at the pointer.
    pub fn wheel(&mut self, p: Point, notches: f64) {
        if self.locked {
            return;
        }
        let factor = self.config.zoom.wheel_step.powf(notches);
        if let Some(side) = self.banner_at(p) {
            if let (Some(rect), Some(banners)) = (self.banner_rect(side), self.banners_mut()) {
                banners.zoom(side, rect, factor, p);
            }
        } else if let Some(mut vp) = self.viewport() {
            vp.zoom_at(factor, p);
            self.store_view(&vp);
        } else if let Content::Grid(grid) = &mut self.content {
            if let Some(index) = grid.tile_at(p) {
                grid.zoom_tile(index, factor, p);
            }
        }
    }

    fn on_crop_event(&mut self, event: CropEvent) {
        if event.invalidates() {
            self.preview.effected = None;
        }
        match event {
            CropEvent::Committed(_) => {
                self.status = Some(STATUS_SAVE_HINT.to_string());
            }
            CropEvent::Cleared | CropEvent::Discarded => {
                self.status = None;
            }
            _ => {}
        }
    }

    // =========================================================================
    // Discrete commands
    // =========================================================================

    pub fn select_aspect(&mut self, mode: AspectMode) {
        if self.locked {
            return;
        }
        match &mut self.content {
            Content::Grid(grid) => grid.set_aspect(mode),
            _ => {
                let event = self.crop.set_mode(mode);
                self.on_crop_event(event);
            }
        }
        debug!(aspect = %mode, "aspect selected");
        self.relayout();
    }

    /// Install a crop rectangle directly, in source pixels.
    pub fn set_crop(&mut self, rect: SourceRect) -> Result<(), SessionError> {
        if self.locked {
            return Ok(());
        }
        let size = self.image().ok_or(SessionError::NoImage)?.size();
        let event = self.crop.set_rect(rect, size);
        self.on_crop_event(event);
        Ok(())
    }

    /// Flip a banner side; returns the new state (false without content).
    pub fn toggle_banner(&mut self, side: Side) -> bool {
        if self.locked {
            return false;
        }
        let Some(banners) = self.banners_mut() else {
            return false;
        };
        let on = banners.toggle(side);
        self.relayout();
        on
    }

    pub fn set_banner_image(
        &mut self,
        backend: &dyn ImageBackend,
        side: Side,
        path: &Path,
    ) -> Result<(), SessionError> {
        if self.locked {
            return Ok(());
        }
        let tile = Tile::new(load(backend, path)?).with_path(path);
        let banners = self.banners_mut().ok_or(SessionError::NoImage)?;
        banners.set_image(side, tile);
        self.relayout();
        Ok(())
    }

    pub fn clear_banner_image(&mut self, side: Side) {
        if self.locked {
            return;
        }
        if let Some(banners) = self.banners_mut() {
            banners.clear_image(side);
            self.relayout();
        }
    }

    pub fn toggle_banner_gap(&mut self) -> bool {
        if self.locked {
            return self.gap_at_banners;
        }
        self.gap_at_banners = !self.gap_at_banners;
        let on = self.gap_at_banners;
        if let Content::Grid(grid) = &mut self.content {
            grid.set_gap_at_banners(on);
        }
        self.relayout();
        on
    }

    pub fn set_effect_kind(&mut self, kind: EffectKind, now: Instant) {
        if self.locked {
            return;
        }
        if self.effect.kind() != kind {
            self.effect.set_kind(kind);
            self.effect_debounce.schedule(now);
        }
    }

    /// Slider input: coalesced, the preview recomputes after the debounce delay.
    pub fn set_effect_strength(&mut self, strength: u32, now: Instant) {
        if self.locked {
            return;
        }
        self.effect.set_strength(strength);
        self.effect_debounce.schedule(now);
    }

    pub fn set_effect_for_save(&mut self, enabled: bool) {
        if self.locked {
            return;
        }
        self.effect.set_enabled_for_save(enabled);
    }

    pub fn set_columns(&mut self, columns: usize) {
        if self.locked {
            return;
        }
        if let Content::Grid(grid) = &mut self.content {
            grid.set_columns(columns);
        }
        self.relayout();
    }

    pub fn set_grid_gap(&mut self, gap: u32) {
        if self.locked {
            return;
        }
        if let Content::Grid(grid) = &mut self.content {
            grid.set_gap(gap);
        }
        self.relayout();
    }

    pub fn set_cell_policy(&mut self, policy: CellPolicy) {
        if self.locked {
            return;
        }
        if let Content::Grid(grid) = &mut self.content {
            grid.set_policy(policy);
        }
        self.relayout();
    }

    pub fn set_background(&mut self, background: [u8; 3]) {
        if self.locked {
            return;
        }
        if let Content::Grid(grid) = &mut self.content {
            grid.set_background(background);
        }
    }

    pub fn swap_tiles(&mut self, a: usize, b: usize) -> bool {
        if self.locked {
            return false;
        }
        match &mut self.content {
            Content::Grid(grid) => grid.swap(a, b),
            _ => false,
        }
    }

    /// Remove a tile. Removing the last one returns to the welcome screen.
    pub fn remove_tile(&mut self, index: usize) -> bool {
        if self.locked {
            return false;
        }
        let Content::Grid(grid) = &mut self.content else {
            return false;
        };
        let removed = grid.remove(index).is_some();
        if grid.is_empty() {
            self.reset();
        } else {
            self.relayout();
        }
        removed
    }

    /// Escape: drop the crop rectangle and its effect preview.
    pub fn cancel(&mut self) {
        if self.locked {
            return;
        }
        self.gesture = None;
        let event = self.crop.cancel();
        self.on_crop_event(event);
        self.status = None;
    }

    /// Back to the welcome screen.
    pub fn reset(&mut self) {
        self.content = Content::Welcome;
        self.crop = CropController::new(self.config.crop_settings());
        self.effect = EffectState::default();
        self.effect_debounce.cancel();
        self.preview.clear();
        self.gesture = None;
        self.gap_at_banners = self.config.banners.gap_at_banners;
        self.status = None;
        self.locked = false;
        self.reset_at = None;
        debug!("session reset");
    }

    pub fn key(
        &mut self,
        key: Key,
        backend: &dyn ImageBackend,
        now: Instant,
    ) -> Result<Option<PathBuf>, SessionError> {
        match key {
            Key::Enter | Key::Space => self.save(backend, now),
            Key::Escape => {
                self.cancel();
                Ok(None)
            }
        }
    }

    /// Run whatever has come due: the debounced preview, the post-save reset.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.reset_at.is_some_and(|at| now >= at) {
            self.reset();
            outcome.reset = true;
            return outcome;
        }
        if self.effect_debounce.poll(now) {
            debug!(
                effect = %self.effect.kind(),
                strength = self.effect.strength(),
                "effect preview due"
            );
            self.preview.effected = None;
            self.refresh_effect_preview();
            outcome.preview_refreshed = true;
        }
        outcome
    }

    // =========================================================================
    // Preview
    // =========================================================================

    fn ensure_preview_base(&mut self) {
        let Some(vp) = self.viewport() else {
            return;
        };
        let Content::Single(single) = &self.content else {
            return;
        };
        let displayed = vp.displayed_size();
        let bounds = (
            (displayed.width.round() as u32).clamp(1, single.image.width().max(1)),
            (displayed.height.round() as u32).clamp(1, single.image.height().max(1)),
        );
        if self.preview.size != Some(bounds) {
            self.preview.base = Some(preview(&single.image, bounds));
            self.preview.effected = None;
            self.preview.size = Some(bounds);
        }
    }

    fn refresh_effect_preview(&mut self) {
        self.ensure_preview_base();
        let (Content::Single(single), Some(base)) = (&self.content, &self.preview.base) else {
            return;
        };
        if self.effect.is_active() && self.preview.effected.is_none() {
            let rect = self.crop.rect();
            self.preview.effected = Some(composite(
                base,
                single.image.size(),
                rect.as_ref(),
                &self.effect,
                &self.config.effect_params(),
            ));
        }
    }

    /// Display-sized raster of the single image, with the effect applied once
    /// the debounce has settled.
    pub fn preview(&mut self) -> Option<&RgbImage> {
        if !self.effect_debounce.is_pending() {
            self.refresh_effect_preview();
        } else {
            self.ensure_preview_base();
        }
        if self.effect.is_active() {
            if let Some(effected) = &self.preview.effected {
                return Some(effected);
            }
        }
        self.preview.base.as_ref()
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Save the crop (single) or the collage (grid) under an auto-incremented
    /// name. Returns `None` when there is nothing to save or a save already
    /// locked the session.
    pub fn save(
        &mut self,
        backend: &dyn ImageBackend,
        now: Instant,
    ) -> Result<Option<PathBuf>, SessionError> {
        if self.locked {
            return Ok(None);
        }
        let (image, name) = match &self.content {
            Content::Welcome => return Err(SessionError::NoImage),
            Content::Single(single) => {
                let crop = self.crop.rect();
                if crop.is_none()
                    && !self.effect.applies_to_save()
                    && !single.banners.any_enabled()
                {
                    return Ok(None);
                }
                let main = single_main(
                    &single.image,
                    crop.as_ref(),
                    &self.effect,
                    &self.config.effect_params(),
                );
                // Gaps are display pixels; express them at source resolution.
                let gap = match self.viewport() {
                    Some(vp) if vp.scale() > 0.0 => {
                        (self.config.banners.gap as f64 / vp.scale()).round() as u32
                    }
                    _ => self.config.banners.gap,
                };
                let out = with_banners(
                    &main,
                    &single.banners,
                    gap,
                    self.gap_at_banners,
                    self.config.background(),
                );
                (out, OutputName::new(&single.path, &self.config.output.crop_suffix))
            }
            Content::Grid(grid) => {
                let source = grid
                    .tiles()
                    .iter()
                    .find_map(|t| t.path().cloned())
                    .unwrap_or_else(|| PathBuf::from("collage.png"));
                let out = render_collage(grid, self.container, self.config.grid.export_long_edge);
                (out, OutputName::new(&source, &self.config.output.collage_suffix))
            }
        };

        let path = save_with_increment(backend, &image, &name, self.config.quality())?;
        info!(path = %path.display(), "saved");
        self.status = Some(format!("Saved as: {}", display_name(&path)));
        self.locked = true;
        self.gesture = None;
        self.reset_at = Some(now + self.config.status_duration());
        Ok(Some(path))
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    pub fn frame(&self) -> Frame {
        let layout = self.layout();
        let viewport = self.viewport();
        let tiles = match &self.content {
            Content::Grid(grid) => (0..grid.len())
                .filter_map(|i| grid.tile_viewport(i))
                .map(|vp| vp.visible_rect())
                .collect(),
            _ => Vec::new(),
        };
        let banners = match (&layout, self.banners()) {
            (Some(layout), Some(banners)) if !layout.degenerate => Side::ALL
                .into_iter()
                .filter_map(|side| {
                    let rect = layout.banner(side)?.to_f64();
                    let vp = banners.viewport(side, rect)?;
                    Some((side, vp.visible_rect()))
                })
                .collect(),
            _ => Vec::new(),
        };
        Frame {
            mode: self.mode(),
            layout,
            image: viewport.map(|vp| vp.image_rect()),
            crop: viewport.and_then(|vp| self.crop.display_rect(&vp)),
            handles: viewport.map(|vp| self.crop.handles(&vp)).unwrap_or_default(),
            tiles,
            banners,
            status: self.status.clone(),
            locked: self.locked,
        }
    }
}
