//! Collage grid: tile arena, cell geometry and per-tile pan/zoom.
//!
//! Tiles are stored in an ordered `Vec` and addressed by index. Swap and
//! remove are index operations; after any structural change every tile is
//! re-clamped against its (possibly new) cell in one pass over the arena.
//!
//! ## Cell policies
//!
//! - **Uniform**: every row has the same height. A short last row divides the
//!   full width among only the tiles it holds. Each tile covers its cell and is
//!   cropped through its own pan/zoom (same clamp law as the primary image).
//! - **Fit**: each row's height is `rowWidth / Σ aspect`, so every tile shows
//!   uncropped at its natural aspect. The grid's natural aspect,
//!   `1 / Σ_rows (1 / Σ aspect)`, becomes the layout solver's `Fit` policy.
//!
//! ## Offset rescaling
//!
//! Pan offsets live in display pixels of the tile's cell. When a layout pass
//! changes a tile's rendered size, its offset is scaled by `new / old` so the
//! visible part of the image stays put instead of jumping.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::aspect::{AspectMode, ContentAspect};
use crate::banner::Banners;
use crate::layout::LayoutRequest;
use crate::types::{Point, RasterImage, RectF, Size};
use crate::viewport::{FitMode, Viewport};

pub const DEFAULT_TILE_MAX_ZOOM: f64 = 5.0;

/// One image in the grid (or a banner) with its own pan and zoom.
#[derive(Debug, Clone)]
pub struct Tile {
    image: RasterImage,
    path: Option<PathBuf>,
    zoom: f64,
    offset: Point,
    last_render: Option<Size>,
}

impl Tile {
    pub fn new(image: RasterImage) -> Self {
        Self {
            image,
            path: None,
            zoom: 1.0,
            offset: Point::default(),
            last_render: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn aspect(&self) -> f64 {
        self.image.aspect()
    }

    pub fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.offset = Point::default();
    }

    /// Viewport for drawing this tile into `frame` at another resolution.
    ///
    /// The pan offset is carried over in proportion to the rendered size, so
    /// an export shows the same part of the image as the screen did.
    pub fn export_viewport(&self, frame: RectF, fit: FitMode, max_zoom: f64) -> Viewport {
        let vp = Viewport::new(frame, self.image.size(), fit, max_zoom)
            .with_state(self.zoom, Point::default());
        let rendered = vp.displayed_size();
        let offset = match self.last_render {
            Some(old) if old.width > 0.0 && old.height > 0.0 => Point::new(
                self.offset.x * rendered.width / old.width,
                self.offset.y * rendered.height / old.height,
            ),
            _ => self.offset,
        };
        vp.with_state(self.zoom, offset)
    }

    pub(crate) fn store(&mut self, viewport: &Viewport) {
        self.zoom = viewport.zoom();
        self.offset = viewport.offset();
        self.last_render = Some(viewport.displayed_size());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellPolicy {
    #[default]
    Uniform,
    Fit,
}

impl std::str::FromStr for CellPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(CellPolicy::Uniform),
            "fit" => Ok(CellPolicy::Fit),
            other => Err(format!("unknown cell policy '{other}'")),
        }
    }
}

/// Construction-time settings for a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub columns: usize,
    pub gap: u32,
    pub background: [u8; 3],
    pub policy: CellPolicy,
    pub max_zoom: f64,
    pub gap_at_banners: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 2,
            gap: 12,
            background: [0x11, 0x11, 0x11],
            policy: CellPolicy::Uniform,
            max_zoom: DEFAULT_TILE_MAX_ZOOM,
            gap_at_banners: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridModel {
    tiles: Vec<Tile>,
    columns: usize,
    gap: u32,
    background: [u8; 3],
    policy: CellPolicy,
    aspect: AspectMode,
    max_zoom: f64,
    gap_at_banners: bool,
    banners: Banners,
    frame: Option<RectF>,
}

/// Number of rows needed for `count` tiles at `columns` per row.
pub fn row_count(count: usize, columns: usize) -> usize {
    count.div_ceil(columns.max(1))
}

/// Tiles per row, row-major.
fn row_lengths(count: usize, columns: usize) -> Vec<usize> {
    let columns = columns.max(1);
    (0..row_count(count, columns))
        .map(|row| (count - row * columns).min(columns))
        .collect()
}

/// Uniform-policy cells for `count` tiles inside `frame`.
pub fn uniform_cells(frame: RectF, count: usize, columns: usize, gap: f64) -> Vec<RectF> {
    let rows = row_lengths(count, columns);
    if rows.is_empty() {
        return Vec::new();
    }
    let row_h = ((frame.height - gap * (rows.len() - 1) as f64) / rows.len() as f64).max(0.0);

    let mut cells = Vec::with_capacity(count);
    for (row, &len) in rows.iter().enumerate() {
        let y = frame.y + row as f64 * (row_h + gap);
        let cell_w = ((frame.width - gap * (len - 1) as f64) / len as f64).max(0.0);
        for col in 0..len {
            cells.push(RectF::new(
                frame.x + col as f64 * (cell_w + gap),
                y,
                cell_w,
                row_h,
            ));
        }
    }
    cells
}

/// Fit-policy cells: rows of natural-aspect tiles, scaled down to fit and centered.
pub fn fit_cells(frame: RectF, aspects: &[f64], columns: usize, gap: f64) -> Vec<RectF> {
    let rows = row_lengths(aspects.len(), columns);
    if rows.is_empty() {
        return Vec::new();
    }

    let mut start = 0;
    let mut row_specs = Vec::with_capacity(rows.len());
    for &len in &rows {
        let row = &aspects[start..start + len];
        let sum: f64 = row.iter().sum();
        let avail = (frame.width - gap * (len - 1) as f64).max(0.0);
        let height = if sum > 0.0 { avail / sum } else { 0.0 };
        row_specs.push((start, len, height));
        start += len;
    }

    let gaps_v = gap * (rows.len() - 1) as f64;
    let natural_h: f64 = row_specs.iter().map(|(_, _, h)| h).sum();
    let shrink = if natural_h + gaps_v > frame.height && natural_h > 0.0 {
        ((frame.height - gaps_v) / natural_h).max(0.0)
    } else {
        1.0
    };
    let total_h = natural_h * shrink + gaps_v;

    let mut cells = Vec::with_capacity(aspects.len());
    let mut y = frame.y + ((frame.height - total_h) / 2.0).max(0.0);
    for (start, len, height) in row_specs {
        let h = height * shrink;
        let row = &aspects[start..start + len];
        let row_w: f64 = row.iter().map(|a| a * h).sum::<f64>() + gap * (len - 1) as f64;
        let mut x = frame.x + ((frame.width - row_w) / 2.0).max(0.0);
        for aspect in row {
            let w = aspect * h;
            cells.push(RectF::new(x, y, w, h));
            x += w + gap;
        }
        y += h + gap;
    }
    cells
}

/// Natural aspect of a fit-policy grid, ignoring gaps.
pub fn fit_aspect(aspects: &[f64], columns: usize) -> f64 {
    let mut start = 0;
    let mut inverse_sum = 0.0;
    for len in row_lengths(aspects.len(), columns) {
        let sum: f64 = aspects[start..start + len].iter().sum();
        if sum > 0.0 {
            inverse_sum += 1.0 / sum;
        }
        start += len;
    }
    if inverse_sum > 0.0 { 1.0 / inverse_sum } else { 1.0 }
}

impl GridModel {
    pub fn new(settings: GridSettings, banners: Banners) -> Self {
        Self {
            tiles: Vec::new(),
            columns: settings.columns.max(1),
            gap: settings.gap,
            background: settings.background,
            policy: settings.policy,
            aspect: AspectMode::Free,
            max_zoom: settings.max_zoom,
            gap_at_banners: settings.gap_at_banners,
            banners,
            frame: None,
        }
    }

    pub fn with_tiles(mut self, tiles: impl IntoIterator<Item = Tile>) -> Self {
        self.tiles.extend(tiles);
        self.normalize_columns();
        self
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn gap(&self) -> u32 {
        self.gap
    }

    pub fn background(&self) -> [u8; 3] {
        self.background
    }

    pub fn policy(&self) -> CellPolicy {
        self.policy
    }

    pub fn aspect(&self) -> AspectMode {
        self.aspect
    }

    pub fn banners(&self) -> &Banners {
        &self.banners
    }

    pub fn banners_mut(&mut self) -> &mut Banners {
        &mut self.banners
    }

    /// Grid rectangle of the last layout pass.
    pub fn frame(&self) -> Option<RectF> {
        self.frame
    }

    pub fn set_aspect(&mut self, aspect: AspectMode) {
        self.aspect = aspect;
    }

    pub fn set_background(&mut self, background: [u8; 3]) {
        self.background = background;
    }

    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
        self.normalize_columns();
        self.refresh();
    }

    pub fn set_gap(&mut self, gap: u32) {
        self.gap = gap;
        self.refresh();
    }

    pub fn set_gap_at_banners(&mut self, on: bool) {
        self.gap_at_banners = on;
    }

    pub fn set_policy(&mut self, policy: CellPolicy) {
        self.policy = policy;
        for tile in &mut self.tiles {
            tile.reset_view();
        }
        self.refresh();
    }

    pub fn push(&mut self, tile: Tile) {
        self.tiles.push(tile);
        self.refresh();
    }

    fn aspects(&self) -> Vec<f64> {
        self.tiles.iter().map(Tile::aspect).collect()
    }

    pub fn natural_aspect(&self) -> f64 {
        fit_aspect(&self.aspects(), self.columns)
    }

    /// Content-aspect policy handed to the layout solver.
    pub fn content_aspect(&self) -> ContentAspect {
        match self.policy {
            CellPolicy::Fit => ContentAspect::Fit(self.natural_aspect()),
            CellPolicy::Uniform => ContentAspect::for_mode(self.aspect, self.natural_aspect()),
        }
    }

    pub fn layout_request(&self, container: Size) -> LayoutRequest {
        LayoutRequest {
            container,
            banners: self.banners.ratios(),
            content: self.content_aspect(),
            gap: self.gap,
            gap_at_banners: self.gap_at_banners,
        }
    }

    /// Cell rectangles for `frame`, in tile order.
    pub fn cells(&self, frame: RectF) -> Vec<RectF> {
        self.cells_with_gap(frame, self.gap as f64)
    }

    /// Cell rectangles with an explicit gap (exports scale the gap).
    pub fn cells_with_gap(&self, frame: RectF, gap: f64) -> Vec<RectF> {
        match self.policy {
            CellPolicy::Uniform => uniform_cells(frame, self.tiles.len(), self.columns, gap),
            CellPolicy::Fit => fit_cells(frame, &self.aspects(), self.columns, gap),
        }
    }

    /// How tiles are scaled into their cells, and their zoom ceiling.
    pub fn tile_fit(&self) -> (FitMode, f64) {
        match self.policy {
            CellPolicy::Uniform => (FitMode::Cover, self.max_zoom),
            // Fit cells already match the tile aspect; the whole image is shown.
            CellPolicy::Fit => (FitMode::Contain, 1.0),
        }
    }

    fn viewport_in(&self, tile: &Tile, cell: RectF) -> Viewport {
        let (fit, max_zoom) = self.tile_fit();
        Viewport::new(cell, tile.image.size(), fit, max_zoom).with_state(tile.zoom, tile.offset)
    }

    /// Viewport of tile `index` within the last layout pass.
    pub fn tile_viewport(&self, index: usize) -> Option<Viewport> {
        let frame = self.frame?;
        let cell = *self.cells(frame).get(index)?;
        Some(self.viewport_in(self.tiles.get(index)?, cell))
    }

    /// Lay the grid out in `frame`, rescaling and re-clamping every tile.
    pub fn relayout(&mut self, frame: RectF) {
        let cells = self.cells(frame);
        for (i, cell) in cells.into_iter().enumerate() {
            let tile = &self.tiles[i];
            let mut vp = self.viewport_in(tile, cell);
            let rendered = vp.displayed_size();
            if let Some(old) = tile.last_render {
                if old.width > 0.0 && old.height > 0.0 && old != rendered {
                    let offset = tile.offset;
                    vp = vp.with_state(
                        tile.zoom,
                        Point::new(
                            offset.x * rendered.width / old.width,
                            offset.y * rendered.height / old.height,
                        ),
                    );
                }
            }
            self.tiles[i].store(&vp);
        }
        self.frame = Some(frame);
    }

    fn refresh(&mut self) {
        if let Some(frame) = self.frame {
            self.relayout(frame);
        }
    }

    fn normalize_columns(&mut self) {
        if self.tiles.len() == 1 {
            self.columns = 1;
        }
    }

    /// Index of the tile whose cell contains `p`.
    pub fn tile_at(&self, p: Point) -> Option<usize> {
        let frame = self.frame?;
        self.cells(frame).iter().position(|c| c.contains(p))
    }

    pub fn pan_tile(&mut self, index: usize, dx: f64, dy: f64) -> bool {
        let Some(mut vp) = self.tile_viewport(index) else {
            return false;
        };
        vp.pan_by(dx, dy);
        self.tiles[index].store(&vp);
        true
    }

    pub fn zoom_tile(&mut self, index: usize, factor: f64, anchor: Point) -> bool {
        let Some(mut vp) = self.tile_viewport(index) else {
            return false;
        };
        vp.zoom_at(factor, anchor);
        self.tiles[index].store(&vp);
        true
    }

    /// Exchange two tiles' full state (image, pan, zoom).
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.tiles.len() || b >= self.tiles.len() {
            return false;
        }
        self.tiles.swap(a, b);
        debug!(a, b, "swapped tiles");
        self.refresh();
        true
    }

    /// Drop a tile and re-clamp the rest against the new geometry.
    pub fn remove(&mut self, index: usize) -> Option<Tile> {
        if index >= self.tiles.len() {
            return None;
        }
        let removed = self.tiles.remove(index);
        self.normalize_columns();
        debug!(index, remaining = self.tiles.len(), "removed tile");
        self.refresh();
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_raster;

    fn grid_of(sizes: &[(u32, u32)], columns: usize, policy: CellPolicy) -> GridModel {
        let settings = GridSettings {
            columns,
            gap: 0,
            policy,
            ..GridSettings::default()
        };
        GridModel::new(settings, Banners::default()).with_tiles(
            sizes
                .iter()
                .map(|&(w, h)| Tile::new(gradient_raster(w, h))),
        )
    }

    // =========================================================================
    // Uniform cells
    // =========================================================================

    #[test]
    fn four_tiles_two_columns_share_cell_width() {
        let cells = uniform_cells(RectF::new(0.0, 0.0, 800.0, 600.0), 4, 2, 10.0);
        assert_eq!(cells.len(), 4);
        for c in &cells {
            assert_eq!(c.width, 395.0);
            assert_eq!(c.height, 295.0);
        }
        assert_eq!(cells[3], RectF::new(405.0, 305.0, 395.0, 295.0));
    }

    #[test]
    fn partial_last_row_spans_full_width() {
        let cells = uniform_cells(RectF::new(0.0, 0.0, 800.0, 600.0), 3, 2, 10.0);
        assert_eq!(cells[0].width, 395.0);
        assert_eq!(cells[2], RectF::new(0.0, 305.0, 800.0, 295.0));
    }

    #[test]
    fn row_count_rounds_up() {
        assert_eq!(row_count(0, 3), 0);
        assert_eq!(row_count(3, 3), 1);
        assert_eq!(row_count(4, 3), 2);
        assert_eq!(row_count(5, 0), 5);
    }

    // =========================================================================
    // Fit cells
    // =========================================================================

    #[test]
    fn fit_aspect_is_reciprocal_of_row_inverse_sum() {
        // Rows: [2, 1] → sum 3, [1] → sum 1 → 1 / (1/3 + 1) = 0.75
        assert!((fit_aspect(&[2.0, 1.0, 1.0], 2) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn fit_cells_keep_tile_aspect() {
        let aspects = [1.5, 0.75, 1.0];
        let cells = fit_cells(RectF::new(0.0, 0.0, 900.0, 2000.0), &aspects, 2, 0.0);
        for (cell, aspect) in cells.iter().zip(aspects) {
            assert!((cell.width / cell.height - aspect).abs() < 1e-9);
        }
        // First row: 900 / 2.25 = 400 tall
        assert!((cells[0].height - 400.0).abs() < 1e-9);
        assert!((cells[1].x - 600.0).abs() < 1e-9);
    }

    #[test]
    fn fit_cells_shrink_to_fit_height() {
        let aspects = [1.0, 1.0, 1.0, 1.0];
        let frame = RectF::new(0.0, 0.0, 1000.0, 600.0);
        let cells = fit_cells(frame, &aspects, 2, 0.0);
        // Natural rows are 500 tall each (1000 total) → shrunk to 300.
        assert!((cells[0].height - 300.0).abs() < 1e-9);
        let bottom = cells.iter().map(|c| c.bottom()).fold(0.0, f64::max);
        assert!(bottom <= 600.0 + 1e-9);
        // Rows are centered horizontally.
        assert!((cells[0].x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn fit_policy_feeds_natural_aspect_to_layout() {
        let grid = grid_of(&[(200, 100), (100, 100)], 2, CellPolicy::Fit);
        assert_eq!(grid.content_aspect(), ContentAspect::Fit(3.0));
    }

    #[test]
    fn uniform_policy_uses_selected_aspect() {
        let mut grid = grid_of(&[(200, 100), (100, 100)], 2, CellPolicy::Uniform);
        grid.set_aspect(AspectMode::Square);
        assert_eq!(grid.content_aspect(), ContentAspect::Fixed(1.0));
        grid.set_aspect(AspectMode::Free);
        assert_eq!(grid.content_aspect(), ContentAspect::Free);
    }

    // =========================================================================
    // Pan / zoom / structure
    // =========================================================================

    #[test]
    fn cover_tile_pans_only_along_overflow() {
        // 400x200 image in a 200x200 cell: covers at scale 1, overflows x by 200.
        let mut grid = grid_of(&[(400, 200)], 1, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 200.0, 200.0));
        grid.pan_tile(0, 500.0, 500.0);
        assert_eq!(grid.tiles()[0].offset(), Point::new(100.0, 0.0));
    }

    #[test]
    fn tile_zoom_clamps_to_five() {
        let mut grid = grid_of(&[(100, 100)], 1, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 100.0, 100.0));
        grid.zoom_tile(0, 100.0, Point::new(50.0, 50.0));
        assert_eq!(grid.tiles()[0].zoom(), 5.0);
    }

    #[test]
    fn fit_policy_tiles_do_not_pan_or_zoom() {
        let mut grid = grid_of(&[(400, 200), (200, 200)], 2, CellPolicy::Fit);
        grid.relayout(RectF::new(0.0, 0.0, 600.0, 200.0));
        grid.zoom_tile(0, 3.0, Point::new(100.0, 100.0));
        grid.pan_tile(0, 50.0, 0.0);
        assert_eq!(grid.tiles()[0].zoom(), 1.0);
        assert_eq!(grid.tiles()[0].offset(), Point::new(0.0, 0.0));
    }

    #[test]
    fn offset_rescales_with_cell_size() {
        let mut grid = grid_of(&[(400, 200)], 1, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 200.0, 200.0));
        grid.pan_tile(0, 60.0, 0.0);
        grid.relayout(RectF::new(0.0, 0.0, 400.0, 400.0));
        // Rendered size doubled (400 → 800 wide), so the offset doubles too.
        assert_eq!(grid.tiles()[0].offset(), Point::new(120.0, 0.0));
    }

    #[test]
    fn swap_moves_full_tile_state() {
        let mut grid = grid_of(&[(400, 200), (100, 300)], 2, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 400.0, 200.0));
        grid.zoom_tile(0, 2.0, Point::new(100.0, 100.0));
        assert!(grid.swap(0, 1));
        assert_eq!(grid.tiles()[1].image().width(), 400);
        assert_eq!(grid.tiles()[1].zoom(), 2.0);
        assert_eq!(grid.tiles()[0].zoom(), 1.0);
        assert!(!grid.swap(0, 0));
        assert!(!grid.swap(0, 7));
    }

    #[test]
    fn remove_down_to_one_forces_single_column() {
        let mut grid = grid_of(&[(100, 100), (100, 100)], 2, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 400.0, 200.0));
        assert!(grid.remove(0).is_some());
        assert_eq!(grid.columns(), 1);
        assert_eq!(grid.tile_viewport(0).unwrap().frame(), RectF::new(0.0, 0.0, 400.0, 200.0));
        assert!(grid.remove(5).is_none());
    }

    #[test]
    fn remove_reclamps_remaining_tiles() {
        // Two 100x300 tiles side by side in 200x300: each cell 100x300, no overflow.
        // After zoom + pan the first tile is offset; removing the second widens the
        // cell and the offset must still satisfy the clamp law.
        let mut grid = grid_of(&[(100, 300), (100, 300)], 2, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 200.0, 300.0));
        grid.zoom_tile(0, 2.0, Point::new(50.0, 150.0));
        grid.pan_tile(0, 40.0, 140.0);
        grid.remove(1);
        let vp = grid.tile_viewport(0).unwrap();
        let img = vp.image_rect();
        let frame = vp.frame();
        assert!(img.x <= frame.x + 1e-9 && img.right() >= frame.right() - 1e-9);
        assert!(img.y <= frame.y + 1e-9 && img.bottom() >= frame.bottom() - 1e-9);
    }

    #[test]
    fn export_viewport_scales_pan_with_resolution() {
        let mut grid = grid_of(&[(400, 200)], 1, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 200.0, 200.0));
        grid.pan_tile(0, 50.0, 0.0);
        let (fit, max_zoom) = grid.tile_fit();
        let vp = grid.tiles()[0].export_viewport(RectF::new(0.0, 0.0, 1000.0, 1000.0), fit, max_zoom);
        assert_eq!(vp.offset(), Point::new(250.0, 0.0));
    }

    #[test]
    fn tile_at_finds_cell() {
        let mut grid = grid_of(&[(100, 100); 3], 2, CellPolicy::Uniform);
        grid.relayout(RectF::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(grid.tile_at(Point::new(150.0, 50.0)), Some(1));
        assert_eq!(grid.tile_at(Point::new(150.0, 150.0)), Some(2));
        assert_eq!(grid.tile_at(Point::new(500.0, 150.0)), None);
    }
}
