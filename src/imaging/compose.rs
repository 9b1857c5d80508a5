//! Output assembly: crops, banner frames and collages.
//!
//! Everything here draws through a [`Viewport`]: the part of an image visible
//! through the viewport's frame is cut out of the source, resampled with
//! Lanczos3 to its on-canvas size, and pasted. Screen and export share the
//! same geometry; only the frame rectangles differ in scale.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tracing::debug;

use super::calculations::export_scale;
use super::effects::composite;
use super::params::{EffectParams, EffectState};
use crate::aspect::ContentAspect;
use crate::banner::Banners;
use crate::grid::{DEFAULT_TILE_MAX_ZOOM, GridModel};
use crate::layout::{LayoutRequest, LayoutResult, solve};
use crate::types::{Point, RasterImage, Rect, Side, Size, SourceRect};
use crate::viewport::{FitMode, Viewport};

/// Source-pixel-exact crop. Always at least 1×1.
pub fn crop_source(image: &RgbImage, rect: &SourceRect) -> RgbImage {
    let (x, y, w, h) = rect.pixel_box(image.width(), image.height());
    if w == 0 || h == 0 {
        let x = x.min(image.width().saturating_sub(1));
        let y = y.min(image.height().saturating_sub(1));
        return imageops::crop_imm(image, x, y, 1, 1).to_image();
    }
    imageops::crop_imm(image, x, y, w, h).to_image()
}

/// Paste `image` as seen through `viewport` onto `canvas`.
pub fn draw_viewport(canvas: &mut RgbImage, image: &RgbImage, viewport: &Viewport) {
    let visible = viewport.visible_rect();
    if visible.width < 1.0 || visible.height < 1.0 {
        return;
    }
    let dst = visible.round();
    let a = viewport.to_source(Point::new(visible.x, visible.y));
    let b = viewport.to_source(Point::new(visible.right(), visible.bottom()));
    let (sx, sy, sw, sh) = SourceRect::from_corners(a, b).pixel_box(image.width(), image.height());
    if sw == 0 || sh == 0 {
        return;
    }

    let region = imageops::crop_imm(image, sx, sy, sw, sh).to_image();
    let region = if (sw, sh) == (dst.width, dst.height) {
        region
    } else {
        imageops::resize(&region, dst.width, dst.height, FilterType::Lanczos3)
    };
    imageops::replace(canvas, &region, dst.x as i64, dst.y as i64);
}

fn draw_banners(canvas: &mut RgbImage, banners: &Banners, layout: &LayoutResult) {
    for side in Side::ALL {
        let (Some(rect), Some(tile)) = (layout.banner(side), banners.slot(side).tile()) else {
            continue;
        };
        let vp = tile.export_viewport(rect.to_f64(), FitMode::Cover, DEFAULT_TILE_MAX_ZOOM);
        draw_viewport(canvas, tile.image().pixels(), &vp);
    }
}

fn paste_scaled(canvas: &mut RgbImage, image: &RgbImage, rect: Rect) {
    let scaled;
    let image = if image.dimensions() == (rect.width, rect.height) {
        image
    } else {
        scaled = imageops::resize(image, rect.width, rect.height, FilterType::Lanczos3);
        &scaled
    };
    imageops::replace(canvas, image, rect.x as i64, rect.y as i64);
}

/// Main region of a single-image save.
///
/// With an active effect the whole image is composited, the crop acting as
/// the spared region. Otherwise the crop is cut out exactly, or the image is
/// returned whole when there is no crop.
pub fn single_main(
    image: &RasterImage,
    crop: Option<&SourceRect>,
    effect: &EffectState,
    params: &EffectParams,
) -> RgbImage {
    if effect.applies_to_save() {
        return composite(image.pixels(), image.size(), crop, effect, params);
    }
    match crop {
        Some(rect) => crop_source(image.pixels(), rect),
        None => image.pixels().clone(),
    }
}

/// Frame `main` with the enabled banners at `main`'s own resolution.
pub fn with_banners(
    main: &RgbImage,
    banners: &Banners,
    gap: u32,
    gap_at_banners: bool,
    background: [u8; 3],
) -> RgbImage {
    if !banners.any_enabled() {
        return main.clone();
    }
    let ratios = banners.ratios();
    let (w, h) = (main.width() as f64, main.height() as f64);
    let g = if gap_at_banners { gap as f64 } else { 0.0 };
    let gaps_h = [Side::Left, Side::Right]
        .iter()
        .filter(|s| ratios.is_active(**s))
        .count() as f64
        * g;
    let gaps_v = [Side::Top, Side::Bottom]
        .iter()
        .filter(|s| ratios.is_active(**s))
        .count() as f64
        * g;
    let width = (w + ratios.vertical_sum() * h + gaps_h).ceil();
    let height = (h + ratios.horizontal_sum() * w + gaps_v).ceil();

    let request = LayoutRequest::new(width, height, ContentAspect::Fit(w / h))
        .with_banners(ratios)
        .with_gap(gap, gap_at_banners);
    let layout = solve(&request);

    let mut canvas = RgbImage::from_pixel(width as u32, height as u32, Rgb(background));
    paste_scaled(&mut canvas, main, layout.content);
    draw_banners(&mut canvas, banners, &layout);
    canvas
}

/// Assemble a collage with its long edge at `long_edge` pixels.
///
/// `container` is the on-screen container the grid was laid out in; its
/// layout fixes the proportions that the export reproduces.
pub fn render_collage(grid: &GridModel, container: Size, long_edge: u32) -> RgbImage {
    let container = if container.is_empty() {
        Size::new(long_edge as f64, long_edge as f64)
    } else {
        container
    };
    let screen = solve(&grid.layout_request(container));
    let block = screen.block();
    let k = export_scale(Size::new(block.width as f64, block.height as f64), long_edge);
    let gap = (grid.gap() as f64 * k).round() as u32;

    let mut request = grid.layout_request(Size::new(
        (block.width as f64 * k).round().max(1.0),
        (block.height as f64 * k).round().max(1.0),
    ));
    request.gap = gap;
    let layout = solve(&request);

    let (cw, ch) = (
        request.container.width as u32,
        request.container.height as u32,
    );
    let mut canvas = RgbImage::from_pixel(cw, ch, Rgb(grid.background()));
    let (fit, max_zoom) = grid.tile_fit();
    let cells = grid.cells_with_gap(layout.content.to_f64(), gap as f64);
    for (tile, cell) in grid.tiles().iter().zip(cells) {
        let vp = tile.export_viewport(cell, fit, max_zoom);
        draw_viewport(&mut canvas, tile.image().pixels(), &vp);
    }
    draw_banners(&mut canvas, grid.banners(), &layout);
    debug!(width = cw, height = ch, tiles = grid.len(), "rendered collage");
    canvas
}
