//! CLI output formatting for every command.
//!
//! Output leads with what was produced (regions, the crop, the saved file)
//! and shows filesystem paths as indented `Path:` context lines.
//!
//! # Output Format
//!
//! ## Layout
//!
//! ```text
//! Layout 800x600
//!     top       160,0      480x120
//!     content   160,120    480x480
//!     block     160,0      480x600
//! ```
//!
//! ## Crop
//!
//! ```text
//! photo.jpg (4000x3000)
//!     Crop: 100,100 → 300,250 (200x150)
//!     Effect: blur 10
//! Saved as: photo_cropped.jpg
//!     Path: /home/me/photo_cropped.jpg
//! ```
//!
//! ## Collage
//!
//! ```text
//! Collage: 3 tiles, 2 columns, uniform cells, aspect fit
//!     001 a.jpg (4000x3000)
//!     002 b.jpg (3000x4000)
//!     003 c.jpg (1920x1080)
//! Saved as: a_collage.jpg
//!     Path: /home/me/a_collage.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use std::path::Path;

use crate::grid::{CellPolicy, GridModel};
use crate::imaging::{EffectKind, EffectState};
use crate::layout::LayoutResult;
use crate::naming::display_name;
use crate::types::{Rect, Size, SourceRect};

// ============================================================================
// Shared helpers
// ============================================================================

/// 1-based positional index, 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn region_line(name: &str, r: Rect) -> String {
    format!(
        "{}{:<9} {:<10} {}x{}",
        indent(1),
        name,
        format!("{},{}", r.x, r.y),
        r.width,
        r.height
    )
}

fn saved_lines(saved: Option<&Path>) -> Vec<String> {
    match saved {
        Some(path) => vec![
            format!("Saved as: {}", display_name(path)),
            format!("{}Path: {}", indent(1), path.display()),
        ],
        None => vec!["Nothing to save".to_string()],
    }
}

fn effect_line(effect: &EffectState) -> Option<String> {
    if effect.kind() == EffectKind::None {
        return None;
    }
    let scope = if effect.enabled_for_save() {
        ""
    } else {
        " (preview only)"
    };
    Some(format!(
        "{}Effect: {} {}{}",
        indent(1),
        effect.kind(),
        effect.strength(),
        scope
    ))
}

// ============================================================================
// Layout
// ============================================================================

pub fn format_layout(layout: &LayoutResult, container: Size) -> Vec<String> {
    let mut lines = Vec::new();
    let header = format!("Layout {}x{}", container.width, container.height);
    if layout.degenerate {
        lines.push(format!("{header} (degenerate, nothing to draw)"));
        return lines;
    }
    lines.push(header);
    for (region, rect) in layout.regions() {
        lines.push(region_line(region.name(), rect));
    }
    lines.push(region_line("block", layout.block()));
    lines
}

pub fn print_layout(layout: &LayoutResult, container: Size) {
    for line in format_layout(layout, container) {
        println!("{}", line);
    }
}

// ============================================================================
// Crop
// ============================================================================

pub fn format_crop_result(
    source: &Path,
    dimensions: (u32, u32),
    crop: Option<&SourceRect>,
    effect: &EffectState,
    saved: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}x{})",
        display_name(source),
        dimensions.0,
        dimensions.1
    )];
    if let Some(r) = crop {
        lines.push(format!(
            "{}Crop: {},{} → {},{} ({}x{})",
            indent(1),
            r.x0().round(),
            r.y0().round(),
            r.x1().round(),
            r.y1().round(),
            r.width().round(),
            r.height().round()
        ));
    }
    lines.extend(effect_line(effect));
    lines.extend(saved_lines(saved));
    lines
}

pub fn print_crop_result(
    source: &Path,
    dimensions: (u32, u32),
    crop: Option<&SourceRect>,
    effect: &EffectState,
    saved: Option<&Path>,
) {
    for line in format_crop_result(source, dimensions, crop, effect, saved) {
        println!("{}", line);
    }
}

// ============================================================================
// Collage
// ============================================================================

fn policy_label(policy: CellPolicy) -> &'static str {
    match policy {
        CellPolicy::Uniform => "uniform cells",
        CellPolicy::Fit => "fitted rows",
    }
}

pub fn format_collage_result(grid: &GridModel, saved: Option<&Path>) -> Vec<String> {
    let mut lines = vec![format!(
        "Collage: {} tiles, {} columns, {}, aspect {}",
        grid.len(),
        grid.columns(),
        policy_label(grid.policy()),
        grid.aspect()
    )];
    for (i, tile) in grid.tiles().iter().enumerate() {
        let name = tile
            .path()
            .map(|p| display_name(p))
            .unwrap_or_else(|| "(unnamed)".to_string());
        lines.push(format!(
            "{}{} {} ({}x{})",
            indent(1),
            format_index(i + 1),
            name,
            tile.image().width(),
            tile.image().height()
        ));
    }
    let enabled: Vec<&str> = grid.banners().enabled().map(|s| s.side().name()).collect();
    if !enabled.is_empty() {
        lines.push(format!("{}Banners: {}", indent(1), enabled.join(", ")));
    }
    lines.extend(saved_lines(saved));
    lines
}

pub fn print_collage_result(grid: &GridModel, saved: Option<&Path>) {
    for line in format_collage_result(grid, saved) {
        println!("{}", line);
    }
}
