//! # Cropper
//!
//! Pixel-accurate image cropping, bannered framing and collage layout, with a
//! live preview that matches the saved file.
//!
//! # Architecture: Canonical Geometry, Derived Display
//!
//! Everything the user edits is stored once, in the coordinate space where it
//! is canonical, and everything on screen is derived from it on demand:
//!
//! ```text
//! container size ──► layout::solve ──► content rect ──► Viewport (fit, zoom, pan)
//!                                                            │
//! crop rect (source px) ◄── CropController ◄── pointer ──────┤
//!        │                                                   ▼
//!        └──► effects::composite (preview raster | full source) ──► save
//! ```
//!
//! - The crop rectangle lives in **source pixels**; its display rectangle is
//!   recomputed through the current [`viewport::Viewport`] every time it is
//!   asked for. Zooming or resizing the window never moves the crop.
//! - Effect sizes (blur sigma, pixelate block, feather) are expressed in
//!   source pixels and scaled to whatever raster is composited, so the
//!   downscaled preview and the full-resolution save agree.
//! - Collages are re-laid-out at export size from the same layout rules, with
//!   each tile's pan/zoom carried over proportionally.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Raster and geometry value types shared by every module |
//! | [`aspect`] | Aspect modes, their ratios and handle sets, aspect-locked drags |
//! | [`layout`] | Banner + content layout solver, centered in the container |
//! | [`viewport`] | Source ↔ display mapping, contain/cover fit, zoom and pan clamps |
//! | [`crop`] | Crop rectangle state machine (create, move, resize) |
//! | [`banner`] | The four optional banner slots |
//! | [`grid`] | Tile arena, cell geometry and per-tile pan/zoom for collages |
//! | [`debounce`] | Cancel-and-reschedule debounce for slider input |
//! | [`imaging`] | Decode/encode backend, effects, output composition, no-clobber save |
//! | [`session`] | The interaction surface a UI shell drives: modes, commands, frame snapshot |
//! | [`naming`] | Auto-incremented output names |
//! | [`config`] | `config.toml` editor defaults over stock values |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Synchronous, Clock-Free Core
//!
//! All interaction is a synchronous call on [`session::Session`]. Nothing in
//! the library reads the clock: commands that schedule work take `now`, and
//! the shell calls [`session::Session::tick`] to run what has come due. This
//! keeps debounce and post-save reset behaviour deterministic under test.
//!
//! ## Total Geometry
//!
//! Layout, mapping and clamping functions never fail. A container too small to
//! hold anything yields a layout flagged
//! [`degenerate`](layout::LayoutResult::degenerate) with 1×1 placeholders; the
//! only errors that surface are decode and save I/O failures.
//!
//! ## Saves Never Overwrite
//!
//! Output goes to `<stem>_cropped<ext>` (or `_collage`), then `_1`, `_2`, ….
//! The encoded bytes are written to a temporary file in the destination
//! directory and persisted without clobbering, so an existing file is never
//! replaced and a failed save leaves nothing behind.

pub mod aspect;
pub mod banner;
pub mod config;
pub mod crop;
pub mod debounce;
pub mod grid;
pub mod imaging;
pub mod layout;
pub mod naming;
pub mod output;
pub mod session;
pub mod types;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_helpers;
