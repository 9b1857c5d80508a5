//! Banner + content layout solver.
//!
//! Places a content rectangle and up to four banner rectangles inside a
//! container. Pure geometry: no state, no pixels, and no failure path. A
//! container too small to hold anything yields a 1×1 placeholder flagged as
//! [`degenerate`](LayoutResult::degenerate).
//!
//! ## Banner ratios
//!
//! Each active banner contributes one ratio `r`:
//!
//! - **left / right**: banner width = `r × content height` (image w/h, default 0.25)
//! - **top / bottom**: banner height = `r × content width` (image h/w, default 0.25)
//!
//! ## Solving
//!
//! With a known content aspect `A` the content height is the smaller of the
//! horizontal and vertical budgets:
//!
//! ```text
//! h₁ = availW / (rLeft + rRight + A)
//! h₂ = availH / (1 + A·(rTop + rBottom))
//! h  = min(h₁, h₂),  w = h·A
//! ```
//!
//! Without one (`Free`) the coupled system `w = availW − h·sV`,
//! `h = availH − w·sH` is solved in closed form. When its denominator
//! `1 − sV·sH` vanishes, or the solution is not positive, each axis is divided
//! independently instead. That fallback is an approximation: banner aspect is
//! not preserved there, only positive dimensions are guaranteed.

use serde::Serialize;
use tracing::debug;

use crate::aspect::ContentAspect;
use crate::types::{Rect, Side, Size};

const DENOMINATOR_EPSILON: f64 = 1e-6;

/// Ratios of the active banners. `None` means the side is off.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BannerRatios {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl BannerRatios {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn get(&self, side: Side) -> Option<f64> {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set(&mut self, side: Side, ratio: Option<f64>) {
        let slot = match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *slot = ratio.map(|r| if r.is_finite() { r.max(0.0) } else { 0.0 });
    }

    pub fn with(mut self, side: Side, ratio: f64) -> Self {
        self.set(side, Some(ratio));
        self
    }

    fn ratio(&self, side: Side) -> f64 {
        self.get(side).unwrap_or(0.0)
    }

    pub fn is_active(&self, side: Side) -> bool {
        self.get(side).is_some()
    }

    /// Sum of left + right ratios.
    pub fn vertical_sum(&self) -> f64 {
        self.ratio(Side::Left) + self.ratio(Side::Right)
    }

    /// Sum of top + bottom ratios.
    pub fn horizontal_sum(&self) -> f64 {
        self.ratio(Side::Top) + self.ratio(Side::Bottom)
    }
}

/// Everything the solver needs for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRequest {
    pub container: Size,
    pub banners: BannerRatios,
    pub content: ContentAspect,
    pub gap: u32,
    /// When false, no gap is inserted between a banner and the content.
    pub gap_at_banners: bool,
}

impl LayoutRequest {
    pub fn new(width: f64, height: f64, content: ContentAspect) -> Self {
        Self {
            container: Size::new(width, height),
            banners: BannerRatios::none(),
            content,
            gap: 0,
            gap_at_banners: true,
        }
    }

    pub fn with_banners(mut self, banners: BannerRatios) -> Self {
        self.banners = banners;
        self
    }

    pub fn with_gap(mut self, gap: u32, gap_at_banners: bool) -> Self {
        self.gap = gap;
        self.gap_at_banners = gap_at_banners;
        self
    }
}

/// A named region of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Banner(Side),
    Content,
}

impl Region {
    pub fn name(self) -> &'static str {
        match self {
            Region::Banner(side) => side.name(),
            Region::Content => "content",
        }
    }
}

/// Absolute rectangles for one layout pass. Recomputed on every resize/toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutResult {
    pub content: Rect,
    pub top: Option<Rect>,
    pub bottom: Option<Rect>,
    pub left: Option<Rect>,
    pub right: Option<Rect>,
    /// The container could not hold the layout; nothing should be rendered.
    pub degenerate: bool,
}

impl LayoutResult {
    fn placeholder() -> Self {
        Self {
            content: Rect::new(0, 0, 1, 1),
            top: None,
            bottom: None,
            left: None,
            right: None,
            degenerate: true,
        }
    }

    pub fn banner(&self, side: Side) -> Option<Rect> {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Regions in draw order: top and left precede the content, right and
    /// bottom follow it.
    pub fn regions(&self) -> Vec<(Region, Rect)> {
        let mut out = Vec::with_capacity(5);
        for side in [Side::Top, Side::Left] {
            if let Some(r) = self.banner(side) {
                out.push((Region::Banner(side), r));
            }
        }
        out.push((Region::Content, self.content));
        for side in [Side::Right, Side::Bottom] {
            if let Some(r) = self.banner(side) {
                out.push((Region::Banner(side), r));
            }
        }
        out
    }

    /// Bounding box of every region.
    pub fn block(&self) -> Rect {
        self.regions()
            .iter()
            .map(|(_, r)| *r)
            .fold(self.content, |acc, r| acc.union(&r))
    }
}

/// Content size plus the thickness of each banner, before positioning.
#[derive(Debug, Clone, Copy)]
struct Solved {
    content_w: f64,
    content_h: f64,
    top: f64,
    bottom: f64,
    left: f64,
    right: f64,
}

/// Solve one layout pass. Total: always returns a result.
pub fn solve(request: &LayoutRequest) -> LayoutResult {
    let banners = &request.banners;
    let gap_for = |side: Side| -> u32 {
        if request.gap_at_banners && banners.is_active(side) {
            request.gap
        } else {
            0
        }
    };
    let (gap_top, gap_bottom) = (gap_for(Side::Top), gap_for(Side::Bottom));
    let (gap_left, gap_right) = (gap_for(Side::Left), gap_for(Side::Right));

    let avail_w = request.container.width - (gap_left + gap_right) as f64;
    let avail_h = request.container.height - (gap_top + gap_bottom) as f64;
    if !(avail_w > 0.0 && avail_h > 0.0) {
        debug!(
            width = request.container.width,
            height = request.container.height,
            "layout container too small, returning placeholder"
        );
        return LayoutResult::placeholder();
    }

    let solved = match request.content.ratio() {
        Some(aspect) => solve_constrained(banners, avail_w, avail_h, aspect),
        None => solve_free(banners, avail_w, avail_h),
    };
    let solved = if solved.content_w > 0.0 && solved.content_h > 0.0 {
        solved
    } else {
        solve_independent(banners, avail_w, avail_h)
    };

    place(request, &solved, (gap_top, gap_bottom, gap_left, gap_right))
}

fn with_banners(banners: &BannerRatios, w: f64, h: f64) -> Solved {
    Solved {
        content_w: w,
        content_h: h,
        top: banners.ratio(Side::Top) * w,
        bottom: banners.ratio(Side::Bottom) * w,
        left: banners.ratio(Side::Left) * h,
        right: banners.ratio(Side::Right) * h,
    }
}

fn solve_constrained(banners: &BannerRatios, avail_w: f64, avail_h: f64, aspect: f64) -> Solved {
    let h_by_width = avail_w / (banners.vertical_sum() + aspect);
    let h_by_height = avail_h / (1.0 + aspect * banners.horizontal_sum());
    let h = h_by_width.min(h_by_height);
    with_banners(banners, h * aspect, h)
}

fn solve_free(banners: &BannerRatios, avail_w: f64, avail_h: f64) -> Solved {
    let s_v = banners.vertical_sum();
    let s_h = banners.horizontal_sum();
    let denominator = 1.0 - s_v * s_h;
    if denominator.abs() < DENOMINATOR_EPSILON {
        debug!(s_v, s_h, "free layout system is singular, dividing axes independently");
        return solve_independent(banners, avail_w, avail_h);
    }
    let w = (avail_w - s_v * avail_h) / denominator;
    let h = avail_h - w * s_h;
    with_banners(banners, w, h)
}

/// Per-axis division ignoring the coupling between banner ratio and the
/// orthogonal content dimension.
fn solve_independent(banners: &BannerRatios, avail_w: f64, avail_h: f64) -> Solved {
    let w = avail_w / (1.0 + banners.vertical_sum());
    let h = avail_h / (1.0 + banners.horizontal_sum());
    Solved {
        content_w: w,
        content_h: h,
        top: banners.ratio(Side::Top) * h,
        bottom: banners.ratio(Side::Bottom) * h,
        left: banners.ratio(Side::Left) * w,
        right: banners.ratio(Side::Right) * w,
    }
}

fn thickness(banners: &BannerRatios, side: Side, value: f64) -> u32 {
    if banners.is_active(side) {
        value.round().max(1.0) as u32
    } else {
        0
    }
}

fn place(request: &LayoutRequest, solved: &Solved, gaps: (u32, u32, u32, u32)) -> LayoutResult {
    let banners = &request.banners;
    let (gap_top, gap_bottom, gap_left, gap_right) = gaps;
    let container_w = request.container.width.floor() as i64;
    let container_h = request.container.height.floor() as i64;

    let top = thickness(banners, Side::Top, solved.top);
    let bottom = thickness(banners, Side::Bottom, solved.bottom);
    let left = thickness(banners, Side::Left, solved.left);
    let right = thickness(banners, Side::Right, solved.right);

    // Rounding can push the block a pixel past the container; the content
    // absorbs the excess.
    let fixed_w = (left + right + gap_left + gap_right) as i64;
    let fixed_h = (top + bottom + gap_top + gap_bottom) as i64;
    if fixed_w + 1 > container_w || fixed_h + 1 > container_h {
        debug!(
            fixed_w,
            fixed_h, "banners and gaps leave no room for content, returning placeholder"
        );
        return LayoutResult::placeholder();
    }
    let content_w = (solved.content_w.round() as i64)
        .min(container_w - fixed_w)
        .max(1);
    let content_h = (solved.content_h.round() as i64)
        .min(container_h - fixed_h)
        .max(1);

    let block_w = fixed_w + content_w;
    let block_h = fixed_h + content_h;
    let origin_x = (container_w - block_w).div_euclid(2).max(0);
    let origin_y = (container_h - block_h).div_euclid(2).max(0);

    let content_x = origin_x + (left + gap_left) as i64;
    let content_y = origin_y + (top + gap_top) as i64;
    let content = Rect::new(
        content_x as i32,
        content_y as i32,
        content_w as u32,
        content_h as u32,
    );

    let active = |side: Side, rect: Rect| banners.is_active(side).then_some(rect);
    LayoutResult {
        content,
        top: active(
            Side::Top,
            Rect::new(content.x, origin_y as i32, content.width, top),
        ),
        bottom: active(
            Side::Bottom,
            Rect::new(
                content.x,
                content.bottom() + gap_bottom as i32,
                content.width,
                bottom,
            ),
        ),
        left: active(
            Side::Left,
            Rect::new(origin_x as i32, content.y, left, content.height),
        ),
        right: active(
            Side::Right,
            Rect::new(
                content.right() + gap_right as i32,
                content.y,
                right,
                content.height,
            ),
        ),
        degenerate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_overlap(layout: &LayoutResult) {
        let regions = layout.regions();
        for (i, (ra, a)) in regions.iter().enumerate() {
            for (rb, b) in regions.iter().skip(i + 1) {
                assert!(
                    !a.overlaps(b),
                    "{} {a:?} overlaps {} {b:?}",
                    ra.name(),
                    rb.name()
                );
            }
        }
    }

    fn assert_centered(layout: &LayoutResult, w: f64, h: f64) {
        let block = layout.block();
        let left = block.x as f64;
        let right = w.floor() - block.right() as f64;
        let top = block.y as f64;
        let bottom = h.floor() - block.bottom() as f64;
        assert!((left - right).abs() <= 1.0, "horizontal margins {left} vs {right}");
        assert!((top - bottom).abs() <= 1.0, "vertical margins {top} vs {bottom}");
        assert!(left >= 0.0 && right >= 0.0 && top >= 0.0 && bottom >= 0.0);
    }

    fn all_banner_combinations() -> Vec<BannerRatios> {
        (0..16u8)
            .map(|mask| {
                let mut b = BannerRatios::none();
                for (bit, side) in Side::ALL.into_iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        b.set(side, Some(0.25 + 0.1 * bit as f64));
                    }
                }
                b
            })
            .collect()
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    #[test]
    fn top_banner_square_content() {
        // 800x600, top 0.25, 1:1: h₁ = 800, h₂ = 600 / 1.25 = 480
        let request = LayoutRequest::new(800.0, 600.0, ContentAspect::Fixed(1.0))
            .with_banners(BannerRatios::none().with(Side::Top, 0.25));
        let layout = solve(&request);

        assert!(!layout.degenerate);
        assert_eq!(layout.content.width, 480);
        assert_eq!(layout.content.height, 480);
        let top = layout.top.unwrap();
        assert_eq!(top.height, 120);
        assert_eq!(top.width, 480);
        assert_eq!(layout.block(), Rect::new(160, 0, 480, 600));
        assert_eq!(layout.content.y, 120);
    }

    #[test]
    fn top_banner_gap_sits_between_banner_and_content() {
        let request = LayoutRequest::new(800.0, 600.0, ContentAspect::Fixed(1.0))
            .with_banners(BannerRatios::none().with(Side::Top, 0.25))
            .with_gap(10, true);
        let layout = solve(&request);
        let top = layout.top.unwrap();
        assert_eq!(layout.content.y - top.bottom(), 10);
        assert_eq!(layout.block().height, top.height + 10 + layout.content.height);
    }

    #[test]
    fn banner_gap_flag_off_removes_gap() {
        let request = LayoutRequest::new(800.0, 600.0, ContentAspect::Fixed(1.0))
            .with_banners(BannerRatios::none().with(Side::Left, 0.25))
            .with_gap(10, false);
        let layout = solve(&request);
        assert_eq!(layout.left.unwrap().right(), layout.content.x);
    }

    #[test]
    fn no_banners_fixed_aspect_fills_limiting_axis() {
        let layout = solve(&LayoutRequest::new(
            1000.0,
            500.0,
            ContentAspect::Fixed(16.0 / 9.0),
        ));
        assert_eq!(layout.content.height, 500);
        assert_eq!(layout.content.width, 889);
        assert_eq!(layout.regions().len(), 1);
    }

    #[test]
    fn regions_emit_in_draw_order() {
        let mut banners = BannerRatios::none();
        for side in Side::ALL {
            banners.set(side, Some(0.2));
        }
        let layout = solve(
            &LayoutRequest::new(900.0, 700.0, ContentAspect::Fixed(1.0)).with_banners(banners),
        );
        let order: Vec<&str> = layout.regions().iter().map(|(r, _)| r.name()).collect();
        assert_eq!(order, ["top", "left", "content", "right", "bottom"]);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn centered_and_disjoint_for_all_banner_combinations() {
        let containers = [(800.0, 600.0), (333.0, 1001.0), (1920.0, 1080.0), (50.0, 49.0)];
        let policies = [
            ContentAspect::Fixed(1.0),
            ContentAspect::Fixed(9.0 / 16.0),
            ContentAspect::Fit(2.35),
            ContentAspect::Free,
        ];
        for (w, h) in containers {
            for banners in all_banner_combinations() {
                for content in policies {
                    for gap in [0, 7] {
                        let request = LayoutRequest::new(w, h, content)
                            .with_banners(banners)
                            .with_gap(gap, true);
                        let layout = solve(&request);
                        assert!(!layout.degenerate, "{request:?}");
                        assert_no_overlap(&layout);
                        assert_centered(&layout, w, h);
                    }
                }
            }
        }
    }

    #[test]
    fn fixed_aspect_is_honoured() {
        for banners in all_banner_combinations() {
            for ratio in [1.0, 4.0 / 3.0, 3.0 / 4.0, 16.0 / 9.0, 9.0 / 16.0] {
                let layout = solve(
                    &LayoutRequest::new(1600.0, 1200.0, ContentAspect::Fixed(ratio))
                        .with_banners(banners),
                );
                let actual = layout.content.width as f64 / layout.content.height as f64;
                // One pixel of rounding on the short side.
                let tolerance = ratio / layout.content.height.min(layout.content.width) as f64 * 2.0;
                assert!(
                    (actual - ratio).abs() <= tolerance,
                    "ratio {ratio} got {actual} with {banners:?}"
                );
            }
        }
    }

    #[test]
    fn free_content_takes_remaining_space() {
        // Single left banner 0.25: w = 800 - 0.25·h, h = 600 → w = 650
        let layout = solve(
            &LayoutRequest::new(800.0, 600.0, ContentAspect::Free)
                .with_banners(BannerRatios::none().with(Side::Left, 0.25)),
        );
        assert_eq!(layout.content.width, 650);
        assert_eq!(layout.content.height, 600);
        assert_eq!(layout.left.unwrap().width, 150);
    }

    #[test]
    fn free_singular_system_falls_back_to_positive_dimensions() {
        // sV = 2, sH = 0.5 → 1 - sV·sH = 0
        let banners = BannerRatios::none()
            .with(Side::Left, 1.0)
            .with(Side::Right, 1.0)
            .with(Side::Top, 0.25)
            .with(Side::Bottom, 0.25);
        let layout = solve(
            &LayoutRequest::new(900.0, 600.0, ContentAspect::Free).with_banners(banners),
        );
        assert!(!layout.degenerate);
        assert!(layout.content.width > 0 && layout.content.height > 0);
        for side in Side::ALL {
            let r = layout.banner(side).unwrap();
            assert!(r.width > 0 && r.height > 0);
        }
        assert_no_overlap(&layout);
    }

    #[test]
    fn free_negative_solution_falls_back() {
        // Wide side banners in a short, wide container make w negative.
        let banners = BannerRatios::none()
            .with(Side::Left, 3.0)
            .with(Side::Right, 3.0)
            .with(Side::Top, 0.05);
        let layout = solve(
            &LayoutRequest::new(200.0, 600.0, ContentAspect::Free).with_banners(banners),
        );
        assert!(layout.content.width > 0);
        assert!(layout.content.height > 0);
        assert!(layout.block().right() <= 200);
    }

    // =========================================================================
    // Degenerate containers
    // =========================================================================

    #[test]
    fn zero_container_is_degenerate() {
        let layout = solve(&LayoutRequest::new(0.0, 600.0, ContentAspect::Fixed(1.0)));
        assert!(layout.degenerate);
        assert_eq!(layout.content, Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn minimum_banner_thickness_overflowing_container_is_degenerate() {
        // Each side banner is at least one pixel, leaving no column for content.
        let request = LayoutRequest::new(2.0, 600.0, ContentAspect::Free).with_banners(
            BannerRatios::none()
                .with(Side::Left, 0.25)
                .with(Side::Right, 0.25),
        );
        let layout = solve(&request);
        assert!(layout.degenerate);
        assert_eq!(layout.content, Rect::new(0, 0, 1, 1));
        assert!(layout.left.is_none() && layout.right.is_none());
    }

    #[test]
    fn every_region_stays_inside_tiny_and_extreme_containers() {
        let containers = [
            (1.0, 1.0),
            (2.0, 600.0),
            (600.0, 2.0),
            (3.0, 3.0),
            (5.0, 4000.0),
            (4000.0, 5.0),
            (17.0, 9.0),
        ];
        let policies = [
            ContentAspect::Free,
            ContentAspect::Fixed(1.0),
            ContentAspect::Fixed(16.0 / 9.0),
            ContentAspect::Fit(0.1),
        ];
        for (w, h) in containers {
            for banners in all_banner_combinations() {
                for content in policies {
                    for gap in [0, 1, 3] {
                        let request = LayoutRequest::new(w, h, content)
                            .with_banners(banners)
                            .with_gap(gap, true);
                        let layout = solve(&request);
                        if layout.degenerate {
                            continue;
                        }
                        for (region, rect) in layout.regions() {
                            assert!(
                                rect.x >= 0
                                    && rect.y >= 0
                                    && rect.right() <= w as i32
                                    && rect.bottom() <= h as i32,
                                "{} {rect:?} escapes {w}x{h} for {request:?}",
                                region.name()
                            );
                        }
                        assert_no_overlap(&layout);
                        assert_centered(&layout, w, h);
                    }
                }
            }
        }
    }

    #[test]
    fn gaps_consuming_container_is_degenerate() {
        let request = LayoutRequest::new(20.0, 600.0, ContentAspect::Free)
            .with_banners(
                BannerRatios::none()
                    .with(Side::Left, 0.25)
                    .with(Side::Right, 0.25),
            )
            .with_gap(10, true);
        assert!(solve(&request).degenerate);
    }
}
