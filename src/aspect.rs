//! Aspect modes and the aspect-fit rule shared by crop creation and resize.
//!
//! Modes are a closed enum. The ratio table, the content-aspect policy handed to
//! the layout solver, and the set of resize handles offered to the user are all
//! derived from the variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::Point;

/// User-selectable aspect mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectMode {
    #[default]
    Free,
    Square,
    FourThree,
    ThreeFour,
    SixteenNine,
    NineSixteen,
    /// Ratio derived from the content itself (the image, or the packed grid).
    Fit,
}

/// Which resize handles a crop rectangle offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSet {
    /// Four corners and four edge midpoints.
    All,
    /// Corners only; an edge drag moves one axis and cannot hold a ratio.
    CornersOnly,
}

impl AspectMode {
    pub const ALL: [AspectMode; 7] = [
        AspectMode::Free,
        AspectMode::Square,
        AspectMode::FourThree,
        AspectMode::ThreeFour,
        AspectMode::SixteenNine,
        AspectMode::NineSixteen,
        AspectMode::Fit,
    ];

    /// Width/height for the fixed modes; `None` for `Free` and `Fit`.
    pub fn fixed_ratio(self) -> Option<f64> {
        match self {
            AspectMode::Square => Some(1.0),
            AspectMode::FourThree => Some(4.0 / 3.0),
            AspectMode::ThreeFour => Some(3.0 / 4.0),
            AspectMode::SixteenNine => Some(16.0 / 9.0),
            AspectMode::NineSixteen => Some(9.0 / 16.0),
            AspectMode::Free | AspectMode::Fit => None,
        }
    }

    /// Ratio a crop rectangle is locked to. `Fit` locks to the content's own aspect.
    pub fn lock_ratio(self, natural: f64) -> Option<f64> {
        match self {
            AspectMode::Free => None,
            AspectMode::Fit => (natural.is_finite() && natural > 0.0).then_some(natural),
            fixed => fixed.fixed_ratio(),
        }
    }

    pub fn handle_set(self) -> HandleSet {
        match self {
            AspectMode::Free => HandleSet::All,
            _ => HandleSet::CornersOnly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectMode::Free => "free",
            AspectMode::Square => "1:1",
            AspectMode::FourThree => "4:3",
            AspectMode::ThreeFour => "3:4",
            AspectMode::SixteenNine => "16:9",
            AspectMode::NineSixteen => "9:16",
            AspectMode::Fit => "fit",
        }
    }
}

impl fmt::Display for AspectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectMode::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let labels: Vec<&str> = AspectMode::ALL.iter().map(|m| m.label()).collect();
                format!("unknown aspect mode '{s}' (expected one of {labels:?})")
            })
    }
}

impl TryFrom<String> for AspectMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectMode> for String {
    fn from(mode: AspectMode) -> Self {
        mode.label().to_string()
    }
}

/// Content-aspect policy for the layout solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentAspect {
    /// One of the fixed ratios of [`AspectMode`].
    Fixed(f64),
    /// A ratio precomputed from the content (image aspect, packed grid aspect).
    Fit(f64),
    /// No constraint: the content box takes whatever the banners leave.
    Free,
}

impl ContentAspect {
    /// The ratio that constrains the content box, if any.
    pub fn ratio(self) -> Option<f64> {
        match self {
            ContentAspect::Fixed(r) | ContentAspect::Fit(r) if r.is_finite() && r > 0.0 => Some(r),
            _ => None,
        }
    }

    /// Policy for a mode, given the content's natural aspect for `Fit`.
    pub fn for_mode(mode: AspectMode, natural: f64) -> Self {
        match mode {
            AspectMode::Free => ContentAspect::Free,
            AspectMode::Fit => ContentAspect::Fit(natural),
            fixed => fixed
                .fixed_ratio()
                .map_or(ContentAspect::Free, ContentAspect::Fixed),
        }
    }
}

/// Move `current` so the rectangle spanned from `anchor` has exactly `ratio`.
///
/// Whichever dimension is short relative to the target is expanded; the sign
/// of each axis follows the drag direction (a zero-length axis counts as
/// positive).
pub fn aspect_fit(anchor: Point, current: Point, ratio: f64) -> Point {
    let dx = current.x - anchor.x;
    let dy = current.y - anchor.y;
    let (w, h) = (dx.abs(), dy.abs());
    if w == 0.0 && h == 0.0 {
        return anchor;
    }

    let (w, h) = if h == 0.0 || w / h > ratio {
        // Too wide: height leads the correction.
        (w, w / ratio)
    } else {
        (h * ratio, h)
    };

    let sx = if dx < 0.0 { -1.0 } else { 1.0 };
    let sy = if dy < 0.0 { -1.0 } else { 1.0 };
    Point::new(anchor.x + sx * w, anchor.y + sy * h)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Mode table
    // =========================================================================

    #[test]
    fn fixed_ratios_match_labels() {
        assert_eq!(AspectMode::Square.fixed_ratio(), Some(1.0));
        assert_eq!(AspectMode::SixteenNine.fixed_ratio(), Some(16.0 / 9.0));
        assert_eq!(AspectMode::NineSixteen.fixed_ratio(), Some(9.0 / 16.0));
        assert_eq!(AspectMode::Free.fixed_ratio(), None);
        assert_eq!(AspectMode::Fit.fixed_ratio(), None);
    }

    #[test]
    fn fit_locks_to_natural_aspect() {
        assert_eq!(AspectMode::Fit.lock_ratio(1.5), Some(1.5));
        assert_eq!(AspectMode::Fit.lock_ratio(0.0), None);
        assert_eq!(AspectMode::Free.lock_ratio(1.5), None);
        assert_eq!(AspectMode::FourThree.lock_ratio(1.5), Some(4.0 / 3.0));
    }

    #[test]
    fn locked_modes_offer_corners_only() {
        assert_eq!(AspectMode::Free.handle_set(), HandleSet::All);
        for mode in AspectMode::ALL.into_iter().filter(|m| *m != AspectMode::Free) {
            assert_eq!(mode.handle_set(), HandleSet::CornersOnly, "{mode}");
        }
    }

    #[test]
    fn parse_roundtrips_labels() {
        for mode in AspectMode::ALL {
            assert_eq!(mode.label().parse::<AspectMode>(), Ok(mode));
        }
        assert!("5:4".parse::<AspectMode>().is_err());
    }

    #[test]
    fn content_aspect_for_mode() {
        assert_eq!(
            ContentAspect::for_mode(AspectMode::Square, 2.0),
            ContentAspect::Fixed(1.0)
        );
        assert_eq!(
            ContentAspect::for_mode(AspectMode::Fit, 2.0),
            ContentAspect::Fit(2.0)
        );
        assert_eq!(ContentAspect::for_mode(AspectMode::Free, 2.0).ratio(), None);
    }

    // =========================================================================
    // aspect_fit
    // =========================================================================

    #[test]
    fn aspect_fit_expands_short_height() {
        // 160 wide, 10 tall at 16:9 → height grows to 90
        let p = aspect_fit(Point::new(0.0, 0.0), Point::new(160.0, 10.0), 16.0 / 9.0);
        assert!((p.x - 160.0).abs() < 1e-9);
        assert!((p.y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn aspect_fit_expands_short_width() {
        let p = aspect_fit(Point::new(0.0, 0.0), Point::new(10.0, 100.0), 1.0);
        assert_eq!(p, Point::new(100.0, 100.0));
    }

    #[test]
    fn aspect_fit_preserves_drag_direction() {
        let p = aspect_fit(Point::new(100.0, 100.0), Point::new(40.0, 90.0), 1.0);
        assert_eq!(p, Point::new(40.0, 40.0));
    }

    #[test]
    fn aspect_fit_horizontal_only_drag() {
        let p = aspect_fit(Point::new(0.0, 0.0), Point::new(-80.0, 0.0), 4.0 / 3.0);
        assert!((p.x + 80.0).abs() < 1e-9);
        assert!((p.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn aspect_fit_zero_drag_stays_put() {
        let a = Point::new(5.0, 5.0);
        assert_eq!(aspect_fit(a, a, 1.0), a);
    }
}
