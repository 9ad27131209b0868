//! Camera-space to screen-space coordinate mapping.
//!
//! The camera preview is shown mirrored (selfie convention), so a hand moving
//! to the user's right moves toward *smaller* `x` in the raw camera image.  The
//! horizontal axis is therefore flipped when mapping to the screen:
//!
//! ```text
//! screen_x = (1 - x) * width
//! screen_y = y * height
//! ```
//!
//! Dropping the flip would invert every left/right gesture.

use serde::{Deserialize, Serialize};

use crate::domain::landmark::Landmark;

/// Size of the host viewport in CSS/screen pixels.
///
/// Passed in by the caller and refreshed on resize; the transformer never
/// looks it up on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A position in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - earlier`.
    pub fn delta_from(&self, earlier: &ScreenPoint) -> (f64, f64) {
        (self.x - earlier.x, self.y - earlier.y)
    }
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Maps a normalised, unmirrored camera landmark to mirrored screen pixels.
    pub fn to_screen(&self, landmark: &Landmark) -> ScreenPoint {
        ScreenPoint {
            x: (1.0 - f64::from(landmark.x)) * self.width,
            y: f64::from(landmark.y) * self.height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_camera_edge_maps_to_right_screen_edge() {
        let vp = Viewport::new(1000.0, 800.0);
        let p = vp.to_screen(&Landmark::new(0.0, 0.0, 0.0));
        assert_eq!(p, ScreenPoint::new(1000.0, 0.0));
    }

    #[test]
    fn test_right_camera_edge_maps_to_left_screen_edge() {
        let vp = Viewport::new(1000.0, 800.0);
        let p = vp.to_screen(&Landmark::new(1.0, 1.0, 0.0));
        assert_eq!(p, ScreenPoint::new(0.0, 800.0));
    }

    #[test]
    fn test_vertical_axis_is_not_mirrored() {
        let vp = Viewport::new(1000.0, 800.0);
        let p = vp.to_screen(&Landmark::new(0.5, 0.25, 0.0));
        assert!((p.x - 500.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_delta_from_is_current_minus_earlier() {
        let earlier = ScreenPoint::new(100.0, 50.0);
        let now = ScreenPoint::new(130.0, 40.0);
        assert_eq!(now.delta_from(&earlier), (30.0, -10.0));
    }
}
