//! Gesture classification from a single hand frame.
//!
//! Two independent boolean gestures are read from the landmark geometry:
//!
//! - **Pinch** – index fingertip close to the thumb tip.
//! - **Grab** – all four non-thumb fingertips pulled in toward the wrist
//!   (a closed fist).
//!
//! Both may be true for the same frame (a tight fist usually brings the index
//! tip near the thumb).  Priority between them is decided by the intent mapper,
//! not here.
//!
//! Classification is a pure function of the frame: no history, no calibration.

use serde::{Deserialize, Serialize};

use crate::domain::landmark::{HandFrame, FINGERTIPS};

/// Index-tip to thumb-tip distance below which the hand is pinching.
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.08;

/// Mean fingertip-to-wrist distance below which the hand is grabbing.
pub const DEFAULT_GRAB_THRESHOLD: f32 = 0.4;

/// Distance thresholds in normalised image units.
///
/// Both comparisons are strict: a distance exactly equal to the threshold is
/// *not* a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    pub pinch: f32,
    pub grab: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pinch: DEFAULT_PINCH_THRESHOLD,
            grab: DEFAULT_GRAB_THRESHOLD,
        }
    }
}

/// The classifier's verdict for one frame, with the raw measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    pub pinching: bool,
    pub grabbing: bool,
    /// Index-tip to thumb-tip distance.
    pub pinch_distance: f32,
    /// Mean distance of the four fingertips to the wrist.
    pub grab_spread: f32,
}

/// Stateless pinch/grab classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> GestureThresholds {
        self.thresholds
    }

    /// Classifies one frame.
    pub fn classify(&self, frame: &HandFrame) -> GestureReading {
        let pinch_distance = pinch_distance(frame);
        let grab_spread = grab_spread(frame);
        GestureReading {
            pinching: pinch_distance < self.thresholds.pinch,
            grabbing: grab_spread < self.thresholds.grab,
            pinch_distance,
            grab_spread,
        }
    }
}

/// Distance between index tip and thumb tip.
pub fn pinch_distance(frame: &HandFrame) -> f32 {
    frame.index_tip().planar_distance(&frame.thumb_tip())
}

/// Mean distance from the index, middle, ring and pinky tips to the wrist.
pub fn grab_spread(frame: &HandFrame) -> f32 {
    let wrist = frame.wrist();
    let total: f32 = FINGERTIPS
        .iter()
        .map(|&tip| frame.point(tip).planar_distance(&wrist))
        .sum();
    total / FINGERTIPS.len() as f32
}

// ── Tests ─────────────────────────────────────────────────────────────────────
