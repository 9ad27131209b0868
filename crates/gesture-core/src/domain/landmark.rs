//! Hand landmark domain entities.
//!
//! A detector reports each visible hand as 21 anatomical points.  Coordinates
//! are normalised to the camera image: `x` and `y` are roughly in `[0, 1]`
//! (origin at the top-left of the *unmirrored* camera image), `z` is a relative
//! depth with the wrist as reference.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks in one hand frame.
pub const LANDMARK_COUNT: usize = 21;

// ── Anatomical indices ────────────────────────────────────────────────────────

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// The four non-thumb fingertips used by the grab heuristic.
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Errors that can occur when building a [`HandFrame`].
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// The detector returned the wrong number of points for one hand.
    #[error("hand frame needs {LANDMARK_COUNT} landmarks, got {0}")]
    WrongLandmarkCount(usize),

    /// A coordinate was NaN or infinite.
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// A normalised 3D point on the hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the image plane, ignoring depth.
    ///
    /// Depth from a monocular detector is much noisier than `x`/`y`, so the
    /// gesture thresholds are defined on the planar distance only.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// The 21 landmarks of one detected hand in one video frame.
///
/// A `HandFrame` is built fresh for every frame, handed to the step function
/// by reference, and dropped once the frame has been processed.  It is never
/// stored in [`ControlState`](crate::domain::intent::ControlState).
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    /// Creates a frame from exactly 21 landmarks.
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Creates a frame from a slice, validating length and finiteness.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::WrongLandmarkCount`] if `points.len() != 21` and
    /// [`FrameError::NonFinite`] if any coordinate is NaN or infinite.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, FrameError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongLandmarkCount(points.len()));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(FrameError::NonFinite { index });
        }
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks.copy_from_slice(points);
        Ok(Self { landmarks })
    }

    /// Returns the landmark at anatomical index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 21`.  Use the index constants in this module.
    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn wrist(&self) -> Landmark {
        self.landmarks[WRIST]
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.landmarks[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.landmarks[INDEX_TIP]
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
