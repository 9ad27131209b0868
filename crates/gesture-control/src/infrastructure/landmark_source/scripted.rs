//! A synthetic hand that follows a fixed demo path.
//!
//! Used by the headless binary to exercise the whole pipeline without a
//! camera or a model.  The hand pose is a pure function of the timestamp, so
//! the same timestamp always yields the same landmarks.
//!
//! One cycle lasts [`CYCLE_MS`] and runs through:
//!
//! | from (ms) | pose                                            |
//! |-----------|-------------------------------------------------|
//! | 0         | open hand sweeping across the middle of the view |
//! | 3000      | parked in the low-x edge band (scrolls +)       |
//! | 4500      | parked in the high-x edge band (scrolls −)      |
//! | 6000      | pinching in the centre (one click)              |
//! | 7000      | open hand in the centre (pinch released)        |
//! | 8000      | fist moving sideways (drag)                     |
//! | 10000     | no hand                                         |

use async_trait::async_trait;
use gesture_core::domain::landmark::{FINGERTIPS, INDEX_TIP, THUMB_TIP, WRIST};
use gesture_core::{HandFrame, Landmark, LANDMARK_COUNT};
use tracing::debug;

use super::{DetectorError, DetectorOptions, LandmarkSource};
use crate::infrastructure::camera::VideoFrame;

/// Length of one demo cycle.
pub const CYCLE_MS: u64 = 12_000;

/// Hand poses the script can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pose {
    Open { x: f32, y: f32 },
    Pinch { x: f32, y: f32 },
    Fist { x: f32, y: f32 },
    Away,
}

/// Pose of the demo hand at `timestamp_ms`.
pub fn pose_at(timestamp_ms: u64) -> Pose {
    let t = timestamp_ms % CYCLE_MS;
    match t {
        0..=2_999 => Pose::Open {
            x: lerp(0.3, 0.7, t as f32 / 3_000.0),
            y: 0.5,
        },
        3_000..=4_499 => Pose::Open { x: 0.08, y: 0.45 },
        4_500..=5_999 => Pose::Open { x: 0.92, y: 0.45 },
        6_000..=6_999 => Pose::Pinch { x: 0.5, y: 0.5 },
        7_000..=7_999 => Pose::Open { x: 0.5, y: 0.5 },
        8_000..=9_999 => Pose::Fist {
            x: lerp(0.4, 0.6, (t - 8_000) as f32 / 2_000.0),
            y: 0.5,
        },
        _ => Pose::Away,
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Builds the landmarks for `pose`, index tip at the pose position.
pub fn hand_for(pose: Pose) -> Option<HandFrame> {
    let (x, y, wrist_drop, thumb) = match pose {
        Pose::Away => return None,
        // Fingertips ~0.5 from the wrist: open.  Thumb well clear of the index tip.
        Pose::Open { x, y } => (x, y, 0.5, (x + 0.15, y + 0.12)),
        Pose::Pinch { x, y } => (x, y, 0.5, (x + 0.02, y + 0.01)),
        // Fingertips curled to ~0.1 from the wrist.
        Pose::Fist { x, y } => (x, y, 0.1, (x + 0.15, y + 0.05)),
    };

    let mut points = [Landmark::new(x, y + wrist_drop * 0.5, 0.0); LANDMARK_COUNT];
    points[WRIST] = Landmark::new(x, y + wrist_drop, 0.0);
    for (i, tip) in FINGERTIPS.iter().enumerate() {
        let spread = 0.02 * i as f32;
        points[*tip] = Landmark::new(x + spread, y, 0.0);
    }
    points[INDEX_TIP] = Landmark::new(x, y, 0.0);
    points[THUMB_TIP] = Landmark::new(thumb.0, thumb.1, 0.0);
    Some(HandFrame::new(points))
}

/// [`LandmarkSource`] that ignores pixels and plays the demo script.
#[derive(Debug, Default)]
pub struct ScriptedLandmarkSource {
    initialized: bool,
    closed: bool,
}

impl ScriptedLandmarkSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LandmarkSource for ScriptedLandmarkSource {
    async fn initialize(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        if options.num_hands == 0 {
            return Err(DetectorError::LoadFailed(
                "num_hands must be at least 1".into(),
            ));
        }
        debug!(
            model = %options.model_asset_path,
            delegate = ?options.delegate,
            "scripted landmark source ready"
        );
        self.initialized = true;
        Ok(())
    }

    fn detect(
        &mut self,
        _frame: &VideoFrame,
        timestamp_ms: u64,
    ) -> Result<Option<HandFrame>, DetectorError> {
        if self.closed {
            return Err(DetectorError::AlreadyClosed);
        }
        if !self.initialized {
            return Err(DetectorError::DetectFailed("detector not initialized".into()));
        }
        Ok(hand_for(pose_at(timestamp_ms)))
    }

    fn close(&mut self) -> Result<(), DetectorError> {
        if self.closed {
            return Err(DetectorError::AlreadyClosed);
        }
        self.closed = true;
        Ok(())
    }
}
