//! Decoding of landmark-detector results.
//!
//! Detectors hand back their result in one of two shapes:
//!
//! ```text
//! JSON  { "landmarks": [ [ {"x":…,"y":…,"z":…} × 21 ], … ] }   (one list per hand)
//! flat  [x0, y0, z0, x1, y1, z1, …]                            (63 floats per hand)
//! ```
//!
//! An empty hand list means "no hand in this frame" and decodes to `Ok(None)`.
//! Only the first hand is used; the pointer is driven by a single hand.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::landmark::{FrameError, HandFrame, Landmark, LANDMARK_COUNT};

/// Number of `f32` values describing one hand in a flat buffer.
pub const FLOATS_PER_HAND: usize = LANDMARK_COUNT * 3;

/// Errors that can occur while decoding a detector result.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The JSON text could not be parsed into a detection result.
    #[error("malformed detection JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The first hand did not form a valid frame.
    #[error("invalid hand frame: {0}")]
    Frame(#[from] FrameError),

    /// A flat buffer is shorter than its declared hand count requires.
    #[error("insufficient data: need at least {needed} floats, got {available}")]
    InsufficientData { needed: usize, available: usize },
}

/// The result object returned by a detector for one video frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionResult {
    /// One landmark list per detected hand, in detector order.
    #[serde(default)]
    pub landmarks: Vec<Vec<Landmark>>,
}

impl DetectionResult {
    /// Returns the first hand as a frame, or `None` if no hand was detected.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::Frame`] if the first hand is malformed.
    pub fn first_hand(&self) -> Result<Option<HandFrame>, DetectionError> {
        match self.landmarks.first() {
            Some(points) => Ok(Some(HandFrame::from_slice(points)?)),
            None => Ok(None),
        }
    }
}

/// Decodes a JSON detector result into at most one hand frame.
///
/// # Errors
///
/// Returns [`DetectionError::Json`] for unparsable text and
/// [`DetectionError::Frame`] if the first hand does not have 21 finite points.
///
/// # Examples
///
/// ```rust
/// use gesture_core::protocol::decode_json;
///
/// assert!(decode_json(r#"{"landmarks": []}"#).unwrap().is_none());
/// ```
pub fn decode_json(json: &str) -> Result<Option<HandFrame>, DetectionError> {
    let result: DetectionResult = serde_json::from_str(json)?;
    result.first_hand()
}

/// Decodes a flat `[x, y, z, …]` buffer holding `num_hands` hands.
///
/// # Errors
///
/// Returns [`DetectionError::InsufficientData`] if `data` is shorter than
/// `num_hands * 63` floats, or [`DetectionError::Frame`] for non-finite values.
pub fn decode_flat(data: &[f32], num_hands: usize) -> Result<Option<HandFrame>, DetectionError> {
    if num_hands == 0 {
        return Ok(None);
    }
    // An overflowing hand count can never be satisfied by a real buffer.
    let needed = num_hands.checked_mul(FLOATS_PER_HAND).unwrap_or(usize::MAX);
    if data.len() < needed {
        return Err(DetectionError::InsufficientData {
            needed,
            available: data.len(),
        });
    }
    let points: Vec<Landmark> = data[..FLOATS_PER_HAND]
        .chunks_exact(3)
        .map(|c| Landmark::new(c[0], c[1], c[2]))
        .collect();
    Ok(Some(HandFrame::from_slice(&points)?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
