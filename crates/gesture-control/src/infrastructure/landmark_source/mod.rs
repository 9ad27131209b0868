//! Landmark detector infrastructure.
//!
//! The hand-landmark model is an opaque oracle: given one video frame and a
//! timestamp it reports the 21 landmarks of at most one hand.  This module
//! defines the seam ([`LandmarkSource`]) plus the options handed to a detector
//! when it is loaded.
//!
//! # Implementations
//!
//! - [`mock::MockLandmarkSource`]         – scripted results and counters for tests.
//! - [`scripted::ScriptedLandmarkSource`] – a synthetic hand that follows a
//!   fixed demo path; drives the headless binary.
//! - [`replay::ReplayLandmarkSource`]     – replays recorded detector output
//!   (one JSON result per line).

use async_trait::async_trait;
use gesture_core::HandFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::camera::VideoFrame;

pub mod mock;
pub mod replay;
pub mod scripted;

/// Model used when the config does not name one.
pub const DEFAULT_MODEL_ASSET_PATH: &str =
    "https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/1/hand_landmarker.task";

/// Location of the detector runtime files.
pub const DEFAULT_RUNTIME_BASE_PATH: &str =
    "https://cdn.jsdelivr.net/npm/@mediapipe/tasks-vision@0.10.0/wasm";

/// Error type for detector operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectorError {
    /// The model or runtime could not be loaded.
    #[error("failed to load hand landmark model: {0}")]
    LoadFailed(String),

    /// A single detection call failed.  The frame loop treats this as "no hand".
    #[error("landmark detection failed: {0}")]
    DetectFailed(String),

    /// The detector was used after `close`.
    #[error("landmark detector already closed")]
    AlreadyClosed,
}

/// Hardware the detector should run its model on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Delegate {
    #[default]
    Gpu,
    Cpu,
}

/// How the detector is fed.  Video mode lets the model track a hand across
/// frames using the timestamps passed to `detect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunningMode {
    Image,
    #[default]
    Video,
}

/// Options handed to [`LandmarkSource::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorOptions {
    pub model_asset_path: String,
    pub runtime_base_path: String,
    pub delegate: Delegate,
    pub running_mode: RunningMode,
    /// Maximum number of hands to report.  Only the first hand is ever used.
    pub num_hands: u8,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            model_asset_path: DEFAULT_MODEL_ASSET_PATH.to_string(),
            runtime_base_path: DEFAULT_RUNTIME_BASE_PATH.to_string(),
            delegate: Delegate::Gpu,
            running_mode: RunningMode::Video,
            num_hands: 1,
        }
    }
}

/// A hand-landmark detector.
///
/// Lifecycle: `initialize` once, `detect` at most once per decoded frame,
/// `close` exactly once at teardown.
#[async_trait]
pub trait LandmarkSource: Send {
    /// Loads the model.  May take arbitrarily long (network download).
    async fn initialize(&mut self, options: &DetectorOptions) -> Result<(), DetectorError>;

    /// Runs detection on one frame.
    ///
    /// `timestamp_ms` must increase monotonically across calls.
    /// Returns `Ok(None)` when no hand is in view.
    fn detect(
        &mut self,
        frame: &VideoFrame,
        timestamp_ms: u64,
    ) -> Result<Option<HandFrame>, DetectorError>;

    /// Releases the model.
    fn close(&mut self) -> Result<(), DetectorError>;
}
