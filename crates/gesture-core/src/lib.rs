//! # gesture-core
//!
//! Shared library for hand-gesture pointer control containing the landmark
//! domain, the gesture classifier, the camera-to-screen coordinate transform,
//! and the per-frame intent mapper.
//!
//! It has zero dependencies on camera APIs, detection runtimes, UI toolkits,
//! or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! A hand-landmark detector looks at each camera frame and reports 21 points
//! on the user's hand (wrist, knuckles, fingertips) in normalised coordinates.
//! This crate turns that noisy, continuous stream into a handful of discrete
//! pointer intents: move, click, drag, and edge-scroll.
//!
//! - **`domain`** – Pure business logic.  The most important piece is
//!   [`domain::intent::step`]: a pure function that takes one frame and the
//!   previous [`ControlState`] and returns the new state plus the events that
//!   frame produced.
//!
//! - **`protocol`** – How detector results come in (JSON or flat float
//!   buffers) and how gesture events go out to a host UI (serialisable
//!   [`GestureEvent`] values).

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `gesture_core::HandFrame` instead of `gesture_core::domain::landmark::HandFrame`.
pub use domain::gesture::{GestureClassifier, GestureReading, GestureThresholds};
pub use domain::intent::{step, ControlState, EdgeScrollConfig, Intent, StepConfig, StepOutcome};
pub use domain::landmark::{FrameError, HandFrame, Landmark, LANDMARK_COUNT};
pub use domain::viewport::{ScreenPoint, Viewport};
pub use protocol::detection::{decode_flat, decode_json, DetectionError};
pub use protocol::events::GestureEvent;
