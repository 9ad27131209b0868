//! gesture-control library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does gesture-control do? (for beginners)
//!
//! `gesture-core` knows how to read one frame of hand landmarks.  This crate
//! owns everything *around* that:
//!
//! 1. Loads the landmark detector and opens the camera (either may fail: no
//!    camera, permission denied, model download error).
//! 2. Runs a frame loop: grab a video frame, ask the detector for landmarks,
//!    feed them to the gesture step function.
//! 3. Turns the resulting intents into calls on the host UI's callbacks
//!    (`on_scroll`, `on_pinch`, `on_drag`) and hit-tests clicks.
//! 4. Tears everything down in a fixed order when hand control is switched off.

/// Application layer: use cases for the gesture controller.
pub mod application;

/// Infrastructure layer: camera and detector adapters, config, UI bridge.
pub mod infrastructure;
