//! Infrastructure layer for the gesture controller.
//!
//! Contains the adapters that talk to the outside world: the camera, the
//! landmark detector, the config file, and the host UI.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `gesture_core`, but the domain crate never imports it.
//!
//! # Sub-modules
//!
//! - **`camera`**          – The `CameraDevice` / `CameraStream` seam plus a
//!   mock camera for tests and the headless binary.
//! - **`landmark_source`** – The `LandmarkSource` seam, detector options, a
//!   mock detector for tests, and a scripted detector that replays a demo hand.
//! - **`headless`**        – Host adapters for running without a browser:
//!   a logging event sink, a no-op hit tester, and the demo capture backend.
//! - **`storage`**         – TOML configuration persistence.
//! - **`ui_bridge`**       – Command handlers and DTOs exposing status and the
//!   hand-control toggle to the host UI.

pub mod camera;
pub mod headless;
pub mod landmark_source;
pub mod storage;
pub mod ui_bridge;
