//! Application layer use cases for the gesture controller.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules, here `gesture-core`) and the infrastructure (camera,
//! detector runtime, config files, UI).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "scroll the
//!   gallery while the hand is parked at the edge of the camera view").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so a real webcam and a scripted test camera are interchangeable.
//!
//! # Sub-modules
//!
//! - **`track_gestures`**  – Runs the per-frame step function and dispatches
//!   the resulting intents to the host's [`track_gestures::EventSink`].  This
//!   runs on every frame.
//!
//! - **`capture_session`** – One camera + detector lifetime: acquisition,
//!   the frame loop, and ordered teardown.
//!
//! - **`controller`**      – The mounted control surface: turns hand control
//!   on and off by starting and stopping capture sessions.

pub mod capture_session;
pub mod controller;
pub mod track_gestures;
