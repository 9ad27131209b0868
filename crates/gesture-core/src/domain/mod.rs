//! Domain entities for hand-gesture pointer control.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from camera APIs, detection runtimes, or UI frameworks.
//! - Can be compiled and tested on any platform without a webcam attached.
//! - Defines what makes the system what it is: here, the idea that a cloud of
//!   hand landmarks can be read as a pointer that moves, clicks, drags and
//!   scrolls.
//!
//! Outer layers (the capture session, the event sink, the status UI) depend on
//! the domain, but the domain never depends on them.
//!
//! # Data flow
//!
//! ```text
//! HandFrame ──► gesture (classify) ──► intent (step) ──► Vec<Intent>
//!                                         │
//!                                         └─ viewport (mirror + scale)
//! ```

/// Gesture classification: pinch and grab from one frame.
pub mod gesture;
/// Per-frame intent mapping and the persisted control state.
pub mod intent;
/// Hand landmarks and the 21-point hand frame.
pub mod landmark;
/// Camera-space to screen-space coordinate mapping.
pub mod viewport;
