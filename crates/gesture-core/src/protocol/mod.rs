//! Protocol module: detector output decoding and the host-facing event format.
//!
//! - **`detection`** – Turns what a landmark detector returns (a JSON result
//!   object, or a flat buffer of floats) into at most one [`HandFrame`].
//! - **`events`** – The serialisable [`GestureEvent`] a host UI consumes.
//!
//! [`HandFrame`]: crate::domain::landmark::HandFrame

pub mod detection;
pub mod events;

pub use detection::{decode_flat, decode_json, DetectionError, DetectionResult, FLOATS_PER_HAND};
pub use events::{decode_event, encode_event, GestureEvent};
