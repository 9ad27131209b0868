//! Host-facing gesture events.
//!
//! A [`GestureEvent`] is an [`Intent`] stamped with the frame number that
//! produced it.  Hosts receive them as JSON objects:
//!
//! ```text
//! {"frame":42,"type":"click","x":950.0,"y":400.0}
//! {"frame":43,"type":"scroll","delta":15.0}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::intent::Intent;

/// One intent produced by the gesture pipeline, tagged with its frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub frame: u64,
    #[serde(flatten)]
    pub intent: Intent,
}

impl GestureEvent {
    pub fn new(frame: u64, intent: Intent) -> Self {
        Self { frame, intent }
    }
}

/// Encodes an event as a single-line JSON object.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if serialisation fails.
pub fn encode_event(event: &GestureEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Decodes an event from JSON produced by [`encode_event`].
///
/// # Errors
///
/// Returns the underlying `serde_json` error for malformed input or unknown
/// event types.
pub fn decode_event(json: &str) -> Result<GestureEvent, serde_json::Error> {
    serde_json::from_str(json)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
