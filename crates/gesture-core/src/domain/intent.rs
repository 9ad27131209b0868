//! Per-frame intent mapping.
//!
//! [`step`] is the single entry point: it takes one (optional) hand frame and
//! the previous [`ControlState`], and returns the next state together with the
//! [`Intent`]s that frame produced.  It performs no I/O, so the whole gesture
//! pipeline can be driven from tests with hand-built frames.
//!
//! # Order of evaluation (visible frame)
//!
//! ```text
//! 0. pointer move         always
//! 1. drag                 grabbing && was_grabbing   → Drag(current - previous)
//! 2. clear was_grabbing   !grabbing
//! 3. click                pinching && !was_pinching  → Click (rising edge only)
//! 4. edge scroll          !grabbing && raw x outside [low, high]
//! 5. previous = current   always
//! ```
//!
//! Drag is the coarser, deliberate gesture, so while the fist is closed the
//! edge bands are ignored.  Click is evaluated on every frame regardless of the
//! grab state so a quick pinch during a drag is still reported.
//!
//! An absent frame clears every edge flag and the previous position, so a
//! gesture that resumes after the hand re-enters the view starts fresh.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::gesture::{GestureClassifier, GestureReading, GestureThresholds};
use crate::domain::landmark::HandFrame;
use crate::domain::viewport::{ScreenPoint, Viewport};

/// Raw `x` below which the hand is parked in the scroll-forward band.
pub const DEFAULT_EDGE_LOW: f32 = 0.15;
/// Raw `x` above which the hand is parked in the scroll-back band.
pub const DEFAULT_EDGE_HIGH: f32 = 0.85;
/// Scroll amount emitted per frame while parked in an edge band.
pub const DEFAULT_SCROLL_STEP: f64 = 15.0;

/// A discrete pointer intent produced by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// The pointer is at this screen position.
    PointerMove { x: f64, y: f64 },
    /// Rising pinch edge at this screen position.
    Click { x: f64, y: f64 },
    /// Grab continuation moved the pointer by this many pixels.
    Drag { dx: f64, dy: f64 },
    /// Hand parked in an edge band; positive scrolls forward.
    Scroll { delta: f64 },
}

/// Edge-scroll bands, in raw (unmirrored) normalised camera `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeScrollConfig {
    pub low: f32,
    pub high: f32,
    pub step: f64,
}

impl Default for EdgeScrollConfig {
    fn default() -> Self {
        Self {
            low: DEFAULT_EDGE_LOW,
            high: DEFAULT_EDGE_HIGH,
            step: DEFAULT_SCROLL_STEP,
        }
    }
}

impl EdgeScrollConfig {
    /// Scroll delta for a raw `x`, or `None` in the middle band.
    pub fn delta_for(&self, raw_x: f32) -> Option<f64> {
        if raw_x < self.low {
            Some(self.step)
        } else if raw_x > self.high {
            Some(-self.step)
        } else {
            None
        }
    }
}

/// Everything [`step`] needs besides the frame and state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepConfig {
    pub thresholds: GestureThresholds,
    pub edge: EdgeScrollConfig,
    pub viewport: Viewport,
}

/// Current gesture booleans.  Both false while no hand is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureState {
    pub pinching: bool,
    pub grabbing: bool,
}

/// Pointer position in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Last mapped position; kept while the hand is away so a cursor can stay put.
    pub position: Option<ScreenPoint>,
    /// Position of the previous *visible* frame.  `None` at session start and
    /// after any frame without a hand.
    pub previous: Option<ScreenPoint>,
}

/// Last visible frame's raw booleans, used for edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    pub was_pinching: bool,
    pub was_grabbing: bool,
}

/// All cross-frame state of the gesture pipeline.
///
/// Owned by the caller and threaded through [`step`] by value; `frame` counts
/// the steps applied so stale copies are easy to spot in logs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlState {
    pub frame: u64,
    pub hand_visible: bool,
    pub gesture: GestureState,
    pub pointer: PointerState,
    pub edges: EdgeFlags,
}

/// Result of one [`step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: ControlState,
    pub intents: Vec<Intent>,
    /// Classifier output, `None` when no hand was visible.
    pub reading: Option<GestureReading>,
}

impl StepOutcome {
    pub fn clicks(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        self.intents.iter().filter_map(|i| match *i {
            Intent::Click { x, y } => Some(ScreenPoint::new(x, y)),
            _ => None,
        })
    }
}

/// Advances the gesture pipeline by one frame.
///
/// `frame` is `None` when the detector saw no hand.
pub fn step(frame: Option<&HandFrame>, state: ControlState, config: &StepConfig) -> StepOutcome {
    let frame_no = state.frame.wrapping_add(1);

    let Some(frame) = frame else {
        return StepOutcome {
            state: ControlState {
                frame: frame_no,
                hand_visible: false,
                gesture: GestureState::default(),
                pointer: PointerState {
                    position: state.pointer.position,
                    previous: None,
                },
                edges: EdgeFlags::default(),
            },
            intents: Vec::new(),
            reading: None,
        };
    };

    let reading = GestureClassifier::new(config.thresholds).classify(frame);
    let tip = frame.index_tip();
    let position = config.viewport.to_screen(&tip);
    let mut edges = state.edges;
    let mut intents = vec![Intent::PointerMove {
        x: position.x,
        y: position.y,
    }];

    if reading.grabbing {
        if edges.was_grabbing {
            if let Some(previous) = state.pointer.previous {
                let (dx, dy) = position.delta_from(&previous);
                intents.push(Intent::Drag { dx, dy });
            }
        }
        edges.was_grabbing = true;
    } else {
        edges.was_grabbing = false;
    }

    if reading.pinching && !edges.was_pinching {
        trace!(frame = frame_no, x = position.x, y = position.y, "pinch rising edge");
        intents.push(Intent::Click {
            x: position.x,
            y: position.y,
        });
    }
    edges.was_pinching = reading.pinching;

    if !reading.grabbing {
        if let Some(delta) = config.edge.delta_for(tip.x) {
            intents.push(Intent::Scroll { delta });
        }
    }

    StepOutcome {
        state: ControlState {
            frame: frame_no,
            hand_visible: true,
            gesture: GestureState {
                pinching: reading.pinching,
                grabbing: reading.grabbing,
            },
            pointer: PointerState {
                position: Some(position),
                previous: Some(position),
            },
            edges,
        },
        intents,
        reading: Some(reading),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::landmark::{
        Landmark, FINGERTIPS, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP, WRIST,
    };

    fn config() -> StepConfig {
        StepConfig {
            viewport: Viewport::new(1000.0, 800.0),
            ..StepConfig::default()
        }
    }

    /// Open hand with the index tip at (x, y), thumb well away.
    fn open_at(x: f32, y: f32) -> HandFrame {
        let mut points = [Landmark::new(x, y + 0.3, 0.0); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(x, y + 0.6, 0.0);
        for tip in FINGERTIPS {
            points[tip] = Landmark::new(x, y, 0.0);
        }
        points[THUMB_TIP] = Landmark::new(x + 0.2, y + 0.2, 0.0);
        HandFrame::new(points)
    }

    /// Open hand pinching at (x, y).
    fn pinch_at(x: f32, y: f32) -> HandFrame {
        let mut points = *open_at(x, y).landmarks();
        points[THUMB_TIP] = Landmark::new(x + 0.01, y, 0.0);
        HandFrame::new(points)
    }

    /// Closed fist with the index tip at (x, y).
    fn fist_at(x: f32, y: f32) -> HandFrame {
        let mut points = [Landmark::new(x, y + 0.05, 0.0); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(x, y + 0.1, 0.0);
        for tip in FINGERTIPS {
            points[tip] = Landmark::new(x, y, 0.0);
        }
        points[THUMB_TIP] = Landmark::new(x + 0.2, y, 0.0);
        HandFrame::new(points)
    }

    fn run(frames: &[Option<HandFrame>]) -> (ControlState, Vec<Vec<Intent>>) {
        let cfg = config();
        let mut state = ControlState::default();
        let mut all = Vec::new();
        for f in frames {
            let out = step(f.as_ref(), state, &cfg);
            state = out.state;
            all.push(out.intents);
        }
        (state, all)
    }

    fn count(intents: &[Intent], pred: fn(&Intent) -> bool) -> usize {
        intents.iter().filter(|i| pred(i)).count()
    }

    fn is_click(i: &Intent) -> bool {
        matches!(i, Intent::Click { .. })
    }
    fn is_drag(i: &Intent) -> bool {
        matches!(i, Intent::Drag { .. })
    }
    fn is_scroll(i: &Intent) -> bool {
        matches!(i, Intent::Scroll { .. })
    }

    // ── Absent frames ─────────────────────────────────────────────────────────

    #[test]
    fn test_absent_frame_emits_nothing_and_clears_flags() {
        // Arrange – pinching fist held for one frame
        let mut state = ControlState::default();
        let mut held = pinch_at(0.5, 0.5).landmarks().to_owned();
        for tip in FINGERTIPS {
            held[tip] = Landmark::new(0.5, 0.5, 0.0);
        }
        held[WRIST] = Landmark::new(0.5, 0.6, 0.0);
        state = step(Some(&HandFrame::new(held)), state, &config()).state;
        assert!(state.edges.was_pinching && state.edges.was_grabbing);

        // Act
        let out = step(None, state, &config());

        // Assert
        assert!(out.intents.is_empty());
        assert!(out.reading.is_none());
        assert!(!out.state.hand_visible);
        assert_eq!(out.state.gesture, GestureState::default());
        assert_eq!(out.state.edges, EdgeFlags::default());
        assert_eq!(out.state.pointer.previous, None);
        assert!(out.state.pointer.position.is_some(), "cursor stays where it was");
    }

    #[test]
    fn test_every_step_advances_frame_counter() {
        let (state, _) = run(&[None, Some(open_at(0.5, 0.5)), None]);
        assert_eq!(state.frame, 3);
    }

    // ── Pointer ───────────────────────────────────────────────────────────────

    #[test]
    fn test_visible_frame_always_emits_pointer_move() {
        let out = step(Some(&open_at(0.5, 0.5)), ControlState::default(), &config());
        assert!(matches!(out.intents[0], Intent::PointerMove { .. }));
        assert!(out.state.hand_visible);
    }

    // ── Click ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_click_fires_once_for_held_pinch() {
        // Arrange – pinch held for 5 frames in the middle band
        let frames: Vec<_> = (0..5).map(|_| Some(pinch_at(0.5, 0.5))).collect();

        // Act
        let (_, intents) = run(&frames);

        // Assert
        assert_eq!(count(&intents[0], is_click), 1);
        for later in &intents[1..] {
            assert_eq!(count(later, is_click), 0, "no click while held");
        }
    }

    #[test]
    fn test_release_and_repinch_clicks_again() {
        let (_, intents) = run(&[
            Some(pinch_at(0.5, 0.5)),
            Some(open_at(0.5, 0.5)),
            Some(pinch_at(0.5, 0.5)),
        ]);
        let clicks: usize = intents.iter().map(|i| count(i, is_click)).sum();
        assert_eq!(clicks, 2);
        assert_eq!(count(&intents[1], is_click), 0, "release is not a click");
    }

    #[test]
    fn test_click_carries_mapped_position() {
        let out = step(Some(&pinch_at(0.25, 0.5)), ControlState::default(), &config());
        let clicks: Vec<_> = out.clicks().collect();
        assert_eq!(clicks.len(), 1);
        assert!((clicks[0].x - 750.0).abs() < 1e-3);
        assert!((clicks[0].y - 400.0).abs() < 1e-3);
    }

    // ── Drag ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_fresh_grab_emits_no_drag() {
        let (state, intents) = run(&[Some(open_at(0.5, 0.5)), Some(fist_at(0.4, 0.5))]);
        assert_eq!(count(&intents[1], is_drag), 0);
        assert!(state.edges.was_grabbing);
    }

    #[test]
    fn test_grab_continuation_emits_current_minus_previous() {
        // Arrange – fist moves 0.1 left in camera space (= +100 px mirrored) and 0.05 down
        let frames = [
            Some(fist_at(0.5, 0.4)),
            Some(fist_at(0.4, 0.45)),
            Some(fist_at(0.3, 0.45)),
        ];

        // Act
        let (_, intents) = run(&frames);

        // Assert
        assert_eq!(count(&intents[0], is_drag), 0);
        let drags: Vec<_> = intents[1..]
            .iter()
            .flat_map(|v| v.iter())
            .filter_map(|i| match *i {
                Intent::Drag { dx, dy } => Some((dx, dy)),
                _ => None,
            })
            .collect();
        assert_eq!(drags.len(), 2);
        assert!((drags[0].0 - 100.0).abs() < 1e-3);
        assert!((drags[0].1 - 40.0).abs() < 1e-3);
        assert!((drags[1].0 - 100.0).abs() < 1e-3);
        assert!(drags[1].1.abs() < 1e-3);
    }

    #[test]
    fn test_grab_after_hand_lost_starts_fresh() {
        let (_, intents) = run(&[Some(fist_at(0.5, 0.5)), None, Some(fist_at(0.4, 0.5))]);
        assert_eq!(count(&intents[2], is_drag), 0);
    }

    #[test]
    fn test_pinch_during_drag_still_clicks() {
        // Arrange – a fist whose thumb touches the index tip on the second frame
        let first = fist_at(0.5, 0.5);
        let mut pinched = *fist_at(0.45, 0.5).landmarks();
        pinched[THUMB_TIP] = pinched[INDEX_TIP];

        // Act
        let (_, intents) = run(&[Some(first), Some(HandFrame::new(pinched))]);

        // Assert
        assert_eq!(count(&intents[1], is_drag), 1);
        assert_eq!(count(&intents[1], is_click), 1);
    }

    // ── Edge scroll ───────────────────────────────────────────────────────────

    #[test]
    fn test_left_camera_band_scrolls_forward() {
        let out = step(Some(&open_at(0.1, 0.5)), ControlState::default(), &config());
        assert!(out.intents.contains(&Intent::Scroll { delta: 15.0 }));
    }

    #[test]
    fn test_right_camera_band_scrolls_back() {
        let out = step(Some(&open_at(0.9, 0.5)), ControlState::default(), &config());
        assert!(out.intents.contains(&Intent::Scroll { delta: -15.0 }));
    }

    #[test]
    fn test_middle_band_does_not_scroll() {
        let out = step(Some(&open_at(0.5, 0.5)), ControlState::default(), &config());
        assert_eq!(count(&out.intents, is_scroll), 0);
    }

    #[test]
    fn test_edge_scroll_suppressed_while_grabbing() {
        let (_, intents) = run(&[Some(fist_at(0.05, 0.5)), Some(fist_at(0.05, 0.5))]);
        for frame in &intents {
            assert_eq!(count(frame, is_scroll), 0);
        }
    }

    #[test]
    fn test_edge_scroll_repeats_every_parked_frame() {
        let frames: Vec<_> = (0..4).map(|_| Some(open_at(0.05, 0.5))).collect();
        let (_, intents) = run(&frames);
        for frame in &intents {
            assert_eq!(count(frame, is_scroll), 1, "at most one scroll per frame");
        }
    }

    #[test]
    fn test_edge_band_limits_are_exclusive() {
        let edge = EdgeScrollConfig::default();
        assert_eq!(edge.delta_for(DEFAULT_EDGE_LOW), None);
        assert_eq!(edge.delta_for(DEFAULT_EDGE_HIGH), None);
        assert_eq!(edge.delta_for(0.0), Some(15.0));
        assert_eq!(edge.delta_for(1.0), Some(-15.0));
    }

    #[test]
    fn test_intent_serializes_with_type_tag() {
        let json = serde_json::to_string(&Intent::Scroll { delta: -15.0 }).expect("serialize");
        assert_eq!(json, r#"{"type":"scroll","delta":-15.0}"#);
    }
}
