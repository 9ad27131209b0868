//! TrackGesturesUseCase: turns per-frame hand landmarks into host callbacks.
//!
//! This use case runs once per processed video frame.  It feeds the frame to
//! the pure [`gesture_core::step`] function, keeps the returned
//! [`ControlState`] for the next frame, and dispatches every produced
//! [`Intent`] to the host:
//!
//! | Intent        | Host effect                                            |
//! |---------------|--------------------------------------------------------|
//! | `PointerMove` | cursor position in [`GestureStatus`] only              |
//! | `Click`       | `EventSink::on_pinch`, then hit-test + activate target |
//! | `Drag`        | `EventSink::on_drag(dx, dy)`                           |
//! | `Scroll`      | `EventSink::on_scroll(delta)`                          |
//!
//! # Architecture
//!
//! The use case depends only on traits (`EventSink`, `TargetLocator`) and
//! domain types.  Hosts inject their own implementations, and tests inject
//! recording doubles.

use std::fmt;
use std::sync::Arc;

use gesture_core::{
    step, ControlState, GestureEvent, HandFrame, Intent, ScreenPoint, StepConfig, Viewport,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Callbacks exposed by the host UI.
///
/// Implementations must be cheap: they run inside the frame loop.
pub trait EventSink: Send + Sync {
    /// Called at most once per frame while the hand is parked in an edge band.
    fn on_scroll(&self, delta: f64);

    /// Called once per rising pinch edge.
    fn on_pinch(&self);

    /// Called on every frame that continues a grab, with the pointer delta.
    fn on_drag(&self, dx: f64, dy: f64);
}

/// Hit-testing against the host UI.
///
/// A click is delivered by locating the element under the pointer and then
/// activating it synthetically, the way a real mouse click would.
#[cfg_attr(test, mockall::automock)]
pub trait TargetLocator: Send + Sync {
    /// Returns an identifier of the element under `point`, if any.
    fn locate(&self, point: ScreenPoint) -> Option<String>;

    /// Activates the element previously returned by `locate`.
    fn activate(&self, target: &str) -> Result<(), String>;
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Snapshot of what the pointer overlay shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GestureStatus {
    pub model_loaded: bool,
    pub hand_visible: bool,
    pub pinching: bool,
    pub grabbing: bool,
    /// Last mapped pointer position; stays put while the hand is away.
    pub cursor: Option<ScreenPoint>,
    /// The environment has no camera API at all.
    pub camera_unsupported: bool,
    /// Human-readable camera failure (permission, device).
    pub camera_error: Option<String>,
    /// Human-readable detector load failure.
    pub model_error: Option<String>,
}

impl GestureStatus {
    /// The single status line derived from this snapshot.
    pub fn line(&self) -> StatusLine {
        if self.camera_unsupported {
            StatusLine::CameraUnsupported
        } else if let Some(reason) = &self.camera_error {
            StatusLine::CameraError(reason.clone())
        } else if let Some(reason) = &self.model_error {
            StatusLine::ModelError(reason.clone())
        } else if !self.model_loaded {
            StatusLine::Loading
        } else if !self.hand_visible {
            StatusLine::NoHand
        } else if self.grabbing {
            StatusLine::Tracking(GestureLabel::Grabbing)
        } else if self.pinching {
            StatusLine::Tracking(GestureLabel::Pinching)
        } else {
            StatusLine::Tracking(GestureLabel::Open)
        }
    }
}

/// Gesture shown next to "Tracking Active".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureLabel {
    Open,
    Pinching,
    Grabbing,
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GestureLabel::Open => "OPEN",
            GestureLabel::Pinching => "PINCHING",
            GestureLabel::Grabbing => "GRABBING",
        })
    }
}

/// Status message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Loading,
    CameraUnsupported,
    CameraError(String),
    ModelError(String),
    NoHand,
    Tracking(GestureLabel),
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Loading => f.write_str("Loading AI..."),
            StatusLine::CameraUnsupported => f.write_str("Camera not supported"),
            StatusLine::CameraError(reason) => write!(f, "Camera error: {reason}"),
            StatusLine::ModelError(reason) => write!(f, "Hand model failed to load: {reason}"),
            StatusLine::NoHand => f.write_str("No Hand Detected"),
            StatusLine::Tracking(label) => write!(f, "Tracking Active ({label})"),
        }
    }
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Per-frame gesture tracking and dispatch.
pub struct TrackGesturesUseCase {
    state: ControlState,
    config: StepConfig,
    sink: Arc<dyn EventSink>,
    locator: Arc<dyn TargetLocator>,
    event_tap: Option<mpsc::UnboundedSender<GestureEvent>>,
}

impl TrackGesturesUseCase {
    pub fn new(
        config: StepConfig,
        sink: Arc<dyn EventSink>,
        locator: Arc<dyn TargetLocator>,
    ) -> Self {
        Self {
            state: ControlState::default(),
            config,
            sink,
            locator,
            event_tap: None,
        }
    }

    /// Also publishes every intent as a [`GestureEvent`] on `tap`.
    pub fn with_event_tap(mut self, tap: mpsc::UnboundedSender<GestureEvent>) -> Self {
        self.event_tap = Some(tap);
        self
    }

    /// Uses `viewport` for all following frames.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.config.viewport != viewport {
            debug!(width = viewport.width, height = viewport.height, "viewport updated");
            self.config.viewport = viewport;
        }
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Forgets all cross-frame state, as if the session had just started.
    pub fn reset(&mut self) {
        self.state = ControlState::default();
    }

    /// Processes one frame and dispatches its intents.
    ///
    /// `frame` is `None` when no hand was detected (or detection failed).
    /// Returns the intents the frame produced, in dispatch order.
    pub fn handle_frame(&mut self, frame: Option<&HandFrame>) -> Vec<Intent> {
        let outcome = step(frame, self.state, &self.config);
        self.state = outcome.state;
        for intent in &outcome.intents {
            self.dispatch(*intent);
        }
        outcome.intents
    }

    /// Status snapshot for a session whose detector is loaded.
    pub fn status(&self) -> GestureStatus {
        GestureStatus {
            model_loaded: true,
            hand_visible: self.state.hand_visible,
            pinching: self.state.gesture.pinching,
            grabbing: self.state.gesture.grabbing,
            cursor: self.state.pointer.position,
            ..GestureStatus::default()
        }
    }

    fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::PointerMove { .. } => {}
            Intent::Click { x, y } => {
                self.sink.on_pinch();
                self.activate_target(ScreenPoint::new(x, y));
            }
            Intent::Drag { dx, dy } => self.sink.on_drag(dx, dy),
            Intent::Scroll { delta } => self.sink.on_scroll(delta),
        }

        if let Some(tap) = &self.event_tap {
            if tap.send(GestureEvent::new(self.state.frame, intent)).is_err() {
                debug!("gesture event receiver dropped; detaching event tap");
                self.event_tap = None;
            }
        }
    }

    fn activate_target(&self, point: ScreenPoint) {
        match self.locator.locate(point) {
            Some(target) => {
                if let Err(e) = self.locator.activate(&target) {
                    warn!(target = %target, "failed to activate target: {e}");
                } else {
                    debug!(target = %target, x = point.x, y = point.y, "activated target");
                }
            }
            None => debug!(x = point.x, y = point.y, "click hit no target"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_core::domain::landmark::{FINGERTIPS, THUMB_TIP, WRIST};
    use gesture_core::{Landmark, LANDMARK_COUNT};
    use std::sync::Mutex;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingSink {
        scrolls: Mutex<Vec<f64>>,
        pinches: Mutex<u32>,
        drags: Mutex<Vec<(f64, f64)>>,
    }

    impl EventSink for RecordingSink {
        fn on_scroll(&self, delta: f64) {
            self.scrolls.lock().unwrap().push(delta);
        }

        fn on_pinch(&self) {
            *self.pinches.lock().unwrap() += 1;
        }

        fn on_drag(&self, dx: f64, dy: f64) {
            self.drags.lock().unwrap().push((dx, dy));
        }
    }

    fn quiet_locator() -> MockTargetLocator {
        let mut locator = MockTargetLocator::new();
        locator.expect_locate().returning(|_| None);
        locator
    }

    fn make_use_case(
        locator: MockTargetLocator,
    ) -> (TrackGesturesUseCase, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let config = StepConfig {
            viewport: Viewport::new(1000.0, 800.0),
            ..StepConfig::default()
        };
        let uc = TrackGesturesUseCase::new(
            config,
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Arc::new(locator) as Arc<dyn TargetLocator>,
        );
        (uc, sink)
    }

    fn hand(x: f32, y: f32, wrist_drop: f32, thumb: (f32, f32)) -> HandFrame {
        let mut points = [Landmark::new(x, y, 0.0); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(x, y + wrist_drop, 0.0);
        for tip in FINGERTIPS {
            points[tip] = Landmark::new(x, y, 0.0);
        }
        points[THUMB_TIP] = Landmark::new(thumb.0, thumb.1, 0.0);
        HandFrame::new(points)
    }

    fn open_at(x: f32, y: f32) -> HandFrame {
        hand(x, y, 0.6, (x + 0.2, y + 0.2))
    }

    fn pinch_at(x: f32, y: f32) -> HandFrame {
        hand(x, y, 0.6, (x + 0.01, y))
    }

    fn fist_at(x: f32, y: f32) -> HandFrame {
        hand(x, y, 0.1, (x + 0.2, y + 0.2))
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn test_edge_park_calls_on_scroll_once_per_frame() {
        // Arrange
        let (mut uc, sink) = make_use_case(quiet_locator());

        // Act
        uc.handle_frame(Some(&open_at(0.05, 0.5)));
        uc.handle_frame(Some(&open_at(0.95, 0.5)));

        // Assert
        assert_eq!(*sink.scrolls.lock().unwrap(), vec![15.0, -15.0]);
    }

    #[test]
    fn test_held_pinch_calls_on_pinch_once() {
        let (mut uc, sink) = make_use_case(quiet_locator());
        for _ in 0..5 {
            uc.handle_frame(Some(&pinch_at(0.5, 0.5)));
        }
        assert_eq!(*sink.pinches.lock().unwrap(), 1);
    }

    #[test]
    fn test_click_activates_located_target() {
        // Arrange
        let mut locator = MockTargetLocator::new();
        locator
            .expect_locate()
            .withf(|p| (p.x - 500.0).abs() < 1e-3 && (p.y - 400.0).abs() < 1e-3)
            .times(1)
            .returning(|_| Some("card-3".to_string()));
        locator
            .expect_activate()
            .withf(|target| target == "card-3")
            .times(1)
            .returning(|_| Ok(()));
        let (mut uc, sink) = make_use_case(locator);

        // Act
        uc.handle_frame(Some(&pinch_at(0.5, 0.5)));

        // Assert
        assert_eq!(*sink.pinches.lock().unwrap(), 1);
    }

    #[test]
    fn test_activation_failure_does_not_stop_dispatch() {
        let mut locator = MockTargetLocator::new();
        locator
            .expect_locate()
            .returning(|_| Some("broken".to_string()));
        locator
            .expect_activate()
            .returning(|_| Err("detached element".to_string()));
        let (mut uc, sink) = make_use_case(locator);

        // Pinch parked in the low edge band: click and scroll on the same frame.
        let intents = uc.handle_frame(Some(&pinch_at(0.05, 0.5)));

        assert_eq!(intents.len(), 3);
        assert_eq!(*sink.pinches.lock().unwrap(), 1);
        assert_eq!(*sink.scrolls.lock().unwrap(), vec![15.0]);
    }

    #[test]
    fn test_grab_continuation_calls_on_drag_with_delta() {
        // Arrange
        let (mut uc, sink) = make_use_case(quiet_locator());

        // Act
        uc.handle_frame(Some(&fist_at(0.5, 0.5)));
        uc.handle_frame(Some(&fist_at(0.4, 0.6)));

        // Assert
        let drags = sink.drags.lock().unwrap().clone();
        assert_eq!(drags.len(), 1, "fresh grab must not drag");
        let (dx, dy) = drags[0];
        assert!((dx - 100.0).abs() < 1e-3, "mirrored x: 500 → 600");
        assert!((dy - 80.0).abs() < 1e-3);
        assert!(sink.scrolls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_absent_frame_dispatches_nothing() {
        let (mut uc, sink) = make_use_case(quiet_locator());
        let intents = uc.handle_frame(None);
        assert!(intents.is_empty());
        assert!(sink.scrolls.lock().unwrap().is_empty());
        assert_eq!(*sink.pinches.lock().unwrap(), 0);
    }

    // ── Event tap ─────────────────────────────────────────────────────────────

    #[test]
    fn test_event_tap_receives_intents_with_frame_number() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (uc, _sink) = make_use_case(quiet_locator());
        let mut uc = uc.with_event_tap(tx);

        // Act
        uc.handle_frame(None);
        uc.handle_frame(Some(&open_at(0.05, 0.5)));

        // Assert
        let first = rx.try_recv().expect("pointer move");
        let second = rx.try_recv().expect("scroll");
        assert_eq!(first.frame, 2);
        assert!(matches!(first.intent, Intent::PointerMove { .. }));
        assert_eq!(second.intent, Intent::Scroll { delta: 15.0 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_event_receiver_is_tolerated() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let (uc, sink) = make_use_case(quiet_locator());
        let mut uc = uc.with_event_tap(tx);
        uc.handle_frame(Some(&open_at(0.05, 0.5)));
        uc.handle_frame(Some(&open_at(0.05, 0.5)));
        assert_eq!(sink.scrolls.lock().unwrap().len(), 2);
    }

    // ── Status ────────────────────────────────────────────────────────────────

    #[test]
    fn test_status_tracks_hand_and_keeps_cursor() {
        let (mut uc, _sink) = make_use_case(quiet_locator());
        uc.handle_frame(Some(&pinch_at(0.5, 0.5)));
        let status = uc.status();
        assert!(status.hand_visible && status.pinching);
        assert_eq!(status.line().to_string(), "Tracking Active (PINCHING)");

        uc.handle_frame(None);
        let status = uc.status();
        assert!(!status.hand_visible);
        assert!(status.cursor.is_some(), "cursor stays where the hand left");
        assert_eq!(status.line().to_string(), "No Hand Detected");
    }

    #[test]
    fn test_status_line_priorities() {
        let mut status = GestureStatus::default();
        assert_eq!(status.line().to_string(), "Loading AI...");

        status.camera_error = Some("permission denied".into());
        assert_eq!(status.line().to_string(), "Camera error: permission denied");

        status.camera_unsupported = true;
        assert_eq!(status.line(), StatusLine::CameraUnsupported);

        let tracking = GestureStatus {
            model_loaded: true,
            hand_visible: true,
            pinching: true,
            grabbing: true,
            ..GestureStatus::default()
        };
        assert_eq!(tracking.line(), StatusLine::Tracking(GestureLabel::Grabbing));
    }

    #[test]
    fn test_reset_forgets_edge_state() {
        let (mut uc, sink) = make_use_case(quiet_locator());
        uc.handle_frame(Some(&pinch_at(0.5, 0.5)));
        uc.reset();
        uc.handle_frame(Some(&pinch_at(0.5, 0.5)));
        assert_eq!(*sink.pinches.lock().unwrap(), 2);
        assert_eq!(uc.state().frame, 1);
    }

    #[test]
    fn test_set_viewport_changes_mapping() {
        let (mut uc, _sink) = make_use_case(quiet_locator());
        uc.set_viewport(Viewport::new(200.0, 100.0));
        uc.handle_frame(Some(&open_at(0.25, 0.5)));
        let cursor = uc.status().cursor.expect("cursor");
        assert!((cursor.x - 150.0).abs() < 1e-3);
        assert!((cursor.y - 50.0).abs() < 1e-3);
    }
}
