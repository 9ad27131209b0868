//! CaptureSession: one lifetime of camera + landmark detector.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ─▶ Initializing ─▶ Ready ─▶ Stopped
//!              │
//!              └────────▶ Error(message)
//! ```
//!
//! A session is driven by a single Tokio task that owns every resource: the
//! landmark detector, the camera stream, and the gesture tracker.  The task
//!
//! 1. initializes the detector, then requests the camera stream.  Both steps
//!    are raced against the stop signal, so deactivating while the model is
//!    still downloading cancels the download;
//! 2. on success, runs the frame loop on a fixed-rate ticker until stopped;
//!    on failure, publishes `Error` and waits for the stop signal;
//! 3. tears down in a fixed order: close the detector, then stop every
//!    camera track.  Teardown failures are logged and never propagated.
//!    The resources live in a drop guard, so a host callback that panics
//!    mid-frame still releases them and leaves the session in `Error`.
//!
//! [`CaptureSession::deactivate`] sends the stop signal and awaits the task,
//! so when it returns nothing is scheduled any more.  Dropping a session
//! without deactivating also stops it (the stop sender is dropped), but the
//! teardown then finishes in the background.
//!
//! Session state and the status snapshot are published through
//! `tokio::sync::watch` channels; observers never block the frame loop.

use std::sync::Arc;
use std::time::Duration;

use gesture_core::{GestureEvent, StepConfig, Viewport};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::track_gestures::{
    EventSink, GestureStatus, TargetLocator, TrackGesturesUseCase,
};
use crate::infrastructure::camera::{CameraDevice, CameraError, CameraStream};
use crate::infrastructure::landmark_source::{DetectorError, DetectorOptions, LandmarkSource};

/// Default frame period (about 30 frames per second).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    Ready,
    /// Initialization failed.  Carries a human-readable cause.
    Error(String),
    Stopped,
}

impl SessionState {
    /// `Error` and `Stopped` are final for a session instance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Error(_) | SessionState::Stopped)
    }
}

/// Why a session could not start.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Settings fixed for the lifetime of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub frame_interval: Duration,
    pub detector: DetectorOptions,
    pub step: StepConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            detector: DetectorOptions::default(),
            step: StepConfig::default(),
        }
    }
}

/// Everything a session needs from the outside world.
pub struct SessionParts {
    pub detector: Box<dyn LandmarkSource>,
    pub camera: Box<dyn CameraDevice>,
    pub sink: Arc<dyn EventSink>,
    pub locator: Arc<dyn TargetLocator>,
    /// Optional stream of every produced intent.
    pub event_tap: Option<mpsc::UnboundedSender<GestureEvent>>,
    /// Current viewport; the frame loop picks up changes on the next tick.
    pub viewport: watch::Receiver<Viewport>,
}

/// Handle to a running (or finished) capture session.
pub struct CaptureSession {
    id: Uuid,
    state: Arc<watch::Sender<SessionState>>,
    status: Arc<watch::Sender<GestureStatus>>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<u64>>,
}

impl CaptureSession {
    /// Spawns the session task.  Must be called from within a Tokio runtime.
    pub fn start(config: SessionConfig, parts: SessionParts) -> Self {
        let id = Uuid::new_v4();
        let state = Arc::new(watch::Sender::new(SessionState::Idle));
        let status = Arc::new(watch::Sender::new(GestureStatus::default()));
        let (stop_tx, stop_rx) = oneshot::channel();

        info!("session {id}: starting");
        let task = tokio::spawn(run_session(
            id,
            config,
            parts,
            Arc::clone(&state),
            Arc::clone(&status),
            stop_rx,
        ));

        Self {
            id,
            state,
            status,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> GestureStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<GestureStatus> {
        self.status.subscribe()
    }

    /// Returns `true` until the session task has been torn down.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the session and waits for teardown to finish.
    ///
    /// Idempotent: calling it again is a no-op.
    pub async fn deactivate(&mut self) {
        let Some(task) = self.task.take() else {
            debug!("session {}: already deactivated", self.id);
            return;
        };
        if let Some(stop_tx) = self.stop_tx.take() {
            // The task may already be gone; a closed channel is fine.
            let _ = stop_tx.send(());
        }
        match task.await {
            Ok(frames) => info!("session {}: deactivated after {frames} frames", self.id),
            Err(e) => {
                warn!("session {}: task ended abnormally: {e}", self.id);
                let reason = if e.is_panic() {
                    "frame processing panicked".to_string()
                } else {
                    ABORTED.to_string()
                };
                self.state.send_if_modified(|s| match s {
                    SessionState::Error(message) if message != ABORTED => false,
                    _ => {
                        *s = SessionState::Error(reason);
                        true
                    }
                });
            }
        }
    }
}

// ── Session task ──────────────────────────────────────────────────────────────

/// Body of the session task.  Returns the number of frames processed.
async fn run_session(
    id: Uuid,
    config: SessionConfig,
    parts: SessionParts,
    state: Arc<watch::Sender<SessionState>>,
    status: Arc<watch::Sender<GestureStatus>>,
    mut stop_rx: oneshot::Receiver<()>,
) -> u64 {
    let SessionParts {
        detector,
        mut camera,
        sink,
        locator,
        event_tap,
        mut viewport,
    } = parts;

    state.send_replace(SessionState::Initializing);
    let mut resources = SessionResources {
        id,
        detector,
        stream: None,
        state,
        completed: false,
    };

    let acquired = tokio::select! {
        biased;
        _ = &mut stop_rx => None,
        result = acquire(id, resources.detector.as_mut(), camera.as_mut(), &config.detector, &status) => Some(result),
    };

    let mut frames = 0;
    match acquired {
        None => debug!("session {id}: stopped during initialization"),
        Some(Err(e)) => {
            warn!("session {id}: initialization failed: {e}");
            status.send_modify(|s| record_failure(s, &e));
            resources.state.send_replace(SessionState::Error(e.to_string()));
            // Resources are released on deactivation.
            let _ = stop_rx.await;
        }
        Some(Ok(stream)) => {
            let stream = resources.stream.insert(stream);
            resources.state.send_replace(SessionState::Ready);
            info!("session {id}: ready");

            let mut step = config.step;
            step.viewport = *viewport.borrow_and_update();
            let mut tracker = TrackGesturesUseCase::new(step, sink, locator);
            if let Some(tap) = event_tap {
                tracker = tracker.with_event_tap(tap);
            }

            frames = frame_loop(
                id,
                config.frame_interval,
                resources.detector.as_mut(),
                stream.as_mut(),
                &mut tracker,
                &mut viewport,
                &status,
                &mut stop_rx,
            )
            .await;
        }
    }

    resources.completed = true;
    frames
}

/// Resources owned by a session task.
///
/// Dropping it closes the detector, then stops the camera tracks, then
/// publishes the final state.  This runs whether the task returned, panicked
/// in a host callback, or was dropped by the runtime.
struct SessionResources {
    id: Uuid,
    detector: Box<dyn LandmarkSource>,
    stream: Option<Box<dyn CameraStream>>,
    state: Arc<watch::Sender<SessionState>>,
    /// Set once the task body ran to its end.
    completed: bool,
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        let id = self.id;
        if let Err(e) = self.detector.close() {
            warn!("session {id}: failed to close landmark detector: {e}");
        }
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.stop_all_tracks() {
                warn!("session {id}: failed to stop camera tracks: {e}");
            }
        }
        debug!("session {id}: resources released");

        let completed = self.completed;
        self.state.send_if_modified(|s| {
            if s.is_terminal() {
                false
            } else if completed {
                *s = SessionState::Stopped;
                true
            } else {
                *s = SessionState::Error(ABORTED.to_string());
                true
            }
        });
    }
}

/// Error message of a session whose task did not run to its end.
const ABORTED: &str = "session task ended abnormally";

/// Initializes the detector, then opens the camera.
async fn acquire(
    id: Uuid,
    detector: &mut dyn LandmarkSource,
    camera: &mut dyn CameraDevice,
    options: &DetectorOptions,
    status: &watch::Sender<GestureStatus>,
) -> Result<Box<dyn CameraStream>, SessionError> {
    detector.initialize(options).await?;
    info!("session {id}: landmark detector loaded");
    status.send_modify(|s| s.model_loaded = true);

    let stream = camera.request_stream().await?;
    info!("session {id}: camera stream opened");
    Ok(stream)
}

fn record_failure(status: &mut GestureStatus, error: &SessionError) {
    match error {
        SessionError::Camera(CameraError::NotSupported) => status.camera_unsupported = true,
        SessionError::Camera(e) => status.camera_error = Some(e.to_string()),
        SessionError::Detector(e) => status.model_error = Some(e.to_string()),
    }
}

/// Processes frames until the stop signal arrives.  Returns the frame count.
#[allow(clippy::too_many_arguments)]
async fn frame_loop(
    id: Uuid,
    period: Duration,
    detector: &mut dyn LandmarkSource,
    stream: &mut dyn CameraStream,
    tracker: &mut TrackGesturesUseCase,
    viewport: &mut watch::Receiver<Viewport>,
    status: &watch::Sender<GestureStatus>,
    stop_rx: &mut oneshot::Receiver<()>,
) -> u64 {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();
    let mut last_timestamp: Option<u64> = None;
    let mut frames = 0u64;

    loop {
        let stop = tokio::select! {
            biased;
            _ = &mut *stop_rx => true,
            _ = ticker.tick() => false,
        };
        if stop {
            debug!("session {id}: frame loop stopped");
            return frames;
        }

        if viewport.has_changed().unwrap_or(false) {
            tracker.set_viewport(*viewport.borrow_and_update());
        }

        let Some(frame) = stream.next_frame() else {
            continue;
        };
        if !frame.is_decodable() {
            continue;
        }

        // Detectors in video mode need strictly increasing timestamps.
        let elapsed = started.elapsed().as_millis() as u64;
        let timestamp = match last_timestamp {
            Some(last) if elapsed <= last => last + 1,
            _ => elapsed,
        };
        last_timestamp = Some(timestamp);

        let hand = match detector.detect(&frame, timestamp) {
            Ok(hand) => hand,
            Err(e) => {
                warn!("session {id}: detection failed on frame {}: {e}", frame.sequence);
                None
            }
        };
        tracker.handle_frame(hand.as_ref());
        frames += 1;

        let snapshot = tracker.status();
        status.send_if_modified(|s| {
            if *s == snapshot {
                false
            } else {
                *s = snapshot;
                true
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
