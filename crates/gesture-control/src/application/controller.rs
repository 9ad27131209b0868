//! GestureController: the mounted hand-control surface.
//!
//! The controller owns at most one [`CaptureSession`] at a time.  Turning
//! hand control on starts a fresh session; turning it off (or starting a new
//! one) fully tears down the previous session first, so there is never more
//! than one frame loop and no camera stream is leaked.
//!
//! The controller also owns the viewport: hosts call [`GestureController::resize`]
//! and the change reaches the running frame loop through a `watch` channel.

use std::sync::Arc;

use gesture_core::{GestureEvent, Viewport};
use tokio::sync::{mpsc, watch};
use tracing::info;
use uuid::Uuid;

use crate::application::capture_session::{
    CaptureSession, SessionConfig, SessionParts, SessionState,
};
use crate::application::track_gestures::{EventSink, GestureStatus, TargetLocator};
use crate::infrastructure::camera::CameraDevice;
use crate::infrastructure::landmark_source::LandmarkSource;

/// Factory for the per-session resources.
///
/// Each session gets a brand-new detector and camera handle; nothing is
/// reused across sessions.
pub trait CaptureBackend: Send + Sync {
    fn landmark_source(&self) -> Box<dyn LandmarkSource>;
    fn camera(&self) -> Box<dyn CameraDevice>;
}

/// Starts, stops, and observes capture sessions.
pub struct GestureController {
    backend: Arc<dyn CaptureBackend>,
    config: SessionConfig,
    sink: Arc<dyn EventSink>,
    locator: Arc<dyn TargetLocator>,
    event_tap: Option<mpsc::UnboundedSender<GestureEvent>>,
    viewport: watch::Sender<Viewport>,
    enabled: bool,
    session: Option<CaptureSession>,
}

impl GestureController {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        config: SessionConfig,
        sink: Arc<dyn EventSink>,
        locator: Arc<dyn TargetLocator>,
    ) -> Self {
        let (viewport, _) = watch::channel(config.step.viewport);
        Self {
            backend,
            config,
            sink,
            locator,
            event_tap: None,
            viewport,
            enabled: false,
            session: None,
        }
    }

    /// Publishes every intent of every future session on `tap`.
    pub fn with_event_tap(mut self, tap: mpsc::UnboundedSender<GestureEvent>) -> Self {
        self.event_tap = Some(tap);
        self
    }

    /// Tears down any live session and starts a fresh one.
    ///
    /// Returns the id of the new session.
    pub async fn activate(&mut self) -> Uuid {
        self.deactivate().await;

        let session = CaptureSession::start(
            self.config.clone(),
            SessionParts {
                detector: self.backend.landmark_source(),
                camera: self.backend.camera(),
                sink: Arc::clone(&self.sink),
                locator: Arc::clone(&self.locator),
                event_tap: self.event_tap.clone(),
                viewport: self.viewport.subscribe(),
            },
        );
        let id = session.id();
        self.session = Some(session);
        self.enabled = true;
        id
    }

    /// Stops the live session, if any.  Idempotent.
    ///
    /// The finished session is kept so its final state and status stay
    /// observable until the next activation.
    pub async fn deactivate(&mut self) {
        self.enabled = false;
        if let Some(session) = self.session.as_mut() {
            session.deactivate().await;
        }
    }

    /// Turns hand control on or off.  Setting the current value again does
    /// nothing.
    pub async fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        info!(enabled, "hand control toggled");
        if enabled {
            self.activate().await;
        } else {
            self.deactivate().await;
        }
    }

    /// Replaces the settings used by the next activation.
    pub fn set_session_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Updates the viewport used to map hand positions to the screen.
    pub fn resize(&self, viewport: Viewport) {
        self.viewport.send_replace(viewport);
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.borrow()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(CaptureSession::id)
    }

    /// State of the current (or last) session; `None` before the first activation.
    pub fn session_state(&self) -> Option<SessionState> {
        self.session.as_ref().map(CaptureSession::state)
    }

    /// Returns `true` while a session task is alive.
    pub fn is_session_active(&self) -> bool {
        self.session.as_ref().is_some_and(CaptureSession::is_active)
    }

    pub fn status(&self) -> GestureStatus {
        self.session
            .as_ref()
            .map(CaptureSession::status)
            .unwrap_or_default()
    }

    pub fn subscribe_status(&self) -> Option<watch::Receiver<GestureStatus>> {
        self.session.as_ref().map(CaptureSession::subscribe_status)
    }
}
