//! Mock camera for unit testing and headless runs.
//!
//! # Why a mock camera?
//!
//! A real camera needs capture hardware, a permission prompt, and a user in
//! front of it.  `MockCamera` replaces all of that with in-memory state:
//!
//! - Access can be granted or refused with any [`CameraError`].
//! - The first `warmup_frames` frames report 0×0, like a stream whose first
//!   frame is not decoded yet.
//! - Every request, served frame, and stopped track is counted so tests can
//!   assert on the resource lifecycle.
//!
//! `MockCamera` is `Clone`; all clones share the same counters, so a test can
//! keep one handle while the session owns another.
//!
//! # Usage in tests
//!
//! ```ignore
//! let camera = MockCamera::denied("user dismissed prompt");
//! let handle = camera.clone();
//! // … start a session with Box::new(camera) …
//! assert_eq!(handle.tracks_stopped(), 0);
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{CameraDevice, CameraError, CameraStream, VideoFrame};

/// Ordered record of lifecycle calls shared between several mocks.
///
/// Lets a test assert on the *relative* order of calls made on different
/// resources (detector closed before camera tracks stopped).
#[derive(Clone, Default)]
pub struct CallJournal(Arc<Mutex<Vec<&'static str>>>);

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: &'static str) {
        self.0.lock().expect("lock poisoned").push(call);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().expect("lock poisoned").clone()
    }
}

struct MockCameraState {
    outcome: Result<(), CameraError>,
    width: u32,
    height: u32,
    warmup_frames: u64,
    stop_error: Option<CameraError>,
    requests: u32,
    frames_served: u64,
    tracks_stopped: u32,
}

/// A mock implementation of [`CameraDevice`].
#[derive(Clone)]
pub struct MockCamera {
    state: Arc<Mutex<MockCameraState>>,
    journal: Option<CallJournal>,
}

impl MockCamera {
    fn with_outcome(outcome: Result<(), CameraError>, width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockCameraState {
                outcome,
                width,
                height,
                warmup_frames: 0,
                stop_error: None,
                requests: 0,
                frames_served: 0,
                tracks_stopped: 0,
            })),
            journal: None,
        }
    }

    /// A camera that grants access and produces `width`×`height` frames.
    pub fn granted(width: u32, height: u32) -> Self {
        Self::with_outcome(Ok(()), width, height)
    }

    /// A camera whose permission prompt is refused.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::failing(CameraError::PermissionDenied(reason.into()))
    }

    /// A camera whose stream request fails with `error`.
    pub fn failing(error: CameraError) -> Self {
        Self::with_outcome(Err(error), 0, 0)
    }

    /// Reports 0×0 for the first `frames` frames of each stream.
    pub fn with_warmup_frames(self, frames: u64) -> Self {
        self.state.lock().expect("lock poisoned").warmup_frames = frames;
        self
    }

    /// Makes `stop_all_tracks` report `error` (after still stopping the tracks).
    pub fn with_stop_error(self, error: CameraError) -> Self {
        self.state.lock().expect("lock poisoned").stop_error = Some(error);
        self
    }

    /// Records lifecycle calls into `journal`.
    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Number of times a stream was requested.
    pub fn request_count(&self) -> u32 {
        self.state.lock().expect("lock poisoned").requests
    }

    /// Number of decodable frames handed out across all streams.
    pub fn frames_served(&self) -> u64 {
        self.state.lock().expect("lock poisoned").frames_served
    }

    /// Number of `stop_all_tracks` calls that actually stopped a live stream.
    pub fn tracks_stopped(&self) -> u32 {
        self.state.lock().expect("lock poisoned").tracks_stopped
    }

    fn record(&self, call: &'static str) {
        if let Some(journal) = &self.journal {
            journal.record(call);
        }
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    async fn request_stream(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        self.record("camera.request");
        let outcome = {
            let mut state = self.state.lock().expect("lock poisoned");
            state.requests += 1;
            state.outcome.clone()
        };
        outcome?;
        Ok(Box::new(MockStream {
            camera: self.clone(),
            sequence: 0,
            stopped: false,
        }))
    }
}

/// Stream handed out by [`MockCamera`].
struct MockStream {
    camera: MockCamera,
    sequence: u64,
    stopped: bool,
}

impl CameraStream for MockStream {
    fn next_frame(&mut self) -> Option<VideoFrame> {
        if self.stopped {
            return None;
        }
        self.sequence += 1;
        let mut state = self.camera.state.lock().expect("lock poisoned");
        let (width, height) = if self.sequence <= state.warmup_frames {
            (0, 0)
        } else {
            state.frames_served += 1;
            (state.width, state.height)
        };
        Some(VideoFrame {
            width,
            height,
            sequence: self.sequence,
            pixels: Vec::new(),
        })
    }

    fn stop_all_tracks(&mut self) -> Result<(), CameraError> {
        if self.stopped {
            return Err(CameraError::TrackStop("tracks already stopped".into()));
        }
        self.stopped = true;
        self.camera.record("camera.stop_tracks");
        let mut state = self.camera.state.lock().expect("lock poisoned");
        state.tracks_stopped += 1;
        match state.stop_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
