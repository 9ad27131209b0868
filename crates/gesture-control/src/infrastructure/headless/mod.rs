//! Host adapters for running the controller without a browser.
//!
//! The headless binary has no UI to scroll and no DOM to hit-test, so it
//! plugs in adapters that only log:
//!
//! - [`TracingEventSink`]  – logs every callback at `info`.
//! - [`NoTargets`]         – a hit tester with nothing under the pointer.
//! - [`SyntheticCamera`]   – always grants access and serves blank frames.
//! - [`DemoBackend`]       – pairs the synthetic camera with either the
//!   scripted demo hand or a recorded detector log.

use std::path::PathBuf;

use async_trait::async_trait;
use gesture_core::ScreenPoint;
use tracing::{debug, info};

use crate::application::controller::CaptureBackend;
use crate::application::track_gestures::{EventSink, TargetLocator};
use crate::infrastructure::camera::{CameraDevice, CameraError, CameraStream, VideoFrame};
use crate::infrastructure::landmark_source::replay::ReplayLandmarkSource;
use crate::infrastructure::landmark_source::scripted::ScriptedLandmarkSource;
use crate::infrastructure::landmark_source::LandmarkSource;

/// [`EventSink`] that writes every callback to the log.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn on_scroll(&self, delta: f64) {
        info!(delta, "scroll");
    }

    fn on_pinch(&self) {
        info!("pinch");
    }

    fn on_drag(&self, dx: f64, dy: f64) {
        info!(dx, dy, "drag");
    }
}

/// [`TargetLocator`] for hosts without clickable elements.
#[derive(Debug, Default)]
pub struct NoTargets;

impl TargetLocator for NoTargets {
    fn locate(&self, _point: ScreenPoint) -> Option<String> {
        None
    }

    fn activate(&self, target: &str) -> Result<(), String> {
        Err(format!("no element named {target}"))
    }
}

/// Camera that needs no hardware.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticCamera {
    pub width: u32,
    pub height: u32,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn request_stream(&mut self) -> Result<Box<dyn CameraStream>, CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::DeviceNotFound(
                "synthetic camera has no resolution".into(),
            ));
        }
        Ok(Box::new(SyntheticStream {
            camera: *self,
            sequence: 0,
            stopped: false,
        }))
    }
}

struct SyntheticStream {
    camera: SyntheticCamera,
    sequence: u64,
    stopped: bool,
}

impl CameraStream for SyntheticStream {
    fn next_frame(&mut self) -> Option<VideoFrame> {
        if self.stopped {
            return None;
        }
        self.sequence += 1;
        Some(VideoFrame {
            width: self.camera.width,
            height: self.camera.height,
            sequence: self.sequence,
            pixels: Vec::new(),
        })
    }

    fn stop_all_tracks(&mut self) -> Result<(), CameraError> {
        if self.stopped {
            return Err(CameraError::TrackStop("tracks already stopped".into()));
        }
        self.stopped = true;
        debug!(frames = self.sequence, "synthetic camera stopped");
        Ok(())
    }
}

/// Backend used by the headless binary.
#[derive(Debug, Clone, Default)]
pub struct DemoBackend {
    /// Recorded detector output to replay instead of the scripted hand.
    pub recording: Option<PathBuf>,
    pub camera: SyntheticCamera,
}

impl CaptureBackend for DemoBackend {
    fn landmark_source(&self) -> Box<dyn LandmarkSource> {
        match &self.recording {
            Some(path) => Box::new(ReplayLandmarkSource::open(path.clone())),
            None => Box::new(ScriptedLandmarkSource::new()),
        }
    }

    fn camera(&self) -> Box<dyn CameraDevice> {
        Box::new(self.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_camera_serves_frames_until_stopped() {
        let mut camera = SyntheticCamera::default();
        let mut stream = tokio_test::block_on(camera.request_stream()).expect("stream");
        assert!(stream.next_frame().expect("frame").is_decodable());
        stream.stop_all_tracks().expect("stop");
        assert!(stream.next_frame().is_none());
        assert!(stream.stop_all_tracks().is_err());
    }

    #[test]
    fn test_zero_sized_synthetic_camera_is_rejected() {
        let mut camera = SyntheticCamera {
            width: 0,
            height: 480,
        };
        let result = tokio_test::block_on(camera.request_stream());
        assert!(matches!(result, Err(CameraError::DeviceNotFound(_))));
    }

    #[test]
    fn test_no_targets_locates_nothing() {
        let locator = NoTargets;
        assert_eq!(locator.locate(ScreenPoint::new(1.0, 2.0)), None);
        assert!(locator.activate("card").is_err());
    }
}
