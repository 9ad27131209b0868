//! Camera infrastructure.
//!
//! A camera is acquired in two steps, mirroring the browser media API:
//!
//! 1. [`CameraDevice::request_stream`] asks for access.  This may suspend for
//!    as long as the user takes to answer a permission prompt, and it may fail
//!    with an ordinary [`CameraError`] (no camera API, permission denied, no
//!    device).  None of these are fatal to the host application.
//! 2. The returned [`CameraStream`] hands out frames until
//!    [`CameraStream::stop_all_tracks`] is called.
//!
//! # Testability
//!
//! [`mock::MockCamera`] lets tests grant or deny access and count how often
//! tracks were stopped, without any capture hardware.

use async_trait::async_trait;
use thiserror::Error;

pub mod mock;

/// Error type for camera operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    /// The environment has no media capture API at all.
    #[error("camera not supported in this environment")]
    NotSupported,
    /// The user or platform policy refused camera access.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    /// No capture device is attached.
    #[error("no camera device found: {0}")]
    DeviceNotFound(String),
    /// A track could not be stopped (for example it was already ended).
    #[error("failed to stop camera track: {0}")]
    TrackStop(String),
    /// Any other capture failure.
    #[error("camera failure: {0}")]
    Other(String),
}

/// One captured video frame.
///
/// Pixel data stays opaque to this crate; only the landmark source looks at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Monotonic frame counter assigned by the stream.
    pub sequence: u64,
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    /// A frame can be handed to the detector only once it has real dimensions.
    ///
    /// Streams report 0×0 until the first frame has been decoded.
    pub fn is_decodable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A live camera stream.
pub trait CameraStream: Send {
    /// Returns the most recent frame, or `None` if nothing has arrived yet.
    fn next_frame(&mut self) -> Option<VideoFrame>;

    /// Stops every track of the stream.
    ///
    /// Must tolerate being called on already-stopped tracks by returning an
    /// error rather than panicking.
    fn stop_all_tracks(&mut self) -> Result<(), CameraError>;
}

/// A camera that can be asked for a stream.
#[async_trait]
pub trait CameraDevice: Send {
    /// Requests camera access and opens a stream.
    async fn request_stream(&mut self) -> Result<Box<dyn CameraStream>, CameraError>;
}
