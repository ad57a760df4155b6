use std::sync::Arc;

use async_trait::async_trait;

use crate::models::error::{CaptureError, PlaybackError};
use crate::models::frame::RawFrame;
use crate::traits::camera_device::MediaStream;

/// Where the live camera feed is rendered.
///
/// Only the device resource manager attaches and detaches streams; the
/// state machine reads dimensions and snapshots through it.
#[async_trait]
pub trait PreviewSurface: Send + Sync {
    /// Use `stream` as the surface's video source.
    fn attach(&self, stream: Arc<dyn MediaStream>);

    /// Clear the video source.
    fn detach(&self);

    /// Start playback of the attached stream.
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Intrinsic video size; `(0, 0)` until the stream has produced a frame.
    fn dimensions(&self) -> (u32, u32);

    /// Copy the currently displayed frame.
    fn snapshot(&self) -> Result<RawFrame, CaptureError>;
}
