use std::sync::Arc;

use async_trait::async_trait;

use crate::models::device::MediaConstraints;
use crate::models::error::CaptureError;
use crate::models::frame::RawFrame;

/// A live video stream handed out by a [`CameraDevice`].
///
/// Implemented by:
/// - `VirtualStream` (photo-capture-native, image-file backed)
/// - browser `MediaStream` wrappers in embedding applications
pub trait MediaStream: Send + Sync {
    /// Stable identifier, used in logs.
    fn id(&self) -> &str;

    /// Number of video tracks in the stream.
    fn track_count(&self) -> usize;

    /// Enable or disable every track. Disabled tracks keep their last frame.
    fn set_tracks_enabled(&self, enabled: bool);

    fn tracks_enabled(&self) -> bool;

    /// Stop every track. After this the stream delivers no frames and the
    /// device is free for another client.
    fn stop_tracks(&self);

    /// Whether any track is still live.
    fn is_active(&self) -> bool;

    /// Most recent decoded frame, if the stream has produced one.
    fn current_frame(&self) -> Option<RawFrame>;
}

/// Source of camera streams.
///
/// `acquire` may show an OS permission prompt and should map platform
/// failures onto `PermissionDenied`, `DeviceNotFound`, `DeviceNotSupported`
/// or `UnknownDevice`.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn acquire(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError>;
}
