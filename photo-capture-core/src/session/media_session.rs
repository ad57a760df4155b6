use std::sync::Arc;

use crate::traits::camera_device::MediaStream;
use crate::traits::preview_surface::PreviewSurface;

/// An open camera stream and the surface it is bound to.
///
/// Releasing stops every track and detaches the surface. Release is
/// idempotent and also runs on drop, so a session can never outlive its
/// owner with the camera still running.
pub struct MediaSession {
    stream: Arc<dyn MediaStream>,
    surface: Option<Arc<dyn PreviewSurface>>,
    released: bool,
}

impl MediaSession {
    pub(crate) fn new(stream: Arc<dyn MediaStream>) -> Self {
        log::debug!(
            "media session opened: stream {} ({} tracks)",
            stream.id(),
            stream.track_count()
        );
        Self {
            stream,
            surface: None,
            released: false,
        }
    }

    pub fn stream_id(&self) -> &str {
        self.stream.id()
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn bind(&mut self, surface: Arc<dyn PreviewSurface>) {
        if let Some(previous) = self.surface.take() {
            previous.detach();
        }
        surface.attach(Arc::clone(&self.stream));
        self.surface = Some(surface);
    }

    pub(crate) fn set_tracks_enabled(&self, enabled: bool) {
        self.stream.set_tracks_enabled(enabled);
    }

    /// Stop tracks and unbind. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.stream.stop_tracks();
        if let Some(surface) = self.surface.take() {
            surface.detach();
        }
        self.released = true;
        log::debug!("media session released: stream {}", self.stream.id());
        true
    }
}

impl Drop for MediaSession {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "media session for stream {} dropped while open; releasing",
                self.stream.id()
            );
            self.release();
        }
    }
}
