use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device::MediaConstraints;
use crate::models::error::{CaptureError, PlaybackError};
use crate::models::frame::RawFrame;
use crate::session::media_session::MediaSession;
use crate::traits::camera_device::CameraDevice;
use crate::traits::preview_surface::PreviewSurface;

struct ManagerState {
    session: Option<MediaSession>,
    pending: bool,
    /// Bumped by `shutdown`. Acquisitions that resolve under an older epoch
    /// are stale and get released instead of bound.
    epoch: u64,
}

/// Owns the single camera session and the preview surface it renders to.
pub struct DeviceResourceManager {
    device: Box<dyn CameraDevice>,
    surface: Arc<dyn PreviewSurface>,
    state: Mutex<ManagerState>,
}

/// Clears the pending flag even if the acquiring future is dropped.
struct PendingAcquisition<'a> {
    state: &'a Mutex<ManagerState>,
}

impl Drop for PendingAcquisition<'_> {
    fn drop(&mut self) {
        self.state.lock().pending = false;
    }
}

impl DeviceResourceManager {
    pub fn new(device: Box<dyn CameraDevice>, surface: Arc<dyn PreviewSurface>) -> Self {
        Self {
            device,
            surface,
            state: Mutex::new(ManagerState {
                session: None,
                pending: false,
                epoch: 0,
            }),
        }
    }

    pub fn has_open_session(&self) -> bool {
        self.state.lock().session.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending
    }

    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Request a camera stream and hold it as the open session.
    ///
    /// Fails with `InvalidTransition` if a session is already open or an
    /// acquisition is in flight, and with `SessionClosed` if `shutdown` ran
    /// while waiting for the device (the late stream is released).
    pub async fn acquire(&self, constraints: &MediaConstraints) -> Result<(), CaptureError> {
        let epoch = {
            let mut s = self.state.lock();
            if s.pending {
                return Err(CaptureError::InvalidTransition(
                    "camera acquisition already in progress".into(),
                ));
            }
            if s.session.is_some() {
                return Err(CaptureError::InvalidTransition(
                    "camera session already open".into(),
                ));
            }
            s.pending = true;
            s.epoch
        };

        log::info!(
            "requesting camera {}x{} facing {:?}",
            constraints.ideal_width,
            constraints.ideal_height,
            constraints.facing_mode
        );

        let guard = PendingAcquisition { state: &self.state };
        let result = self.device.acquire(constraints).await;
        drop(guard);

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("camera acquisition failed: {}", e);
                return Err(e);
            }
        };

        let mut session = MediaSession::new(stream);
        {
            let mut s = self.state.lock();
            if s.epoch == epoch {
                s.session = Some(session);
                return Ok(());
            }
        }

        log::warn!(
            "camera stream {} resolved after shutdown; releasing",
            session.stream_id()
        );
        session.release();
        Err(CaptureError::SessionClosed)
    }

    /// Bind the open session to the preview surface and start playback.
    ///
    /// An aborted playback request is not an error.
    pub async fn bind(&self) -> Result<(), CaptureError> {
        let epoch = {
            let mut s = self.state.lock();
            let epoch = s.epoch;
            let session = s.session.as_mut().ok_or_else(|| {
                CaptureError::InvalidTransition("no open camera session to bind".into())
            })?;
            session.bind(Arc::clone(&self.surface));
            epoch
        };

        match self.surface.play().await {
            Ok(()) => {}
            Err(PlaybackError::Aborted) => log::debug!("preview playback aborted; ignoring"),
            Err(PlaybackError::Failed(msg)) => return Err(CaptureError::PlaybackFailed(msg)),
        }

        if self.state.lock().epoch != epoch {
            return Err(CaptureError::SessionClosed);
        }
        Ok(())
    }

    /// Freeze or unfreeze the live feed without releasing the camera.
    pub fn set_tracks_enabled(&self, enabled: bool) -> bool {
        match self.state.lock().session.as_ref() {
            Some(session) => {
                session.set_tracks_enabled(enabled);
                true
            }
            None => false,
        }
    }

    pub fn surface_dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    pub fn snapshot(&self) -> Result<RawFrame, CaptureError> {
        self.surface.snapshot()
    }

    /// Release the open session, if any. Safe to call repeatedly.
    ///
    /// Returns `true` if a session was released by this call.
    pub fn release(&self) -> bool {
        let session = self.state.lock().session.take();
        match session {
            Some(mut session) => session.release(),
            None => false,
        }
    }

    /// Release the open session and invalidate any in-flight acquisition.
    pub fn shutdown(&self) -> bool {
        self.state.lock().epoch += 1;
        self.release()
    }
}
