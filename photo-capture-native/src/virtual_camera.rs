//! Virtual camera backed by a still image file.
//!
//! Lets the capture flow run on machines without a webcam: every
//! acquisition decodes the file and streams it as a single unchanging
//! frame, scaled down to the requested resolution.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use parking_lot::Mutex;

use photo_capture_core::models::device::MediaConstraints;
use photo_capture_core::models::error::{CaptureError, PlaybackError};
use photo_capture_core::models::frame::RawFrame;
use photo_capture_core::traits::camera_device::{CameraDevice, MediaStream};
use photo_capture_core::traits::preview_surface::PreviewSurface;

/// Camera device that streams the image at `path`.
pub struct VirtualCamera {
    path: PathBuf,
    denied: AtomicBool,
}

impl VirtualCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            denied: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Simulate the user blocking camera access.
    pub fn set_permission_denied(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }
}

#[async_trait]
impl CameraDevice for VirtualCamera {
    async fn acquire(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(CaptureError::PermissionDenied);
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => CaptureError::DeviceNotFound,
            ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
            _ => CaptureError::UnknownDevice(format!("{}: {}", self.path.display(), e)),
        })?;

        let frame = decode_frame(&bytes, constraints).map_err(|e| {
            log::warn!("cannot decode {}: {}", self.path.display(), e);
            CaptureError::DeviceNotSupported
        })?;

        log::info!(
            "virtual camera streaming {} at {}x{}",
            self.path.display(),
            frame.width,
            frame.height
        );
        Ok(Arc::new(VirtualStream::new(frame)))
    }
}

/// Decode `bytes` to RGBA, shrinking to fit the ideal resolution.
fn decode_frame(bytes: &[u8], constraints: &MediaConstraints) -> Result<RawFrame, image::ImageError> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > constraints.ideal_width || img.height() > constraints.ideal_height {
        img = img.resize(
            constraints.ideal_width,
            constraints.ideal_height,
            FilterType::Triangle,
        );
    }

    let rgba = img.to_rgba8();
    Ok(RawFrame {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// A one-track stream that always shows the same frame.
pub struct VirtualStream {
    id: String,
    frame: RawFrame,
    enabled: AtomicBool,
    stopped: AtomicBool,
}

impl VirtualStream {
    pub fn new(frame: RawFrame) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            frame,
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        }
    }
}

impl MediaStream for VirtualStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn track_count(&self) -> usize {
        1
    }

    fn set_tracks_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn tracks_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stop_tracks(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            log::debug!("virtual stream {} stopped", self.id);
        }
    }

    fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    fn current_frame(&self) -> Option<RawFrame> {
        self.is_active().then(|| self.frame.clone())
    }
}

/// Headless preview surface: holds the attached stream and reads frames
/// straight from it.
#[derive(Default)]
pub struct VirtualSurface {
    stream: Mutex<Option<Arc<dyn MediaStream>>>,
}

impl VirtualSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_attached(&self) -> bool {
        self.stream.lock().is_some()
    }

    fn frame(&self) -> Option<RawFrame> {
        self.stream.lock().as_ref().and_then(|s| s.current_frame())
    }
}

#[async_trait]
impl PreviewSurface for VirtualSurface {
    fn attach(&self, stream: Arc<dyn MediaStream>) {
        *self.stream.lock() = Some(stream);
    }

    fn detach(&self) {
        *self.stream.lock() = None;
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        let active = self.stream.lock().as_ref().map(|s| s.is_active());
        match active {
            Some(true) => Ok(()),
            // Stream stopped under us; a newer load will follow.
            Some(false) => Err(PlaybackError::Aborted),
            None => Err(PlaybackError::Failed("no stream attached".into())),
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frame().map(|f| (f.width, f.height)).unwrap_or((0, 0))
    }

    fn snapshot(&self) -> Result<RawFrame, CaptureError> {
        self.frame()
            .ok_or_else(|| CaptureError::InvalidFrame("no frame to capture".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_capture_core::models::device::DeviceProfile;

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("face.png");
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 150, 120, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn streams_the_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let camera = VirtualCamera::new(write_png(dir.path(), 64, 48));

        let stream = camera
            .acquire(&DeviceProfile::desktop(1280).constraints())
            .await
            .unwrap();
        let frame = stream.current_frame().unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert_eq!(frame.rgba.len(), 64 * 48 * 4);
    }

    #[tokio::test]
    async fn oversized_image_is_scaled_to_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let camera = VirtualCamera::new(write_png(dir.path(), 2560, 1440));

        let stream = camera
            .acquire(&DeviceProfile::desktop(1280).constraints())
            .await
            .unwrap();
        let frame = stream.current_frame().unwrap();
        assert_eq!((frame.width, frame.height), (1280, 720));
    }

    #[tokio::test]
    async fn acquisition_errors_map_to_device_errors() {
        let dir = tempfile::tempdir().unwrap();
        let constraints = DeviceProfile::desktop(1280).constraints();

        let missing = VirtualCamera::new(dir.path().join("nope.png"));
        assert_eq!(
            missing.acquire(&constraints).await.err(),
            Some(CaptureError::DeviceNotFound)
        );

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not an image").unwrap();
        assert_eq!(
            VirtualCamera::new(garbage).acquire(&constraints).await.err(),
            Some(CaptureError::DeviceNotSupported)
        );

        let denied = VirtualCamera::new(write_png(dir.path(), 8, 8));
        denied.set_permission_denied(true);
        assert_eq!(
            denied.acquire(&constraints).await.err(),
            Some(CaptureError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn surface_follows_stream_lifecycle() {
        let surface = VirtualSurface::new();
        assert!(matches!(surface.play().await, Err(PlaybackError::Failed(_))));
        assert_eq!(surface.dimensions(), (0, 0));

        let stream = Arc::new(VirtualStream::new(RawFrame {
            width: 2,
            height: 1,
            rgba: vec![0; 8],
        }));
        surface.attach(stream.clone());
        assert_eq!(surface.play().await, Ok(()));
        assert_eq!(surface.dimensions(), (2, 1));

        // Disabled tracks keep the last frame on screen.
        stream.set_tracks_enabled(false);
        assert!(surface.snapshot().is_ok());

        stream.stop_tracks();
        assert_eq!(surface.play().await, Err(PlaybackError::Aborted));
        assert!(surface.snapshot().is_err());

        surface.detach();
        assert!(!surface.is_attached());
    }
}
