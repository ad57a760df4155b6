use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::analysis::{AnalysisHandoff, Navigation};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::frame::{CaptureSource, CapturedFrame, EntryMode};
use crate::models::state::SessionPhase;
use crate::processing::{data_url, image_codec};
use crate::session::resource_manager::DeviceResourceManager;
use crate::session::selector::EntryHint;
use crate::session::submission::SubmissionPipeline;
use crate::traits::analysis_service::AnalysisService;
use crate::traits::camera_device::CameraDevice;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::file_picker::FilePicker;
use crate::traits::preview_surface::PreviewSurface;
use crate::traits::result_store::ResultStore;

/// Internal mutable session state, protected by `parking_lot::Mutex`.
///
/// Never held across an `.await`. Lock order: session state before the
/// camera manager.
struct SessionState {
    phase: SessionPhase,
    activated: bool,
    closed: bool,
    frame: Option<CapturedFrame>,
    /// Error shown on top of the current view (capture, file selection,
    /// submission). Full-screen errors live in `SessionPhase::Error`.
    inline_error: Option<CaptureError>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            activated: false,
            closed: false,
            frame: None,
            inline_error: None,
        }
    }
}

/// The capture/upload state machine.
///
/// One instance per visit to the capture view. All operations take `&self`
/// so that teardown can run while an acquisition or upload is suspended;
/// in-flight work that resolves afterwards is discarded and its resources
/// released.
///
/// ```text
/// [EntryHint] → activate ─┬─ camera → [DeviceResourceManager] → capture ─┐
///                         └─ gallery → [FilePicker] ─────────────────────┤
///                                                                         ↓
///                              proceed → [SubmissionPipeline] → Navigation::Results
/// ```
pub struct CaptureSession {
    config: CaptureConfiguration,
    entry_mode: EntryMode,
    camera: Option<DeviceResourceManager>,
    picker: Option<Box<dyn FilePicker>>,
    pipeline: SubmissionPipeline,
    delegate: Option<Arc<dyn CaptureDelegate>>,
    state: Mutex<SessionState>,
}

impl CaptureSession {
    /// Start building a session for an already-decided entry mode.
    pub fn builder(entry_mode: EntryMode) -> CaptureSessionBuilder {
        CaptureSessionBuilder::new(entry_mode)
    }

    /// Start building a session, resolving the entry mode from navigation
    /// input. The hint's one-shot flag is consumed here.
    pub fn builder_from_hint(hint: &EntryHint) -> CaptureSessionBuilder {
        CaptureSessionBuilder::new(hint.resolve())
    }

    pub fn entry_mode(&self) -> EntryMode {
        self.entry_mode
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase.clone()
    }

    pub fn inline_error(&self) -> Option<CaptureError> {
        self.state.lock().inline_error.clone()
    }

    pub fn captured_frame(&self) -> Option<CapturedFrame> {
        self.state.lock().frame.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn has_open_camera(&self) -> bool {
        self.camera
            .as_ref()
            .map(DeviceResourceManager::has_open_session)
            .unwrap_or(false)
    }

    /// Run the entry strategy. Transitions: idle → loading (camera) or
    /// idle → captured_preview (gallery, once a file is chosen).
    ///
    /// May only be called once per session.
    pub async fn activate(&self) -> Result<(), CaptureError> {
        {
            let mut s = self.state.lock();
            if s.closed {
                return Err(CaptureError::SessionClosed);
            }
            if s.activated {
                return Err(CaptureError::InvalidTransition("session already activated".into()));
            }
            s.activated = true;
        }

        log::info!("activating capture session in {:?} mode", self.entry_mode);
        match self.entry_mode {
            EntryMode::Camera => self.start_camera().await,
            EntryMode::Gallery => self.open_gallery().await,
        }
    }

    /// Snapshot the live preview. Transitions: live_preview → captured_preview.
    ///
    /// The stream's tracks are disabled, not stopped, so the last frame stays
    /// on screen behind the preview.
    pub fn capture(&self) -> Result<(), CaptureError> {
        self.expect_phase("capture", |p| p.is_live())?;
        let camera = self.camera_manager()?;

        let (width, height) = camera.surface_dimensions();
        if width == 0 || height == 0 {
            return Err(self.fail_inline(CaptureError::InvalidFrame(format!(
                "camera not ready ({}x{})",
                width, height
            ))));
        }

        let frame = camera
            .snapshot()
            .and_then(|raw| image_codec::encode_snapshot(&raw, self.config.jpeg_quality))
            .and_then(|frame| {
                let url = frame.to_data_url();
                data_url::validate_image(&url, self.config.min_payload_chars)
                    .map(|()| frame)
                    .map_err(CaptureError::InvalidFrame)
            });
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => return Err(self.fail_inline(e)),
        };

        let (id, size) = (frame.id.clone(), frame.size());
        self.transition("capture", |p| p.is_live(), |s| {
            camera.set_tracks_enabled(false);
            s.frame = Some(frame);
            s.inline_error = None;
            SessionPhase::CapturedPreview
        })?;
        log::info!("captured frame {} ({} bytes)", id, size);
        Ok(())
    }

    /// Open the file picker and take the chosen file as the captured frame.
    /// Transitions: idle/loading → captured_preview.
    ///
    /// Rejected files leave the phase untouched and set an inline error.
    /// Dismissing the picker is not an error.
    pub async fn pick_from_gallery(&self) -> Result<(), CaptureError> {
        self.expect_phase("pick from gallery", |p| p.is_idle() || p.is_loading())?;
        let picker = self.picker.as_ref().ok_or_else(|| {
            CaptureError::ConfigurationFailed("no file picker configured".into())
        })?;

        let picked = picker.pick().await;
        self.ensure_open()?;

        let file = match picked {
            Ok(Some(file)) => file,
            Ok(None) => {
                log::info!("file picker dismissed");
                return Ok(());
            }
            Err(e) => return Err(self.fail_inline(e)),
        };

        log::info!(
            "picked {} ({}, {} bytes)",
            file.name,
            file.mime_type,
            file.bytes.len()
        );
        let frame = match image_codec::frame_from_file(file, &self.config) {
            Ok(frame) => frame,
            Err(e) => return Err(self.fail_inline(e)),
        };

        self.transition("pick from gallery", |p| p.is_idle() || p.is_loading(), |s| {
            s.frame = Some(frame);
            s.inline_error = None;
            SessionPhase::CapturedPreview
        })?;

        // A pending or open camera is superseded by the chosen file.
        if let Some(camera) = &self.camera {
            camera.shutdown();
        }
        Ok(())
    }

    /// Submit the captured frame. Transitions: captured_preview → uploading,
    /// then either hands off to the results view or returns to
    /// captured_preview with the frame intact.
    pub async fn proceed(&self) -> Result<AnalysisHandoff, CaptureError> {
        let mut prepared: Result<CapturedFrame, CaptureError> = Err(CaptureError::InvalidFrame(
            "no captured image to submit".into(),
        ));
        self.transition("proceed", |p| p.is_previewing_capture(), |s| {
            if let Some(frame) = &s.frame {
                prepared = self.pipeline.prepare(frame).map(|_| frame.clone());
            }
            if prepared.is_ok() {
                s.inline_error = None;
                SessionPhase::Uploading
            } else {
                s.phase.clone()
            }
        })?;
        let frame = prepared.map_err(|e| self.fail_inline(e))?;

        let outcome = self.pipeline.submit(&frame).await;

        // The frozen preview is no longer needed whatever the outcome.
        if let Some(camera) = &self.camera {
            camera.release();
        }

        match outcome {
            Ok(handoff) => {
                let newly_closed = {
                    let mut s = self.state.lock();
                    let was_open = !s.closed;
                    s.closed = true;
                    was_open
                };
                if !newly_closed {
                    log::info!(
                        "session closed during upload; discarding result for frame {}",
                        frame.id
                    );
                    return Err(CaptureError::SessionClosed);
                }
                self.pipeline.persist(&handoff);
                self.navigate(Navigation::Results(handoff.clone()));
                Ok(handoff)
            }
            Err(e) => {
                log::warn!("submission failed: {}", e);
                self.transition("return to preview", |p| p.is_uploading(), |s| {
                    s.inline_error = Some(e.clone());
                    SessionPhase::CapturedPreview
                })?;
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Discard the captured frame and go back to capturing.
    ///
    /// Camera frames return to the live preview if the stream is still
    /// open, otherwise the camera is reacquired. Gallery frames reopen the
    /// picker.
    pub async fn retake(&self) -> Result<(), CaptureError> {
        let next = self.transition("retake", |p| p.is_previewing_capture(), |s| {
            s.inline_error = None;
            match s.frame.take().map(|f| f.source) {
                Some(CaptureSource::Gallery) => SessionPhase::Idle,
                _ => match &self.camera {
                    Some(camera) if camera.set_tracks_enabled(true) => SessionPhase::LivePreview,
                    _ => SessionPhase::Loading,
                },
            }
        })?;

        match next {
            SessionPhase::Idle => self.open_gallery().await,
            SessionPhase::LivePreview => Ok(()),
            _ => self.start_camera().await,
        }
    }

    /// Leave the full-screen error and try the camera again.
    /// Transitions: error → loading.
    pub async fn retry(&self) -> Result<(), CaptureError> {
        self.transition("retry", |p| p.is_error(), |s| {
            s.inline_error = None;
            SessionPhase::Loading
        })?;
        if let Some(camera) = &self.camera {
            camera.shutdown();
        }
        self.start_camera().await
    }

    /// Release everything and return to the previous view.
    pub fn go_back(&self) -> Result<(), CaptureError> {
        self.close()?;
        log::info!("capture session closed by user");
        self.navigate(Navigation::Back);
        Ok(())
    }

    /// Release everything without navigating. Idempotent.
    ///
    /// Call when the hosting view goes away. Acquisitions still in flight
    /// are released when they resolve.
    pub fn teardown(&self) {
        if self.close().is_ok() {
            log::debug!("capture session torn down");
        }
    }

    // --- Internal helpers ---

    /// Acquire and bind the camera. Transitions: * → loading → live_preview
    /// or error.
    async fn start_camera(&self) -> Result<(), CaptureError> {
        let camera = match self.camera_manager() {
            Ok(camera) => camera,
            Err(e) => return Err(self.fail(e)),
        };

        self.state.lock().inline_error = None;
        self.set_phase(SessionPhase::Loading);

        let constraints = self.config.device_profile.constraints();
        match camera.acquire(&constraints).await {
            Ok(()) => {}
            Err(CaptureError::SessionClosed) => return Err(CaptureError::SessionClosed),
            Err(e) => return Err(self.fail_while_loading(e)),
        }

        let epoch = camera.epoch();
        let superseded = || camera.epoch() != epoch || self.ensure_open().is_err();

        if !self.config.warmup.is_zero() {
            tokio::time::sleep(self.config.warmup).await;
        }
        if superseded() {
            // Whoever bumped the epoch already released the stream.
            return Err(CaptureError::SessionClosed);
        }

        if let Err(e) = camera.bind().await {
            if superseded() || e == CaptureError::SessionClosed {
                return Err(CaptureError::SessionClosed);
            }
            camera.release();
            return Err(self.fail_while_loading(e));
        }
        if superseded() {
            return Err(CaptureError::SessionClosed);
        }

        let shown = self.transition("show live preview", |p| p.is_loading(), |_| {
            SessionPhase::LivePreview
        });
        if shown.is_err() {
            // Superseded, e.g. by a gallery pick.
            return Err(CaptureError::SessionClosed);
        }
        log::info!("live preview started");
        Ok(())
    }

    /// Gallery entry: wait one tick for the picker to mount, then open it.
    async fn open_gallery(&self) -> Result<(), CaptureError> {
        tokio::task::yield_now().await;
        self.ensure_open()?;

        let mounted = self.picker.as_ref().map(|p| p.is_mounted()).unwrap_or(false);
        if !mounted {
            let e = self.fail(CaptureError::PickerUnavailable);
            self.navigate(Navigation::Back);
            return Err(e);
        }

        self.pick_from_gallery().await
    }

    fn camera_manager(&self) -> Result<&DeviceResourceManager, CaptureError> {
        self.camera
            .as_ref()
            .ok_or_else(|| CaptureError::ConfigurationFailed("no camera configured".into()))
    }

    fn expect_phase(
        &self,
        action: &str,
        allowed: impl Fn(&SessionPhase) -> bool,
    ) -> Result<(), CaptureError> {
        self.transition(action, allowed, |s| s.phase.clone()).map(|_| ())
    }

    /// Check the phase and enter the next one under a single lock.
    ///
    /// `update` runs with the state locked and returns the phase to enter;
    /// returning the current phase leaves it as is. The delegate hears about
    /// the change after the lock is dropped.
    fn transition(
        &self,
        action: &str,
        allowed: impl Fn(&SessionPhase) -> bool,
        update: impl FnOnce(&mut SessionState) -> SessionPhase,
    ) -> Result<SessionPhase, CaptureError> {
        let next = {
            let mut s = self.state.lock();
            if s.closed {
                return Err(CaptureError::SessionClosed);
            }
            if !allowed(&s.phase) {
                return Err(CaptureError::InvalidTransition(format!(
                    "cannot {} while {}",
                    action,
                    s.phase.name()
                )));
            }
            let next = update(&mut s);
            if s.phase == next {
                return Ok(next);
            }
            log::debug!("phase {} → {}", s.phase.name(), next.name());
            s.phase = next.clone();
            next
        };
        if let Some(ref delegate) = self.delegate {
            delegate.on_phase_changed(&next);
        }
        Ok(next)
    }

    fn ensure_open(&self) -> Result<(), CaptureError> {
        if self.state.lock().closed {
            return Err(CaptureError::SessionClosed);
        }
        Ok(())
    }

    /// Mark the session closed and release the camera.
    fn close(&self) -> Result<(), CaptureError> {
        {
            let mut s = self.state.lock();
            if s.closed {
                return Err(CaptureError::SessionClosed);
            }
            s.closed = true;
            s.frame = None;
        }
        if let Some(camera) = &self.camera {
            camera.shutdown();
        }
        Ok(())
    }

    /// Move to the full-screen error phase.
    fn fail(&self, error: CaptureError) -> CaptureError {
        log::error!("capture session error: {}", error);
        self.set_phase(SessionPhase::Error(error.clone()));
        self.notify_error(&error);
        error
    }

    /// Enter the error phase, unless start-up was superseded or the session
    /// closed in the meantime.
    fn fail_while_loading(&self, error: CaptureError) -> CaptureError {
        let entered = self.transition("report camera error", |p| p.is_loading(), |_| {
            SessionPhase::Error(error.clone())
        });
        if entered.is_err() {
            return CaptureError::SessionClosed;
        }
        log::error!("capture session error: {}", error);
        self.notify_error(&error);
        error
    }

    /// Record an error on the current view without changing phase.
    fn fail_inline(&self, error: CaptureError) -> CaptureError {
        log::warn!("capture session inline error: {}", error);
        self.state.lock().inline_error = Some(error.clone());
        self.notify_error(&error);
        error
    }

    fn set_phase(&self, new_phase: SessionPhase) {
        {
            let mut s = self.state.lock();
            if s.phase == new_phase {
                return;
            }
            log::debug!("phase {} → {}", s.phase.name(), new_phase.name());
            s.phase = new_phase.clone();
        }
        if let Some(ref delegate) = self.delegate {
            delegate.on_phase_changed(&new_phase);
        }
    }

    fn notify_error(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }

    fn navigate(&self, navigation: Navigation) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_navigate(&navigation);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Assembles a [`CaptureSession`].
///
/// Camera mode needs a camera device and preview surface; gallery mode needs
/// a file picker. Both need an analysis service.
pub struct CaptureSessionBuilder {
    entry_mode: EntryMode,
    config: CaptureConfiguration,
    camera: Option<(Box<dyn CameraDevice>, Arc<dyn PreviewSurface>)>,
    picker: Option<Box<dyn FilePicker>>,
    service: Option<Box<dyn AnalysisService>>,
    store: Option<Arc<dyn ResultStore>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl CaptureSessionBuilder {
    pub fn new(entry_mode: EntryMode) -> Self {
        Self {
            entry_mode,
            config: CaptureConfiguration::default(),
            camera: None,
            picker: None,
            service: None,
            store: None,
            delegate: None,
        }
    }

    pub fn config(mut self, config: CaptureConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn camera(
        mut self,
        device: impl CameraDevice + 'static,
        surface: Arc<dyn PreviewSurface>,
    ) -> Self {
        self.camera = Some((Box::new(device), surface));
        self
    }

    pub fn file_picker(mut self, picker: impl FilePicker + 'static) -> Self {
        self.picker = Some(Box::new(picker));
        self
    }

    pub fn analysis_service(mut self, service: impl AnalysisService + 'static) -> Self {
        self.service = Some(Box::new(service));
        self
    }

    pub fn result_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn delegate(mut self, delegate: Arc<dyn CaptureDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn build(self) -> Result<CaptureSession, CaptureError> {
        self.config
            .validate()
            .map_err(CaptureError::ConfigurationFailed)?;

        match self.entry_mode {
            EntryMode::Camera if self.camera.is_none() => {
                return Err(CaptureError::ConfigurationFailed(
                    "camera mode requires a camera device".into(),
                ))
            }
            EntryMode::Gallery if self.picker.is_none() => {
                return Err(CaptureError::ConfigurationFailed(
                    "gallery mode requires a file picker".into(),
                ))
            }
            _ => {}
        }

        let service = self.service.ok_or_else(|| {
            CaptureError::ConfigurationFailed("an analysis service is required".into())
        })?;
        let mut pipeline = SubmissionPipeline::new(service, self.config.endpoint.clone())
            .with_min_payload_chars(self.config.min_payload_chars);
        if let Some(store) = self.store {
            pipeline = pipeline.with_store(store);
        }

        Ok(CaptureSession {
            entry_mode: self.entry_mode,
            camera: self
                .camera
                .map(|(device, surface)| DeviceResourceManager::new(device, surface)),
            picker: self.picker,
            pipeline,
            delegate: self.delegate,
            state: Mutex::new(SessionState::new()),
            config: self.config,
        })
    }
}
