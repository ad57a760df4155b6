//! In-memory stand-ins for every collaborator of `CaptureSession`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use photo_capture_core::{
    AnalysisService, CameraDevice, CaptureConfiguration, CaptureDelegate, CaptureError,
    FilePicker, MediaConstraints, MediaStream, Navigation, PickedFile, PlaybackError,
    PreviewSurface, RawFrame, ResultStore, ServiceResponse, SessionPhase,
};

pub fn test_config() -> CaptureConfiguration {
    CaptureConfiguration {
        warmup: Duration::ZERO,
        ..Default::default()
    }
}

pub fn solid_frame(width: u32, height: u32) -> RawFrame {
    RawFrame {
        width,
        height,
        rgba: [180, 140, 120, 255].repeat((width * height) as usize),
    }
}

/// A PNG signature padded with zeros to `len` bytes.
pub fn png_file(len: usize) -> PickedFile {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len, 0);
    PickedFile {
        name: "selfie.png".into(),
        mime_type: "image/png".into(),
        bytes,
    }
}

// --- Camera ---

pub struct FakeStream {
    id: String,
    frame: RawFrame,
    enabled: AtomicBool,
    stopped: AtomicBool,
    pub stop_calls: AtomicUsize,
}

impl FakeStream {
    pub fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl MediaStream for FakeStream {
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
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    fn current_frame(&self) -> Option<RawFrame> {
        self.is_active().then(|| self.frame.clone())
    }
}

#[derive(Default)]
struct CameraInner {
    failures: Mutex<VecDeque<CaptureError>>,
    streams: Mutex<Vec<Arc<FakeStream>>>,
    constraints: Mutex<Vec<MediaConstraints>>,
    gate: Option<Arc<Notify>>,
}

#[derive(Clone, Default)]
pub struct FakeCamera {
    inner: Arc<CameraInner>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each `acquire` waits for one `notify_one` on `gate`.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            inner: Arc::new(CameraInner {
                gate: Some(gate),
                ..Default::default()
            }),
        }
    }

    /// Make the next acquisition fail with `error`.
    pub fn fail_next(&self, error: CaptureError) {
        self.inner.failures.lock().push_back(error);
    }

    pub fn acquisitions(&self) -> usize {
        self.inner.constraints.lock().len()
    }

    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        self.inner.constraints.lock().last().copied()
    }

    pub fn stream(&self, index: usize) -> Arc<FakeStream> {
        Arc::clone(&self.inner.streams.lock()[index])
    }

    pub fn stream_count(&self) -> usize {
        self.inner.streams.lock().len()
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn acquire(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError> {
        self.inner.constraints.lock().push(*constraints);
        if let Some(gate) = &self.inner.gate {
            gate.notified().await;
        }
        let failure = self.inner.failures.lock().pop_front();
        if let Some(e) = failure {
            return Err(e);
        }
        let mut streams = self.inner.streams.lock();
        let stream = Arc::new(FakeStream {
            id: format!("stream-{}", streams.len()),
            frame: solid_frame(32, 18),
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
            stop_calls: AtomicUsize::new(0),
        });
        streams.push(Arc::clone(&stream));
        Ok(stream)
    }
}

// --- Preview surface ---

pub struct FakeSurface {
    attached: Mutex<Option<Arc<dyn MediaStream>>>,
    pub attach_calls: AtomicUsize,
    pub detach_calls: AtomicUsize,
    play_result: Mutex<Result<(), PlaybackError>>,
    zero_sized: AtomicBool,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attached: Mutex::new(None),
            attach_calls: AtomicUsize::new(0),
            detach_calls: AtomicUsize::new(0),
            play_result: Mutex::new(Ok(())),
            zero_sized: AtomicBool::new(false),
        })
    }

    pub fn set_play_result(&self, result: Result<(), PlaybackError>) {
        *self.play_result.lock() = result;
    }

    /// Report 0x0 regardless of the attached stream.
    pub fn set_zero_sized(&self, zero: bool) {
        self.zero_sized.store(zero, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.lock().is_some()
    }

    pub fn attaches(&self) -> usize {
        self.attach_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreviewSurface for FakeSurface {
    fn attach(&self, stream: Arc<dyn MediaStream>) {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        *self.attached.lock() = Some(stream);
    }

    fn detach(&self) {
        self.detach_calls.fetch_add(1, Ordering::SeqCst);
        *self.attached.lock() = None;
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        self.play_result.lock().clone()
    }

    fn dimensions(&self) -> (u32, u32) {
        if self.zero_sized.load(Ordering::SeqCst) {
            return (0, 0);
        }
        self.attached
            .lock()
            .as_ref()
            .and_then(|s| s.current_frame())
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0))
    }

    fn snapshot(&self) -> Result<RawFrame, CaptureError> {
        self.attached
            .lock()
            .as_ref()
            .and_then(|s| s.current_frame())
            .ok_or_else(|| CaptureError::InvalidFrame("nothing attached".into()))
    }
}

// --- File picker ---

struct PickerInner {
    mounted: bool,
    files: Mutex<VecDeque<Option<PickedFile>>>,
    opens: AtomicUsize,
}

#[derive(Clone)]
pub struct FakePicker {
    inner: Arc<PickerInner>,
}

impl FakePicker {
    pub fn with_files(files: Vec<Option<PickedFile>>) -> Self {
        Self {
            inner: Arc::new(PickerInner {
                mounted: true,
                files: Mutex::new(files.into()),
                opens: AtomicUsize::new(0),
            }),
        }
    }

    pub fn unmounted() -> Self {
        Self {
            inner: Arc::new(PickerInner {
                mounted: false,
                files: Mutex::new(VecDeque::new()),
                opens: AtomicUsize::new(0),
            }),
        }
    }

    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilePicker for FakePicker {
    fn is_mounted(&self) -> bool {
        self.inner.mounted
    }

    async fn pick(&self) -> Result<Option<PickedFile>, CaptureError> {
        self.inner.opens.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.files.lock().pop_front().flatten())
    }
}

// --- Analysis service ---

#[derive(Default)]
struct ServiceInner {
    responses: Mutex<VecDeque<Result<ServiceResponse, CaptureError>>>,
    bodies: Mutex<Vec<serde_json::Value>>,
    gate: Option<Arc<Notify>>,
}

#[derive(Clone, Default)]
pub struct FakeService {
    inner: Arc<ServiceInner>,
}

impl FakeService {
    pub fn replying(responses: Vec<Result<ServiceResponse, CaptureError>>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }),
        }
    }

    pub fn gated(gate: Arc<Notify>, responses: Vec<Result<ServiceResponse, CaptureError>>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                responses: Mutex::new(responses.into()),
                gate: Some(gate),
                ..Default::default()
            }),
        }
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.inner.bodies.lock().clone()
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn post_json(
        &self,
        _endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<ServiceResponse, CaptureError> {
        self.inner.bodies.lock().push(body.clone());
        if let Some(gate) = &self.inner.gate {
            gate.notified().await;
        }
        let next = self.inner.responses.lock().pop_front();
        next.unwrap_or_else(|| Err(CaptureError::NetworkFailure("no scripted response".into())))
    }
}

// --- Store ---

pub struct FailingStore;

impl ResultStore for FailingStore {
    fn put(&self, _key: &str, _value: &serde_json::Value) -> Result<(), CaptureError> {
        Err(CaptureError::StorageError("quota exceeded".into()))
    }

    fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, CaptureError> {
        Ok(None)
    }
}

// --- Delegate ---

#[derive(Default)]
pub struct RecordingDelegate {
    pub phases: Mutex<Vec<SessionPhase>>,
    pub errors: Mutex<Vec<CaptureError>>,
    pub navigations: Mutex<Vec<Navigation>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.lock().iter().map(SessionPhase::name).collect()
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_phase_changed(&self, phase: &SessionPhase) {
        self.phases.lock().push(phase.clone());
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }

    fn on_navigate(&self, navigation: &Navigation) {
        self.navigations.lock().push(navigation.clone());
    }
}
