//! # photo-capture-core
//!
//! Platform-agnostic photo capture core library.
//!
//! Owns the capture/upload state machine: camera lifecycle, snapshot,
//! gallery fallback, preview, and submission to a remote analysis service.
//! Platform backends (browser bindings, the native virtual camera, HTTP
//! clients) implement the traits in `traits/` and plug into
//! `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! photo-capture-core (this crate)
//! ├── traits/       ← CameraDevice, MediaStream, PreviewSurface, FilePicker,
//! │                   AnalysisService, ResultStore, CaptureDelegate
//! ├── models/       ← CaptureError, SessionPhase, CaptureConfiguration,
//! │                   DeviceProfile, CapturedFrame, AnalysisResult, etc.
//! ├── processing/   ← data URLs, JPEG snapshot encoding, file validation
//! ├── session/      ← CaptureSession (state machine), DeviceResourceManager,
//! │                   MediaSession, EntryHint, SubmissionPipeline
//! └── storage/      ← MemoryResultStore, FileResultStore
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::analysis::{AnalysisHandoff, AnalysisResult, Navigation};
pub use models::config::{CaptureConfiguration, DEFAULT_ANALYSIS_ENDPOINT};
pub use models::device::{DeviceClass, DeviceProfile, FacingMode, MediaConstraints};
pub use models::error::{CaptureError, PlaybackError};
pub use models::frame::{CaptureSource, CapturedFrame, EntryMode, RawFrame};
pub use models::state::SessionPhase;
pub use session::machine::{CaptureSession, CaptureSessionBuilder};
pub use session::media_session::MediaSession;
pub use session::resource_manager::DeviceResourceManager;
pub use session::selector::{EntryHint, OneShotFlag};
pub use session::submission::{interpret_response, SubmissionPipeline};
pub use storage::result_store::{
    FileResultStore, MemoryResultStore, ANALYSIS_RESULT_KEY, ANALYSIS_TIMESTAMP_KEY,
};
pub use traits::analysis_service::{AnalysisService, ServiceResponse};
pub use traits::camera_device::{CameraDevice, MediaStream};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::file_picker::{FilePicker, PickedFile};
pub use traits::preview_surface::PreviewSurface;
pub use traits::result_store::ResultStore;
