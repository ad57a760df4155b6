//! # photo-capture-native
//!
//! Native backends for photo-capture-kit.
//!
//! Provides:
//! - `HttpAnalysisService` — analysis endpoint client over HTTPS (reqwest)
//! - `PathFilePicker` — "gallery" that reads queued files from disk
//! - `VirtualCamera` / `VirtualSurface` — a camera that streams a still image file
//!
//! ## Usage
//! ```ignore
//! use photo_capture_core::{CaptureSession, EntryMode};
//! use photo_capture_native::{HttpAnalysisService, VirtualCamera, VirtualSurface};
//!
//! let session = CaptureSession::builder(EntryMode::Camera)
//!     .camera(VirtualCamera::new("face.jpg"), VirtualSurface::new())
//!     .analysis_service(HttpAnalysisService::new()?)
//!     .build()?;
//! session.activate().await?;
//! session.capture()?;
//! let handoff = session.proceed().await?;
//! ```

pub mod file_picker;
pub mod http_service;
pub mod virtual_camera;

pub use file_picker::{mime_for_path, PathFilePicker, DEFAULT_MAX_FILE_BYTES};
pub use http_service::{HttpAnalysisService, DEFAULT_REQUEST_TIMEOUT};
pub use virtual_camera::{VirtualCamera, VirtualStream, VirtualSurface};
