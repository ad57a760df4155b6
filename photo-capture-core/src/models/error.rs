use thiserror::Error;

/// Errors that can occur while acquiring a camera, capturing a frame,
/// selecting a file, or submitting a frame for analysis.
///
/// Every variant is recovered locally into `SessionPhase::Error` or an
/// inline error on the current phase; see [`CaptureError::user_message`]
/// for the text shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not found")]
    DeviceNotFound,

    #[error("device not supported")]
    DeviceNotSupported,

    #[error("unknown device error: {0}")]
    UnknownDevice(String),

    #[error("preview playback failed: {0}")]
    PlaybackFailed(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("invalid file type: {0}")]
    InvalidFileType(String),

    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("file read failed: {0}")]
    FileReadFailure(String),

    #[error("file picker unavailable")]
    PickerUnavailable,

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("response parse failed: {0}")]
    ResponseParseFailure(String),

    #[error("service error: {0}")]
    ServiceError(String),

    #[error("empty analysis result")]
    EmptyResult,

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("session closed")]
    SessionClosed,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl CaptureError {
    /// Message suitable for display in the capture UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Camera access denied. Please allow camera access and try again.".into()
            }
            Self::DeviceNotFound => "No camera found. Please connect a camera.".into(),
            Self::DeviceNotSupported => "Camera not supported by this browser.".into(),
            Self::UnknownDevice(_) => "Failed to access camera. Please try again.".into(),
            Self::PlaybackFailed(_) => "Failed to start camera preview. Please try again.".into(),
            Self::InvalidFrame(_) => "Failed to capture image. Please try again.".into(),
            Self::InvalidFileType(_) => "Please select an image file.".into(),
            Self::FileTooLarge { max, .. } => format!(
                "Image is too large. Please select an image under {}MB.",
                max / (1024 * 1024)
            ),
            Self::FileReadFailure(_) => {
                "Failed to read the selected image. Please try another file.".into()
            }
            Self::PickerUnavailable => "Photo gallery is not available.".into(),
            Self::NetworkFailure(_) => {
                "Failed to upload image. Please check your connection and try again.".into()
            }
            Self::ResponseParseFailure(_) => {
                "Received an invalid response from the analysis service.".into()
            }
            Self::ServiceError(detail) => format!("Analysis failed: {}", detail),
            Self::EmptyResult => "Analysis returned no results. Please try another photo.".into(),
            other => other.to_string(),
        }
    }

    /// Whether the error comes from acquiring or starting the camera.
    ///
    /// These render as the full-screen error view; everything else is shown
    /// inline on the current view.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::DeviceNotFound
                | Self::DeviceNotSupported
                | Self::UnknownDevice(_)
                | Self::PlaybackFailed(_)
                | Self::PickerUnavailable
        )
    }
}

/// Outcome of a failed attempt to start preview playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Playback was interrupted by a newer load request. Harmless.
    Aborted,
    Failed(String),
}
