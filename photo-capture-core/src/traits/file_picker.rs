use async_trait::async_trait;

use crate::models::error::CaptureError;

/// A file returned by a [`FilePicker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    /// MIME type as reported by the platform.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// System file picker used in gallery mode.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Whether the picker element exists and can be opened.
    fn is_mounted(&self) -> bool;

    /// Open the picker and wait for the user.
    ///
    /// Returns `Ok(None)` if the user dismissed the picker.
    async fn pick(&self) -> Result<Option<PickedFile>, CaptureError>;
}
