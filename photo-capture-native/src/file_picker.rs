//! Filesystem stand-in for the platform photo gallery.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use photo_capture_core::models::error::CaptureError;
use photo_capture_core::traits::file_picker::{FilePicker, PickedFile};

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("heic", "image/heic"),
];

/// Declared MIME type for `path`, guessed from its extension.
///
/// Unknown extensions are `application/octet-stream`, which the session
/// rejects as a non-image.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}

/// Largest file read by default, matching the session's default limit.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Hands out queued file paths, one per `pick`.
///
/// An empty queue behaves like the user dismissing the dialog. Files over
/// the size limit are rejected from their metadata without being read.
pub struct PathFilePicker {
    queue: Mutex<VecDeque<PathBuf>>,
    max_bytes: u64,
}

impl PathFilePicker {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            max_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            queue: Mutex::new(paths.into_iter().map(Into::into).collect()),
            max_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    /// Use the session's `max_file_bytes` as the read limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn enqueue(&self, path: impl Into<PathBuf>) {
        self.queue.lock().push_back(path.into());
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl Default for PathFilePicker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilePicker for PathFilePicker {
    fn is_mounted(&self) -> bool {
        true
    }

    async fn pick(&self) -> Result<Option<PickedFile>, CaptureError> {
        let next = self.queue.lock().pop_front();
        let Some(path) = next else {
            return Ok(None);
        };

        let read_failure =
            |e: std::io::Error| CaptureError::FileReadFailure(format!("{}: {}", path.display(), e));

        let size = tokio::fs::metadata(&path).await.map_err(read_failure)?.len();
        if size > self.max_bytes {
            return Err(CaptureError::FileTooLarge {
                size,
                max: self.max_bytes,
            });
        }
        let bytes = tokio::fs::read(&path).await.map_err(read_failure)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("read {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(PickedFile {
            name,
            mime_type: mime_for_path(&path).to_string(),
            bytes,
        }))
    }
}
