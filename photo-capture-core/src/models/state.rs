use super::error::CaptureError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle ──(camera)──→ loading ──→ live_preview ──capture──→ captured_preview
///   │                  │  ↑                                   │   ↑
///   │                  ↓  │retry                        proceed│   │failure
///   │                 error                                   ↓   │
///   └──(gallery file)──────────────────────────→ captured_preview ← uploading
/// ```
/// A successful upload and "go back" leave the machine; the session is then
/// closed and accepts no further actions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Loading,
    LivePreview,
    CapturedPreview,
    Uploading,
    Error(CaptureError),
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::LivePreview)
    }

    pub fn is_previewing_capture(&self) -> bool {
        matches!(self, Self::CapturedPreview)
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error carried by the full-screen error phase, if any.
    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Short lowercase name, used in logs and delegate payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::LivePreview => "live_preview",
            Self::CapturedPreview => "captured_preview",
            Self::Uploading => "uploading",
            Self::Error(_) => "error",
        }
    }
}
